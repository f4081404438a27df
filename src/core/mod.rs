// Domain-layer modules and shared errors/models
pub mod enrichment {
    pub use crate::enrichment::*;
}

pub mod batch {
    pub use crate::batch::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod store {
    pub use crate::store::*;
}

pub mod errors {
    pub use crate::errors::*;
}
