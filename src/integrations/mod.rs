//! External service integrations.

pub mod car_info {
    pub use crate::services::*;
}

pub mod postgres {
    pub use crate::db::Database;
    pub use crate::db_storage::*;
}
