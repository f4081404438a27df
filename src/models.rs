use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============ Database Models ============

/// A stored registration number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NumberRecord {
    /// Server-generated key.
    pub id: i64,
    /// The registration string, never empty.
    pub number: String,
}

/// Vehicle and owner details obtained for one registration number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedInfo {
    pub reg_num: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub owner: Owner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    pub surname: String,
    pub patronymic: Option<String>,
}

// ============ Enrichment API Models ============

/// Payload returned by the enrichment API.
///
/// Every key except `owner.patronymic` is required; a missing or wrong-typed
/// key fails decoding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CarInfoPayload {
    #[serde(rename = "regNum")]
    pub reg_num: String,
    pub mark: String,
    pub model: String,
    pub year: i32,
    pub owner: OwnerPayload,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OwnerPayload {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub patronymic: Option<String>,
}

impl From<CarInfoPayload> for EnrichedInfo {
    fn from(payload: CarInfoPayload) -> Self {
        Self {
            reg_num: payload.reg_num,
            make: payload.mark,
            model: payload.model,
            year: payload.year,
            owner: Owner {
                name: payload.owner.name,
                surname: payload.owner.surname,
                patronymic: payload.owner.patronymic,
            },
        }
    }
}

// ============ Batch Outcomes ============

/// Why a single unit of the create-enrich workflow stopped short of success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ItemErrorKind {
    PersistFailed,
    Timeout,
    TransportFailed,
    RemoteStatusError,
    DecodeFailed,
    EnrichedPersistFailed,
    /// The unit of work panicked or was aborted before reporting.
    TaskFailed,
}

/// Result of processing one identifier of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchOutcome {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub created: bool,
    pub enriched: bool,
    pub error: Option<ItemErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl BatchOutcome {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            id: None,
            created: false,
            enriched: false,
            error: None,
            detail: None,
        }
    }

    pub fn fail(mut self, kind: ItemErrorKind, detail: impl Into<String>) -> Self {
        self.error = Some(kind);
        self.detail = Some(detail.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated outcome of one batch, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BatchReport {
    pub results: Vec<BatchOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn from_outcomes(results: Vec<BatchOutcome>) -> Self {
        let succeeded = results.iter().filter(|o| o.is_success()).count();
        let failed = results.len() - succeeded;
        Self {
            results,
            succeeded,
            failed,
        }
    }
}

// ============ API Request/Response Models ============

/// Body of `POST /create`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateRequest {
    /// Numbers to be created.
    #[schema(example = json!(["X123XX150", "A123BC77"]))]
    #[serde(rename = "regNums")]
    pub reg_nums: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateResponse {
    #[serde(rename = "regNums")]
    pub reg_nums: Vec<String>,
    #[serde(flatten)]
    pub report: BatchReport,
}

/// Body of `POST /delete`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DeleteRequest {
    /// Ids of numbers to be deleted, as decimal strings.
    pub ids: Vec<String>,
}

/// Body of `POST /update`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateRequest {
    pub id: String,
    #[serde(rename = "newNum")]
    pub new_num: String,
}

/// Query parameters for `GET /list`. Exactly one must be non-empty.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Id of the number to retrieve.
    pub id: Option<String>,
    /// Substring the numbers must contain.
    pub prefix: Option<String>,
    /// Region code the numbers must end with (1-8 letters or digits).
    pub region: Option<String>,
}

/// Lookup mode selected by a [`ListQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMode {
    ById(String),
    ByPrefix(String),
    ByRegion(String),
}

impl ListQuery {
    /// Picks the lookup mode, ignoring blank parameters.
    ///
    /// Returns `None` unless exactly one parameter is present.
    pub fn mode(self) -> Option<ListMode> {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        match (
            non_blank(self.id),
            non_blank(self.prefix),
            non_blank(self.region),
        ) {
            (Some(id), None, None) => Some(ListMode::ById(id)),
            (None, Some(prefix), None) => Some(ListMode::ByPrefix(prefix)),
            (None, None, Some(region)) => Some(ListMode::ByRegion(region)),
            _ => None,
        }
    }
}

/// Body of a successful `GET /list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ListResult {
    Single(String),
    Many(Vec<String>),
}
