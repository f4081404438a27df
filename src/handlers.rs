use crate::batch::run_bounded;
use crate::config::Config;
use crate::enrichment::BatchEnricher;
use crate::errors::{AppError, ErrorBody};
use crate::models::*;
use crate::store::{is_valid_region, NumberStore};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence port.
    pub store: Arc<dyn NumberStore>,
    /// Create-and-enrich orchestrator.
    pub enricher: BatchEnricher,
    /// Application configuration.
    pub config: Config,
}

/// GET /
pub async fn start() -> Json<&'static str> {
    Json("Start page")
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "regnum-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /create
///
/// Persists every submitted number and enriches each one concurrently.
/// Always answers 200 once the batch has finished; per-item failures are
/// reported in `results`.
///
/// # Returns
///
/// * `Result<Json<CreateResponse>, AppError>` - Echoed numbers plus per-item outcomes,
///   or 400 for a malformed body, a blank number or an oversized batch.
#[utoipa::path(
    post,
    path = "/create",
    tag = "numbers",
    request_body = CreateRequest,
    responses(
        (status = 200, description = "Per-item outcomes", body = CreateResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_numbers(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Json<CreateResponse>, AppError> {
    let Json(req) = payload.map_err(bad_body)?;
    tracing::debug!("POST /create - {} number(s)", req.reg_nums.len());

    if req.reg_nums.len() > state.config.max_batch_size {
        return Err(AppError::BadRequest(format!(
            "Batch of {} exceeds the limit of {} numbers",
            req.reg_nums.len(),
            state.config.max_batch_size
        )));
    }

    let reg_nums = req
        .reg_nums
        .into_iter()
        .map(|n| n.trim().to_string())
        .collect::<Vec<_>>();
    if reg_nums.iter().any(|n| n.is_empty()) {
        return Err(AppError::BadRequest(
            "regNums must not contain blank values".to_string(),
        ));
    }

    let report = state.enricher.process_batch(reg_nums.clone()).await;

    Ok(Json(CreateResponse { reg_nums, report }))
}

/// POST /delete
///
/// Deletes the given ids concurrently. Workers only return results; the
/// response is decided here after all of them have finished.
#[utoipa::path(
    post,
    path = "/delete",
    tag = "numbers",
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "Every id deleted; echoes the ids", body = [String]),
        (status = 400, description = "Malformed body or non-integer id", body = ErrorBody),
        (status = 500, description = "At least one delete failed", body = ErrorBody)
    )
)]
pub async fn delete_numbers(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<Vec<String>>, AppError> {
    let Json(req) = payload.map_err(bad_body)?;
    tracing::debug!("POST /delete - ids: {:?}", req.ids);

    if req.ids.len() > state.config.max_batch_size {
        return Err(AppError::BadRequest(format!(
            "Batch of {} exceeds the limit of {} ids",
            req.ids.len(),
            state.config.max_batch_size
        )));
    }

    let ids = req
        .ids
        .iter()
        .map(|raw| parse_record_id(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let results = run_bounded(
        ids,
        state.config.batch_concurrency,
        |id| {
            let store = Arc::clone(&state.store);
            async move { (id, store.delete(id).await.map_err(|e| e.to_string())) }
        },
        |id, reason| (id, Err(reason)),
    )
    .await;

    let failed = results
        .iter()
        .filter_map(|(id, result)| match result {
            Ok(()) => {
                tracing::info!("delete {} success", id);
                None
            }
            Err(e) => {
                tracing::error!("delete {} error: {}", id, e);
                Some(*id)
            }
        })
        .collect::<Vec<_>>();

    if !failed.is_empty() {
        return Err(AppError::InternalError(format!(
            "failed to delete {} of {} ids: {:?}",
            failed.len(),
            results.len(),
            failed
        )));
    }

    Ok(Json(req.ids))
}

/// GET /list?id=|prefix=|region=
///
/// Exactly one parameter selects the lookup. By id answers a string (empty
/// when absent); by prefix or region answers an array.
#[utoipa::path(
    get,
    path = "/list",
    tag = "numbers",
    params(ListQuery),
    responses(
        (status = 200, description = "String by id, array otherwise", body = ListResult),
        (status = 400, description = "Invalid query", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    )
)]
pub async fn list_numbers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListResult>, AppError> {
    tracing::debug!("GET /list - params: {:?}", params);

    let mode = params.mode().ok_or_else(|| {
        AppError::BadRequest("Exactly one of id, prefix or region is required".to_string())
    })?;

    let result = match mode {
        ListMode::ById(raw) => {
            let id = parse_record_id(&raw)?;
            let number = state.store.get_by_id(id).await?;
            tracing::info!("get[GetById] {} success", id);
            ListResult::Single(number.unwrap_or_default())
        }
        ListMode::ByPrefix(prefix) => {
            let numbers = state.store.get_by_prefix(&prefix).await?;
            tracing::info!(prefix = %prefix, count = numbers.len(), "get[GetByPrefix] success");
            ListResult::Many(numbers)
        }
        ListMode::ByRegion(region) => {
            let region = region.trim().to_string();
            if !is_valid_region(&region) {
                return Err(AppError::BadRequest(format!(
                    "Invalid region '{}': expected 1-8 letters or digits",
                    region
                )));
            }
            let numbers = state.store.get_by_region(&region).await?;
            tracing::info!(region = %region, count = numbers.len(), "get[GetByRegion] success");
            ListResult::Many(numbers)
        }
    };

    Ok(Json(result))
}

/// POST /update
///
/// Replaces the number stored under `id`. Any store failure, not-found
/// included, answers 500 with a generic message.
#[utoipa::path(
    post,
    path = "/update",
    tag = "numbers",
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Number replaced; echoes the id", body = String),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Store failure or unknown id", body = ErrorBody)
    )
)]
pub async fn update_number(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<String>, AppError> {
    let Json(req) = payload.map_err(bad_body)?;
    tracing::debug!("POST /update - request: {:?}", req);

    let id = parse_record_id(&req.id)?;
    let new_num = req.new_num.trim();
    if new_num.is_empty() {
        return Err(AppError::BadRequest("newNum must not be blank".to_string()));
    }

    state
        .store
        .update(id, new_num)
        .await
        .map_err(|e| AppError::InternalError(format!("update {} error: {}", id, e)))?;

    tracing::info!("update success, id {}", id);
    Ok(Json(id.to_string()))
}

fn bad_body(rejection: JsonRejection) -> AppError {
    tracing::error!("decode request body error: {}", rejection);
    AppError::BadRequest(rejection.body_text())
}

fn parse_record_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid id '{}': expected an integer", raw)))
}
