//! OpenAPI document and Swagger UI page.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use utoipa::OpenApi;

use crate::errors::ErrorBody;
use crate::handlers;
use crate::models::{
    BatchOutcome, BatchReport, CreateRequest, CreateResponse, DeleteRequest, ItemErrorKind,
    ListResult, UpdateRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Registration Number API",
        description = "CRUD for vehicle registration numbers with concurrent car info enrichment"
    ),
    paths(
        handlers::create_numbers,
        handlers::delete_numbers,
        handlers::list_numbers,
        handlers::update_number
    ),
    components(schemas(
        CreateRequest,
        CreateResponse,
        BatchReport,
        BatchOutcome,
        ItemErrorKind,
        DeleteRequest,
        UpdateRequest,
        ListResult,
        ErrorBody
    )),
    tags((name = "numbers", description = "Registration number management"))
)]
pub struct ApiDoc;

/// Serves the OpenAPI document as YAML.
///
/// # Returns
///
/// * `impl IntoResponse` - The YAML document, or 500 if it could not be rendered.
pub async fn serve_openapi_spec() -> impl IntoResponse {
    match ApiDoc::openapi().to_yaml() {
        Ok(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/yaml")],
            content,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to render OpenAPI document: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OpenAPI document unavailable",
            )
                .into_response()
        }
    }
}

/// Serves a Swagger UI page pointed at [`serve_openapi_spec`].
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Registration Number API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.yml",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}
