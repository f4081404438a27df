//! Registration Number API Library
//!
//! CRUD service for vehicle registration numbers with concurrent enrichment
//! of newly created numbers through an external car info API.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `batch`: Bounded task group shared by the batch endpoints.
//! - `config`: Configuration management.
//! - `db`: Database connection pool and schema.
//! - `db_storage`: Postgres implementation of the persistence port.
//! - `enrichment`: Batch create-and-enrich orchestrator.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `obs`: Logging setup.
//! - `openapi`: OpenAPI document and Swagger UI.
//! - `routes`: Router and middleware.
//! - `services`: Car info API client.
//! - `store`: Persistence port.

pub mod api;
pub mod core;
pub mod integrations;

pub mod batch;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod obs;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod store;
