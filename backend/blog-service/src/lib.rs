/// Blog Service Library
///
/// Handles users, posts and threaded comments for the blogging backend.
/// Comments form a forest per post; reads materialize a comment together with
/// all of its nested replies.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and the route table
/// - `models`: Records and the derived comment tree
/// - `services`: Post, comment and user lifecycle, plus the tree builder
/// - `db`: Record store traits with PostgreSQL and in-memory backends
/// - `security`: Password hashing
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod openapi;
pub mod security;
pub mod services;

pub use config::Config;
pub use db::{RecordStore, SharedStore, StoreTx};
pub use error::{AppError, Result};
