//! secretaria-server: HTTP API for academic records
//!
//! Students, student ID cards, professors, departments, courses, and
//! enrollments, exposed as JSON CRUD resources over PostgreSQL.

pub mod db;
pub mod http;
pub mod models;

pub use db::create_pool;
pub use http::{run_server, ApiError, ServerConfig};
