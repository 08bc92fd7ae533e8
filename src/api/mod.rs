//! API Module
//!
//! HTTP handlers and routing for the question-tracker REST API.
//!
//! # Endpoints
//! - `GET /api/questions` - Cached question listing
//! - `POST /api/questions/progress` - Record completion status
//! - `POST /api/notes`, `PUT /api/notes/:id`, `DELETE /api/notes/:id` - Notes
//! - `POST /api/admin/questions`, `PUT|DELETE /api/admin/questions/:id` - Catalog
//! - `GET /api/admin/cache`, `DELETE /api/admin/cache` - Server cache admin
//! - `GET /health` - Health check endpoint

pub mod caller;
pub mod handlers;
pub mod routes;

pub use caller::{caller_from_headers, require_admin, require_user};
pub use handlers::*;
pub use routes::create_router;
