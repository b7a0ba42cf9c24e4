//! # rag-api
//!
//! JSON-over-HTTP surface of the retrieval service.
//!
//! Every response is an envelope: `{"success": true, "data": ...}` on
//! success, `{"success": false, "error": ..., "details": ...}` otherwise.
//!
//! | route                          | operation                 |
//! |--------------------------------|---------------------------|
//! | `GET /`                        | liveness banner           |
//! | `GET /health`                  | health check              |
//! | `GET /api/files`               | list stored files         |
//! | `POST /api/search`             | similarity search         |
//! | `POST /api/documents`          | ingest documents          |
//! | `PATCH /api/files/directories` | move files between directories |
//! | `DELETE /api/files/{filename}` | remove a file             |

pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod server;

pub use error::{ApiError, ServerError};
pub use extract::ValidatedJson;
pub use handlers::AppState;
pub use server::{create_cors_layer, create_router, serve, shutdown_signal};
