//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Request ID (add unique ID to each request)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{RequireUser, clear_current_user, set_current_user};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
