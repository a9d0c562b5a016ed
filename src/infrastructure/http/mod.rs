//! HTTP Layer - OpenAI 兼容的 RESTful API

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use rate_limit::{ClientRateLimiter, RateLimits};
pub use routes::create_routes;
pub use server::{build_router, HttpServer, ServerConfig};
pub use state::AppState;
