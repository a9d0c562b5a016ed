//! HTTP Handlers

mod batch;
mod health;
mod models;
mod speech;

pub use batch::*;
pub use health::*;
pub use models::*;
pub use speech::*;
