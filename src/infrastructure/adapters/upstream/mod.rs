//! Upstream Adapter - bot.n.cn 客户端与请求签名

mod fake_client;
mod nano_client;
pub mod signer;

pub use fake_client::{FakeUpstreamClient, FAKE_CATALOG_JSON};
pub use nano_client::*;
pub use signer::SigningContext;
