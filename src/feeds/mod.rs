// ==========================================
// 采购风险评估 - 外部数据源 (HTTP 实现)
// ==========================================
// 职责: 实现 engine::signals 定义的 trait
// 红线: 单次尝试, 固定超时, 不重试; 失败只返回 Unavailable
// ==========================================

pub mod error;
pub mod gdelt;
pub mod narrative;
pub mod world_bank;

use std::time::Duration;

use reqwest::Client;

pub use error::{FeedError, FeedResult};
pub use gdelt::GdeltEventFeed;
pub use narrative::HttpNarrativeGenerator;
pub use world_bank::WorldBankStabilityFeed;

/// 构建带固定超时的 HTTP 客户端
///
/// 构建失败直接返回错误, 不退回无超时的默认客户端
pub fn build_http_client(timeout_secs: u64) -> FeedResult<Client> {
    Client::builder()
        .user_agent(concat!("procurement-risk/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| FeedError::ClientInit(e.to_string()))
}
