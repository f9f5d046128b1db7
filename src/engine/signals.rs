// ==========================================
// 采购风险评估 - 外部信号接口定义
// ==========================================
// 职责: 定义外部数据源 trait, 实现依赖倒置
// 说明: Engine 层定义 trait, feeds 层提供 HTTP 实现
// 红线: 外部获取只返回 FetchOutcome, 从不向评分路径抛错
// ==========================================

use crate::domain::analysis::{AgentScore, EnsembleResult};
use crate::domain::country::EventSignal;
use async_trait::async_trait;
use std::fmt;

// ==========================================
// FetchOutcome - 外部获取结果
// ==========================================

/// 外部获取的显式结果类型
///
/// 降级链对其做模式匹配, 不依赖捕获一切的异常抑制;
/// Unavailable 携带原因, 供日志与测试观察。
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Available(T),
    Unavailable(String),
}

impl<T> FetchOutcome<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        FetchOutcome::Unavailable(reason.into())
    }

    /// 将任意 Result 收敛为 FetchOutcome
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => FetchOutcome::Available(value),
            Err(e) => FetchOutcome::Unavailable(e.to_string()),
        }
    }
}

// ==========================================
// 外部数据源 Trait
// ==========================================

/// 政治稳定性指标源
///
/// 原生刻度约 -2.5 (极不稳定) ~ +2.5 (极稳定)
#[async_trait]
pub trait StabilityFeed: Send + Sync {
    async fn fetch_country_stability(&self, country: &str) -> FetchOutcome<f64>;
}

/// 新闻事件源
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// 事件源主页, 用作占位信息的来源链接
    fn home_url(&self) -> &str;

    async fn fetch_recent_events(&self, country: &str) -> FetchOutcome<EventSignal>;
}

/// 文本生成上下文
#[derive(Debug, Clone)]
pub struct NarrativeContext {
    pub supplier_name: String,
    pub country: String,
    pub agent_scores: Vec<AgentScore>,
    pub ensemble: EnsembleResult,
}

/// 自然语言摘要生成 (可选增强, 不在决策路径上)
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate_narrative(&self, context: &NarrativeContext) -> FetchOutcome<String>;
}

// ==========================================
// 离线实现
// ==========================================

/// 离线稳定性源: 恒不可用, 降级到已存储记录
pub struct OfflineStabilityFeed;

#[async_trait]
impl StabilityFeed for OfflineStabilityFeed {
    async fn fetch_country_stability(&self, _country: &str) -> FetchOutcome<f64> {
        FetchOutcome::unavailable("live stability feed disabled (offline mode)")
    }
}

/// 离线事件源: 恒不可用
pub struct OfflineEventFeed;

pub const GDELT_HOME_URL: &str = "https://www.gdeltproject.org/";

#[async_trait]
impl EventFeed for OfflineEventFeed {
    fn home_url(&self) -> &str {
        GDELT_HOME_URL
    }

    async fn fetch_recent_events(&self, _country: &str) -> FetchOutcome<EventSignal> {
        FetchOutcome::unavailable("event feed disabled (offline mode)")
    }
}

/// 关闭的文本生成: 恒不可用, 使用模板化摘要
pub struct DisabledNarrative;

#[async_trait]
impl NarrativeGenerator for DisabledNarrative {
    async fn generate_narrative(&self, _context: &NarrativeContext) -> FetchOutcome<String> {
        FetchOutcome::unavailable("narrative generation disabled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result_keeps_reason() {
        let ok: FetchOutcome<u32> = FetchOutcome::from_result(Ok::<u32, String>(3));
        assert_eq!(ok, FetchOutcome::Available(3));

        let err: FetchOutcome<u32> = FetchOutcome::from_result(Err::<u32, _>("timeout"));
        assert_eq!(err, FetchOutcome::Unavailable("timeout".to_string()));
    }

    #[tokio::test]
    async fn test_offline_feeds_are_unavailable() {
        assert!(matches!(
            OfflineStabilityFeed.fetch_country_stability("China").await,
            FetchOutcome::Unavailable(_)
        ));
        assert!(matches!(
            OfflineEventFeed.fetch_recent_events("China").await,
            FetchOutcome::Unavailable(_)
        ));
    }
}
