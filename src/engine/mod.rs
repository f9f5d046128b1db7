// ==========================================
// 采购风险评估 - 引擎层
// ==========================================
// 职责: 指标计算 / 信号降级 / 智能体评分 / 集成聚合 / 排序 / 摘要
// 红线: Engine 不拼 SQL, 所有评分必须输出 reasoning
// ==========================================

pub mod agents;
pub mod ensemble;
pub mod narrative;
pub mod orchestrator;
pub mod overview;
pub mod ranker;
pub mod repositories;
pub mod schedule_metrics;
pub mod signal_resolver;
pub mod signals;

// 重导出核心引擎
pub use agents::{AgentEvidence, RiskAgentEngine};
pub use ensemble::EnsembleAggregator;
pub use narrative::NarrativeComposer;
pub use orchestrator::AnalysisOrchestrator;
pub use overview::SupplierOverviewBuilder;
pub use ranker::SupplierRanker;
pub use repositories::{CountrySignalWriter, RiskDataStore, SqliteRiskStore};
pub use schedule_metrics::ScheduleMetricsCalculator;
pub use signal_resolver::SignalResolver;
pub use signals::{
    DisabledNarrative, EventFeed, FetchOutcome, NarrativeContext, NarrativeGenerator,
    OfflineEventFeed, OfflineStabilityFeed, StabilityFeed,
};
