// ==========================================
// 采购风险评估 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值对象、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod analysis;
pub mod country;
pub mod preference;
pub mod supplier;
pub mod types;

// 重导出核心类型
pub use analysis::{
    AgentScore, AlternativeSupplier, CostImpact, EnsembleResult, FleetAlternative, FleetAnalysis,
    GeoRiskSignal, IndividualScore, RecommendationReport, RefreshReport, RefreshedCountry,
    ScheduleMetrics, SkippedCountry, SupplierAnalysis, SupplierCard, SupplierOverview,
    SupplierRecommendation,
};
pub use country::{CountryFactors, CountrySignal, EventSignal};
pub use preference::PreferenceProfile;
pub use supplier::{ScheduleFact, SupplierFilter, SupplierProfile};
pub use types::{AgentKind, Confidence, Provenance, RiskLevel, ScheduleStatus};
