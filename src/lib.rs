// ==========================================
// 采购风险评估 - 核心库
// ==========================================
// 系统定位: 供应商交付风险的多智能体集成评分 + 替代供应商推荐
// 技术栈: Rust + SQLite + 外部信号源 (HTTP)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与值对象
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 外部数据源 - HTTP 实现
pub mod feeds;

// 引擎层 - 评分规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AgentKind, Confidence, Provenance, RiskLevel, ScheduleStatus};

// 领域实体
pub use domain::{
    AgentScore, CountryFactors, CountrySignal, EnsembleResult, FleetAnalysis, PreferenceProfile,
    ScheduleFact, SupplierAnalysis, SupplierProfile,
};

// 引擎
pub use engine::{
    AnalysisOrchestrator, EnsembleAggregator, FetchOutcome, RiskAgentEngine, SignalResolver,
    SupplierRanker,
};

// API
pub use api::{ApiError, ApiResult, FeedMode, RiskApi};

// 配置
pub use config::{AnalysisConfig, ConfigManager};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "采购供应商风险评估";
