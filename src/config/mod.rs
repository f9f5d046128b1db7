// ==========================================
// 采购风险评估 - 配置层
// ==========================================
// 职责: 显式配置对象 + config_kv 覆写加载
// 存储: config_kv 表
// ==========================================

pub mod analysis_config;
pub mod config_manager;

// 重导出核心配置
pub use analysis_config::{AnalysisConfig, ConfigError, ConfigResult};
pub use config_manager::{config_keys, ConfigManager};
