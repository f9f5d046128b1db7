// ==========================================
// 采购风险评估 - 分析配置对象
// ==========================================
// 职责: 在构造时显式传入编排器/外部数据源的配置
// 红线: 不读取环境变量, 不持有全局可变状态
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置值无效 (key={key}, value={value}): {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("配置读取失败: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("配置锁获取失败: {0}")]
    LockError(String),

    #[error("配置快照解析失败: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// AnalysisConfig - 分析配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 中断阈值 T (天), 延期达到 T 时进度风险饱和为 1.0
    pub disruption_threshold_days: f64,
    /// 外部请求超时 (秒), 单次尝试不重试
    pub external_timeout_secs: u64,
    /// 政治稳定性指标服务地址
    pub world_bank_base_url: String,
    /// 新闻事件源地址
    pub gdelt_base_url: String,
    pub gdelt_max_records: u32,
    /// 文本生成服务 (可选增强, 不在决策路径上)
    pub narrative_base_url: String,
    pub narrative_model: String,
    /// 为空表示关闭文本生成
    pub narrative_api_key: String,
    /// 模板化摘要的语言
    pub narrative_locale: String,
    /// 单供应商分析的替代供应商上限
    pub alternative_limit: usize,
    /// 推荐列表上限
    pub recommendation_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            disruption_threshold_days: 30.0,
            external_timeout_secs: 8,
            world_bank_base_url: "https://api.worldbank.org/v2".to_string(),
            gdelt_base_url: "https://api.gdeltproject.org/api/v2/doc/doc".to_string(),
            gdelt_max_records: 10,
            narrative_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            narrative_model: "gemini-1.5-flash".to_string(),
            narrative_api_key: String::new(),
            narrative_locale: "en".to_string(),
            alternative_limit: 3,
            recommendation_limit: 5,
        }
    }
}

impl AnalysisConfig {
    pub fn narrative_enabled(&self) -> bool {
        !self.narrative_api_key.trim().is_empty()
    }

    /// 校验配置取值范围
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.disruption_threshold_days.is_finite() && self.disruption_threshold_days > 0.0) {
            return Err(invalid(
                "disruption_threshold_days",
                self.disruption_threshold_days,
                "must be a positive number of days",
            ));
        }
        if !(1..=60).contains(&self.external_timeout_secs) {
            return Err(invalid(
                "external_timeout_secs",
                self.external_timeout_secs,
                "must be between 1 and 60 seconds",
            ));
        }
        if self.recommendation_limit == 0 {
            return Err(invalid("recommendation_limit", 0, "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.disruption_threshold_days, 30.0);
        assert!(!config.narrative_enabled());
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let config = AnalysisConfig {
            disruption_threshold_days: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "disruption_threshold_days"
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"disruption_threshold_days": 45.0}"#).unwrap();
        assert_eq!(config.disruption_threshold_days, 45.0);
        assert_eq!(config.external_timeout_secs, 8);
    }
}
