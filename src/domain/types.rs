// ==========================================
// 采购风险评估 - 领域类型定义
// ==========================================
// 职责: 风险等级 / 置信度 / 数据来源 / 交付状态 / 智能体标识
// 序列化格式: 与对外接口一致 (小写或 kebab-case)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 风险等级 (Risk Level)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,    // 低风险
    Medium, // 中风险
    High,   // 高风险
}

impl RiskLevel {
    /// 按归一化进度风险 (0~1) 判定等级
    ///
    /// 阈值: >=0.67 高, >=0.33 中, 其余低
    pub fn from_schedule_risk(r_schedule: f64) -> Self {
        if r_schedule >= 0.67 {
            RiskLevel::High
        } else if r_schedule >= 0.33 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// 按国家风险分 (0~10) 判定等级
    ///
    /// 阈值: <4 低, 4~<7 中, >=7 高
    /// 注意: 与进度风险阈值不同, 两者衡量的是不同的量
    pub fn from_country_risk(risk_score: f64) -> Self {
        if risk_score >= 7.0 {
            RiskLevel::High
        } else if risk_score >= 4.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 集成置信度 (Ensemble Confidence)
// ==========================================
// 红线: 置信度是智能体"分歧度"(CV) 的反向指标,
//       不代表证据完整度或样本量。单智能体集成恒为 High。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// CV 不超过该值时置信度为 high
pub const HIGH_CONFIDENCE_MAX_CV: f64 = 0.15;
/// CV 超过该值即高不确定性, 同时置信度为 low
pub const HIGH_UNCERTAINTY_CV: f64 = 0.30;

impl Confidence {
    /// CV 映射 (按顺序, 互斥):
    /// - CV <= 0.15 → High
    /// - 0.15 < CV <= 0.30 → Medium
    /// - CV > 0.30 → Low
    pub fn from_cv(cv: f64) -> Self {
        if cv <= HIGH_CONFIDENCE_MAX_CV {
            Confidence::High
        } else if cv <= HIGH_UNCERTAINTY_CV {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 信号来源 (Provenance)
// ==========================================
// 记录国家风险值由降级链的哪一层产生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    LiveService, // 实时外部服务
    Stored,      // 已存储记录
    Default,     // 中性默认值
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::LiveService => "live-service",
            Provenance::Stored => "stored",
            Provenance::Default => "default",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 交付状态 (Schedule Status)
// ==========================================
// 序列化格式: snake_case (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    OnTime,  // 按期
    Delayed, // 延期
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::OnTime => "on_time",
            ScheduleStatus::Delayed => "delayed",
        }
    }

    /// 从数据库字符串解析, 未知值按 OnTime 处理
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "delayed" => ScheduleStatus::Delayed,
            _ => ScheduleStatus::OnTime,
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 风险智能体标识 (Agent Kind)
// ==========================================
// 封闭集合: 三个独立的启发式评估器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    #[serde(rename = "ScheduleVarianceAgent")]
    ScheduleVariance,
    #[serde(rename = "GeopoliticalSignalAgent")]
    GeopoliticalSignal,
    #[serde(rename = "SupplierReliabilityAgent")]
    SupplierReliability,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::ScheduleVariance => "ScheduleVarianceAgent",
            AgentKind::GeopoliticalSignal => "GeopoliticalSignalAgent",
            AgentKind::SupplierReliability => "SupplierReliabilityAgent",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
