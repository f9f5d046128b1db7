// ==========================================
// 采购风险评估 - 风险智能体
// ==========================================
// 职责: 三个相互独立的启发式评估器, 各自把一类证据映射到 [0, 1] 风险分
// 输入: 进度指标 / 国家风险信号 / 供应商历史表现
// 输出: AgentScore (分数 + 可解释说明)
// 红线: 智能体之间不读取彼此输出; 每一步即时保留 4 位小数
// ==========================================

use crate::domain::analysis::AgentScore;
use crate::domain::types::AgentKind;

// ==========================================
// 数值工具
// ==========================================

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn round4(value: f64) -> f64 {
    round_to(value, 4)
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// 归一化进度风险: clamp(delay / T, 0, 1)
pub fn compute_r_schedule(delay_days: f64, threshold_days: f64) -> f64 {
    if threshold_days <= 0.0 {
        return if delay_days > 0.0 { 1.0 } else { 0.0 };
    }
    round4(clamp01(delay_days / threshold_days))
}

/// 进度绩效指数 SPI = planned / (planned + max(0, delay))
///
/// 计划工期 <= 0 时无延期信息, 视为按计划 (1.0)
pub fn compute_spi(delay_days: f64, planned_duration_days: i64) -> f64 {
    if planned_duration_days <= 0 {
        return 1.0;
    }
    let planned = planned_duration_days as f64;
    round4(planned / (planned + delay_days.max(0.0)))
}

/// 进度偏差 (天), 负数表示落后
pub fn compute_sv_days(delay_days: f64) -> f64 {
    round2(-delay_days)
}

/// 截断到 max_chars 个字符, 超出时追加省略号
pub fn truncate_headline(headline: &str, max_chars: usize) -> String {
    if headline.chars().count() > max_chars {
        let head: String = headline.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        headline.to_string()
    }
}

// ==========================================
// 智能体输入
// ==========================================

/// 进度智能体输入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEvidence {
    pub delay_days: f64,
    pub spi: f64,
    pub r_schedule: f64,
}

/// 地缘智能体输入
#[derive(Debug, Clone, PartialEq)]
pub struct GeopoliticalEvidence {
    /// 国家风险 (0~10)
    pub country_risk_score: f64,
    pub headline: String,
    /// 归一化外部风险 (0~1)
    pub r_external: f64,
    pub event_count: u32,
}

/// 可靠性智能体输入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliabilityEvidence {
    /// 可靠性百分比 (0~100)
    pub reliability_score: f64,
    pub avg_delivery_time: i64,
    pub delay_days: f64,
    pub delay_percent: f64,
}

/// 一次分析的全部智能体输入
#[derive(Debug, Clone, PartialEq)]
pub struct AgentEvidence {
    pub schedule: ScheduleEvidence,
    pub geopolitical: GeopoliticalEvidence,
    pub reliability: ReliabilityEvidence,
}

// ==========================================
// RiskAgentEngine - 智能体集合
// ==========================================
pub struct RiskAgentEngine {
    /// 中断阈值 T (天), 仅用于说明文本
    disruption_threshold_days: f64,
}

impl RiskAgentEngine {
    pub fn new(disruption_threshold_days: f64) -> Self {
        Self {
            disruption_threshold_days,
        }
    }

    /// 依次运行三个智能体, 输出顺序固定 (进度 → 地缘 → 可靠性)
    pub fn evaluate_all(&self, evidence: &AgentEvidence) -> Vec<AgentScore> {
        vec![
            self.schedule_agent(&evidence.schedule),
            self.geopolitical_agent(&evidence.geopolitical),
            self.reliability_agent(&evidence.reliability),
        ]
    }

    /// 进度智能体
    ///
    /// score = 0.7 * R_schedule + 0.3 * (1 - SPI)
    pub fn schedule_agent(&self, evidence: &ScheduleEvidence) -> AgentScore {
        let r_schedule = round4(clamp01(evidence.r_schedule));
        let spi_risk = round4(clamp01(1.0 - evidence.spi));
        let score = round4(clamp01(r_schedule * 0.7 + spi_risk * 0.3));

        let reasoning = if evidence.delay_days <= 0.0 {
            format!(
                "No delay detected. R_schedule={:.3} (T={:.0}d). SPI={:.3}, on schedule.",
                r_schedule, self.disruption_threshold_days, evidence.spi
            )
        } else {
            format!(
                "Delay of {:.1} days → R_schedule={:.3} (T={:.0}d). SPI={:.3} → SPI-risk={:.3}. Weighted score={:.3}.",
                evidence.delay_days,
                r_schedule,
                self.disruption_threshold_days,
                evidence.spi,
                spi_risk,
                score
            )
        };

        AgentScore {
            agent: AgentKind::ScheduleVariance,
            score,
            reasoning,
        }
    }

    /// 地缘智能体
    ///
    /// score = clamp(R_external + min(0.1, 0.01 * 事件数), 0, 1)
    pub fn geopolitical_agent(&self, evidence: &GeopoliticalEvidence) -> AgentScore {
        let r_external = clamp01(evidence.r_external);
        let event_boost = (evidence.event_count as f64 * 0.01).min(0.1);
        let score = round4(clamp01(r_external + event_boost));

        let reasoning = format!(
            "Country risk score {:.1}/10 → R_external={:.3}. Recent events: {} → boost +{:.3}. Latest signal: '{}'",
            evidence.country_risk_score,
            r_external,
            evidence.event_count,
            event_boost,
            truncate_headline(&evidence.headline, 100)
        );

        AgentScore {
            agent: AgentKind::GeopoliticalSignal,
            score,
            reasoning,
        }
    }

    /// 可靠性智能体
    ///
    /// score = 0.4 * 可靠性风险 + 0.3 * 延期/平均交付比 + 0.3 * 延期频率风险
    pub fn reliability_agent(&self, evidence: &ReliabilityEvidence) -> AgentScore {
        let reliability_risk = round4(clamp01(1.0 - evidence.reliability_score / 100.0));
        // 分母为历史平均交付周期, 而非单条记录的计划工期
        let delivery_ratio = if evidence.avg_delivery_time > 0 {
            round4(clamp01(
                evidence.delay_days / evidence.avg_delivery_time as f64,
            ))
        } else {
            0.0
        };
        let frequency_risk = round4(clamp01(evidence.delay_percent / 100.0));

        let score = round4(
            reliability_risk * 0.4 + delivery_ratio * 0.3 + frequency_risk * 0.3,
        );

        let reasoning = format!(
            "Reliability {:.1}% → reliability-risk={:.3}. Delay/avg_delivery_time ratio={:.3}. Delay frequency {:.1}% → freq-risk={:.3}. Weighted score={:.3}.",
            evidence.reliability_score,
            reliability_risk,
            delivery_ratio,
            evidence.delay_percent,
            frequency_risk,
            score
        );

        AgentScore {
            agent: AgentKind::SupplierReliability,
            score,
            reasoning,
        }
    }
}
