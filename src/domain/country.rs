// ==========================================
// 采购风险评估 - 国家风险信号与国家因素
// ==========================================

use crate::domain::types::Provenance;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// CountrySignal - 国家风险信号
// ==========================================
// 每次分析临时生成, 同一国家两次调用结果不保证一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySignal {
    pub country: String,
    /// 风险值 (0~10, 越高越危险)
    pub risk_score: f64,
    pub headline: String,
    pub source_url: Option<String>,
    pub provenance: Provenance,
    pub last_updated: Option<NaiveDateTime>,
}

// ==========================================
// EventSignal - 近期事件信号 (新闻事件源)
// ==========================================
// 仅作为上下文, 数值上只通过地缘智能体的小幅放大量影响评分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSignal {
    pub headline: String,
    pub source_url: String,
    pub event_count: u32,
    /// true 表示事件源不可用, 使用了确定性占位信息
    pub is_placeholder: bool,
}

impl EventSignal {
    /// 事件源不可用时的确定性占位
    pub fn placeholder(country: &str, home_url: &str) -> Self {
        Self {
            headline: format!("No recent events retrieved for {}", country),
            source_url: home_url.to_string(),
            event_count: 0,
            is_placeholder: true,
        }
    }
}

// ==========================================
// CountryFactors - 国家物流/贸易因素
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryFactors {
    pub country: String,
    pub continent: String,
    /// 平均海运天数
    pub avg_shipping_days: i64,
    pub shipping_cost_usd_per_kg: f64,
    /// 是否存在自由贸易协定
    pub has_fta: bool,
    pub political_stability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_deterministic() {
        let a = EventSignal::placeholder("Vietnam", "https://www.gdeltproject.org/");
        let b = EventSignal::placeholder("Vietnam", "https://www.gdeltproject.org/");
        assert_eq!(a, b);
        assert_eq!(a.event_count, 0);
        assert!(a.is_placeholder);
        assert!(a.headline.contains("Vietnam"));
    }
}
