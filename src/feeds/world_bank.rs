// ==========================================
// 采购风险评估 - 政治稳定性指标源 (World Bank WGI)
// ==========================================
// 指标: PV.EST (Political Stability and Absence of Violence)
// 原生刻度: 约 -2.5 (极不稳定) ~ +2.5 (极稳定)
// 响应格式: [ {元数据}, [ {"value": 数值或 null, ...} ] ]
// ==========================================

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::engine::signals::{FetchOutcome, StabilityFeed};
use crate::feeds::build_http_client;
use crate::feeds::error::{FeedError, FeedResult};

pub const STABILITY_INDICATOR: &str = "PV.EST";

/// 国家名 → ISO 3166-1 alpha-2
const COUNTRY_ISO: &[(&str, &str)] = &[
    ("China", "CN"),
    ("India", "IN"),
    ("Vietnam", "VN"),
    ("Germany", "DE"),
    ("USA", "US"),
    ("United States", "US"),
    ("Japan", "JP"),
    ("South Korea", "KR"),
    ("Taiwan", "TW"),
    ("Mexico", "MX"),
    ("Brazil", "BR"),
    ("Bangladesh", "BD"),
    ("Indonesia", "ID"),
    ("Thailand", "TH"),
    ("Malaysia", "MY"),
    ("Singapore", "SG"),
    ("Russia", "RU"),
    ("Ukraine", "UA"),
];

/// 查找国家 ISO 代码 (忽略大小写)
pub fn iso_code(country: &str) -> Option<&'static str> {
    let needle = country.trim();
    COUNTRY_ISO
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(needle))
        .map(|(_, iso)| *iso)
}

/// 从 WGI 响应中取最新一条指标值
pub fn parse_stability_payload(payload: &Value) -> FeedResult<f64> {
    let records = payload
        .as_array()
        .and_then(|parts| parts.get(1))
        .and_then(Value::as_array)
        .ok_or_else(|| FeedError::Malformed("missing record list".to_string()))?;

    let first = records
        .first()
        .ok_or_else(|| FeedError::Malformed("empty record list".to_string()))?;

    first
        .get("value")
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .ok_or_else(|| FeedError::Malformed("indicator value is null".to_string()))
}

// ==========================================
// WorldBankStabilityFeed
// ==========================================
pub struct WorldBankStabilityFeed {
    client: Client,
    base_url: String,
}

impl WorldBankStabilityFeed {
    pub fn new(config: &AnalysisConfig) -> FeedResult<Self> {
        Ok(Self {
            client: build_http_client(config.external_timeout_secs)?,
            base_url: config.world_bank_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, country: &str) -> FeedResult<f64> {
        let iso = iso_code(country).ok_or_else(|| FeedError::UnknownCountry(country.to_string()))?;
        let url = format!(
            "{}/country/{}/indicator/{}",
            self.base_url, iso, STABILITY_INDICATOR
        );
        debug!(country, url = %url, "请求政治稳定性指标");

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("mrv", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let payload: Value = response.json().await?;
        parse_stability_payload(&payload)
    }
}

#[async_trait]
impl StabilityFeed for WorldBankStabilityFeed {
    async fn fetch_country_stability(&self, country: &str) -> FetchOutcome<f64> {
        let result = self.fetch(country).await;
        if let Err(e) = &result {
            warn!(country, reason = %e, "政治稳定性指标不可用");
        }
        FetchOutcome::from_result(result)
    }
}
