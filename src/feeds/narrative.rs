// ==========================================
// 采购风险评估 - 自然语言摘要生成 (可选增强)
// ==========================================
// 接口: {base}/models/{model}:generateContent
// 红线: 不在决策路径上; API Key 为空时直接返回 Unavailable
// ==========================================

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::engine::signals::{FetchOutcome, NarrativeContext, NarrativeGenerator};
use crate::feeds::build_http_client;
use crate::feeds::error::{FeedError, FeedResult};

/// 组装提示词
pub fn build_prompt(context: &NarrativeContext) -> String {
    let agent_text = context
        .agent_scores
        .iter()
        .map(|a| format!("- {} (score={:.3}): {}", a.agent, a.score, a.reasoning))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a procurement risk analyst. Summarize the following multi-agent risk assessment \
for supplier '{}' from {} in 2-3 concise sentences for a procurement manager.\n\
Focus on the most critical risks and actionable recommendations.\n\n\
Agent assessments:\n{}\n\n\
Ensemble risk score: {:.3} (confidence: {}, CV={:.3})\n\n\
Write a plain English executive summary:",
        context.supplier_name,
        context.country,
        agent_text,
        context.ensemble.final_score,
        context.ensemble.confidence,
        context.ensemble.coefficient_of_variation,
    )
}

/// 取首个候选的文本
pub fn parse_generation(payload: &Value) -> FeedResult<String> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FeedError::Malformed("no candidate text".to_string()))
}

// ==========================================
// HttpNarrativeGenerator
// ==========================================
pub struct HttpNarrativeGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl HttpNarrativeGenerator {
    pub fn new(config: &AnalysisConfig) -> FeedResult<Self> {
        Ok(Self {
            client: build_http_client(config.external_timeout_secs)?,
            base_url: config.narrative_base_url.trim_end_matches('/').to_string(),
            model: config.narrative_model.clone(),
            api_key: config.narrative_api_key.trim().to_string(),
        })
    }

    async fn generate(&self, context: &NarrativeContext) -> FeedResult<String> {
        if self.api_key.is_empty() {
            return Err(FeedError::Disabled);
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(context) }] }]
        });
        debug!(supplier = %context.supplier_name, model = %self.model, "请求摘要生成");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let payload: Value = response.json().await?;
        parse_generation(&payload)
    }
}

#[async_trait]
impl NarrativeGenerator for HttpNarrativeGenerator {
    async fn generate_narrative(&self, context: &NarrativeContext) -> FetchOutcome<String> {
        match self.generate(context).await {
            Ok(text) => FetchOutcome::Available(text),
            Err(FeedError::Disabled) => FetchOutcome::unavailable("narrative api key not configured"),
            Err(e) => {
                warn!(supplier = %context.supplier_name, reason = %e, "摘要生成不可用, 使用模板");
                FetchOutcome::Unavailable(e.to_string())
            }
        }
    }
}
