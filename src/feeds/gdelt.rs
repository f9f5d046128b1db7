// ==========================================
// 采购风险评估 - 新闻事件源 (GDELT v2 DOC API)
// ==========================================
// 查询: "{国家} supply chain trade disruption", artlist 模式
// 说明: 事件仅作为上下文; 数量只通过地缘智能体的小幅放大量影响评分
// ==========================================

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::domain::country::EventSignal;
use crate::engine::signals::{EventFeed, FetchOutcome, GDELT_HOME_URL};
use crate::feeds::build_http_client;
use crate::feeds::error::{FeedError, FeedResult};

#[derive(Debug, Deserialize)]
struct ArticleList {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
}

pub fn event_query(country: &str) -> String {
    format!("{} supply chain trade disruption", country)
}

/// 解析 artlist 响应; 无文章视为不可用
pub fn parse_article_list(body: &str, country: &str) -> FeedResult<EventSignal> {
    let list: ArticleList =
        serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;

    let top = list
        .articles
        .first()
        .ok_or_else(|| FeedError::Malformed("no articles returned".to_string()))?;

    // 头条为空时按占位处理, 标题回退到已存储记录
    let blank_title = top.title.trim().is_empty();
    let headline = if blank_title {
        format!("No recent events for {}", country)
    } else {
        top.title.trim().to_string()
    };

    Ok(EventSignal {
        headline,
        source_url: top.url.clone(),
        event_count: list.articles.len() as u32,
        is_placeholder: blank_title,
    })
}

// ==========================================
// GdeltEventFeed
// ==========================================
pub struct GdeltEventFeed {
    client: Client,
    base_url: String,
    max_records: u32,
}

impl GdeltEventFeed {
    pub fn new(config: &AnalysisConfig) -> FeedResult<Self> {
        Ok(Self {
            client: build_http_client(config.external_timeout_secs)?,
            base_url: config.gdelt_base_url.clone(),
            max_records: config.gdelt_max_records,
        })
    }

    async fn fetch(&self, country: &str) -> FeedResult<EventSignal> {
        let query = event_query(country);
        let max_records = self.max_records.to_string();
        debug!(country, query = %query, "请求近期事件");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("query", query.as_str()),
                ("mode", "artlist"),
                ("maxrecords", max_records.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_article_list(&body, country)
    }
}

#[async_trait]
impl EventFeed for GdeltEventFeed {
    fn home_url(&self) -> &str {
        GDELT_HOME_URL
    }

    async fn fetch_recent_events(&self, country: &str) -> FetchOutcome<EventSignal> {
        let result = self.fetch(country).await;
        if let Err(e) = &result {
            warn!(country, reason = %e, "近期事件不可用");
        }
        FetchOutcome::from_result(result)
    }
}
