// ==========================================
// 采购风险评估 - 外部数据源错误类型
// ==========================================
// 说明: 获取阶段的 FeedError 在出口处统一转换为 FetchOutcome::Unavailable;
//       只有 ClientInit 会在组装阶段上抛
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP 客户端初始化失败: {0}")]
    ClientInit(String),

    #[error("请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("服务返回非成功状态: {0}")]
    Status(u16),

    #[error("响应格式错误: {0}")]
    Malformed(String),

    #[error("未知国家 (无 ISO 映射): {0}")]
    UnknownCountry(String),

    #[error("数据源已关闭")]
    Disabled,
}

pub type FeedResult<T> = Result<T, FeedError>;
