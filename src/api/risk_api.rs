// ==========================================
// 采购风险评估 - 风险分析 API
// ==========================================
// 职责: 封装 AnalysisOrchestrator 与 SQLite 仓储, 提供对外查询接口
// 架构: API 层 → Engine 层 (AnalysisOrchestrator) → Repository 层
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AnalysisConfig, ConfigManager};
use crate::domain::analysis::{
    FleetAnalysis, RecommendationReport, RefreshReport, SupplierAnalysis, SupplierOverview,
};
use crate::domain::country::CountrySignal;
use crate::domain::supplier::{SupplierFilter, SupplierProfile};
use crate::engine::{AnalysisOrchestrator, RiskDataStore, SqliteRiskStore};
use crate::feeds::{GdeltEventFeed, HttpNarrativeGenerator, WorldBankStabilityFeed};

/// 外部数据源模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// 实时外部服务 (失败时降级到已存储记录)
    Live,
    /// 不访问网络, 只使用已存储记录
    Offline,
}

// ==========================================
// RiskApi - 风险分析 API
// ==========================================
pub struct RiskApi {
    store: Arc<SqliteRiskStore>,
    orchestrator: AnalysisOrchestrator,
}

impl RiskApi {
    pub fn new(store: Arc<SqliteRiskStore>, orchestrator: AnalysisOrchestrator) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    /// 从共享连接组装 API
    ///
    /// # 参数
    /// - conn: 已初始化表结构的连接
    /// - config: 分析配置 (通常由 ConfigManager 加载)
    /// - mode: 外部数据源模式
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
        config: AnalysisConfig,
        mode: FeedMode,
    ) -> ApiResult<Self> {
        config.validate()?;

        let store = Arc::new(SqliteRiskStore::from_connection(conn));
        let data_store: Arc<dyn RiskDataStore> = store.clone();

        let orchestrator = match mode {
            FeedMode::Live => AnalysisOrchestrator::new(
                config.clone(),
                data_store,
                Arc::new(WorldBankStabilityFeed::new(&config)?),
                Arc::new(GdeltEventFeed::new(&config)?),
                Arc::new(HttpNarrativeGenerator::new(&config)?),
            ),
            FeedMode::Offline => AnalysisOrchestrator::offline(config, data_store),
        };

        Ok(Self::new(store, orchestrator))
    }

    /// 打开数据库文件, 初始化表结构, 从 config_kv 加载配置
    pub fn open(db_path: &str, mode: FeedMode) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        crate::db::init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(conn.clone())?.load_analysis_config()?;
        info!(db_path, mode = ?mode, "风险分析 API 已初始化");

        Self::from_connection(conn, config, mode)
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.orchestrator.config()
    }

    // ==========================================
    // 供应商查询
    // ==========================================

    pub fn list_suppliers(&self, filter: &SupplierFilter) -> ApiResult<Vec<SupplierProfile>> {
        Ok(self.store.list_suppliers(filter)?)
    }

    pub fn get_supplier(&self, supplier_id: i64) -> ApiResult<SupplierProfile> {
        validate_supplier_id(supplier_id)?;
        self.store
            .get_supplier_profile(supplier_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Supplier(id={})不存在", supplier_id)))
    }

    /// 国家风险记录 (已存储层)
    pub fn get_country_risk(&self, country: &str) -> ApiResult<CountrySignal> {
        if country.trim().is_empty() {
            return Err(ApiError::InvalidInput("国家名不能为空".to_string()));
        }
        self.store
            .get_stored_country_signal(country.trim())?
            .ok_or_else(|| ApiError::NotFound(format!("CountryRisk(country={})不存在", country)))
    }

    pub fn list_country_risk(&self) -> ApiResult<Vec<CountrySignal>> {
        Ok(self.store.list_stored_country_signals()?)
    }

    // ==========================================
    // 分析接口
    // ==========================================

    pub async fn analyze_supplier(&self, supplier_id: i64) -> ApiResult<SupplierAnalysis> {
        validate_supplier_id(supplier_id)?;
        Ok(self.orchestrator.analyze_supplier(supplier_id).await?)
    }

    pub async fn analyze_fleet(&self) -> ApiResult<FleetAnalysis> {
        Ok(self.orchestrator.analyze_fleet().await?)
    }

    pub fn recommend_for_user(&self, user_id: i64) -> ApiResult<RecommendationReport> {
        Ok(self.orchestrator.recommend_for_user(user_id)?)
    }

    pub fn suppliers_overview(&self) -> ApiResult<SupplierOverview> {
        Ok(self.orchestrator.suppliers_overview()?)
    }

    /// 刷新全部已存储国家风险记录
    pub async fn refresh_country_signals(&self) -> ApiResult<RefreshReport> {
        Ok(self
            .orchestrator
            .refresh_country_signals(self.store.as_ref())
            .await?)
    }
}

/// 非正数 ID 不可能存在, 不查库直接按未找到处理
fn validate_supplier_id(supplier_id: i64) -> ApiResult<()> {
    if supplier_id <= 0 {
        return Err(ApiError::NotFound(format!("Supplier(id={})不存在", supplier_id)));
    }
    Ok(())
}
