// ==========================================
// 采购风险评估 - 引擎层数据协作接口
// ==========================================
// 职责: 定义评分核心所需的持久化协作者 trait,
//       并以 SQLite 仓储聚合提供默认实现
// 说明: 评分核心只依赖 RiskDataStore, 不感知存储细节
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::domain::country::{CountryFactors, CountrySignal};
use crate::domain::preference::PreferenceProfile;
use crate::domain::supplier::{ScheduleFact, SupplierFilter, SupplierProfile};
use crate::repository::{
    CountryFactorsRepository, CountryRiskRepository, PreferenceProfileRepository,
    RepositoryResult, ScheduleRepository, SupplierRepository,
};

/// 持久化协作者
///
/// 所有方法均为只读快照; 供应商不存在时返回 Ok(None),
/// 由上层决定是否转为"未找到"错误。
pub trait RiskDataStore: Send + Sync {
    fn get_supplier_profile(&self, supplier_id: i64) -> RepositoryResult<Option<SupplierProfile>>;

    fn list_suppliers(&self, filter: &SupplierFilter) -> RepositoryResult<Vec<SupplierProfile>>;

    fn get_schedule_facts(&self, supplier_id: i64) -> RepositoryResult<Vec<ScheduleFact>>;

    fn list_schedule_facts(&self) -> RepositoryResult<Vec<ScheduleFact>>;

    /// 降级链"已存储"一层 (国家名忽略大小写)
    fn get_stored_country_signal(&self, country: &str) -> RepositoryResult<Option<CountrySignal>>;

    fn list_stored_country_signals(&self) -> RepositoryResult<Vec<CountrySignal>>;

    fn list_country_factors(&self) -> RepositoryResult<Vec<CountryFactors>>;

    fn get_preference_profile(&self, user_id: i64) -> RepositoryResult<Option<PreferenceProfile>>;
}

/// 国家信号写入 (仅刷新服务使用)
pub trait CountrySignalWriter: Send + Sync {
    fn store_country_signal(&self, signal: &CountrySignal) -> RepositoryResult<()>;
}

// ==========================================
// SqliteRiskStore - SQLite 仓储聚合
// ==========================================

/// 风险评分仓储集合
///
/// 聚合评分核心所需的所有 Repository, 共享同一连接。
#[derive(Clone)]
pub struct SqliteRiskStore {
    pub supplier_repo: Arc<SupplierRepository>,
    pub schedule_repo: Arc<ScheduleRepository>,
    pub country_risk_repo: Arc<CountryRiskRepository>,
    pub country_factors_repo: Arc<CountryFactorsRepository>,
    pub profile_repo: Arc<PreferenceProfileRepository>,
}

impl SqliteRiskStore {
    /// 从共享连接创建仓储集合
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            supplier_repo: Arc::new(SupplierRepository::from_connection(conn.clone())),
            schedule_repo: Arc::new(ScheduleRepository::from_connection(conn.clone())),
            country_risk_repo: Arc::new(CountryRiskRepository::from_connection(conn.clone())),
            country_factors_repo: Arc::new(CountryFactorsRepository::from_connection(conn.clone())),
            profile_repo: Arc::new(PreferenceProfileRepository::from_connection(conn)),
        }
    }

    /// 打开数据库文件并初始化表结构
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }
}

impl RiskDataStore for SqliteRiskStore {
    fn get_supplier_profile(&self, supplier_id: i64) -> RepositoryResult<Option<SupplierProfile>> {
        self.supplier_repo.find_by_id(supplier_id)
    }

    fn list_suppliers(&self, filter: &SupplierFilter) -> RepositoryResult<Vec<SupplierProfile>> {
        self.supplier_repo.list_filtered(filter)
    }

    fn get_schedule_facts(&self, supplier_id: i64) -> RepositoryResult<Vec<ScheduleFact>> {
        self.schedule_repo.list_by_supplier(supplier_id)
    }

    fn list_schedule_facts(&self) -> RepositoryResult<Vec<ScheduleFact>> {
        self.schedule_repo.list_all()
    }

    fn get_stored_country_signal(&self, country: &str) -> RepositoryResult<Option<CountrySignal>> {
        self.country_risk_repo.find_by_country(country)
    }

    fn list_stored_country_signals(&self) -> RepositoryResult<Vec<CountrySignal>> {
        self.country_risk_repo.list_all()
    }

    fn list_country_factors(&self) -> RepositoryResult<Vec<CountryFactors>> {
        self.country_factors_repo.list_all()
    }

    fn get_preference_profile(&self, user_id: i64) -> RepositoryResult<Option<PreferenceProfile>> {
        self.profile_repo.find_by_user(user_id)
    }
}

impl CountrySignalWriter for SqliteRiskStore {
    fn store_country_signal(&self, signal: &CountrySignal) -> RepositoryResult<()> {
        let last_updated = signal
            .last_updated
            .unwrap_or_else(|| chrono::Utc::now().naive_utc());
        self.country_risk_repo.upsert(
            &signal.country,
            signal.risk_score,
            &signal.headline,
            signal.source_url.as_deref(),
            last_updated,
        )
    }
}
