// ==========================================
// 采购风险评估 - 供应商与交付计划数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::supplier::{ScheduleFact, SupplierFilter, SupplierProfile};
use crate::domain::types::ScheduleStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SUPPLIER_COLUMNS: &str = r#"
    id, supplier_name, country, industry, reliability_score,
    average_delivery_time, cost_competitiveness
"#;

const SCHEDULE_COLUMNS: &str = r#"
    id, equipment_name, supplier_id, planned_delivery_date,
    actual_delivery_date, equipment_value, status
"#;

fn map_supplier(row: &Row<'_>) -> SqliteResult<SupplierProfile> {
    Ok(SupplierProfile {
        id: row.get(0)?,
        supplier_name: row.get(1)?,
        country: row.get(2)?,
        industry: row.get(3)?,
        reliability_score: row.get(4)?,
        average_delivery_time: row.get(5)?,
        cost_competitiveness: row.get(6)?,
    })
}

fn map_schedule(row: &Row<'_>) -> SqliteResult<ScheduleFact> {
    Ok(ScheduleFact {
        id: row.get(0)?,
        equipment_name: row.get(1)?,
        supplier_id: row.get(2)?,
        planned_delivery_date: row.get(3)?,
        actual_delivery_date: row.get(4)?,
        equipment_value: row.get(5)?,
        status: ScheduleStatus::parse(&row.get::<_, String>(6)?),
    })
}

// ==========================================
// SupplierRepository - 供应商仓储
// ==========================================

/// 供应商仓储
/// 职责: 管理suppliers表的读写
pub struct SupplierRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SupplierRepository {
    /// 创建新的供应商仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按ID查询供应商
    ///
    /// # 返回
    /// - Ok(Some(SupplierProfile)): 找到供应商
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, supplier_id: i64) -> RepositoryResult<Option<SupplierProfile>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM suppliers WHERE id = ?1", SUPPLIER_COLUMNS);

        let supplier = conn
            .query_row(&sql, params![supplier_id], map_supplier)
            .optional()?;

        Ok(supplier)
    }

    /// 查询全部供应商 (按ID升序, 即插入顺序)
    pub fn list_all(&self) -> RepositoryResult<Vec<SupplierProfile>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM suppliers ORDER BY id", SUPPLIER_COLUMNS);

        let mut stmt = conn.prepare(&sql)?;
        let suppliers = stmt
            .query_map([], map_supplier)?
            .collect::<SqliteResult<Vec<SupplierProfile>>>()?;

        Ok(suppliers)
    }

    /// 按过滤条件查询供应商
    pub fn list_filtered(&self, filter: &SupplierFilter) -> RepositoryResult<Vec<SupplierProfile>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect())
    }

    /// 插入供应商, 返回新ID
    pub fn insert(&self, supplier: &SupplierProfile) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO suppliers (
                supplier_name, country, industry, reliability_score,
                average_delivery_time, cost_competitiveness
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                supplier.supplier_name,
                supplier.country,
                supplier.industry,
                supplier.reliability_score,
                supplier.average_delivery_time,
                supplier.cost_competitiveness,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }
}

// ==========================================
// ScheduleRepository - 交付计划仓储
// ==========================================

/// 交付计划仓储
/// 职责: 管理equipment_schedule表的读写
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询某供应商的全部交付记录
    pub fn list_by_supplier(&self, supplier_id: i64) -> RepositoryResult<Vec<ScheduleFact>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM equipment_schedule WHERE supplier_id = ?1 ORDER BY id",
            SCHEDULE_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let facts = stmt
            .query_map(params![supplier_id], map_schedule)?
            .collect::<SqliteResult<Vec<ScheduleFact>>>()?;

        Ok(facts)
    }

    /// 查询全部交付记录
    pub fn list_all(&self) -> RepositoryResult<Vec<ScheduleFact>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM equipment_schedule ORDER BY id", SCHEDULE_COLUMNS);

        let mut stmt = conn.prepare(&sql)?;
        let facts = stmt
            .query_map([], map_schedule)?
            .collect::<SqliteResult<Vec<ScheduleFact>>>()?;

        Ok(facts)
    }

    /// 插入交付记录, 返回新ID
    ///
    /// 约束: 实际交付晚于计划时必须标记为 delayed
    pub fn insert(&self, fact: &ScheduleFact) -> RepositoryResult<i64> {
        if let Some(actual) = fact.actual_delivery_date {
            if actual > fact.planned_delivery_date && !fact.is_delayed() {
                return Err(RepositoryError::FieldValueError {
                    field: "status".to_string(),
                    message: format!(
                        "equipment '{}' delivered after plan must be tagged delayed",
                        fact.equipment_name
                    ),
                });
            }
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO equipment_schedule (
                equipment_name, supplier_id, planned_delivery_date,
                actual_delivery_date, equipment_value, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                fact.equipment_name,
                fact.supplier_id,
                fact.planned_delivery_date,
                fact.actual_delivery_date,
                fact.equipment_value,
                fact.status.as_str(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }
}
