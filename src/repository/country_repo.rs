// ==========================================
// 采购风险评估 - 国家风险与国家因素数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: country_risk 为信号降级链的"已存储"一层
// ==========================================

use crate::domain::country::{CountryFactors, CountrySignal};
use crate::domain::types::Provenance;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

fn map_country_signal(row: &Row<'_>) -> SqliteResult<CountrySignal> {
    Ok(CountrySignal {
        country: row.get(0)?,
        risk_score: row.get(1)?,
        last_updated: row.get(2)?,
        headline: row.get(3)?,
        source_url: row.get(4)?,
        provenance: Provenance::Stored,
    })
}

fn map_country_factors(row: &Row<'_>) -> SqliteResult<CountryFactors> {
    Ok(CountryFactors {
        country: row.get(0)?,
        continent: row.get(1)?,
        avg_shipping_days: row.get(2)?,
        shipping_cost_usd_per_kg: row.get(3)?,
        has_fta: row.get::<_, i64>(4)? != 0,
        political_stability: row.get(5)?,
    })
}

// ==========================================
// CountryRiskRepository - 国家风险仓储
// ==========================================

/// 国家风险仓储
/// 职责: 管理country_risk表的读写
pub struct CountryRiskRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CountryRiskRepository {
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

    /// 按国家名查询 (忽略大小写)
    pub fn find_by_country(&self, country: &str) -> RepositoryResult<Option<CountrySignal>> {
        let conn = self.get_conn()?;

        let signal = conn
            .query_row(
                r#"
                SELECT country, risk_score, last_updated, headline, source_url
                FROM country_risk
                WHERE LOWER(country) = LOWER(?1)
                LIMIT 1
                "#,
                params![country.trim()],
                map_country_signal,
            )
            .optional()?;

        Ok(signal)
    }

    /// 查询全部国家风险记录 (按ID升序)
    pub fn list_all(&self) -> RepositoryResult<Vec<CountrySignal>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT country, risk_score, last_updated, headline, source_url
            FROM country_risk
            ORDER BY id
            "#,
        )?;

        let signals = stmt
            .query_map([], map_country_signal)?
            .collect::<SqliteResult<Vec<CountrySignal>>>()?;

        Ok(signals)
    }

    /// 插入或更新国家风险记录
    pub fn upsert(
        &self,
        country: &str,
        risk_score: f64,
        headline: &str,
        source_url: Option<&str>,
        last_updated: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO country_risk (country, risk_score, last_updated, headline, source_url)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(country) DO UPDATE SET
                risk_score = excluded.risk_score,
                last_updated = excluded.last_updated,
                headline = excluded.headline,
                source_url = excluded.source_url
            "#,
            params![country, risk_score, last_updated, headline, source_url],
        )?;

        Ok(())
    }
}

// ==========================================
// CountryFactorsRepository - 国家因素仓储
// ==========================================

/// 国家因素仓储
/// 职责: 管理country_factors表的读写
pub struct CountryFactorsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CountryFactorsRepository {
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

    pub fn list_all(&self) -> RepositoryResult<Vec<CountryFactors>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT country, continent, avg_shipping_days, shipping_cost_usd_per_kg,
                   has_fta, political_stability
            FROM country_factors
            ORDER BY country
            "#,
        )?;

        let factors = stmt
            .query_map([], map_country_factors)?
            .collect::<SqliteResult<Vec<CountryFactors>>>()?;

        Ok(factors)
    }

    pub fn upsert(&self, factors: &CountryFactors) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO country_factors (
                country, continent, avg_shipping_days, shipping_cost_usd_per_kg,
                has_fta, political_stability
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                factors.country,
                factors.continent,
                factors.avg_shipping_days,
                factors.shipping_cost_usd_per_kg,
                factors.has_fta as i64,
                factors.political_stability,
            ],
        )?;

        Ok(())
    }
}
