// ==========================================
// 采购风险评估 - 采购方偏好档案仓储
// ==========================================
// 存储: user_company_profile 表, 列表字段为 JSON 数组文本
// ==========================================

use crate::domain::preference::PreferenceProfile;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 偏好档案仓储
pub struct PreferenceProfileRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PreferenceProfileRepository {
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

    /// 按用户查询偏好档案
    ///
    /// # 返回
    /// - Ok(None): 用户未完成入驻档案
    pub fn find_by_user(&self, user_id: i64) -> RepositoryResult<Option<PreferenceProfile>> {
        let conn = self.get_conn()?;

        let raw = conn
            .query_row(
                r#"
                SELECT company_type, raw_materials, preferred_countries
                FROM user_company_profile
                WHERE user_id = ?1
                "#,
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((company_type, raw_materials, preferred_countries)) = raw else {
            return Ok(None);
        };

        Ok(Some(PreferenceProfile {
            raw_materials: parse_json_list(raw_materials.as_deref())?,
            preferred_countries: parse_json_list(preferred_countries.as_deref())?,
            company_type: company_type.filter(|s| !s.trim().is_empty()),
        }))
    }

    /// 保存偏好档案 (覆盖)
    pub fn upsert(
        &self,
        user_id: i64,
        company_name: &str,
        profile: &PreferenceProfile,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO user_company_profile (
                user_id, company_name, company_type, raw_materials, preferred_countries
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                user_id,
                company_name,
                profile.company_type,
                serde_json::to_string(&profile.raw_materials)?,
                serde_json::to_string(&profile.preferred_countries)?,
            ],
        )?;

        Ok(())
    }
}

/// 解析 JSON 数组文本, 空值视为空列表
fn parse_json_list(raw: Option<&str>) -> RepositoryResult<Vec<String>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => Ok(serde_json::from_str(text)?),
    }
}
