// ==========================================
// 采购风险评估 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表加载覆写值, 叠加到默认配置之上
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::analysis_config::{AnalysisConfig, ConfigError, ConfigResult};
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn lock(&self) -> ConfigResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析数值配置, 格式错误时回退默认值
    fn get_parsed_or<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    "配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    fn get_string_or(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 加载分析配置 (默认值 + config_kv 覆写), 并校验
    pub fn load_analysis_config(&self) -> ConfigResult<AnalysisConfig> {
        let d = AnalysisConfig::default();

        let config = AnalysisConfig {
            disruption_threshold_days: self
                .get_parsed_or(config_keys::DISRUPTION_THRESHOLD_DAYS, d.disruption_threshold_days)?,
            external_timeout_secs: self
                .get_parsed_or(config_keys::EXTERNAL_TIMEOUT_SECS, d.external_timeout_secs)?,
            world_bank_base_url: self
                .get_string_or(config_keys::WORLD_BANK_BASE_URL, &d.world_bank_base_url)?,
            gdelt_base_url: self.get_string_or(config_keys::GDELT_BASE_URL, &d.gdelt_base_url)?,
            gdelt_max_records: self
                .get_parsed_or(config_keys::GDELT_MAX_RECORDS, d.gdelt_max_records)?,
            narrative_base_url: self
                .get_string_or(config_keys::NARRATIVE_BASE_URL, &d.narrative_base_url)?,
            narrative_model: self.get_string_or(config_keys::NARRATIVE_MODEL, &d.narrative_model)?,
            narrative_api_key: self
                .get_config_value(config_keys::NARRATIVE_API_KEY)?
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            narrative_locale: self
                .get_string_or(config_keys::NARRATIVE_LOCALE, &d.narrative_locale)?,
            alternative_limit: self
                .get_parsed_or(config_keys::ALTERNATIVE_LIMIT, d.alternative_limit)?,
            recommendation_limit: self
                .get_parsed_or(config_keys::RECOMMENDATION_LIMIT, d.recommendation_limit)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// 说明: 密钥类配置不进入快照
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            if key == config_keys::NARRATIVE_API_KEY {
                continue;
            }
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            let affected = tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
            count += affected;
        }

        tx.commit()?;
        Ok(count)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 进度风险
    pub const DISRUPTION_THRESHOLD_DAYS: &str = "disruption_threshold_days";

    // 外部数据源
    pub const EXTERNAL_TIMEOUT_SECS: &str = "external_timeout_secs";
    pub const WORLD_BANK_BASE_URL: &str = "world_bank_base_url";
    pub const GDELT_BASE_URL: &str = "gdelt_base_url";
    pub const GDELT_MAX_RECORDS: &str = "gdelt_max_records";

    // 文本生成 (可选)
    pub const NARRATIVE_BASE_URL: &str = "narrative_base_url";
    pub const NARRATIVE_MODEL: &str = "narrative_model";
    pub const NARRATIVE_API_KEY: &str = "narrative_api_key";
    pub const NARRATIVE_LOCALE: &str = "narrative_locale";

    // 推荐
    pub const ALTERNATIVE_LIMIT: &str = "alternative_limit";
    pub const RECOMMENDATION_LIMIT: &str = "recommendation_limit";
}
