// ==========================================
// 采购风险评估 - 仓储层错误类型
// ==========================================
// 职责: 供应商 / 交付记录 / 国家风险 / 采购方档案 四类表的访问错误
// 说明: SQLite 错误按扩展错误码归类, 不解析错误消息文本
// ==========================================

use rusqlite::{ffi, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 编排器据此返回"供应商不存在"
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    /// 数据库文件无法打开, 或被其他进程长期占用
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    /// 共享连接的 Mutex 中毒
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    /// 国家风险按国家名唯一
    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    /// 交付记录引用了不存在的供应商
    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    /// 入库数据不满足业务约束 (如迟交未标记 delayed), 或 JSON 列无法解析
    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg) => {
                let detail = msg.unwrap_or_else(|| code.to_string());
                match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        RepositoryError::UniqueConstraintViolation(detail)
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => RepositoryError::ForeignKeyViolation(detail),
                    _ => match code.code {
                        ErrorCode::CannotOpen
                        | ErrorCode::NotADatabase
                        | ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked => RepositoryError::DatabaseConnectionError(detail),
                        _ => RepositoryError::DatabaseQueryError(detail),
                    },
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },
            other => RepositoryError::DatabaseQueryError(other.to_string()),
        }
    }
}

/// 档案表的 JSON 列 (原材料 / 偏好国家)
impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::FieldValueError {
            field: "json".to_string(),
            message: err.to_string(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
