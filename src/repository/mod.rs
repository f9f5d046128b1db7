// ==========================================
// 采购风险评估 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod country_repo;
pub mod error;
pub mod profile_repo;
pub mod supplier_repo;

// 重导出核心仓储
pub use country_repo::{CountryFactorsRepository, CountryRiskRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use profile_repo::PreferenceProfileRepository;
pub use supplier_repo::{ScheduleRepository, SupplierRepository};
