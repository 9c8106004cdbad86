// ==========================================
// 电商卖家库存决策支持系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod error;
pub mod state_store;

pub use error::{RepositoryError, RepositoryResult};
pub use state_store::{MemoryStateStore, SqliteStateStore, StateStore};
