// ==========================================
// 电商卖家库存决策支持系统 - 配置层
// ==========================================
// 职责: 客户清单加载 + 每客户报表路径/参数查询
// ==========================================

pub mod client_config;
pub mod error;

pub use client_config::{ClientConfig, ClientConfigStore, ReportPaths};
pub use error::{ConfigError, ConfigResult};
