// ==========================================
// 电商卖家库存决策支持系统 - 导入层
// ==========================================
// 职责: 报表文件解析 → 列名别名映射 → 标准化记录
// 红线: 核心层不接触原始表头，只消费标准化字段
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod report_reader;
pub mod validator;

pub use error::{ImportError, ImportResult};
pub use field_mapper::{AwdFieldMapper, InventoryFieldMapper, ListingFieldMapper, SalesFieldMapper};
pub use file_parser::{parse_report_file, RawRow};
pub use report_reader::{ReportBundle, ReportKind, ReportReader};
pub use validator::validate_listing_report;
