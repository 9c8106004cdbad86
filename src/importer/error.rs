// ==========================================
// 电商卖家库存决策支持系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    // ===== 报表可用性错误 =====
    #[error("必需报表不可用: {report}: {message}")]
    FeedUnavailable { report: String, message: String },

    // ===== 数据形状错误 =====
    #[error("必需列缺失: {0}")]
    MissingColumns(String),

    // ===== 类型转换错误 =====
    #[error("数值转换失败 (行 {row}, 字段 {field}): {value}")]
    NumberFormatError {
        row: usize,
        field: String,
        value: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
