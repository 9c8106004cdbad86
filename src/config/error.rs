// ==========================================
// 电商卖家库存决策支持系统 - 配置模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置模块错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    ConfigFileNotFound(String),

    #[error("配置文件解析失败: {0}")]
    ConfigParseError(String),

    #[error("客户配置缺失: {client_id}")]
    ClientNotFound { client_id: String },

    #[error("配置值非法: {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
