// ==========================================
// 电商卖家库存决策支持系统 - API 层错误类型
// ==========================================
// 职责: 把导入层/仓储层/配置层错误换装为边界错误，
// 批处理边界只抛结构化错误，决不向调用方透出 panic
// ==========================================

use crate::config::ConfigError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 配置错误 =====
    #[error("客户配置缺失: {0}")]
    ConfigurationMissing(String),

    // ===== 报表错误 =====
    #[error("必需报表不可用: {report}: {message}")]
    FeedUnavailable { report: String, message: String },

    #[error("报表数据形状不符: {missing_fields}")]
    DataShapeMismatch { missing_fields: String },

    #[error("报表导入失败: {0}")]
    ImportFailure(String),

    // ===== 输出错误 =====
    #[error("序列化载荷超限: {size} 字节 > 上限 {limit} 字节")]
    SerializationOverflow { size: usize, limit: usize },

    #[error("序列化失败: {0}")]
    SerializationError(String),

    // ===== 状态存储错误 =====
    #[error("状态存储错误: {0}")]
    StateStoreError(String),

    // ===== 业务输入错误 =====
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// 目的: 报表层技术错误换装为边界可判别的错误
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FeedUnavailable { report, message } => {
                ApiError::FeedUnavailable { report, message }
            }
            ImportError::MissingColumns(fields) => ApiError::DataShapeMismatch {
                missing_fields: fields,
            },
            other => ApiError::ImportFailure(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Other(e) => ApiError::Other(e),
            other => ApiError::StateStoreError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ClientNotFound { client_id } => {
                ApiError::ConfigurationMissing(format!("未知客户: {client_id}"))
            }
            ConfigError::InvalidValue { key, message } => {
                ApiError::InvalidInput(format!("配置项 {key} 无效: {message}"))
            }
            other => ApiError::ConfigurationMissing(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
