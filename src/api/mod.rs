// ==========================================
// 电商卖家库存决策支持系统 - API 层
// ==========================================
// 批处理边界: 编排 + 错误换装，不含业务规则
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod forecast_api;

pub use dashboard_api::{DashboardApi, DashboardPayload, MAX_PAYLOAD_BYTES};
pub use error::{ApiError, ApiResult};
pub use forecast_api::{ForecastApi, ForecastPayload};
