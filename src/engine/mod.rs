// ==========================================
// 电商卖家库存决策支持系统 - 引擎层
// ==========================================
// 所有引擎均为无状态纯函数式结构（幽灵登记表与
// 指标环比除外，二者借 StateStore 跨批持久化），
// 同一输入必产生同一输出
// ==========================================

pub mod awd;
pub mod fbm;
pub mod forecast;
pub mod ghost;
pub mod metrics_delta;
pub mod price;
pub mod reconciliation;
pub mod risk;
pub mod sales_index;
pub mod stock;
pub mod trends;

// ==========================================
// 重导出核心引擎
// ==========================================
pub use awd::awd_total_by_sku;
pub use fbm::{FbmConversionAdvisor, FBM_RESULT_LIMIT, FBM_UNITS_THRESHOLD};
pub use forecast::{ForecastConfig, SeasonalForecastPlanner, CRITICAL_RISK_SCORE};
pub use ghost::{GhostRegistry, GHOST_REGISTRY_CAP, GHOST_RETENTION_DAYS};
pub use metrics_delta::MetricsDeltaTracker;
pub use price::PriceMap;
pub use reconciliation::{is_invalid_sku, select_primary_sku, AsinSkuGraph, PrimaryCandidate, SkuNode};
pub use risk::{RevenueRiskRanker, RISK_RESULT_LIMIT};
pub use sales_index::SalesIndex;
pub use stock::{
    index_inventory, AsinAvailability, PipelineQuantities, StockAssessment, StockClassifier,
};
pub use trends::SkuTrendsAnalyzer;
