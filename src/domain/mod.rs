// ==========================================
// 电商卖家库存决策支持系统 - 领域层
// ==========================================

pub mod forecast;
pub mod ghost;
pub mod inventory;
pub mod listing;
pub mod metrics;
pub mod risk;
pub mod sales;
pub mod types;

pub use forecast::{
    CurrentInventory, ForecastOutcome, ForecastResult, ForecastSummary, HistoricalDemand,
    OrderRecommendation,
};
pub use ghost::{GhostEntry, GhostRegistryData};
pub use inventory::{AwdRecord, InventoryRecord};
pub use listing::ListingRecord;
pub use metrics::{MetricChanges, MetricsSnapshot};
pub use risk::{FbmCandidate, RiskResult, TrendResult};
pub use sales::{SalesRecord, SalesTotals};
