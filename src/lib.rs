// ==========================================
// 电商卖家库存决策支持系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (库存风险识别 + 需求预测)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 持久化状态存储
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部报表数据
pub mod importer;

// 配置层 - 客户配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 批处理边界
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FulfillmentChannel, ListingStatus, RevenueTier, SalesWindow, SeasonMonth};

// 领域实体
pub use domain::{
    AwdRecord, FbmCandidate, ForecastResult, GhostEntry, GhostRegistryData, InventoryRecord,
    ListingRecord, MetricChanges, OrderRecommendation, RiskResult, SalesRecord, SalesTotals,
    TrendResult,
};

// 引擎
pub use engine::{
    AsinAvailability, AsinSkuGraph, GhostRegistry, MetricsDeltaTracker, PriceMap,
    RevenueRiskRanker, SalesIndex, SeasonalForecastPlanner, SkuTrendsAnalyzer, StockClassifier,
};

// API
pub use api::{DashboardApi, ForecastApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "电商卖家库存决策支持系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
