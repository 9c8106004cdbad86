// ==========================================
// 电商卖家库存决策支持系统 - 风险与趋势结果对象
// ==========================================
// 每批次重新计算，不持久化
// ==========================================

use crate::domain::types::RevenueTier;
use serde::{Deserialize, Serialize};

/// 营收风险结果 (RiskResult)
///
/// 风险排名器输出；每批次重建，仅幽灵登记表与上期指标快照跨批持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub sku: String,
    pub asin: Option<String>,
    pub title: String,

    /// 90 天窗口营收
    pub revenue_90_days: f64,

    /// 365 天窗口营收
    pub revenue_365_days: f64,

    /// 日均流失营收 = max(revenue90/90, revenue365/365)
    pub lost_revenue_per_day: f64,

    // ===== 管道数量（展示用） =====
    pub fulfillable_quantity: i64,
    pub reserved_quantity: i64,
    pub inbound_working: i64,
    pub inbound_shipped: i64,
    pub inbound_receiving: i64,
    pub total_inbound: i64,
    pub total_pipeline: i64,
    pub future_supply_buyable: i64,
    pub reserved_future_supply: i64,

    /// 是否由健康状态字段直接判定缺货
    pub detected_via_health_status: bool,

    /// 是否为幽灵 SKU（库存报表缺行但仍有销量）
    pub is_ghost: bool,

    /// 该 ASIN 是否有多个 SKU 共享（人工复核提示）
    pub shared_asin: bool,

    // ===== ASIN 分组去重元数据 =====
    /// 是否为该 ASIN 的主 SKU
    pub is_primary: bool,

    /// 同一 ASIN 下其他缺货 SKU
    pub other_oos_skus: Vec<String>,

    /// 同一 ASIN 下缺货 SKU 总数（含自身）
    pub total_oos_siblings: usize,

    /// 全部缺货兄弟 SKU 的 90 天营收合计
    pub combined_revenue_90_days: f64,

    /// 全部缺货兄弟 SKU 的日均流失合计
    pub combined_lost_revenue_per_day: f64,
}

/// SKU 趋势分析结果 (TrendResult)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub sku: String,
    pub asin: Option<String>,
    pub title: String,

    // ===== 窗口销量/营收 =====
    pub units_30: i64,
    pub units_60: i64,
    pub units_90: i64,
    pub units_365: i64,
    pub revenue_30: f64,
    pub revenue_90: f64,
    pub revenue_365: f64,

    /// 近 90 天三个 30 天桶（旧→新: 61-90 / 31-60 / 1-30）
    pub sparkline: [i64; 3],

    /// 1-30 天相对 31-60 天的销量变化百分比
    pub percent_change: f64,

    // ===== 库存口径 =====
    /// 履约仓库存（仓内 + 在途/收货中，不含在建）
    pub fba_inventory: i64,

    /// 第三方仓 (AWD) 库存
    pub awd_inventory: i64,

    /// 合并库存 (FBA + AWD)
    pub total_inventory: i64,

    /// 供应天数（30 天速度口径；None 表示有库存但近 30 天无销量）
    pub days_of_supply: Option<i64>,

    /// 超过 180 天覆盖的预计过剩件数
    pub projected_excess: i64,

    // ===== 排名与分层 =====
    pub rank: usize,
    pub revenue_contribution: f64,
    pub revenue_tier: RevenueTier,
    pub velocity_90: f64,
    pub velocity_365: f64,
    pub days_of_inventory: i64,
    pub is_low_stock: bool,
    pub is_critical_stock: bool,
    pub is_out_of_stock: bool,
    pub is_overstocked: bool,

    /// 共享 ASIN 提示
    pub has_shared_asin: bool,
    pub shared_skus: Vec<String>,
}

/// FBM→FBA 转换建议 (FbmCandidate)
///
/// 自发货渠道销量达标、且尚无对应 FBA 变体的 SKU。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FbmCandidate {
    pub sku: String,
    pub title: String,

    /// 60 天窗口销量
    pub units_60: i64,

    /// 60 天窗口营收
    pub revenue_60: f64,

    /// 窗口均价 = revenue_60 / units_60
    pub avg_price: f64,
}
