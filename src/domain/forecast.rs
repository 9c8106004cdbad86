// ==========================================
// 电商卖家库存决策支持系统 - 预测与补货对象
// ==========================================
// 每批次重新计算，不持久化
// ==========================================

use crate::domain::types::SeasonMonth;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单 SKU 历史季节需求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDemand {
    /// 各月销量
    pub units_by_month: BTreeMap<SeasonMonth, i64>,

    /// 季节合计销量
    pub total_units: i64,

    /// 季节合计营收
    pub total_revenue: f64,

    /// 峰值月（按原始销量）
    pub peak_month: SeasonMonth,
}

impl HistoricalDemand {
    pub fn units(&self, month: SeasonMonth) -> i64 {
        self.units_by_month.get(&month).copied().unwrap_or(0)
    }
}

/// 当前库存口径（预测规划用）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentInventory {
    /// 仓内现货
    pub on_hand: i64,

    /// 入库管道
    pub inbound: i64,

    /// 可用合计
    pub total_available: i64,
}

/// 补货建议：某月开始前需到货的订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecommendation {
    /// 缺口出现的月份
    pub month: SeasonMonth,

    /// 下单截止日（到货月第一天前推 45 天交期）
    pub order_by_date: NaiveDate,

    /// 期望到货日（当月第一天）
    pub arrival_date: NaiveDate,

    /// 建议下单件数（缺口 × 1.2 安全系数，向上取整）
    pub order_quantity: i64,

    /// 建议原因（可解释性）
    pub reason: String,
}

/// 单 SKU 预测结果 (ForecastResult)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub sku: String,
    pub asin: Option<String>,
    pub title: String,

    /// 历史季节需求
    pub historical: HistoricalDemand,

    /// 当前库存
    pub current_inventory: CurrentInventory,

    /// 各月预测销量（历史 × 增长系数，向上取整）
    pub forecast_by_month: BTreeMap<SeasonMonth, i64>,

    /// 预测合计
    pub forecast_total: i64,

    /// 各月日均速度（历史销量 / 当月天数）
    pub daily_velocities: BTreeMap<SeasonMonth, f64>,

    /// 补货建议（按月顺序）
    pub order_recommendations: Vec<OrderRecommendation>,

    /// 风险分 (0-100，加性、各分量封顶)
    pub risk_score: u32,

    /// 采用的增长系数
    pub growth_factor: f64,
}

/// 预测批次汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_skus: usize,
    pub skus_needing_orders: usize,
    pub critical_skus: usize,
    pub total_historical_units: i64,
    pub total_forecast_units: i64,
    pub unmatched_asins: usize,
}

/// 预测批次输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutcome {
    pub growth_factor: f64,
    pub results: Vec<ForecastResult>,
    pub summary: ForecastSummary,
}
