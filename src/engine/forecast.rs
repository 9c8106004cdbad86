// ==========================================
// 电商卖家库存决策支持系统 - 季节预测规划引擎
// ==========================================
// 职责: 历史季节月度销量 → 需求预测 + 补货建议 + 风险评分
// 覆盖: 8-12 月季节窗口；头部抽样控制输出规模
// ==========================================

use crate::domain::forecast::{
    CurrentInventory, ForecastOutcome, ForecastResult, ForecastSummary, HistoricalDemand,
    OrderRecommendation,
};
use crate::domain::inventory::InventoryRecord;
use crate::domain::listing::ListingRecord;
use crate::domain::sales::SalesRecord;
use crate::domain::types::SeasonMonth;
use crate::engine::price::PriceMap;
use crate::engine::reconciliation::AsinSkuGraph;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};

/// 高危阈值（风险分 ≥ 70 计为 critical）
pub const CRITICAL_RISK_SCORE: u32 = 70;

// ==========================================
// ForecastConfig - 规划参数
// ==========================================
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// 头部抽样比例（按季节营收）
    pub sample_ratio: f64,

    /// 抽样下限
    pub min_sample: usize,

    /// 抽样上限
    pub max_sample: usize,

    /// 安全库存系数（缺口放大倍数）
    pub safety_buffer: f64,

    /// 采购交期（天）：到货月第一天前推的下单提前量
    pub lead_time_days: i64,

    /// 默认增长系数
    pub default_growth: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            sample_ratio: 0.1,
            min_sample: 20,
            max_sample: 100,
            safety_buffer: 1.2,
            lead_time_days: 45,
            default_growth: 1.1,
        }
    }
}

/// 聚合中间态
#[derive(Debug, Default)]
struct SeasonAggregate {
    asin: String,
    title: String,
    units_by_month: BTreeMap<SeasonMonth, i64>,
    total_units: i64,
    total_revenue: f64,
}

// ==========================================
// SeasonalForecastPlanner - 季节预测规划引擎
// ==========================================
pub struct SeasonalForecastPlanner {
    config: ForecastConfig,
}

impl SeasonalForecastPlanner {
    pub fn new() -> Self {
        Self {
            config: ForecastConfig::default(),
        }
    }

    pub fn with_config(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// 生成季节预测
    ///
    /// # 步骤
    /// 1. 月度历史销售行按 ASIN 回配到 SKU 并逐月聚合
    /// 2. 按季节营收降序抽头部样本（比例 + 上下限夹取）
    /// 3. 逐 SKU 推算预测需求、累计缺口与下单截止日
    /// 4. 风险评分降序输出
    ///
    /// 同一输入与 `today` 下输出完全确定。
    pub fn plan(
        &self,
        listings: &[ListingRecord],
        inventory: &[InventoryRecord],
        monthly: &BTreeMap<SeasonMonth, Vec<SalesRecord>>,
        price_map: &PriceMap,
        growth_factor: Option<f64>,
        today: NaiveDate,
    ) -> ForecastOutcome {
        let growth = growth_factor.unwrap_or(self.config.default_growth);
        let graph = AsinSkuGraph::from_listings(listings);

        // 1. 逐月聚合
        let mut aggregates: HashMap<String, SeasonAggregate> = HashMap::new();
        let mut unmatched_asins: HashSet<String> = HashSet::new();

        for month in SeasonMonth::all() {
            let Some(records) = monthly.get(&month) else {
                continue;
            };
            for record in records {
                let Some(asin) = record.asin.as_deref().filter(|a| !a.is_empty()) else {
                    continue;
                };
                if record.units <= 0 {
                    continue;
                }

                let mut revenue = record.revenue;
                if revenue == 0.0 {
                    if let Some(price) = price_map.get(asin) {
                        revenue = record.units as f64 * price;
                    }
                }

                let Some(node) =
                    graph.find_best_matching_sku(asin, &record.title, revenue, record.units)
                else {
                    unmatched_asins.insert(asin.to_string());
                    continue;
                };

                let agg = aggregates
                    .entry(node.sku.clone())
                    .or_insert_with(|| SeasonAggregate {
                        asin: asin.to_string(),
                        title: if record.title.is_empty() {
                            node.title.clone()
                        } else {
                            record.title.clone()
                        },
                        ..Default::default()
                    });
                *agg.units_by_month.entry(month).or_insert(0) += record.units;
                agg.total_units += record.units;
                agg.total_revenue += revenue;
            }
        }

        let total_historical_units: i64 = aggregates.values().map(|a| a.total_units).sum();
        tracing::info!(
            skus = aggregates.len(),
            unmatched = unmatched_asins.len(),
            "季节历史聚合完成"
        );

        // 2. 头部抽样
        let mut sorted: Vec<(String, SeasonAggregate)> = aggregates.into_iter().collect();
        sorted.sort_by(|a, b| {
            b.1.total_revenue
                .partial_cmp(&a.1.total_revenue)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        let sample_count = ((sorted.len() as f64 * self.config.sample_ratio).ceil() as usize)
            .clamp(self.config.min_sample, self.config.max_sample);
        sorted.truncate(sample_count);

        // 3. 逐 SKU 规划
        let inventory_map = Self::build_inventory_map(inventory);
        let mut results: Vec<ForecastResult> = sorted
            .into_iter()
            .map(|(sku, agg)| {
                let current = inventory_map.get(&sku).copied().unwrap_or_default();
                self.plan_sku(sku, agg, current, growth, today)
            })
            .collect();

        // 4. 风险降序
        results.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));

        let summary = ForecastSummary {
            total_skus: results.len(),
            skus_needing_orders: results
                .iter()
                .filter(|r| !r.order_recommendations.is_empty())
                .count(),
            critical_skus: results
                .iter()
                .filter(|r| r.risk_score >= CRITICAL_RISK_SCORE)
                .count(),
            total_historical_units,
            total_forecast_units: results.iter().map(|r| r.forecast_total).sum(),
            unmatched_asins: unmatched_asins.len(),
        };

        tracing::info!(
            skus = summary.total_skus,
            critical = summary.critical_skus,
            growth,
            "季节预测规划完成"
        );

        ForecastOutcome {
            growth_factor: growth,
            results,
            summary,
        }
    }

    fn build_inventory_map(inventory: &[InventoryRecord]) -> HashMap<String, CurrentInventory> {
        let mut map = HashMap::new();
        for record in inventory {
            let inbound = record.total_inbound();
            map.insert(
                record.sku.clone(),
                CurrentInventory {
                    on_hand: record.total_quantity,
                    inbound,
                    total_available: record.total_quantity + inbound,
                },
            );
        }
        map
    }

    fn plan_sku(
        &self,
        sku: String,
        agg: SeasonAggregate,
        current: CurrentInventory,
        growth: f64,
        today: NaiveDate,
    ) -> ForecastResult {
        let year = today.year();

        // 日均速度与峰值月
        let mut daily_velocities: BTreeMap<SeasonMonth, f64> = BTreeMap::new();
        for month in SeasonMonth::all() {
            let units = agg.units_by_month.get(&month).copied().unwrap_or(0);
            daily_velocities.insert(month, units as f64 / month.days_in_month() as f64);
        }
        let peak_month = Self::peak_month(&agg.units_by_month);

        // 预测需求
        let mut forecast_by_month: BTreeMap<SeasonMonth, i64> = BTreeMap::new();
        for month in SeasonMonth::all() {
            let units = agg.units_by_month.get(&month).copied().unwrap_or(0);
            forecast_by_month.insert(month, (units as f64 * growth).ceil() as i64);
        }
        let forecast_total = (agg.total_units as f64 * growth).ceil() as i64;

        // 累计需求走查: 缺口出现即生成订单，订单视作按期到货计回库存
        let mut cumulative_demand = 0_i64;
        let mut remaining = current.total_available;
        let mut order_recommendations: Vec<OrderRecommendation> = Vec::new();

        for month in SeasonMonth::all() {
            cumulative_demand += forecast_by_month.get(&month).copied().unwrap_or(0);

            let arrival_date = month.first_day(year);
            let order_by_date = arrival_date - Duration::days(self.config.lead_time_days);

            if remaining < cumulative_demand {
                let gap = cumulative_demand - remaining;
                let buffered = (gap as f64 * self.config.safety_buffer).ceil() as i64;

                order_recommendations.push(OrderRecommendation {
                    month,
                    order_by_date,
                    arrival_date,
                    order_quantity: buffered,
                    reason: format!(
                        "{} 月累计需求 {} 件，现有 {} 件",
                        month.month_number(),
                        cumulative_demand,
                        remaining
                    ),
                });
                remaining += buffered;
            }
        }

        // 风险评分（加性）
        let mut risk_score = 0_u32;
        if current.total_available == 0 {
            risk_score += 30;
        }
        if order_recommendations
            .first()
            .map(|o| o.order_by_date < today)
            .unwrap_or(false)
        {
            risk_score += 40;
        }
        if forecast_total as f64 > agg.total_units as f64 * 1.5 {
            risk_score += 20;
        }
        if current.total_available < forecast_by_month.get(&SeasonMonth::Aug).copied().unwrap_or(0)
        {
            risk_score += 10;
        }

        ForecastResult {
            sku,
            asin: Some(agg.asin).filter(|a| !a.is_empty()),
            title: agg.title,
            historical: HistoricalDemand {
                units_by_month: agg.units_by_month,
                total_units: agg.total_units,
                total_revenue: agg.total_revenue,
                peak_month,
            },
            current_inventory: current,
            forecast_by_month,
            forecast_total,
            daily_velocities,
            order_recommendations,
            risk_score,
            growth_factor: growth,
        }
    }

    /// 峰值月判定顺序: Nov > Oct > Sep > Aug > Dec（并列时前者优先）
    fn peak_month(units_by_month: &BTreeMap<SeasonMonth, i64>) -> SeasonMonth {
        let max_units = SeasonMonth::all()
            .iter()
            .map(|m| units_by_month.get(m).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);

        for month in [
            SeasonMonth::Nov,
            SeasonMonth::Oct,
            SeasonMonth::Sep,
            SeasonMonth::Aug,
        ] {
            if units_by_month.get(&month).copied().unwrap_or(0) == max_units {
                return month;
            }
        }
        SeasonMonth::Dec
    }
}

impl Default for SeasonalForecastPlanner {
    fn default() -> Self {
        Self::new()
    }
}
