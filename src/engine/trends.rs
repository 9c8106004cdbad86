// ==========================================
// 电商卖家库存决策支持系统 - SKU 趋势分析引擎
// ==========================================
// 职责: 按 SKU 聚合各窗口销量，输出趋势桶/补货口径/营收分层
// 口径: FBA 库存 + 第三方仓 (AWD) 合并；AWD 只计 inbound + available
// ==========================================

use crate::domain::inventory::{AwdRecord, InventoryRecord};
use crate::domain::listing::ListingRecord;
use crate::domain::risk::TrendResult;
use crate::domain::sales::SalesRecord;
use crate::domain::types::{FulfillmentChannel, ListingStatus, RevenueTier, SalesWindow};
use crate::engine::awd::awd_total_by_sku;
use crate::engine::price::PriceMap;
use crate::engine::reconciliation::{is_invalid_sku, AsinSkuGraph};
use crate::engine::stock::index_inventory;
use std::collections::{BTreeMap, HashMap, HashSet};

// 供应覆盖阈值（天）
const OVERSTOCK_DAYS: i64 = 180;
const LOW_STOCK_DAYS: i64 = 30;
const CRITICAL_STOCK_DAYS: i64 = 14;

// 有库存但近期零销量时的覆盖天数哨兵值
const NO_VELOCITY_DAYS: i64 = 999;

/// 按 SKU 聚合的各窗口销量
#[derive(Debug, Default, Clone)]
struct SalesAggregate {
    asin: String,
    title: String,
    title_units: i64,
    units_30: i64,
    units_60: i64,
    units_90: i64,
    units_365: i64,
    revenue_30: f64,
    revenue_60: f64,
    revenue_90: f64,
    revenue_365: f64,
}

// ==========================================
// SkuTrendsAnalyzer - 趋势分析引擎
// ==========================================
pub struct SkuTrendsAnalyzer;

impl SkuTrendsAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// 生成 SKU 趋势分析
    ///
    /// # 步骤
    /// 1. 圈定 Active FBA SKU（Inactive 仅参与 ASIN 回配，不出现在结果里）
    /// 2. 销售行按 ASIN 回配到最匹配 SKU 并聚合各窗口
    /// 3. 计算 30 天桶/供应天数/过剩件数
    /// 4. 按 90 天销量排序，累计营收分层 (A/B/C/D)
    pub fn analyze(
        &self,
        listings: &[ListingRecord],
        inventory: &[InventoryRecord],
        sales: &BTreeMap<SalesWindow, Vec<SalesRecord>>,
        price_map: &PriceMap,
        awd: &[AwdRecord],
    ) -> Vec<TrendResult> {
        if listings.is_empty() {
            tracing::warn!("在售清单为空，趋势分析跳过");
            return Vec::new();
        }

        let inventory_by_sku = index_inventory(inventory);
        let awd_by_sku = awd_total_by_sku(awd);

        // 1. Active FBA SKU 集合 + 回配图谱
        let active_fba: HashSet<&str> = listings
            .iter()
            .filter(|l| {
                !l.sku.is_empty()
                    && !is_invalid_sku(&l.sku)
                    && l.status.is_active()
                    && l.fulfillment_channel.is_fba()
                    && l.asin.as_deref().map(|a| !a.is_empty()).unwrap_or(false)
            })
            .map(|l| l.sku.as_str())
            .collect();

        let graph = Self::build_matching_graph(listings, inventory, &active_fba);

        // 2. 销售行回配与聚合
        let aggregates = Self::aggregate_sales(sales, &graph, price_map);
        tracing::info!(skus = aggregates.len(), "销售聚合完成");

        // 3. 逐 SKU 计算趋势指标
        let mut results: Vec<TrendResult> = Vec::new();
        for (sku, agg) in &aggregates {
            if agg.units_365 <= 0 {
                continue;
            }
            // Inactive SKU 仅用于回配
            if !active_fba.contains(sku.as_str()) {
                continue;
            }

            results.push(Self::build_result(
                sku,
                agg,
                listings,
                &inventory_by_sku,
                &awd_by_sku,
                &graph,
            ));
        }

        // 4. 排序与营收分层
        results.sort_by(|a, b| {
            let a_units = if a.units_90 > 0 { a.units_90 } else { a.units_365 };
            let b_units = if b.units_90 > 0 { b.units_90 } else { b.units_365 };
            b_units.cmp(&a_units)
        });
        Self::assign_revenue_tiers(&mut results);

        tracing::info!(count = results.len(), "SKU 趋势分析完成");
        results
    }

    /// 回配图谱: Active FBA 清单行 + 清单缺席但出现在库存快照的 FBA SKU
    fn build_matching_graph(
        listings: &[ListingRecord],
        inventory: &[InventoryRecord],
        active_fba: &HashSet<&str>,
    ) -> AsinSkuGraph {
        let mut rows: Vec<ListingRecord> = listings
            .iter()
            .filter(|l| active_fba.contains(l.sku.as_str()))
            .cloned()
            .collect();

        let known: HashSet<String> = rows.iter().map(|l| l.sku.clone()).collect();
        for record in inventory {
            if record.sku.is_empty() || is_invalid_sku(&record.sku) {
                continue;
            }
            if known.contains(record.sku.as_str()) {
                continue;
            }
            let Some(asin) = record.asin.clone().filter(|a| !a.is_empty()) else {
                continue;
            };
            rows.push(ListingRecord {
                sku: record.sku.clone(),
                asin: Some(asin),
                status: ListingStatus::Active,
                fulfillment_channel: FulfillmentChannel::Fba,
                title: record.title.clone().unwrap_or_default(),
                price: 0.0,
            });
        }

        AsinSkuGraph::from_listings(&rows)
    }

    fn aggregate_sales(
        sales: &BTreeMap<SalesWindow, Vec<SalesRecord>>,
        graph: &AsinSkuGraph,
        price_map: &PriceMap,
    ) -> HashMap<String, SalesAggregate> {
        let mut aggregates: HashMap<String, SalesAggregate> = HashMap::new();

        for window in [
            SalesWindow::T365,
            SalesWindow::T30,
            SalesWindow::T60,
            SalesWindow::T90,
        ] {
            let Some(records) = sales.get(&window) else {
                continue;
            };

            for record in records {
                // 只用子级 ASIN，父级聚合行跳过
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
                    continue;
                };

                let agg = aggregates
                    .entry(node.sku.clone())
                    .or_insert_with(|| SalesAggregate {
                        asin: asin.to_string(),
                        ..Default::default()
                    });

                match window {
                    SalesWindow::T30 => {
                        agg.units_30 += record.units;
                        agg.revenue_30 += revenue;
                    }
                    SalesWindow::T60 => {
                        agg.units_60 += record.units;
                        agg.revenue_60 += revenue;
                    }
                    SalesWindow::T90 => {
                        agg.units_90 += record.units;
                        agg.revenue_90 += revenue;
                    }
                    SalesWindow::T365 => {
                        agg.units_365 += record.units;
                        agg.revenue_365 += revenue;
                        // 品名取年窗口里销量最大的行
                        if !record.title.is_empty()
                            && (agg.title.is_empty() || record.units > agg.title_units)
                        {
                            agg.title = record.title.clone();
                            agg.title_units = record.units;
                        }
                    }
                    _ => {}
                }
            }
        }

        aggregates
    }

    fn build_result(
        sku: &str,
        agg: &SalesAggregate,
        listings: &[ListingRecord],
        inventory_by_sku: &HashMap<String, &InventoryRecord>,
        awd_by_sku: &HashMap<String, i64>,
        graph: &AsinSkuGraph,
    ) -> TrendResult {
        // 30 天桶（窗口差分，负差按 0 处理）
        let units_1_30 = agg.units_30;
        let units_31_60 = (agg.units_60 - agg.units_30).max(0);
        let units_61_90 = (agg.units_90 - agg.units_60).max(0);

        let percent_change = if units_31_60 > 0 {
            (units_1_30 - units_31_60) as f64 / units_31_60 as f64 * 100.0
        } else if units_1_30 > 0 {
            100.0
        } else {
            0.0
        };

        let awd_inventory = awd_by_sku.get(sku).copied().unwrap_or(0);

        // 库存口径
        let mut total_inventory = 0_i64;
        let mut projected_excess = 0_i64;
        let mut fba_only_inventory = 0_i64;

        if let Some(record) = inventory_by_sku.get(sku) {
            let warehouse = if record.total_quantity > 0 {
                record.total_quantity
            } else {
                record.fulfillable_quantity
            };

            // 全口径: 仓内 + 全部入库管线
            let fba_all = warehouse + record.total_inbound();
            total_inventory = fba_all + awd_inventory;

            // 过剩评估（90 天速度，退化到 365 天）
            let (units, days) = if agg.units_90 > 0 {
                (agg.units_90, 90.0)
            } else {
                (agg.units_365, 365.0)
            };
            let daily_velocity = units as f64 / days;
            if daily_velocity > 0.0 {
                let days_of_inventory = total_inventory as f64 / daily_velocity;
                if days_of_inventory > OVERSTOCK_DAYS as f64 {
                    let coverage = daily_velocity * OVERSTOCK_DAYS as f64;
                    projected_excess = ((total_inventory as f64 - coverage).max(0.0)).round() as i64;
                }
            }

            // 供应天数口径: 在建入库 (working) 仍在卖家仓，不计入
            fba_only_inventory =
                warehouse + record.inbound_shipped + record.inbound_receiving;
        }

        let combined_inventory = fba_only_inventory + awd_inventory;
        let days_of_supply = if units_1_30 > 0 {
            let per_day = units_1_30 as f64 / 30.0;
            Some((combined_inventory as f64 / per_day).round() as i64)
        } else if combined_inventory > 0 {
            None // 有库存但近 30 天无销量
        } else {
            Some(0)
        };

        // 品名兜底与截断
        let mut title = agg.title.clone();
        if title.len() < 10 {
            if let Some(listing) = listings.iter().find(|l| l.sku == sku) {
                if !listing.title.is_empty() {
                    title = listing.title.clone();
                }
            }
        }
        if title.chars().count() > 50 {
            title = format!("{}...", title.chars().take(47).collect::<String>());
        }
        if title.is_empty() {
            title = "No title available".to_string();
        }

        let has_shared_asin = graph.is_shared_asin(&agg.asin);
        let shared_skus = if has_shared_asin {
            graph
                .skus_for_asin(&agg.asin)
                .iter()
                .map(|n| n.sku.clone())
                .collect()
        } else {
            Vec::new()
        };

        TrendResult {
            sku: sku.to_string(),
            asin: Some(agg.asin.clone()),
            title,
            units_30: agg.units_30,
            units_60: agg.units_60,
            units_90: agg.units_90,
            units_365: agg.units_365,
            revenue_30: agg.revenue_30,
            revenue_90: agg.revenue_90,
            revenue_365: agg.revenue_365,
            sparkline: [units_61_90, units_31_60, units_1_30],
            percent_change,
            fba_inventory: fba_only_inventory,
            awd_inventory,
            total_inventory,
            days_of_supply,
            projected_excess,
            rank: 0,
            revenue_contribution: 0.0,
            revenue_tier: RevenueTier::D,
            velocity_90: agg.units_90 as f64 / 90.0,
            velocity_365: agg.units_365 as f64 / 365.0,
            days_of_inventory: 0,
            is_low_stock: false,
            is_critical_stock: false,
            is_out_of_stock: false,
            is_overstocked: false,
            has_shared_asin,
            shared_skus,
        }
    }

    /// 累计营收分层: A 前 50% / B 至 80% / C 至 95% / D 其余
    fn assign_revenue_tiers(results: &mut [TrendResult]) {
        let total_revenue: f64 = results
            .iter()
            .map(|r| if r.revenue_90 > 0.0 { r.revenue_90 } else { r.revenue_365 })
            .sum();

        let mut cumulative = 0.0;
        for (idx, result) in results.iter_mut().enumerate() {
            let revenue = if result.revenue_90 > 0.0 {
                result.revenue_90
            } else {
                result.revenue_365
            };
            cumulative += revenue;

            result.rank = idx + 1;
            result.revenue_contribution = if total_revenue > 0.0 {
                revenue / total_revenue * 100.0
            } else {
                0.0
            };

            result.revenue_tier = if cumulative <= total_revenue * 0.5 {
                RevenueTier::A
            } else if cumulative <= total_revenue * 0.8 {
                RevenueTier::B
            } else if cumulative <= total_revenue * 0.95 {
                RevenueTier::C
            } else {
                RevenueTier::D
            };

            // 剩余覆盖天数与健康标记
            if result.total_inventory > 0 {
                let velocity = if result.velocity_90 > 0.0 {
                    result.velocity_90
                } else {
                    result.velocity_365
                };
                result.days_of_inventory = if velocity > 0.0 {
                    (result.total_inventory as f64 / velocity).round() as i64
                } else {
                    NO_VELOCITY_DAYS
                };
            } else {
                result.days_of_inventory = 0;
            }

            result.is_low_stock =
                result.days_of_inventory < LOW_STOCK_DAYS && result.days_of_inventory > 0;
            result.is_critical_stock =
                result.days_of_inventory < CRITICAL_STOCK_DAYS && result.days_of_inventory > 0;
            result.is_out_of_stock = result.total_inventory == 0;
            result.is_overstocked = result.days_of_inventory > OVERSTOCK_DAYS;
        }
    }
}

impl Default for SkuTrendsAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
