// ==========================================
// 电商卖家库存决策支持系统 - 营收风险排名引擎
// ==========================================
// 职责: 找出"断货且近期仍有销售"的 SKU，按日均流失营收排名
// 输入: 在售清单 + 库存快照 + 销售索引 + 幽灵登记簿
// 输出: 前 10 条营收风险（共享 ASIN 组折叠为主 SKU）
// ==========================================

use crate::domain::ghost::GhostRegistryData;
use crate::domain::inventory::InventoryRecord;
use crate::domain::listing::ListingRecord;
use crate::domain::risk::RiskResult;
use crate::domain::types::{ListingStatus, SalesWindow};
use crate::engine::price::PriceMap;
use crate::engine::reconciliation::{
    is_invalid_sku, select_primary_sku, AsinSkuGraph, PrimaryCandidate,
};
use crate::engine::sales_index::SalesIndex;
use crate::engine::stock::{index_inventory, AsinAvailability, StockClassifier};
use std::collections::HashMap;

/// 输出上限
pub const RISK_RESULT_LIMIT: usize = 10;

const TITLE_UNAVAILABLE: &str = "(Product Title Not Available)";

// ==========================================
// RevenueRiskRanker - 营收风险排名引擎
// ==========================================
pub struct RevenueRiskRanker {
    classifier: StockClassifier,
}

impl RevenueRiskRanker {
    pub fn new() -> Self {
        Self {
            classifier: StockClassifier::new(),
        }
    }

    /// 生成营收风险排名
    ///
    /// # 步骤
    /// 1. 扫描在售清单里的 FBA SKU（Active 与 Inactive），断货且 90 天有销量者入选
    /// 2. 合并幽灵 SKU（已从库存快照消失但仍有销售）
    /// 3. 共享 ASIN 全员断货时折叠为主 SKU，并聚合组内营收
    /// 4. 按日均流失营收降序截前 10
    pub fn rank(
        &self,
        listings: &[ListingRecord],
        inventory: &[InventoryRecord],
        sales_index: &SalesIndex,
        price_map: &PriceMap,
        ghosts: &GhostRegistryData,
    ) -> Vec<RiskResult> {
        let inventory_by_sku = index_inventory(inventory);
        let graph = AsinSkuGraph::from_listings(listings);
        let availability = AsinAvailability::build(listings, &inventory_by_sku, &self.classifier);

        let mut results: Vec<RiskResult> = Vec::new();

        // 1. 扫描在售清单
        for listing in listings {
            if listing.sku.is_empty() || is_invalid_sku(&listing.sku) {
                continue;
            }
            if !matches!(listing.status, ListingStatus::Active | ListingStatus::Inactive) {
                continue;
            }
            if !listing.fulfillment_channel.is_fba() {
                continue;
            }

            // 库存快照里找不到的 SKU 无法判定（幽灵登记簿另行处理）
            let Some(record) = inventory_by_sku.get(&listing.sku) else {
                continue;
            };

            let assessment = self.classifier.assess(record);
            if !assessment.out_of_stock {
                continue;
            }

            // ASIN 级假阳性抑制: 任一同 ASIN 的 FBA SKU 仍可售，买家不受影响
            if let Some(asin) = &listing.asin {
                if availability.has_inventory(asin) {
                    continue;
                }
            }

            let Some(sales_90) = sales_index.find(
                SalesWindow::T90,
                &listing.sku,
                listing.asin.as_deref(),
                Some(price_map),
            ) else {
                continue;
            };
            if sales_90.units <= 0 {
                continue;
            }

            let sales_365 = sales_index.find(
                SalesWindow::T365,
                &listing.sku,
                listing.asin.as_deref(),
                Some(price_map),
            );
            let revenue_365 = sales_365.map(|s| s.revenue).unwrap_or(0.0);
            let lost_per_day = (sales_90.revenue / 90.0).max(revenue_365 / 365.0);

            // 库存快照里的品名通常更完整
            let title = record
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .or_else(|| Some(listing.title.clone()).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| TITLE_UNAVAILABLE.to_string());

            let q = assessment.quantities;
            results.push(RiskResult {
                sku: listing.sku.clone(),
                asin: listing.asin.clone(),
                title,
                revenue_90_days: sales_90.revenue,
                revenue_365_days: revenue_365,
                lost_revenue_per_day: lost_per_day,
                fulfillable_quantity: q.fulfillable,
                reserved_quantity: q.reserved,
                inbound_working: q.inbound_working,
                inbound_shipped: q.inbound_shipped,
                inbound_receiving: q.inbound_receiving,
                total_inbound: q.total_inbound(),
                total_pipeline: q.total_pipeline(),
                future_supply_buyable: q.future_supply_buyable,
                reserved_future_supply: q.reserved_future_supply,
                detected_via_health_status: assessment.detected_via_health_status,
                is_ghost: false,
                shared_asin: listing
                    .asin
                    .as_deref()
                    .map(|a| graph.is_shared_asin(a))
                    .unwrap_or(false),
                is_primary: false,
                other_oos_skus: Vec::new(),
                total_oos_siblings: 1,
                combined_revenue_90_days: sales_90.revenue,
                combined_lost_revenue_per_day: lost_per_day,
            });
        }

        tracing::info!(count = results.len(), "库存快照断货风险扫描完成");

        // 2. 合并幽灵 SKU
        for ghost in &ghosts.entries {
            if results.iter().any(|r| r.sku == ghost.sku) {
                continue;
            }

            let Some(sales_90) = sales_index.find(
                SalesWindow::T90,
                &ghost.sku,
                ghost.asin.as_deref(),
                Some(price_map),
            ) else {
                continue;
            };
            if sales_90.units <= 0 {
                continue;
            }

            if let Some(asin) = &ghost.asin {
                if availability.has_inventory(asin) {
                    tracing::debug!(sku = %ghost.sku, asin, "幽灵 SKU 的 ASIN 仍有可售同胞，跳过");
                    continue;
                }
            }

            let sales_365 = sales_index.find(
                SalesWindow::T365,
                &ghost.sku,
                ghost.asin.as_deref(),
                Some(price_map),
            );
            let revenue_365 = sales_365.map(|s| s.revenue).unwrap_or(0.0);
            let lost_per_day = (sales_90.revenue / 90.0).max(revenue_365 / 365.0);

            let title = Some(ghost.title.clone())
                .filter(|t| !t.is_empty())
                .or_else(|| {
                    graph
                        .details(&ghost.sku)
                        .map(|n| n.title.clone())
                        .filter(|t| !t.is_empty())
                })
                .unwrap_or_else(|| TITLE_UNAVAILABLE.to_string());

            results.push(RiskResult {
                sku: ghost.sku.clone(),
                asin: ghost.asin.clone(),
                title,
                revenue_90_days: sales_90.revenue,
                revenue_365_days: revenue_365,
                lost_revenue_per_day: lost_per_day,
                fulfillable_quantity: 0,
                reserved_quantity: 0,
                inbound_working: 0,
                inbound_shipped: 0,
                inbound_receiving: 0,
                total_inbound: 0,
                total_pipeline: 0,
                future_supply_buyable: 0,
                reserved_future_supply: 0,
                detected_via_health_status: false,
                is_ghost: true,
                shared_asin: ghost
                    .asin
                    .as_deref()
                    .map(|a| graph.is_shared_asin(a))
                    .unwrap_or(false),
                is_primary: false,
                other_oos_skus: Vec::new(),
                total_oos_siblings: 1,
                combined_revenue_90_days: sales_90.revenue,
                combined_lost_revenue_per_day: lost_per_day,
            });
        }

        // 3. 共享 ASIN 折叠
        let mut collapsed = Self::collapse_shared_asins(results, &graph, sales_index);

        // 4. 降序截断
        collapsed.sort_by(|a, b| {
            b.lost_revenue_per_day
                .partial_cmp(&a.lost_revenue_per_day)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        collapsed.truncate(RISK_RESULT_LIMIT);

        tracing::info!(count = collapsed.len(), "营收风险排名生成完成");
        collapsed
    }

    /// 同 ASIN 多 SKU 全员断货时只保留主 SKU，组内营收聚合到主 SKU 上
    fn collapse_shared_asins(
        results: Vec<RiskResult>,
        graph: &AsinSkuGraph,
        sales_index: &SalesIndex,
    ) -> Vec<RiskResult> {
        let mut by_asin: HashMap<String, Vec<RiskResult>> = HashMap::new();
        let mut standalone: Vec<RiskResult> = Vec::new();

        for result in results {
            match result.asin.clone().filter(|a| !a.is_empty()) {
                Some(asin) => by_asin.entry(asin).or_default().push(result),
                None => standalone.push(result),
            }
        }

        let mut collapsed: Vec<RiskResult> = Vec::new();

        for mut r in standalone {
            r.is_primary = true;
            collapsed.push(r);
        }

        let mut asins: Vec<String> = by_asin.keys().cloned().collect();
        asins.sort(); // 输出顺序与 HashMap 迭代序解耦
        for asin in asins {
            let group = by_asin.remove(&asin).unwrap_or_default();
            if group.len() == 1 {
                if let Some(mut r) = group.into_iter().next() {
                    r.is_primary = true;
                    collapsed.push(r);
                }
                continue;
            }

            let candidates: Vec<PrimaryCandidate> = group
                .iter()
                .map(|r| PrimaryCandidate {
                    sku: r.sku.clone(),
                    asin: r.asin.clone(),
                    status: graph
                        .details(&r.sku)
                        .map(|n| n.status)
                        .unwrap_or(ListingStatus::Active),
                    revenue_90: Some(r.revenue_90_days),
                })
                .collect();

            let Some(primary_sku) = select_primary_sku(&candidates, Some(sales_index)) else {
                continue;
            };

            let combined_revenue: f64 = group.iter().map(|r| r.revenue_90_days).sum();
            let combined_lost: f64 = group.iter().map(|r| r.lost_revenue_per_day).sum();
            let siblings = group.len();
            let others: Vec<String> = group
                .iter()
                .filter(|r| r.sku != primary_sku)
                .map(|r| r.sku.clone())
                .collect();

            if let Some(mut primary) = group.into_iter().find(|r| r.sku == primary_sku) {
                primary.is_primary = true;
                primary.other_oos_skus = others;
                primary.total_oos_siblings = siblings;
                primary.combined_revenue_90_days = combined_revenue;
                primary.combined_lost_revenue_per_day = combined_lost;
                tracing::info!(
                    asin,
                    siblings,
                    primary_sku = %primary.sku,
                    "共享 ASIN 全员断货，折叠为主 SKU"
                );
                collapsed.push(primary);
            }
        }

        collapsed
    }
}

impl Default for RevenueRiskRanker {
    fn default() -> Self {
        Self::new()
    }
}
