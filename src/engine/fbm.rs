// ==========================================
// 电商卖家库存决策支持系统 - FBM→FBA 转换建议引擎
// ==========================================
// 职责: 筛选自发货渠道销量达标、且尚无对应 FBA 变体的 SKU
// ==========================================

use crate::domain::listing::ListingRecord;
use crate::domain::risk::FbmCandidate;
use crate::domain::types::SalesWindow;
use crate::engine::price::PriceMap;
use crate::engine::reconciliation::is_invalid_sku;
use crate::engine::sales_index::SalesIndex;
use std::collections::HashSet;

/// 60 天销量门槛（低于此量转 FBA 仓储费不划算）
pub const FBM_UNITS_THRESHOLD: i64 = 20;

/// 建议条数上限
pub const FBM_RESULT_LIMIT: usize = 20;

// ==========================================
// FbmConversionAdvisor - 转换建议引擎
// ==========================================
pub struct FbmConversionAdvisor;

impl FbmConversionAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// 生成 FBM→FBA 转换建议
    ///
    /// # 步骤
    /// 1. 收集在售 FBA SKU 集合（识别已有 "FBA-{sku}" 变体的情况）
    /// 2. 遍历在售 FBM 清单行，剔除无效变体
    /// 3. 60 天销量 > 门槛才纳入
    /// 4. 按 60 天营收降序取前 N 条
    pub fn suggest(
        &self,
        listings: &[ListingRecord],
        sales_index: &SalesIndex,
        price_map: &PriceMap,
    ) -> Vec<FbmCandidate> {
        let active_fba_skus: HashSet<&str> = listings
            .iter()
            .filter(|l| l.status.is_active() && l.fulfillment_channel.is_fba())
            .map(|l| l.sku.as_str())
            .collect();

        let mut candidates: Vec<FbmCandidate> = Vec::new();

        for listing in listings {
            if !listing.status.is_active() || listing.fulfillment_channel.is_fba() {
                continue;
            }
            if listing.sku.is_empty() || is_invalid_sku(&listing.sku) {
                continue;
            }
            // 已存在对应 FBA 变体的不再建议
            let fba_variant = format!("FBA-{}", listing.sku);
            if active_fba_skus.contains(fba_variant.as_str()) {
                continue;
            }

            let Some(totals) = sales_index.find(
                SalesWindow::T60,
                &listing.sku,
                listing.asin.as_deref(),
                Some(price_map),
            ) else {
                continue;
            };
            if totals.units <= FBM_UNITS_THRESHOLD {
                continue;
            }

            candidates.push(FbmCandidate {
                sku: listing.sku.clone(),
                title: listing.title.clone(),
                units_60: totals.units,
                revenue_60: totals.revenue,
                avg_price: totals.revenue / totals.units as f64,
            });
        }

        candidates.sort_by(|a, b| {
            b.revenue_60
                .partial_cmp(&a.revenue_60)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.sku.cmp(&b.sku))
        });
        candidates.truncate(FBM_RESULT_LIMIT);

        tracing::debug!(count = candidates.len(), "FBM→FBA 建议生成完成");
        candidates
    }
}

impl Default for FbmConversionAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sales::SalesRecord;
    use crate::domain::types::{FulfillmentChannel, ListingStatus, SalesWindow};
    use std::collections::BTreeMap;

    fn listing(sku: &str, channel: FulfillmentChannel, status: ListingStatus) -> ListingRecord {
        ListingRecord {
            sku: sku.to_string(),
            asin: Some(format!("B-{sku}")),
            status,
            fulfillment_channel: channel,
            title: format!("{sku} title"),
            price: 10.0,
        }
    }

    fn t60_sales(rows: Vec<SalesRecord>) -> SalesIndex {
        let mut windows = BTreeMap::new();
        windows.insert(SalesWindow::T60, rows);
        SalesIndex::build(&windows)
    }

    fn sale(sku: &str, units: i64, revenue: f64) -> SalesRecord {
        SalesRecord {
            asin: Some(format!("B-{sku}")),
            sku: Some(sku.to_string()),
            title: String::new(),
            units,
            revenue,
        }
    }

    #[test]
    fn test_threshold_and_avg_price() {
        let listings = vec![
            listing("M1", FulfillmentChannel::Merchant, ListingStatus::Active),
            listing("M2", FulfillmentChannel::Merchant, ListingStatus::Active),
        ];
        let index = t60_sales(vec![sale("M1", 25, 500.0), sale("M2", 20, 999.0)]);

        let results =
            FbmConversionAdvisor::new().suggest(&listings, &index, &PriceMap::empty());
        // M2 恰好 20 件，不达标
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].sku, "M1");
        assert!((results[0].avg_price - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_existing_fba_variant_skipped() {
        let listings = vec![
            listing("M1", FulfillmentChannel::Merchant, ListingStatus::Active),
            listing("FBA-M1", FulfillmentChannel::Fba, ListingStatus::Active),
        ];
        let index = t60_sales(vec![sale("M1", 50, 500.0)]);

        let results =
            FbmConversionAdvisor::new().suggest(&listings, &index, &PriceMap::empty());
        assert!(results.is_empty());
    }

    #[test]
    fn test_inactive_and_invalid_skipped() {
        let listings = vec![
            listing("M1", FulfillmentChannel::Merchant, ListingStatus::Inactive),
            listing("M2.missing", FulfillmentChannel::Merchant, ListingStatus::Active),
        ];
        let index = t60_sales(vec![sale("M1", 50, 500.0), sale("M2.missing", 50, 500.0)]);

        let results =
            FbmConversionAdvisor::new().suggest(&listings, &index, &PriceMap::empty());
        assert!(results.is_empty());
    }

    #[test]
    fn test_sorted_by_revenue_and_capped() {
        let mut listings = Vec::new();
        let mut rows = Vec::new();
        for i in 0..25 {
            let sku = format!("M{i:02}");
            listings.push(listing(&sku, FulfillmentChannel::Merchant, ListingStatus::Active));
            rows.push(sale(&sku, 30, 100.0 + i as f64));
        }
        let index = t60_sales(rows);

        let results =
            FbmConversionAdvisor::new().suggest(&listings, &index, &PriceMap::empty());
        assert_eq!(results.len(), FBM_RESULT_LIMIT);
        assert_eq!(results[0].sku, "M24");
        assert!(results[0].revenue_60 >= results[19].revenue_60);
    }
}
