// ==========================================
// 电商卖家库存决策支持系统 - ASIN 价格解析器
// ==========================================
// 职责: 在售清单 → ASIN 最优参考价
// 用途: 销售报表营收缺失时按件数 × 参考价兜底
// ==========================================

use crate::domain::listing::ListingRecord;
use std::collections::HashMap;

// ==========================================
// PriceMap - ASIN 参考价映射
// ==========================================
// 仅取 Active 且价格为正的行；同 ASIN 多价取最高
// ==========================================
pub struct PriceMap {
    prices: HashMap<String, f64>,
}

impl PriceMap {
    /// 从在售清单构建
    pub fn from_listings(listings: &[ListingRecord]) -> Self {
        let mut prices: HashMap<String, f64> = HashMap::new();

        for listing in listings {
            if !listing.status.is_active() || listing.price <= 0.0 {
                continue;
            }
            let Some(asin) = &listing.asin else {
                continue;
            };
            if asin.is_empty() {
                continue;
            }

            prices
                .entry(asin.clone())
                .and_modify(|p| {
                    if listing.price > *p {
                        *p = listing.price;
                    }
                })
                .or_insert(listing.price);
        }

        tracing::debug!(asins = prices.len(), "价格映射构建完成");
        Self { prices }
    }

    /// 空映射（无清单场景）
    pub fn empty() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    pub fn get(&self, asin: &str) -> Option<f64> {
        self.prices.get(asin).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{FulfillmentChannel, ListingStatus};

    fn listing(sku: &str, asin: &str, status: ListingStatus, price: f64) -> ListingRecord {
        ListingRecord {
            sku: sku.to_string(),
            asin: Some(asin.to_string()),
            status,
            fulfillment_channel: FulfillmentChannel::Fba,
            title: String::new(),
            price,
        }
    }

    #[test]
    fn test_highest_active_price_wins() {
        let listings = vec![
            listing("A1", "B01", ListingStatus::Active, 10.0),
            listing("A2", "B01", ListingStatus::Active, 15.0),
            listing("A3", "B01", ListingStatus::Inactive, 99.0), // 非 Active 忽略
        ];
        let map = PriceMap::from_listings(&listings);
        assert_eq!(map.get("B01"), Some(15.0));
    }

    #[test]
    fn test_zero_price_excluded() {
        let listings = vec![listing("A1", "B01", ListingStatus::Active, 0.0)];
        let map = PriceMap::from_listings(&listings);
        assert!(map.get("B01").is_none());
        assert!(map.is_empty());
    }
}
