// ==========================================
// 电商卖家库存决策支持系统 - ASIN/SKU 对账引擎
// ==========================================
// 职责: 无效 SKU 识别 / 共享 ASIN 图谱 / 主 SKU 评分 / 销售行回配
// 红线: 全部对账判定止步于此，下游引擎只消费图谱查询结果
// ==========================================

use crate::domain::listing::ListingRecord;
use crate::domain::types::ListingStatus;
use crate::engine::sales_index::SalesIndex;
use crate::domain::types::SalesWindow;
use std::collections::HashMap;

// 平台自动生成的残次/遗失变体后缀（大小写不敏感）
const INVALID_SKU_MARKERS: &[&str] = &[
    ".found", ".missing", "-found", "-missing", "_found", "_missing", " found", " missing",
];

/// 判定平台生成的无效变体 SKU
///
/// 此类 SKU 由仓库盘点自动创建，不代表真实商品，
/// 参与任何分析都会造成重复计数。
pub fn is_invalid_sku(sku: &str) -> bool {
    let lowered = sku.to_lowercase();
    INVALID_SKU_MARKERS.iter().any(|m| lowered.contains(m))
}

// ==========================================
// SkuNode - 图谱节点（在售清单裁剪视图）
// ==========================================
#[derive(Debug, Clone)]
pub struct SkuNode {
    pub sku: String,
    pub asin: Option<String>,
    pub status: ListingStatus,
    pub fulfillment_channel: crate::domain::types::FulfillmentChannel,
    pub title: String,
    pub price: f64,
}

impl SkuNode {
    fn from_listing(listing: &ListingRecord) -> Self {
        Self {
            sku: listing.sku.clone(),
            asin: listing.asin.clone(),
            status: listing.status,
            fulfillment_channel: listing.fulfillment_channel,
            title: listing.title.clone(),
            price: listing.price,
        }
    }
}

// ==========================================
// AsinSkuGraph - 共享 ASIN 图谱
// ==========================================
// ASIN → SKU 列表（含 Active 与 Inactive，以发现全部共享关系）
// 无效变体 SKU 在建图时剔除
// ==========================================
pub struct AsinSkuGraph {
    asin_to_skus: HashMap<String, Vec<SkuNode>>,
    details: HashMap<String, SkuNode>,
}

impl AsinSkuGraph {
    /// 从在售清单构建图谱
    pub fn from_listings(listings: &[ListingRecord]) -> Self {
        let mut asin_to_skus: HashMap<String, Vec<SkuNode>> = HashMap::new();
        let mut details: HashMap<String, SkuNode> = HashMap::new();

        for listing in listings {
            if listing.sku.is_empty() || is_invalid_sku(&listing.sku) {
                continue;
            }

            let node = SkuNode::from_listing(listing);
            details.entry(listing.sku.clone()).or_insert_with(|| node.clone());

            if let Some(asin) = &listing.asin {
                if !asin.is_empty() {
                    asin_to_skus.entry(asin.clone()).or_default().push(node);
                }
            }
        }

        let shared = asin_to_skus.values().filter(|v| v.len() > 1).count();
        tracing::debug!(
            asins = asin_to_skus.len(),
            shared_asins = shared,
            "ASIN-SKU 图谱构建完成"
        );

        Self {
            asin_to_skus,
            details,
        }
    }

    /// 指定 ASIN 下的全部 SKU（清单顺序）
    pub fn skus_for_asin(&self, asin: &str) -> &[SkuNode] {
        self.asin_to_skus
            .get(asin)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// 按 SKU 查节点明细
    pub fn details(&self, sku: &str) -> Option<&SkuNode> {
        self.details.get(sku)
    }

    /// ASIN 是否被多个 SKU 共享
    pub fn is_shared_asin(&self, asin: &str) -> bool {
        self.skus_for_asin(asin).len() > 1
    }

    /// 为销售行在共享 ASIN 候选中回配最匹配的 SKU
    ///
    /// # 评分（0-100）
    /// 1. 标题词重合率 × 50
    /// 2. 均价偏差 20% 以内: (1 - 偏差) × 50
    ///
    /// 所有候选都无信号时取首个候选（清单顺序稳定）。
    pub fn find_best_matching_sku(
        &self,
        asin: &str,
        sales_title: &str,
        sales_revenue: f64,
        sales_units: i64,
    ) -> Option<&SkuNode> {
        let candidates = self.skus_for_asin(asin);
        if candidates.is_empty() {
            return None;
        }
        if candidates.len() == 1 {
            return Some(&candidates[0]);
        }

        let avg_price = if sales_units > 0 {
            sales_revenue / sales_units as f64
        } else {
            0.0
        };

        let mut best: Option<&SkuNode> = None;
        let mut best_score = -1.0_f64;

        for node in candidates {
            let mut score = 0.0;

            if !sales_title.is_empty() && !node.title.is_empty() {
                score += title_overlap_ratio(sales_title, &node.title) * 50.0;
            }

            if avg_price > 0.0 && node.price > 0.0 {
                let price_diff = (avg_price - node.price).abs() / node.price;
                if price_diff <= 0.2 {
                    score += (1.0 - price_diff) * 50.0;
                }
            }

            // 仅严格更优才替换，保证平分时取首个候选
            if score > best_score {
                best_score = score;
                best = Some(node);
            }
        }

        best
    }
}

/// 标题词重合率: 共同词数 / max(两侧词数)
fn title_overlap_ratio(a: &str, b: &str) -> f64 {
    let a_words: Vec<String> = a.to_lowercase().split_whitespace().map(String::from).collect();
    let b_words: Vec<String> = b.to_lowercase().split_whitespace().map(String::from).collect();
    if a_words.is_empty() || b_words.is_empty() {
        return 0.0;
    }

    let common = a_words.iter().filter(|w| b_words.contains(w)).count();
    common as f64 / a_words.len().max(b_words.len()) as f64
}

// ==========================================
// 主 SKU 评分
// ==========================================

/// 主 SKU 候选（来自同一 ASIN 的断货 SKU 组）
#[derive(Debug, Clone)]
pub struct PrimaryCandidate {
    pub sku: String,
    pub asin: Option<String>,
    pub status: ListingStatus,
    /// 已算出的 90 天营收（有则直接作为营收分）
    pub revenue_90: Option<f64>,
}

/// 从共享 ASIN 的候选组里选出主 SKU
///
/// # 评分
/// 1. 营收分: revenue_90（缺失时查 90 天销售索引，营收为 0 用件数 × 10 兜底）
/// 2. 短名加成: max(0, 100 - SKU 长度)
/// 3. Active 加成: +50
///
/// 平分时取首个候选（输入顺序稳定）。
pub fn select_primary_sku(
    candidates: &[PrimaryCandidate],
    sales_index: Option<&SalesIndex>,
) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }
    if candidates.len() == 1 {
        return Some(candidates[0].sku.clone());
    }

    let mut best: Option<&PrimaryCandidate> = None;
    let mut best_score = f64::NEG_INFINITY;

    for candidate in candidates {
        let mut score = 0.0;

        match candidate.revenue_90 {
            Some(revenue) if revenue > 0.0 => score += revenue,
            _ => {
                if let Some(index) = sales_index {
                    if let Some(totals) = index.find(
                        SalesWindow::T90,
                        &candidate.sku,
                        candidate.asin.as_deref(),
                        None,
                    ) {
                        score += if totals.revenue > 0.0 {
                            totals.revenue
                        } else {
                            totals.units as f64 * 10.0
                        };
                    }
                }
            }
        }

        score += (100 - candidate.sku.len() as i64).max(0) as f64;

        if candidate.status.is_active() {
            score += 50.0;
        }

        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }

    best.map(|c| c.sku.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FulfillmentChannel;

    fn listing(sku: &str, asin: &str, status: ListingStatus, title: &str, price: f64) -> ListingRecord {
        ListingRecord {
            sku: sku.to_string(),
            asin: Some(asin.to_string()),
            status,
            fulfillment_channel: FulfillmentChannel::Fba,
            title: title.to_string(),
            price,
        }
    }

    #[test]
    fn test_invalid_sku_patterns() {
        assert!(is_invalid_sku("WIDGET-01.FOUND"));
        assert!(is_invalid_sku("widget-01.missing"));
        assert!(is_invalid_sku("WIDGET_found"));
        assert!(is_invalid_sku("widget missing"));
        assert!(!is_invalid_sku("WIDGET-01"));
        assert!(!is_invalid_sku("FOUNDATION-CREAM")); // 词中不含分隔标记
    }

    #[test]
    fn test_graph_excludes_invalid_skus() {
        let listings = vec![
            listing("A1", "B01", ListingStatus::Active, "Widget", 10.0),
            listing("A1.found", "B01", ListingStatus::Active, "Widget", 10.0),
        ];
        let graph = AsinSkuGraph::from_listings(&listings);
        assert_eq!(graph.skus_for_asin("B01").len(), 1);
        assert!(!graph.is_shared_asin("B01"));
        assert!(graph.details("A1.found").is_none());
    }

    #[test]
    fn test_shared_asin_detection_includes_inactive() {
        let listings = vec![
            listing("A1", "B01", ListingStatus::Active, "Widget", 10.0),
            listing("A2", "B01", ListingStatus::Inactive, "Widget v2", 12.0),
        ];
        let graph = AsinSkuGraph::from_listings(&listings);
        assert!(graph.is_shared_asin("B01"));
    }

    #[test]
    fn test_best_match_prefers_title_overlap() {
        let listings = vec![
            listing("A1", "B01", ListingStatus::Active, "Blue Widget Large", 10.0),
            listing("A2", "B01", ListingStatus::Active, "Red Gadget Small", 10.0),
        ];
        let graph = AsinSkuGraph::from_listings(&listings);
        let node = graph
            .find_best_matching_sku("B01", "Blue Widget Large", 0.0, 0)
            .unwrap();
        assert_eq!(node.sku, "A1");
    }

    #[test]
    fn test_best_match_price_within_20_percent() {
        let listings = vec![
            listing("A1", "B01", ListingStatus::Active, "X", 100.0),
            listing("A2", "B01", ListingStatus::Active, "Y", 10.0),
        ];
        let graph = AsinSkuGraph::from_listings(&listings);
        // 均价 9.5，与 A2 的 10.0 偏差 5%
        let node = graph.find_best_matching_sku("B01", "", 95.0, 10).unwrap();
        assert_eq!(node.sku, "A2");
    }

    #[test]
    fn test_best_match_no_signal_returns_first() {
        let listings = vec![
            listing("A1", "B01", ListingStatus::Active, "", 0.0),
            listing("A2", "B01", ListingStatus::Active, "", 0.0),
        ];
        let graph = AsinSkuGraph::from_listings(&listings);
        let node = graph.find_best_matching_sku("B01", "", 0.0, 0).unwrap();
        assert_eq!(node.sku, "A1");
    }

    fn candidate(sku: &str, status: ListingStatus, revenue_90: Option<f64>) -> PrimaryCandidate {
        PrimaryCandidate {
            sku: sku.to_string(),
            asin: Some("B01".to_string()),
            status,
            revenue_90,
        }
    }

    #[test]
    fn test_primary_sku_revenue_dominates() {
        let chosen = select_primary_sku(
            &[
                candidate("SHORT", ListingStatus::Active, Some(100.0)),
                candidate("LONGER-SKU-NAME", ListingStatus::Inactive, Some(500.0)),
            ],
            None,
        );
        assert_eq!(chosen.as_deref(), Some("LONGER-SKU-NAME"));
    }

    #[test]
    fn test_primary_sku_shorter_name_wins_without_revenue() {
        let chosen = select_primary_sku(
            &[
                candidate("WIDGET-01-VARIANT", ListingStatus::Active, None),
                candidate("WIDGET-01", ListingStatus::Active, None),
            ],
            None,
        );
        assert_eq!(chosen.as_deref(), Some("WIDGET-01"));
    }

    #[test]
    fn test_primary_sku_tie_is_stable() {
        // 长度与状态完全一致，平分取首个
        let chosen = select_primary_sku(
            &[
                candidate("AAA-1", ListingStatus::Active, None),
                candidate("BBB-1", ListingStatus::Active, None),
            ],
            None,
        );
        assert_eq!(chosen.as_deref(), Some("AAA-1"));
    }

    #[test]
    fn test_primary_sku_single_candidate() {
        let chosen = select_primary_sku(&[candidate("ONLY", ListingStatus::Inactive, None)], None);
        assert_eq!(chosen.as_deref(), Some("ONLY"));
    }
}
