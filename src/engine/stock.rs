// ==========================================
// 电商卖家库存决策支持系统 - 库存状态引擎
// ==========================================
// 职责: SKU 级断货判定 + ASIN 级可用性聚合
// 口径: 可用管线不含预留 (预留件多为盘点/残损，不可售)
// ==========================================

use crate::domain::inventory::InventoryRecord;
use crate::domain::listing::ListingRecord;
use crate::engine::reconciliation::is_invalid_sku;
use std::collections::HashMap;

/// SKU → 库存快照行索引（同 SKU 多行取末行，与报表导出口径一致）
pub fn index_inventory(records: &[InventoryRecord]) -> HashMap<String, &InventoryRecord> {
    let mut map = HashMap::new();
    for record in records {
        map.insert(record.sku.clone(), record);
    }
    map
}

// ==========================================
// PipelineQuantities - 管线量口径
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineQuantities {
    pub fulfillable: i64,
    pub reserved: i64,
    pub inbound_working: i64,
    pub inbound_shipped: i64,
    pub inbound_receiving: i64,
    pub future_supply_buyable: i64,
    pub reserved_future_supply: i64,
}

impl PipelineQuantities {
    pub fn from_inventory(record: &InventoryRecord) -> Self {
        Self {
            fulfillable: record.fulfillable_quantity,
            reserved: record.reserved_quantity,
            inbound_working: record.inbound_working,
            inbound_shipped: record.inbound_shipped,
            inbound_receiving: record.inbound_receiving,
            future_supply_buyable: record.future_supply_buyable,
            reserved_future_supply: record.reserved_future_supply,
        }
    }

    pub fn total_inbound(&self) -> i64 {
        self.inbound_working + self.inbound_shipped + self.inbound_receiving
    }

    /// 全管线（含预留，仅用于展示）
    pub fn total_pipeline(&self) -> i64 {
        self.fulfillable + self.reserved + self.total_inbound() + self.future_supply_buyable
    }

    /// 可用管线（不含预留，断货判定口径）
    pub fn available_pipeline(&self) -> i64 {
        self.fulfillable + self.total_inbound() + self.future_supply_buyable
    }
}

// ==========================================
// StockAssessment - 单 SKU 断货判定结果
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct StockAssessment {
    pub out_of_stock: bool,
    /// 经健康状态列直接判定（而非管线推断）
    pub detected_via_health_status: bool,
    pub quantities: PipelineQuantities,
}

// ==========================================
// StockClassifier - 断货判定引擎
// ==========================================
pub struct StockClassifier;

impl StockClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 单 SKU 断货判定
    ///
    /// # 判定顺序
    /// 1. 健康状态列含 "out of stock" → 断货
    /// 2. 否则可用管线为 0 → 断货
    pub fn assess(&self, record: &InventoryRecord) -> StockAssessment {
        let quantities = PipelineQuantities::from_inventory(record);
        let by_health = Self::is_health_out_of_stock(record.health_status.as_deref());
        let out_of_stock = by_health || quantities.available_pipeline() == 0;

        StockAssessment {
            out_of_stock,
            detected_via_health_status: by_health,
            quantities,
        }
    }

    fn is_health_out_of_stock(health_status: Option<&str>) -> bool {
        health_status
            .map(|h| h.to_lowercase().contains("out of stock"))
            .unwrap_or(false)
    }
}

impl Default for StockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// AsinAvailability - ASIN 级可用性
// ==========================================
// 同 ASIN 任一 FBA SKU 有可用管线即视作买家仍可下单，
// 该 ASIN 下其余断货 SKU 不构成营收风险（假阳性抑制）
// ==========================================
#[derive(Debug, Default)]
pub struct AsinStockStatus {
    pub has_inventory: bool,
    pub fba_skus_with_inventory: Vec<String>,
    pub all_fba_skus: Vec<String>,
}

pub struct AsinAvailability {
    status: HashMap<String, AsinStockStatus>,
}

impl AsinAvailability {
    /// 从在售清单 + 库存索引构建
    ///
    /// 仅统计 FBA 渠道且非无效变体的 SKU。
    pub fn build(
        listings: &[ListingRecord],
        inventory_by_sku: &HashMap<String, &InventoryRecord>,
        classifier: &StockClassifier,
    ) -> Self {
        let mut status: HashMap<String, AsinStockStatus> = HashMap::new();

        for listing in listings {
            if listing.sku.is_empty() || is_invalid_sku(&listing.sku) {
                continue;
            }
            if !listing.fulfillment_channel.is_fba() {
                continue;
            }
            let Some(asin) = &listing.asin else {
                continue;
            };
            if asin.is_empty() {
                continue;
            }

            let entry = status.entry(asin.clone()).or_default();
            entry.all_fba_skus.push(listing.sku.clone());

            if let Some(record) = inventory_by_sku.get(&listing.sku) {
                let assessment = classifier.assess(record);
                if assessment.quantities.available_pipeline() > 0
                    && !assessment.detected_via_health_status
                {
                    entry.has_inventory = true;
                    entry.fba_skus_with_inventory.push(listing.sku.clone());
                }
            }
        }

        Self { status }
    }

    /// ASIN 是否有任一 FBA SKU 可售
    pub fn has_inventory(&self, asin: &str) -> bool {
        self.status.get(asin).map(|s| s.has_inventory).unwrap_or(false)
    }

    pub fn status(&self, asin: &str) -> Option<&AsinStockStatus> {
        self.status.get(asin)
    }
}
