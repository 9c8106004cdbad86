// ==========================================
// 电商卖家库存决策支持系统 - 字段映射器
// ==========================================
// 职责: 历史列名别名 → 标准字段 + 类型转换
// 红线: 所有表头分支止步于此，核心层只见标准化记录
// ==========================================

use crate::domain::inventory::{AwdRecord, InventoryRecord};
use crate::domain::listing::ListingRecord;
use crate::domain::sales::SalesRecord;
use crate::domain::types::{FulfillmentChannel, ListingStatus};
use crate::importer::file_parser::RawRow;
use chrono::NaiveDate;

// ==========================================
// 列名别名表（历史观察到的各代报表格式）
// ==========================================

pub const SKU_ALIASES: &[&str] = &[
    "seller-sku",
    "SKU",
    "sku",
    "Seller SKU",
    "Seller_SKU",
    "merchant-sku",
    "seller_sku",
];

pub const ASIN_ALIASES: &[&str] = &["asin1", "asin", "ASIN", "asin-1", "asin_1"];

pub const STATUS_ALIASES: &[&str] = &["status", "Status", "STATUS", "listing-status", "listing_status"];

pub const FULFILLMENT_ALIASES: &[&str] = &[
    "fulfillment-channel",
    "Fulfillment Channel",
    "fulfillment_channel",
    "fulfillment channel",
    "channel",
    "fulfillment-channel-id",
];

pub const TITLE_ALIASES: &[&str] = &[
    "item-name",
    "product-name",
    "Product Name",
    "title",
    "Title",
    "item_name",
    "product_name",
    "item-description",
];

pub const PRICE_ALIASES: &[&str] = &["price", "Price", "your-price", "Your Price", "your_price", "item-price"];

pub const HEALTH_STATUS_ALIASES: &[&str] = &[
    "fba-inventory-level-health-status",
    "inventory-level-health-status",
    "health-status",
];

const CHILD_ASIN_ALIASES: &[&str] = &["(Child) ASIN", "Child ASIN", "ASIN"];
const SALES_SKU_ALIASES: &[&str] = &["SKU", "sku"];
const SALES_UNITS_ALIASES: &[&str] = &["Units Ordered", "Units Ordered - Sales Channel"];
const SALES_REVENUE_ALIASES: &[&str] = &[
    "Ordered Product Sales",
    "Ordered Product Sales - Sales Channel",
    "Product Sales - Sales Channel",
];
const SALES_TITLE_ALIASES: &[&str] = &["Title", "Product Name"];

const FULFILLABLE_ALIASES: &[&str] = &["afn-fulfillable-quantity", "available"];
const RESERVED_ALIASES: &[&str] = &["afn-reserved-quantity", "Total Reserved Quantity"];
const INBOUND_WORKING_ALIASES: &[&str] = &["afn-inbound-working-quantity", "inbound-working"];
const INBOUND_SHIPPED_ALIASES: &[&str] = &["afn-inbound-shipped-quantity", "inbound-shipped"];
const INBOUND_RECEIVING_ALIASES: &[&str] = &["afn-inbound-receiving-quantity", "inbound-received"];
const FUTURE_SUPPLY_ALIASES: &[&str] = &["afn-future-supply-buyable"];
const RESERVED_FUTURE_ALIASES: &[&str] = &["afn-reserved-future-supply"];
const TOTAL_QUANTITY_ALIASES: &[&str] = &[
    "afn-total-quantity",
    "afn-warehouse-quantity",
    "Inventory Supply at FBA",
];
const AGGREGATE_INBOUND_ALIASES: &[&str] = &["inbound-quantity"];
const SNAPSHOT_DATE_ALIASES: &[&str] = &["snapshot-date", "snapshot_date", "Snapshot Date"];

// ==========================================
// 取值辅助
// ==========================================

/// 按别名序提取非空字符串
fn get_string(row: &RawRow, aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        if let Some(v) = row.get(*alias) {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// 按别名序提取整数；缺失/不可解析记 0（可容忍字段不致命）
fn get_i64(row: &RawRow, aliases: &[&str]) -> i64 {
    get_string(row, aliases)
        .map(|v| v.replace(',', ""))
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v as i64)
        .unwrap_or(0)
}

/// 按别名序提取金额；剥离 `$` 与千分位逗号，缺失记 0.0
fn get_money(row: &RawRow, aliases: &[&str]) -> f64 {
    get_string(row, aliases)
        .map(|v| v.replace(['$', ','], ""))
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// 按别名序提取日期（多种历史格式）
fn get_date(row: &RawRow, aliases: &[&str]) -> Option<NaiveDate> {
    let raw = get_string(row, aliases)?;
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(&raw, fmt) {
            return Some(d);
        }
    }
    // ISO 时间戳取日期部分
    raw.get(0..10)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

// ==========================================
// ListingFieldMapper - 在售清单映射
// ==========================================
pub struct ListingFieldMapper;

impl ListingFieldMapper {
    /// 单行映射；sku 缺失的行返回 None（无法参与任何下游计算）
    pub fn map_row(row: &RawRow) -> Option<ListingRecord> {
        let sku = get_string(row, SKU_ALIASES)?;

        Some(ListingRecord {
            sku,
            asin: get_string(row, ASIN_ALIASES),
            status: get_string(row, STATUS_ALIASES)
                .map(|s| ListingStatus::from_raw(&s))
                .unwrap_or(ListingStatus::Other),
            fulfillment_channel: get_string(row, FULFILLMENT_ALIASES)
                .map(|s| FulfillmentChannel::from_raw(&s))
                .unwrap_or(FulfillmentChannel::Other),
            title: get_string(row, TITLE_ALIASES).unwrap_or_default(),
            price: get_money(row, PRICE_ALIASES),
        })
    }

    pub fn map_rows(rows: &[RawRow]) -> Vec<ListingRecord> {
        rows.iter().filter_map(Self::map_row).collect()
    }
}

// ==========================================
// InventoryFieldMapper - 库存快照映射
// ==========================================
pub struct InventoryFieldMapper;

impl InventoryFieldMapper {
    /// 单行映射；sku 缺失的行返回 None
    ///
    /// 聚合回退: 三个入库分列全为 0 且存在 inbound-quantity 聚合列时，
    /// 将聚合值归入 inbound_shipped（历史报表只给聚合列）。
    pub fn map_row(row: &RawRow) -> Option<InventoryRecord> {
        let sku = get_string(row, SKU_ALIASES)?;

        let mut inbound_working = get_i64(row, INBOUND_WORKING_ALIASES);
        let mut inbound_shipped = get_i64(row, INBOUND_SHIPPED_ALIASES);
        let inbound_receiving = get_i64(row, INBOUND_RECEIVING_ALIASES);

        if inbound_working == 0 && inbound_shipped == 0 && inbound_receiving == 0 {
            let aggregate = get_i64(row, AGGREGATE_INBOUND_ALIASES);
            if aggregate > 0 {
                inbound_shipped = aggregate;
                inbound_working = 0;
            }
        }

        Some(InventoryRecord {
            sku,
            asin: get_string(row, ASIN_ALIASES),
            title: get_string(row, TITLE_ALIASES),
            fulfillable_quantity: get_i64(row, FULFILLABLE_ALIASES),
            reserved_quantity: get_i64(row, RESERVED_ALIASES),
            inbound_working,
            inbound_shipped,
            inbound_receiving,
            future_supply_buyable: get_i64(row, FUTURE_SUPPLY_ALIASES),
            reserved_future_supply: get_i64(row, RESERVED_FUTURE_ALIASES),
            total_quantity: get_i64(row, TOTAL_QUANTITY_ALIASES),
            health_status: get_string(row, HEALTH_STATUS_ALIASES),
            snapshot_date: get_date(row, SNAPSHOT_DATE_ALIASES),
        })
    }

    pub fn map_rows(rows: &[RawRow]) -> Vec<InventoryRecord> {
        rows.iter().filter_map(Self::map_row).collect()
    }
}

// ==========================================
// SalesFieldMapper - 销售报表映射
// ==========================================
pub struct SalesFieldMapper;

impl SalesFieldMapper {
    /// 单行映射
    ///
    /// 仅保留能解析出子级 ASIN 或 SKU 的行；父级聚合行（两者皆无）剔除。
    pub fn map_row(row: &RawRow) -> Option<SalesRecord> {
        let asin = get_string(row, CHILD_ASIN_ALIASES);
        let sku = get_string(row, SALES_SKU_ALIASES);

        if asin.is_none() && sku.is_none() {
            return None;
        }

        Some(SalesRecord {
            asin,
            sku,
            title: get_string(row, SALES_TITLE_ALIASES).unwrap_or_default(),
            units: get_i64(row, SALES_UNITS_ALIASES),
            revenue: get_money(row, SALES_REVENUE_ALIASES),
        })
    }

    pub fn map_rows(rows: &[RawRow]) -> Vec<SalesRecord> {
        rows.iter().filter_map(Self::map_row).collect()
    }
}

// ==========================================
// AwdFieldMapper - 第三方仓报表映射
// ==========================================
// AWD 报表列名带单位后缀且不同批次大小写不一，
// 按表头子串匹配而非精确别名
// ==========================================
pub struct AwdFieldMapper;

impl AwdFieldMapper {
    fn find_value<'a>(row: &'a RawRow, needle: &str, exclude: Option<&str>) -> Option<&'a String> {
        row.iter()
            .find(|(header, _)| {
                let h = header.to_lowercase();
                h.contains(needle) && exclude.map_or(true, |ex| !h.contains(ex))
            })
            .map(|(_, v)| v)
    }

    fn find_i64(row: &RawRow, needle: &str) -> i64 {
        Self::find_value(row, needle, None)
            .map(|v| v.replace(',', ""))
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v as i64)
            .unwrap_or(0)
    }

    /// 单行映射；sku 缺失或计入合计为 0 的行返回 None
    pub fn map_row(row: &RawRow) -> Option<AwdRecord> {
        let sku = Self::find_value(row, "sku", Some("fnsku"))?
            .trim()
            .to_string();
        if sku.is_empty() {
            return None;
        }

        let record = AwdRecord {
            sku,
            inbound_units: Self::find_i64(row, "inbound to awd"),
            available_units: Self::find_i64(row, "available in awd"),
            reserved_units: Self::find_i64(row, "reserved in awd"),
            outbound_units: Self::find_i64(row, "outbound to fba"),
        };

        if record.total() > 0 {
            Some(record)
        } else {
            None
        }
    }

    pub fn map_rows(rows: &[RawRow]) -> Vec<AwdRecord> {
        rows.iter().filter_map(Self::map_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_listing_mapping_with_aliases() {
        let r = row(&[
            ("Seller SKU", "A1"),
            ("asin1", "X"),
            ("Status", "Active"),
            ("fulfillment-channel", "AMAZON_NA"),
            ("item-name", "Widget"),
            ("your-price", "$1,299.99"),
        ]);
        let listing = ListingFieldMapper::map_row(&r).unwrap();
        assert_eq!(listing.sku, "A1");
        assert_eq!(listing.asin.as_deref(), Some("X"));
        assert!(listing.status.is_active());
        assert!(listing.fulfillment_channel.is_fba());
        assert_eq!(listing.price, 1299.99);
    }

    #[test]
    fn test_listing_row_without_sku_is_dropped() {
        let r = row(&[("asin1", "X"), ("status", "Active")]);
        assert!(ListingFieldMapper::map_row(&r).is_none());
    }

    #[test]
    fn test_inventory_aggregate_inbound_fallback() {
        let r = row(&[
            ("sku", "A1"),
            ("afn-fulfillable-quantity", "3"),
            ("inbound-quantity", "12"),
        ]);
        let inv = InventoryFieldMapper::map_row(&r).unwrap();
        assert_eq!(inv.inbound_shipped, 12);
        assert_eq!(inv.inbound_working, 0);
        assert_eq!(inv.total_inbound(), 12);
    }

    #[test]
    fn test_sales_parent_row_is_dropped() {
        let r = row(&[("Units Ordered", "5"), ("Ordered Product Sales", "$50")]);
        assert!(SalesFieldMapper::map_row(&r).is_none());
    }

    #[test]
    fn test_sales_money_stripping() {
        let r = row(&[
            ("(Child) ASIN", "X"),
            ("Units Ordered", "30"),
            ("Ordered Product Sales", "$1,234.50"),
        ]);
        let s = SalesFieldMapper::map_row(&r).unwrap();
        assert_eq!(s.units, 30);
        assert_eq!(s.revenue, 1234.50);
    }

    #[test]
    fn test_awd_mapping_skips_fnsku_column() {
        let r = row(&[
            ("FNSKU", "ZZZ"),
            ("SKU", "S1"),
            ("Inbound to AWD (Units)", "10"),
            ("Available in AWD (Units)", "5"),
            ("Reserved in AWD", "100"),
            ("Outbound to FBA", "50"),
        ]);
        let awd = AwdFieldMapper::map_row(&r).unwrap();
        assert_eq!(awd.sku, "S1");
        assert_eq!(awd.total(), 15);
        assert_eq!(awd.reserved_units, 100);
        assert_eq!(awd.outbound_units, 50);
    }

    #[test]
    fn test_awd_zero_total_row_is_dropped() {
        let r = row(&[
            ("SKU", "S2"),
            ("Inbound to AWD (Units)", "0"),
            ("Available in AWD (Units)", "0"),
            ("Reserved in AWD", "7"),
        ]);
        assert!(AwdFieldMapper::map_row(&r).is_none());
    }
}
