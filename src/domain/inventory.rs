// ==========================================
// 电商卖家库存决策支持系统 - 库存记录
// ==========================================
// 来源: 履约仓库存快照报表 + 第三方仓 (AWD) 报表
// 快照日期作为整批数据的 as-of 时间戳
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 履约仓库存记录 (InventoryRecord)
///
/// 每 SKU 每快照一行。数量字段缺失时由导入层归零，核心层不再判空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// 卖家 SKU
    pub sku: String,

    /// 目录商品标识 (ASIN)
    pub asin: Option<String>,

    /// 商品标题（部分报表提供，优先于 listing 标题展示）
    pub title: Option<String>,

    /// 可售数量
    pub fulfillable_quantity: i64,

    /// 保留数量（质检/调查/残损，不计入可用管道）
    pub reserved_quantity: i64,

    /// 入库在建数量
    pub inbound_working: i64,

    /// 入库在途数量
    pub inbound_shipped: i64,

    /// 入库收货中数量
    pub inbound_receiving: i64,

    /// 未来供给可售数量
    pub future_supply_buyable: i64,

    /// 未来供给保留数量
    pub reserved_future_supply: i64,

    /// 仓内总数量（预测规划用的现货口径）
    pub total_quantity: i64,

    /// 库存健康状态（原始文本，判定时做大小写不敏感子串匹配）
    pub health_status: Option<String>,

    /// 快照日期
    pub snapshot_date: Option<NaiveDate>,
}

impl InventoryRecord {
    /// 入库管道合计（在建 + 在途 + 收货中）
    pub fn total_inbound(&self) -> i64 {
        self.inbound_working + self.inbound_shipped + self.inbound_receiving
    }
}

/// 第三方仓 (AWD) 库存记录
///
/// 只有 inbound 与 available 计入合计——reserved 与 outbound-to-FBA
/// 在履约仓报表中已被统计，再计一次会重复。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwdRecord {
    /// 卖家 SKU
    pub sku: String,

    /// 在途入仓数量
    pub inbound_units: i64,

    /// 仓内可用数量
    pub available_units: i64,

    /// 保留数量（不计入合计，仅核对用）
    pub reserved_units: i64,

    /// 转运 FBA 数量（不计入合计，仅核对用）
    pub outbound_units: i64,
}

impl AwdRecord {
    /// AWD 计入合计的数量
    pub fn total(&self) -> i64 {
        self.inbound_units + self.available_units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_awd_total_excludes_reserved_and_outbound() {
        let rec = AwdRecord {
            sku: "S1".to_string(),
            inbound_units: 10,
            available_units: 5,
            reserved_units: 100,
            outbound_units: 50,
        };
        assert_eq!(rec.total(), 15);
    }
}
