// ==========================================
// 电商卖家库存决策支持系统 - 第三方仓 (AWD) 库存映射
// ==========================================
// 口径: 只计 inbound + available；
// 预留列与发往 FBA 的出库列已计入 FBA 快照，再计即重复
// ==========================================

use crate::domain::inventory::AwdRecord;
use std::collections::HashMap;

/// SKU → AWD 合计
///
/// 报表缺失时调用方传空切片，映射为空即可，不阻断批处理。
pub fn awd_total_by_sku(records: &[AwdRecord]) -> HashMap<String, i64> {
    records
        .iter()
        .filter(|r| r.total() > 0)
        .map(|r| (r.sku.clone(), r.total()))
        .collect()
}
