// ==========================================
// 电商卖家库存决策支持系统 - 销售记录
// ==========================================
// 来源: 各滚动窗口销售报表与历史月度报表
// 约束: 仅保留子级 ASIN 行，父级聚合行在导入层剔除
// ==========================================

use serde::{Deserialize, Serialize};

/// 销售记录 (SalesRecord)
///
/// asin 为子级 ASIN；历史上部分报表把 SKU 填进了 ASIN 列，
/// 查找逻辑（SalesIndex）对此做了容错。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// 子级 ASIN
    pub asin: Option<String>,

    /// 卖家 SKU（部分报表提供）
    pub sku: Option<String>,

    /// 商品标题
    pub title: String,

    /// 订购件数
    pub units: i64,

    /// 订购商品销售额（缺价时记 0，由价格表兜底换算）
    pub revenue: f64,
}

/// 单 SKU 在某窗口内的销售合计
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesTotals {
    pub units: i64,
    pub revenue: f64,
}
