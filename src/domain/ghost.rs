// ==========================================
// 电商卖家库存决策支持系统 - 幽灵 SKU 条目
// ==========================================
// 幽灵 SKU: 近期仍有销量但从当前库存报表中消失的 SKU
// 按客户持久化，60 天滚动保留，上限 50 条
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 幽灵 SKU 条目 (GhostEntry)
///
/// 不变量: 条目存在当且仅当
/// (a) SKU 不在最新库存快照中，且
/// (b) last_seen_date 距今不超过 60 天。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostEntry {
    /// 卖家 SKU
    pub sku: String,

    /// 目录商品标识 (ASIN)
    pub asin: Option<String>,

    /// 商品标题（发现时可能为空，展示时再补）
    pub title: String,

    /// 最后一次在库存报表中出现的时间
    pub last_seen_date: DateTime<Utc>,

    /// 90 天窗口营收
    pub revenue_90: f64,

    /// 365 天窗口营收
    pub revenue_365: f64,

    /// 90 天窗口销量
    pub units_90: i64,

    /// 365 天窗口销量
    pub units_365: i64,
}

/// 按客户持久化的幽灵登记表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GhostRegistryData {
    /// 最近一次更新时间（首跑为 None）
    pub last_updated: Option<DateTime<Utc>>,

    /// 条目列表（按 90 天营收降序）
    pub entries: Vec<GhostEntry>,
}
