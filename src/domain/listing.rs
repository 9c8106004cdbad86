// ==========================================
// 电商卖家库存决策支持系统 - 在售清单记录
// ==========================================
// 来源: listings 报表（经导入层字段映射标准化）
// 用途: 对账图谱 / 价格表 / 风险排名的事实来源
// ==========================================

use crate::domain::types::{FulfillmentChannel, ListingStatus};
use serde::{Deserialize, Serialize};

/// 在售清单记录 (ListingRecord)
///
/// 每行对应卖家的一个 listing；sku 必填，asin 在部分历史报表缺失。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// 卖家 SKU
    pub sku: String,

    /// 目录商品标识 (ASIN)，历史报表可能缺失
    pub asin: Option<String>,

    /// 在售状态
    pub status: ListingStatus,

    /// 履约渠道
    pub fulfillment_channel: FulfillmentChannel,

    /// 商品标题
    pub title: String,

    /// 挂牌价（缺失记作 0.0）
    pub price: f64,
}

impl ListingRecord {
    /// 是否为可参与风险排名的 FBA 型 listing（active 或 inactive）
    pub fn is_risk_candidate(&self) -> bool {
        self.fulfillment_channel.is_fba()
            && matches!(self.status, ListingStatus::Active | ListingStatus::Inactive)
    }
}
