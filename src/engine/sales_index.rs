// ==========================================
// 电商卖家库存决策支持系统 - 销售索引
// ==========================================
// 职责: 各窗口销售记录的 SKU/ASIN 双键索引
// 兜底: 营收为 0 且有件数时按 ASIN 参考价折算
// ==========================================

use crate::domain::sales::{SalesRecord, SalesTotals};
use crate::domain::types::SalesWindow;
use crate::engine::price::PriceMap;
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
struct WindowIndex {
    by_asin: HashMap<String, SalesTotals>,
    by_sku: HashMap<String, SalesTotals>,
}

// ==========================================
// SalesIndex - 销售索引
// ==========================================
pub struct SalesIndex {
    windows: BTreeMap<SalesWindow, WindowIndex>,
}

impl SalesIndex {
    /// 从各窗口销售记录构建
    ///
    /// 同键多行取首行（与报表行序一致）。
    pub fn build(sales: &BTreeMap<SalesWindow, Vec<SalesRecord>>) -> Self {
        let mut windows: BTreeMap<SalesWindow, WindowIndex> = BTreeMap::new();

        for (window, records) in sales {
            let index = windows.entry(*window).or_default();
            for record in records {
                let totals = SalesTotals {
                    units: record.units,
                    revenue: record.revenue,
                };
                if let Some(asin) = &record.asin {
                    if !asin.is_empty() {
                        index.by_asin.entry(asin.clone()).or_insert(totals);
                    }
                }
                if let Some(sku) = &record.sku {
                    if !sku.is_empty() {
                        index.by_sku.entry(sku.clone()).or_insert(totals);
                    }
                }
            }
        }

        Self { windows }
    }

    /// 查找某 SKU 在指定窗口的销售合计
    ///
    /// # 匹配顺序
    /// 1. ASIN 键
    /// 2. SKU 键
    /// 3. SKU 作 ASIN 键（历史报表偶见 SKU 误入 ASIN 列）
    ///
    /// # 兜底
    /// 营收为 0 且件数 > 0 时，按价格映射折算营收。
    /// 件数与营收皆为 0 视作无销售，返回 None。
    pub fn find(
        &self,
        window: SalesWindow,
        sku: &str,
        asin: Option<&str>,
        price_map: Option<&PriceMap>,
    ) -> Option<SalesTotals> {
        let index = self.windows.get(&window)?;

        let mut totals = asin
            .and_then(|a| index.by_asin.get(a))
            .or_else(|| index.by_sku.get(sku))
            .or_else(|| index.by_asin.get(sku))
            .copied()?;

        if totals.revenue == 0.0 && totals.units > 0 {
            if let (Some(price_map), Some(asin)) = (price_map, asin) {
                if let Some(price) = price_map.get(asin) {
                    totals.revenue = totals.units as f64 * price;
                    tracing::debug!(asin, units = totals.units, price, "销售营收按参考价兜底");
                }
            }
        }

        if totals.units > 0 || totals.revenue > 0.0 {
            Some(totals)
        } else {
            None
        }
    }

    /// 指定窗口是否有任何销售记录
    pub fn has_window(&self, window: SalesWindow) -> bool {
        self.windows
            .get(&window)
            .map(|w| !w.by_asin.is_empty() || !w.by_sku.is_empty())
            .unwrap_or(false)
    }
}
