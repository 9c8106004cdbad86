// ==========================================
// 电商卖家库存决策支持系统 - 幽灵 SKU 登记簿
// ==========================================
// 职责: 追踪"有销售但已从库存快照消失"的 SKU
// 生命周期: 重现即清除 / 60 天未见即过期 / 按 90 天营收截前 50
// 顺序约束: 每次批处理先更新登记簿，再执行营收风险排名
// ==========================================

use crate::domain::ghost::{GhostEntry, GhostRegistryData};
use crate::domain::inventory::InventoryRecord;
use crate::domain::sales::SalesRecord;
use crate::domain::types::SalesWindow;
use crate::engine::price::PriceMap;
use crate::engine::reconciliation::is_invalid_sku;
use crate::engine::sales_index::SalesIndex;
use crate::repository::{RepositoryResult, StateStore};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

/// 登记簿保留天数（超过即过期清除）
pub const GHOST_RETENTION_DAYS: i64 = 60;

/// 单客户登记上限（按 90 天营收保留头部）
pub const GHOST_REGISTRY_CAP: usize = 50;

// 登记簿序列化体积告警阈值（字节）
const REGISTRY_SIZE_WARN_BYTES: usize = 5000;

// ==========================================
// GhostRegistry - 幽灵 SKU 登记簿
// ==========================================
pub struct GhostRegistry<'a> {
    store: &'a dyn StateStore,
}

impl<'a> GhostRegistry<'a> {
    pub fn new(store: &'a dyn StateStore) -> Self {
        Self { store }
    }

    fn key(client_id: &str) -> String {
        format!("ghost_skus_{}", client_id)
    }

    /// 读取客户登记簿；不存在或已损坏返回空簿
    ///
    /// 登记簿是辅助数据，单条损坏不应阻断批处理，解码失败降级为空并告警。
    pub fn get(&self, client_id: &str) -> RepositoryResult<GhostRegistryData> {
        let raw = self.store.get(&Self::key(client_id))?;
        let Some(raw) = raw else {
            return Ok(GhostRegistryData::default());
        };

        match serde_json::from_str::<GhostRegistryData>(&raw) {
            Ok(data) => Ok(data),
            Err(e) => {
                tracing::warn!(client_id, error = %e, "幽灵登记簿解码失败，降级为空簿");
                Ok(GhostRegistryData::default())
            }
        }
    }

    /// 更新客户登记簿
    ///
    /// # 步骤
    /// 1. 保留既有幽灵: 未重现于库存快照且 60 天内见过
    /// 2. 发现新幽灵: 90 天销售窗口里有件数与营收、却不在库存快照的 SKU
    /// 3. 按 90 天营收降序截前 50，落库
    ///
    /// 无效变体 SKU 不入簿。
    pub fn update(
        &self,
        client_id: &str,
        inventory: &[InventoryRecord],
        sales_t90: &[SalesRecord],
        sales_index: &SalesIndex,
        price_map: &PriceMap,
        now: DateTime<Utc>,
    ) -> RepositoryResult<usize> {
        let existing = self.get(client_id)?;
        let cutoff = now - Duration::days(GHOST_RETENTION_DAYS);

        let active_skus: HashSet<&str> = inventory.iter().map(|r| r.sku.as_str()).collect();

        // 1. 保留仍然缺席且未过期的既有幽灵
        let mut ghosts: HashMap<String, GhostEntry> = HashMap::new();
        for ghost in existing.entries {
            if active_skus.contains(ghost.sku.as_str()) {
                tracing::info!(sku = %ghost.sku, "幽灵 SKU 已重现于库存快照，移出登记簿");
                continue;
            }
            if ghost.last_seen_date < cutoff {
                tracing::info!(sku = %ghost.sku, "幽灵 SKU 超过保留期，移出登记簿");
                continue;
            }
            ghosts.insert(ghost.sku.clone(), ghost);
        }

        // 2. 发现新幽灵
        for record in sales_t90 {
            let Some(sku) = record.sku.as_deref().filter(|s| !s.is_empty()) else {
                continue;
            };
            if is_invalid_sku(sku) {
                continue;
            }
            if active_skus.contains(sku) || ghosts.contains_key(sku) {
                continue;
            }

            let Some(sales_90) =
                sales_index.find(SalesWindow::T90, sku, record.asin.as_deref(), Some(price_map))
            else {
                continue;
            };
            if sales_90.revenue <= 0.0 || sales_90.units <= 0 {
                continue;
            }

            let sales_365 =
                sales_index.find(SalesWindow::T365, sku, record.asin.as_deref(), Some(price_map));

            tracing::info!(sku, revenue_90 = sales_90.revenue, "发现新幽灵 SKU");
            ghosts.insert(
                sku.to_string(),
                GhostEntry {
                    sku: sku.to_string(),
                    asin: record.asin.clone(),
                    title: record.title.clone(),
                    last_seen_date: now,
                    revenue_90: sales_90.revenue,
                    revenue_365: sales_365.map(|s| s.revenue).unwrap_or(0.0),
                    units_90: sales_90.units,
                    units_365: sales_365.map(|s| s.units).unwrap_or(0),
                },
            );
        }

        // 3. 营收降序截断并落库
        let mut entries: Vec<GhostEntry> = ghosts.into_values().collect();
        entries.sort_by(|a, b| {
            b.revenue_90
                .partial_cmp(&a.revenue_90)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.sku.cmp(&b.sku))
        });
        entries.truncate(GHOST_REGISTRY_CAP);

        let count = entries.len();
        let data = GhostRegistryData {
            last_updated: Some(now),
            entries,
        };

        let serialized = serde_json::to_string(&data).map_err(|e| {
            crate::repository::RepositoryError::StateEncodeError {
                key: Self::key(client_id),
                message: e.to_string(),
            }
        })?;

        if serialized.len() > REGISTRY_SIZE_WARN_BYTES {
            tracing::warn!(
                client_id,
                bytes = serialized.len(),
                "幽灵登记簿体积偏大，建议清理"
            );
        }

        self.store.put(&Self::key(client_id), &serialized, None)?;
        tracing::info!(client_id, count, "幽灵登记簿更新完成");
        Ok(count)
    }

    /// 清理过期幽灵（可独立于批处理周期调用）
    ///
    /// # 返回
    /// (移除数, 剩余数)
    pub fn cleanup(&self, client_id: &str, now: DateTime<Utc>) -> RepositoryResult<(usize, usize)> {
        let existing = self.get(client_id)?;
        if existing.entries.is_empty() {
            return Ok((0, 0));
        }

        let cutoff = now - Duration::days(GHOST_RETENTION_DAYS);
        let original = existing.entries.len();
        let entries: Vec<GhostEntry> = existing
            .entries
            .into_iter()
            .filter(|g| g.last_seen_date >= cutoff)
            .collect();
        let remaining = entries.len();

        let data = GhostRegistryData {
            last_updated: Some(now),
            entries,
        };
        let serialized = serde_json::to_string(&data).map_err(|e| {
            crate::repository::RepositoryError::StateEncodeError {
                key: Self::key(client_id),
                message: e.to_string(),
            }
        })?;
        self.store.put(&Self::key(client_id), &serialized, None)?;

        Ok((original - remaining, remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStateStore;
    use std::collections::BTreeMap;

    fn sales_record(sku: &str, asin: &str, units: i64, revenue: f64) -> SalesRecord {
        SalesRecord {
            asin: Some(asin.to_string()),
            sku: Some(sku.to_string()),
            title: format!("{sku} title"),
            units,
            revenue,
        }
    }

    fn inventory_record(sku: &str) -> InventoryRecord {
        InventoryRecord {
            sku: sku.to_string(),
            asin: None,
            title: None,
            fulfillable_quantity: 1,
            reserved_quantity: 0,
            inbound_working: 0,
            inbound_shipped: 0,
            inbound_receiving: 0,
            future_supply_buyable: 0,
            reserved_future_supply: 0,
            total_quantity: 1,
            health_status: None,
            snapshot_date: None,
        }
    }

    fn index_of(t90: &[SalesRecord]) -> SalesIndex {
        let mut map = BTreeMap::new();
        map.insert(SalesWindow::T90, t90.to_vec());
        SalesIndex::build(&map)
    }

    #[test]
    fn test_new_ghost_detected_from_sales() {
        let store = MemoryStateStore::new();
        let registry = GhostRegistry::new(&store);
        let now = Utc::now();

        let t90 = vec![sales_record("GHOST-1", "B01", 5, 50.0)];
        let count = registry
            .update("acme", &[], &t90, &index_of(&t90), &PriceMap::empty(), now)
            .unwrap();
        assert_eq!(count, 1);

        let data = registry.get("acme").unwrap();
        assert_eq!(data.entries[0].sku, "GHOST-1");
        assert_eq!(data.entries[0].units_90, 5);
    }

    #[test]
    fn test_invalid_sku_never_registered() {
        let store = MemoryStateStore::new();
        let registry = GhostRegistry::new(&store);

        let t90 = vec![sales_record("GHOST-1.missing", "B01", 5, 50.0)];
        let count = registry
            .update("acme", &[], &t90, &index_of(&t90), &PriceMap::empty(), Utc::now())
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_reappeared_sku_removed() {
        let store = MemoryStateStore::new();
        let registry = GhostRegistry::new(&store);
        let now = Utc::now();

        let t90 = vec![sales_record("GHOST-1", "B01", 5, 50.0)];
        registry
            .update("acme", &[], &t90, &index_of(&t90), &PriceMap::empty(), now)
            .unwrap();

        // 下一批该 SKU 重现于库存快照
        let inventory = vec![inventory_record("GHOST-1")];
        let count = registry
            .update("acme", &inventory, &t90, &index_of(&t90), &PriceMap::empty(), now)
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_retention_window_boundary() {
        let store = MemoryStateStore::new();
        let registry = GhostRegistry::new(&store);
        let now = Utc::now();

        let t90 = vec![sales_record("GHOST-1", "B01", 5, 50.0)];
        registry
            .update("acme", &[], &t90, &index_of(&t90), &PriceMap::empty(), now)
            .unwrap();

        // 59 天后仍保留
        let count = registry
            .update("acme", &[], &[], &index_of(&[]), &PriceMap::empty(), now + Duration::days(59))
            .unwrap();
        assert_eq!(count, 1);

        // 61 天后过期
        let count = registry
            .update("acme", &[], &[], &index_of(&[]), &PriceMap::empty(), now + Duration::days(61))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cap_keeps_highest_revenue() {
        let store = MemoryStateStore::new();
        let registry = GhostRegistry::new(&store);
        let now = Utc::now();

        let t90: Vec<SalesRecord> = (0..80)
            .map(|i| sales_record(&format!("G-{i:03}"), &format!("B{i:03}"), 1, i as f64 + 1.0))
            .collect();
        let count = registry
            .update("acme", &[], &t90, &index_of(&t90), &PriceMap::empty(), now)
            .unwrap();
        assert_eq!(count, GHOST_REGISTRY_CAP);

        let data = registry.get("acme").unwrap();
        // 营收最高的 G-079 居首，营收最低的 30 条被截掉
        assert_eq!(data.entries[0].sku, "G-079");
        assert!(data.entries.iter().all(|g| g.revenue_90 > 30.0));
    }

    #[test]
    fn test_corrupt_registry_degrades_to_empty() {
        let store = MemoryStateStore::new();
        store.put("ghost_skus_acme", "not json", None).unwrap();

        let registry = GhostRegistry::new(&store);
        let data = registry.get("acme").unwrap();
        assert!(data.entries.is_empty());
    }

    #[test]
    fn test_cleanup_counts() {
        let store = MemoryStateStore::new();
        let registry = GhostRegistry::new(&store);
        let now = Utc::now();

        let t90 = vec![sales_record("GHOST-1", "B01", 5, 50.0)];
        registry
            .update("acme", &[], &t90, &index_of(&t90), &PriceMap::empty(), now)
            .unwrap();

        let (removed, remaining) = registry
            .cleanup("acme", now + Duration::days(61))
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(remaining, 0);
    }
}
