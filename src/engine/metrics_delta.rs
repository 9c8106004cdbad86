// ==========================================
// 电商卖家库存决策支持系统 - 指标环比引擎
// ==========================================
// 职责: 按客户持久化上期指标快照，跨批次计算环比
// 口径: 以库存快照日期为"期"；同一快照期内重复跑批
//       直接回放已存的环比结果，不重复比较
// ==========================================

use crate::domain::metrics::{MetricChanges, MetricsSnapshot};
use crate::domain::risk::{FbmCandidate, RiskResult, TrendResult};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::state_store::StateStore;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// 快照中最多保留的 FBM 建议 SKU 数
pub const FBM_SKU_SNAPSHOT_CAP: usize = 100;

// ==========================================
// MetricsDeltaTracker - 指标环比引擎
// ==========================================
pub struct MetricsDeltaTracker<'a> {
    store: &'a dyn StateStore,
}

impl<'a> MetricsDeltaTracker<'a> {
    pub fn new(store: &'a dyn StateStore) -> Self {
        Self { store }
    }

    fn metrics_key(client_id: &str) -> String {
        format!("metrics_{client_id}")
    }

    fn changes_key(client_id: &str) -> String {
        format!("changes_{client_id}")
    }

    /// 从本批次分析结果构建当前指标快照
    ///
    /// 快照日期优先取库存报表 as-of 日期，缺失时退回跑批时间。
    pub fn snapshot_from_results(
        risk: &[RiskResult],
        trends: &[TrendResult],
        fbm: &[FbmCandidate],
        snapshot_date: Option<String>,
        now: DateTime<Utc>,
    ) -> MetricsSnapshot {
        MetricsSnapshot {
            risk_count: risk.len(),
            lost_revenue_per_day_total: risk.iter().map(|r| r.lost_revenue_per_day).sum(),
            trends_count: trends.len(),
            fbm_count: fbm.len(),
            fbm_skus: fbm
                .iter()
                .take(FBM_SKU_SNAPSHOT_CAP)
                .map(|c| c.sku.clone())
                .collect(),
            last_snapshot: snapshot_date.unwrap_or_else(|| now.to_rfc3339()),
            timestamp: Some(now),
        }
    }

    /// 计算本期环比并推进持久化快照
    ///
    /// # 步骤
    /// 1. 无上期快照（或快照损坏）→ 存当前，标记首跑
    /// 2. 快照日期变化 → 计算环比，存当前快照与环比结果
    /// 3. 快照日期未变 → 回放已存环比；缺失时现算但不落盘
    pub fn track(
        &self,
        client_id: &str,
        current: MetricsSnapshot,
    ) -> RepositoryResult<MetricChanges> {
        let metrics_key = Self::metrics_key(client_id);

        let previous: Option<MetricsSnapshot> = match self.store.get(&metrics_key)? {
            Some(json) => match serde_json::from_str(&json) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!(client_id, error = %e, "上期指标快照损坏，按首跑处理");
                    None
                }
            },
            None => None,
        };

        let Some(previous) = previous else {
            self.store_snapshot(&metrics_key, &current)?;
            tracing::info!(client_id, "无上期指标快照，已存当前快照");
            return Ok(MetricChanges {
                is_first_run: true,
                ..Default::default()
            });
        };

        if previous.last_snapshot != current.last_snapshot {
            let changes = Self::diff(&previous, &current);

            self.store_snapshot(&metrics_key, &current)?;
            let changes_key = Self::changes_key(client_id);
            let changes_json =
                serde_json::to_string(&changes).map_err(|e| RepositoryError::StateEncodeError {
                    key: changes_key.clone(),
                    message: e.to_string(),
                })?;
            self.store.put(&changes_key, &changes_json, None)?;

            tracing::info!(
                client_id,
                previous = %previous.last_snapshot,
                current = %current.last_snapshot,
                "快照期推进，已计算环比"
            );
            return Ok(changes);
        }

        // 同一快照期: 回放已存环比
        if let Some(json) = self.store.get(&Self::changes_key(client_id))? {
            match serde_json::from_str::<MetricChanges>(&json) {
                Ok(changes) => return Ok(changes),
                Err(e) => {
                    tracing::warn!(client_id, error = %e, "已存环比损坏，现算兜底");
                }
            }
        }
        Ok(Self::diff(&previous, &current))
    }

    fn diff(previous: &MetricsSnapshot, current: &MetricsSnapshot) -> MetricChanges {
        let previous_fbm: HashSet<&str> = previous.fbm_skus.iter().map(String::as_str).collect();
        let new_fbm_skus = current
            .fbm_skus
            .iter()
            .filter(|sku| !previous_fbm.contains(sku.as_str()))
            .cloned()
            .collect();

        MetricChanges {
            risk_change: current.risk_count as i64 - previous.risk_count as i64,
            revenue_risk_change: current.lost_revenue_per_day_total
                - previous.lost_revenue_per_day_total,
            trends_change: current.trends_count as i64 - previous.trends_count as i64,
            fbm_change: current.fbm_count as i64 - previous.fbm_count as i64,
            new_fbm_skus,
            previous_snapshot: Some(previous.last_snapshot.clone()),
            is_first_run: false,
        }
    }

    fn store_snapshot(&self, key: &str, snapshot: &MetricsSnapshot) -> RepositoryResult<()> {
        let json =
            serde_json::to_string(snapshot).map_err(|e| RepositoryError::StateEncodeError {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        self.store.put(key, &json, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::state_store::MemoryStateStore;

    fn snapshot(risk_count: usize, revenue: f64, fbm_skus: &[&str], date: &str) -> MetricsSnapshot {
        MetricsSnapshot {
            risk_count,
            lost_revenue_per_day_total: revenue,
            trends_count: 10,
            fbm_count: fbm_skus.len(),
            fbm_skus: fbm_skus.iter().map(|s| s.to_string()).collect(),
            last_snapshot: date.to_string(),
            timestamp: Some(Utc::now()),
        }
    }

    #[test]
    fn test_first_run_stores_snapshot() {
        let store = MemoryStateStore::new();
        let tracker = MetricsDeltaTracker::new(&store);

        let changes = tracker
            .track("acme", snapshot(5, 120.0, &["M1"], "2026-08-20"))
            .unwrap();
        assert!(changes.is_first_run);
        assert_eq!(changes.risk_change, 0);
        assert!(store.get("metrics_acme").unwrap().is_some());
    }

    #[test]
    fn test_new_snapshot_date_yields_delta() {
        let store = MemoryStateStore::new();
        let tracker = MetricsDeltaTracker::new(&store);

        tracker
            .track("acme", snapshot(5, 120.0, &["M1"], "2026-08-19"))
            .unwrap();
        let changes = tracker
            .track("acme", snapshot(8, 150.0, &["M1", "M2"], "2026-08-20"))
            .unwrap();

        assert!(!changes.is_first_run);
        assert_eq!(changes.risk_change, 3);
        assert!((changes.revenue_risk_change - 30.0).abs() < 1e-9);
        assert_eq!(changes.fbm_change, 1);
        assert_eq!(changes.new_fbm_skus, vec!["M2".to_string()]);
        assert_eq!(changes.previous_snapshot.as_deref(), Some("2026-08-19"));
    }

    #[test]
    fn test_same_snapshot_date_replays_stored_changes() {
        let store = MemoryStateStore::new();
        let tracker = MetricsDeltaTracker::new(&store);

        tracker
            .track("acme", snapshot(5, 120.0, &[], "2026-08-19"))
            .unwrap();
        let first = tracker
            .track("acme", snapshot(8, 150.0, &[], "2026-08-20"))
            .unwrap();

        // 同一快照期内再跑一次，结果与已存环比一致，不随本批数据漂移
        let replayed = tracker
            .track("acme", snapshot(99, 9999.0, &[], "2026-08-20"))
            .unwrap();
        assert_eq!(replayed, first);
    }

    #[test]
    fn test_corrupt_previous_snapshot_degrades_to_first_run() {
        let store = MemoryStateStore::new();
        store.put("metrics_acme", "{not json", None).unwrap();
        let tracker = MetricsDeltaTracker::new(&store);

        let changes = tracker
            .track("acme", snapshot(5, 120.0, &[], "2026-08-20"))
            .unwrap();
        assert!(changes.is_first_run);
    }
}
