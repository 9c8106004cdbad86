// ==========================================
// 电商卖家库存决策支持系统 - 驾驶舱 API
// ==========================================
// 职责: 单客户一次批处理的完整编排
// 顺序约束: 幽灵登记簿先于风险排名更新
// 隔离策略: 单个分析失败降级为 None + warn，不拖垮整批；
//           必需报表缺失仍整批失败
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ClientConfigStore;
use crate::domain::metrics::MetricChanges;
use crate::domain::risk::{FbmCandidate, RiskResult, TrendResult};
use crate::domain::types::SalesWindow;
use crate::engine::fbm::FbmConversionAdvisor;
use crate::engine::ghost::GhostRegistry;
use crate::engine::metrics_delta::MetricsDeltaTracker;
use crate::engine::price::PriceMap;
use crate::engine::risk::RevenueRiskRanker;
use crate::engine::sales_index::SalesIndex;
use crate::engine::trends::SkuTrendsAnalyzer;
use crate::importer::report_reader::ReportReader;
use crate::repository::StateStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use uuid::Uuid;

/// 载荷上限（字节）
pub const MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

// ==========================================
// DashboardPayload - 驾驶舱载荷
// ==========================================
#[derive(Debug, Serialize)]
pub struct DashboardPayload {
    /// 本次批处理 id
    pub run_id: String,

    pub client_id: String,
    pub client_name: String,
    pub generated_at: DateTime<Utc>,

    /// 库存报表 as-of 日期
    pub snapshot_date: Option<NaiveDate>,

    // ===== 分析结果（失败隔离后可为 None） =====
    pub revenue_risk: Option<Vec<RiskResult>>,
    pub sku_trends: Option<Vec<TrendResult>>,
    pub fbm_suggestions: Option<Vec<FbmCandidate>>,

    /// 本批次后登记簿中的幽灵 SKU 数
    pub ghost_count: usize,

    /// 指标环比（状态存储故障时为 None）
    pub metric_changes: Option<MetricChanges>,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    config: Arc<ClientConfigStore>,
    store: Arc<dyn StateStore>,
}

impl DashboardApi {
    pub fn new(config: Arc<ClientConfigStore>, store: Arc<dyn StateStore>) -> Self {
        Self { config, store }
    }

    /// 执行单客户批处理并装配驾驶舱载荷
    ///
    /// # 步骤
    /// 1. 客户配置 → 报表装配（必需报表缺失即失败）
    /// 2. 价格表 / 销售索引
    /// 3. 幽灵登记簿更新（必须先于风险排名）
    /// 4. 风险排名 / 趋势分析 / FBM 建议（逐个失败隔离）
    /// 5. 指标环比
    /// 6. 载荷序列化体积校验
    pub fn load(&self, client_id: &str) -> ApiResult<DashboardPayload> {
        let run_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        tracing::info!(client_id, run_id = %run_id, "驾驶舱批处理开始");

        // 1. 配置与报表
        let client = self.config.get(client_id)?;
        let bundle = ReportReader::new().load_bundle(client)?;
        let snapshot_date = bundle.snapshot_date();

        // 2. 衍生索引
        let price_map = PriceMap::from_listings(&bundle.listings);
        let sales_index = SalesIndex::build(&bundle.sales);

        // 3. 幽灵登记簿（辅助数据，故障不阻断批处理）
        let registry = GhostRegistry::new(self.store.as_ref());
        if let Err(e) = registry.update(
            client_id,
            &bundle.inventory,
            bundle.sales_window(SalesWindow::T90),
            &sales_index,
            &price_map,
            now,
        ) {
            tracing::warn!(client_id, error = %e, "幽灵登记簿更新失败，沿用上期登记");
        }
        let ghosts = registry.get(client_id).unwrap_or_else(|e| {
            tracing::warn!(client_id, error = %e, "幽灵登记簿读取失败，按空簿处理");
            Default::default()
        });
        let ghost_count = ghosts.entries.len();

        // 4. 三项分析，逐个隔离
        let revenue_risk = Self::isolated("revenue_risk", || {
            RevenueRiskRanker::new().rank(
                &bundle.listings,
                &bundle.inventory,
                &sales_index,
                &price_map,
                &ghosts,
            )
        });
        let sku_trends = Self::isolated("sku_trends", || {
            SkuTrendsAnalyzer::new().analyze(
                &bundle.listings,
                &bundle.inventory,
                &bundle.sales,
                &price_map,
                &bundle.awd,
            )
        });
        let fbm_suggestions = Self::isolated("fbm_suggestions", || {
            FbmConversionAdvisor::new().suggest(&bundle.listings, &sales_index, &price_map)
        });

        // 5. 指标环比
        let snapshot_key = snapshot_date.map(|d| d.to_string());
        let current = MetricsDeltaTracker::snapshot_from_results(
            revenue_risk.as_deref().unwrap_or(&[]),
            sku_trends.as_deref().unwrap_or(&[]),
            fbm_suggestions.as_deref().unwrap_or(&[]),
            snapshot_key,
            now,
        );
        let metric_changes = match MetricsDeltaTracker::new(self.store.as_ref())
            .track(client_id, current)
        {
            Ok(changes) => Some(changes),
            Err(e) => {
                tracing::warn!(client_id, error = %e, "指标环比计算失败");
                None
            }
        };

        let payload = DashboardPayload {
            run_id,
            client_id: client_id.to_string(),
            client_name: client.display_name.clone(),
            generated_at: now,
            snapshot_date,
            revenue_risk,
            sku_trends,
            fbm_suggestions,
            ghost_count,
            metric_changes,
        };

        // 6. 体积校验
        Self::check_payload_size(&payload)?;
        tracing::info!(client_id, run_id = %payload.run_id, "驾驶舱批处理完成");
        Ok(payload)
    }

    /// 单项分析失败隔离：panic 降级为 None 并告警
    fn isolated<T>(name: &str, f: impl FnOnce() -> T) -> Option<T> {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(analytic = name, "分析执行失败，结果置空");
                None
            }
        }
    }

    fn check_payload_size<T: Serialize>(payload: &T) -> ApiResult<()> {
        let json = serde_json::to_string(payload)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        if json.len() > MAX_PAYLOAD_BYTES {
            return Err(ApiError::SerializationOverflow {
                size: json.len(),
                limit: MAX_PAYLOAD_BYTES,
            });
        }
        Ok(())
    }
}
