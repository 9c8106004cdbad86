// ==========================================
// 电商卖家库存决策支持系统 - 季节预测 API
// ==========================================
// 职责: 单客户季节预测批处理编排
// 前置: 月度历史报表至少一个月有数据，否则整批失败
// ==========================================

use crate::api::dashboard_api::MAX_PAYLOAD_BYTES;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ClientConfigStore;
use crate::domain::forecast::ForecastOutcome;
use crate::engine::forecast::SeasonalForecastPlanner;
use crate::engine::price::PriceMap;
use crate::importer::report_reader::ReportReader;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// ForecastPayload - 预测载荷
// ==========================================
#[derive(Debug, Serialize)]
pub struct ForecastPayload {
    pub run_id: String,
    pub client_id: String,
    pub client_name: String,
    pub generated_at: DateTime<Utc>,
    pub outcome: ForecastOutcome,
}

// ==========================================
// ForecastApi - 季节预测 API
// ==========================================
pub struct ForecastApi {
    config: Arc<ClientConfigStore>,
}

impl ForecastApi {
    pub fn new(config: Arc<ClientConfigStore>) -> Self {
        Self { config }
    }

    /// 执行单客户季节预测
    ///
    /// # 参数
    /// - client_id: 客户标识
    /// - growth_factor: 增长系数；None 时依次退回客户配置默认、系统默认
    pub fn forecast(
        &self,
        client_id: &str,
        growth_factor: Option<f64>,
    ) -> ApiResult<ForecastPayload> {
        let run_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        tracing::info!(client_id, run_id = %run_id, "季节预测批处理开始");

        if let Some(g) = growth_factor {
            if !g.is_finite() || g <= 0.0 {
                return Err(ApiError::InvalidInput(format!(
                    "增长系数必须为正实数，收到 {g}"
                )));
            }
        }

        let client = self.config.get(client_id)?;
        let bundle = ReportReader::new().load_bundle(client)?;

        if !bundle.has_monthly_history() {
            return Err(ApiError::FeedUnavailable {
                report: "monthly_history".to_string(),
                message: "季节预测需要至少一个月的月度历史报表".to_string(),
            });
        }

        let price_map = PriceMap::from_listings(&bundle.listings);
        let outcome = SeasonalForecastPlanner::new().plan(
            &bundle.listings,
            &bundle.inventory,
            &bundle.monthly,
            &price_map,
            growth_factor.or(client.default_growth_factor),
            now.date_naive(),
        );

        let payload = ForecastPayload {
            run_id,
            client_id: client_id.to_string(),
            client_name: client.display_name.clone(),
            generated_at: now,
            outcome,
        };

        let json = serde_json::to_string(&payload)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        if json.len() > MAX_PAYLOAD_BYTES {
            return Err(ApiError::SerializationOverflow {
                size: json.len(),
                limit: MAX_PAYLOAD_BYTES,
            });
        }

        tracing::info!(
            client_id,
            skus = payload.outcome.summary.total_skus,
            "季节预测批处理完成"
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use std::collections::BTreeMap;

    fn store_with(client_id: &str, config: ClientConfig) -> Arc<ClientConfigStore> {
        let mut clients = BTreeMap::new();
        clients.insert(client_id.to_string(), config);
        Arc::new(ClientConfigStore::from_clients(clients))
    }

    #[test]
    fn test_invalid_growth_factor_rejected() {
        let api = ForecastApi::new(store_with("acme", ClientConfig::default()));
        let err = api.forecast("acme", Some(0.0)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_unknown_client_rejected() {
        let api = ForecastApi::new(store_with("acme", ClientConfig::default()));
        let err = api.forecast("nobody", None).unwrap_err();
        assert!(matches!(err, ApiError::ConfigurationMissing(_)));
    }
}
