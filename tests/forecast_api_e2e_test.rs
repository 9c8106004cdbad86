// ==========================================
// 季节预测 API 端到端测试
// ==========================================
// 场景: 月度历史 CSV → ReportReader → 预测规划 → 载荷
// ==========================================

#[path = "helpers/test_data_builder.rs"]
mod test_data_builder;

use seller_insight::api::{ApiError, ForecastApi};
use std::sync::Arc;
use test_data_builder::ReportFixture;

fn fixture(dir: &std::path::Path) -> ReportFixture {
    ReportFixture::new(dir)
        .listings(&[
            ("SEASON-01", "B01", "Active", "AMAZON_NA", "Holiday Lights Set", 25.0),
            ("SEASON-02", "B02", "Active", "AMAZON_NA", "Gift Wrap Bundle", 8.0),
        ])
        .inventory("2026-08-20", &[("SEASON-01", "B01", 100, 0, 20)])
        .sales_all_mandatory(&[("B01", "SEASON-01", "Holiday Lights Set", 10, 250.0)])
        .monthly("oct", &[("B01", "SEASON-01", "Holiday Lights Set", 80, 2000.0)])
        .monthly(
            "dec",
            &[
                ("B01", "SEASON-01", "Holiday Lights Set", 200, 5000.0),
                ("B02", "SEASON-02", "Gift Wrap Bundle", 60, 480.0),
            ],
        )
}

#[test]
fn test_forecast_payload_from_monthly_history() {
    let dir = tempfile::tempdir().unwrap();
    let api = ForecastApi::new(Arc::new(fixture(dir.path()).into_store("acme")));

    let payload = api.forecast("acme", Some(1.0)).unwrap();
    let outcome = &payload.outcome;

    assert_eq!(outcome.summary.total_skus, 2);
    assert_eq!(outcome.summary.total_historical_units, 80 + 200 + 60);
    assert_eq!(outcome.summary.unmatched_asins, 0);

    let season_01 = outcome
        .results
        .iter()
        .find(|r| r.sku == "SEASON-01")
        .unwrap();
    // 现货 100 + 入库 20 = 120；12 月累计需求 280 > 120 → 需要下单
    assert_eq!(season_01.current_inventory.total_available, 120);
    assert!(!season_01.order_recommendations.is_empty());

    // SEASON-02 零库存 → 风险分含 +30，排序靠前
    let season_02 = outcome
        .results
        .iter()
        .find(|r| r.sku == "SEASON-02")
        .unwrap();
    assert!(season_02.risk_score >= 30);
    assert!(outcome.results[0].risk_score >= outcome.results[1].risk_score);
}

#[test]
fn test_growth_factor_falls_back_to_client_default() {
    let dir = tempfile::tempdir().unwrap();
    let api = ForecastApi::new(Arc::new(
        fixture(dir.path()).growth_factor(1.5).into_store("acme"),
    ));

    let payload = api.forecast("acme", None).unwrap();
    assert!((payload.outcome.growth_factor - 1.5).abs() < 1e-12);
}

#[test]
fn test_forecast_without_monthly_history_fails() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = ReportFixture::new(dir.path())
        .listings(&[("A1", "B01", "Active", "AMAZON_NA", "Widget", 10.0)])
        .inventory("2026-08-20", &[("A1", "B01", 5, 0, 0)])
        .sales_all_mandatory(&[("B01", "A1", "Widget", 3, 30.0)]);
    let api = ForecastApi::new(Arc::new(fixture.into_store("acme")));

    let err = api.forecast("acme", None).unwrap_err();
    match err {
        ApiError::FeedUnavailable { report, .. } => assert_eq!(report, "monthly_history"),
        other => panic!("expected FeedUnavailable, got {other:?}"),
    }
}
