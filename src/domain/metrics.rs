// ==========================================
// 电商卖家库存决策支持系统 - 指标快照与环比
// ==========================================
// 上期指标按客户持久化，按快照日期比对，
// 同一快照期内重复跑批不重复计算增量
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 上期指标快照 (MetricsSnapshot)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// 风险排名条数
    pub risk_count: usize,

    /// 日均流失营收合计
    pub lost_revenue_per_day_total: f64,

    /// 趋势分析条数
    pub trends_count: usize,

    /// FBM→FBA 建议条数
    pub fbm_count: usize,

    /// FBM 建议 SKU（最多存 100 个，用于识别新增）
    pub fbm_skus: Vec<String>,

    /// 库存快照日期（报表 as-of；缺失时用跑批时间）
    pub last_snapshot: String,

    /// 快照写入时间
    pub timestamp: Option<DateTime<Utc>>,
}

/// 指标环比 (MetricChanges)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricChanges {
    pub risk_change: i64,
    pub revenue_risk_change: f64,
    pub trends_change: i64,
    pub fbm_change: i64,

    /// 本期新出现的 FBM 建议 SKU
    pub new_fbm_skus: Vec<String>,

    /// 上期快照日期
    pub previous_snapshot: Option<String>,

    /// 是否首跑（无可比快照）
    pub is_first_run: bool,
}
