// ==========================================
// 电商卖家库存决策支持系统 - 报表读取器
// ==========================================
// 职责: 按客户配置装配一次批处理所需的全部报表
// 红线: 必需报表缺失即整批失败；可选报表降级为空
// ==========================================

use crate::config::ClientConfig;
use crate::domain::inventory::{AwdRecord, InventoryRecord};
use crate::domain::listing::ListingRecord;
use crate::domain::sales::SalesRecord;
use crate::domain::types::{SalesWindow, SeasonMonth};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{
    AwdFieldMapper, InventoryFieldMapper, ListingFieldMapper, SalesFieldMapper,
};
use crate::importer::file_parser::parse_report_file;
use crate::importer::validator::validate_listing_report;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;

// AWD 导出前三行为报表说明，表头在第四行
const DEFAULT_AWD_HEADER_ROW: usize = 3;

// ==========================================
// ReportKind - 报表种类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Listings,
    Inventory,
    Sales(SalesWindow),
    Awd,
    Monthly(SeasonMonth),
}

impl ReportKind {
    /// 缺失是否导致整批失败
    pub fn is_mandatory(&self) -> bool {
        match self {
            ReportKind::Listings | ReportKind::Inventory => true,
            ReportKind::Sales(window) => window.is_mandatory(),
            ReportKind::Awd | ReportKind::Monthly(_) => false,
        }
    }

    /// 错误信息中的报表名
    pub fn label(&self) -> String {
        match self {
            ReportKind::Listings => "listings".to_string(),
            ReportKind::Inventory => "inventory".to_string(),
            ReportKind::Sales(window) => format!("sales_{}", window).to_lowercase(),
            ReportKind::Awd => "awd".to_string(),
            ReportKind::Monthly(month) => format!("monthly_{}", month).to_lowercase(),
        }
    }
}

// ==========================================
// ReportBundle - 单次批处理的报表数据集
// ==========================================
#[derive(Debug, Default)]
pub struct ReportBundle {
    /// 在售清单（必需）
    pub listings: Vec<ListingRecord>,

    /// 库存快照（必需）
    pub inventory: Vec<InventoryRecord>,

    /// 各滚动窗口销售记录；可选窗口缺失时无键
    pub sales: BTreeMap<SalesWindow, Vec<SalesRecord>>,

    /// 第三方仓记录；报表缺失时为空
    pub awd: Vec<AwdRecord>,

    /// 季节月度历史销售；报表缺失时无键
    pub monthly: BTreeMap<SeasonMonth, Vec<SalesRecord>>,
}

impl ReportBundle {
    /// 指定窗口的销售记录（缺失窗口视作空）
    pub fn sales_window(&self, window: SalesWindow) -> &[SalesRecord] {
        self.sales.get(&window).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// 库存快照日期（取首个带快照日期的行）
    pub fn snapshot_date(&self) -> Option<NaiveDate> {
        self.inventory.iter().find_map(|r| r.snapshot_date)
    }

    /// 是否具备季节预测所需的月度历史
    pub fn has_monthly_history(&self) -> bool {
        self.monthly.values().any(|rows| !rows.is_empty())
    }
}

// ==========================================
// ReportReader - 报表读取器
// ==========================================
pub struct ReportReader;

impl ReportReader {
    pub fn new() -> Self {
        Self
    }

    /// 按客户配置加载全部报表
    ///
    /// # 加载规则
    /// 1. 必需: listings / inventory / T30·T60·T90·T365 销售窗口 — 缺失即 FeedUnavailable
    /// 2. 可选: T7·T180 销售窗口 / AWD / 月度历史 — 缺失或解析失败降级为空并记录 warn
    /// 3. 在售清单加载后立即做形状校验（必需列别名解析）
    pub fn load_bundle(&self, config: &ClientConfig) -> ImportResult<ReportBundle> {
        let mut bundle = ReportBundle::default();

        // 1. 在售清单（必需 + 形状校验）
        let listings_path = Self::require_path(config.reports.listings.as_deref(), ReportKind::Listings)?;
        let listing_rows = Self::parse_mandatory(listings_path, 0, ReportKind::Listings)?;
        validate_listing_report(&listing_rows)?;
        bundle.listings = ListingFieldMapper::map_rows(&listing_rows);
        tracing::info!(rows = bundle.listings.len(), "在售清单加载完成");

        // 2. 库存快照（必需）
        let inventory_path =
            Self::require_path(config.reports.inventory.as_deref(), ReportKind::Inventory)?;
        let inventory_rows = Self::parse_mandatory(inventory_path, 0, ReportKind::Inventory)?;
        bundle.inventory = InventoryFieldMapper::map_rows(&inventory_rows);
        tracing::info!(rows = bundle.inventory.len(), "库存快照加载完成");

        // 3. 销售窗口
        let window_paths = config.reports.sales_windows();
        for window in SalesWindow::all() {
            let kind = ReportKind::Sales(window);
            match window_paths.get(&window) {
                Some(path) => match Self::parse_with_fallback(path, 0, kind)? {
                    Some(rows) => {
                        bundle.sales.insert(window, SalesFieldMapper::map_rows(&rows));
                    }
                    None => {
                        // 仅可选窗口会走到这里
                        tracing::warn!(report = %kind.label(), "可选销售窗口降级为空");
                    }
                },
                None if kind.is_mandatory() => {
                    return Err(ImportError::FeedUnavailable {
                        report: kind.label(),
                        message: "客户配置未指定报表路径".to_string(),
                    });
                }
                None => {}
            }
        }

        // 4. AWD（可选，表头不在首行）
        if let Some(path) = &config.reports.awd {
            let header_row = config.awd_header_row.unwrap_or(DEFAULT_AWD_HEADER_ROW);
            if let Some(rows) = Self::parse_with_fallback(path, header_row, ReportKind::Awd)? {
                bundle.awd = AwdFieldMapper::map_rows(&rows);
                tracing::info!(rows = bundle.awd.len(), "AWD 报表加载完成");
            }
        }

        // 5. 月度历史（可选）
        for (month, path) in config.reports.monthly_months() {
            let kind = ReportKind::Monthly(month);
            if let Some(rows) = Self::parse_with_fallback(&path, 0, kind)? {
                bundle.monthly.insert(month, SalesFieldMapper::map_rows(&rows));
            }
        }

        Ok(bundle)
    }

    fn require_path(path: Option<&Path>, kind: ReportKind) -> ImportResult<&Path> {
        path.ok_or_else(|| ImportError::FeedUnavailable {
            report: kind.label(),
            message: "客户配置未指定报表路径".to_string(),
        })
    }

    /// 必需报表解析；任何失败换装为 FeedUnavailable
    fn parse_mandatory(
        path: &Path,
        header_row: usize,
        kind: ReportKind,
    ) -> ImportResult<Vec<crate::importer::file_parser::RawRow>> {
        parse_report_file(path, header_row).map_err(|e| match e {
            err @ ImportError::MissingColumns(_) => err,
            other => ImportError::FeedUnavailable {
                report: kind.label(),
                message: other.to_string(),
            },
        })
    }

    /// 带降级的报表解析
    ///
    /// 必需报表失败上抛；可选报表失败记 warn 并返回 None。
    fn parse_with_fallback(
        path: &Path,
        header_row: usize,
        kind: ReportKind,
    ) -> ImportResult<Option<Vec<crate::importer::file_parser::RawRow>>> {
        match parse_report_file(path, header_row) {
            Ok(rows) => Ok(Some(rows)),
            Err(e) if kind.is_mandatory() => Err(ImportError::FeedUnavailable {
                report: kind.label(),
                message: e.to_string(),
            }),
            Err(e) => {
                tracing::warn!(report = %kind.label(), error = %e, "可选报表解析失败，降级为空");
                Ok(None)
            }
        }
    }
}

impl Default for ReportReader {
    fn default() -> Self {
        Self::new()
    }
}
