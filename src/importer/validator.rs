// ==========================================
// 电商卖家库存决策支持系统 - 报表形状校验
// ==========================================
// 职责: 校验必需列可解析；可容忍列缺失降级为空/零
// 可解释性: 报错信息附带完整别名候选列表
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{FULFILLMENT_ALIASES, SKU_ALIASES, STATUS_ALIASES};
use crate::importer::file_parser::RawRow;

/// 校验在售清单报表的必需列
///
/// 必需列: sku / status / fulfillment-channel（以别名表解析）。
/// 任一缺失即为数据形状错误，错误信息列出每个缺失列尝试过的别名。
pub fn validate_listing_report(rows: &[RawRow]) -> ImportResult<()> {
    if rows.is_empty() {
        return Err(ImportError::FeedUnavailable {
            report: "listings".to_string(),
            message: "报表为空".to_string(),
        });
    }

    let first_row = &rows[0];
    let mandatory: [(&str, &[&str]); 3] = [
        ("sku", SKU_ALIASES),
        ("status", STATUS_ALIASES),
        ("fulfillmentChannel", FULFILLMENT_ALIASES),
    ];

    let mut missing = Vec::new();
    for (field, aliases) in mandatory {
        let resolved = aliases
            .iter()
            .any(|alias| first_row.get(*alias).map_or(false, |v| !v.trim().is_empty()));
        if !resolved {
            missing.push(format!("{} (尝试列名: {})", field, aliases.join(", ")));
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::MissingColumns(missing.join("; ")))
    }
}
