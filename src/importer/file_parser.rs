// ==========================================
// 电商卖家库存决策支持系统 - 报表文件解析器
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 特殊: AWD 报表表头不在首行（header_row 可配置）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 解析后的原始行（表头 → 单元格文本）
pub type RawRow = HashMap<String, String>;

/// 解析报表文件为原始行集
///
/// # 参数
/// - `file_path`: 报表文件路径
/// - `header_row`: 表头所在行（0 起算；常规报表为 0，AWD 报表为 3）
///
/// # 返回
/// 每行一个 RawRow；完全空白的行被跳过
pub fn parse_report_file(file_path: &Path, header_row: usize) -> ImportResult<Vec<RawRow>> {
    if !file_path.exists() {
        return Err(ImportError::FileNotFound(file_path.display().to_string()));
    }

    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => parse_csv(file_path, header_row),
        "xlsx" | "xls" => parse_excel(file_path, header_row),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

// ==========================================
// CSV 解析
// ==========================================
fn parse_csv(file_path: &Path, header_row: usize) -> ImportResult<Vec<RawRow>> {
    let file = File::open(file_path)?;

    // 表头可能不在首行，统一按无表头读取后自行切分
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // 允许行长度不一致
        .from_reader(file);

    let mut rows = reader.records();

    // 跳过表头前的说明行
    for _ in 0..header_row {
        if rows.next().is_none() {
            return Err(ImportError::CsvParseError(format!(
                "文件不足 {} 行，无法定位表头",
                header_row + 1
            )));
        }
    }

    let headers: Vec<String> = match rows.next() {
        Some(result) => result
            .map_err(|e| ImportError::CsvParseError(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Err(ImportError::CsvParseError("文件无表头行".to_string())),
    };

    let mut records = Vec::new();
    for result in rows {
        let record = result.map_err(|e| ImportError::CsvParseError(e.to_string()))?;
        let mut row_map = RawRow::new();

        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                if !header.is_empty() {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }
        }

        // 跳过完全空白的行
        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}

// ==========================================
// Excel 解析
// ==========================================
fn parse_excel(file_path: &Path, header_row: usize) -> ImportResult<Vec<RawRow>> {
    let mut workbook: Xlsx<_> = open_workbook(file_path)
        .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(ImportError::ExcelParseError("Excel 文件无工作表".to_string()));
    }

    // 读取第一个 sheet
    let sheet_name = sheet_names[0].clone();
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

    let mut rows = range.rows();

    for _ in 0..header_row {
        if rows.next().is_none() {
            return Err(ImportError::ExcelParseError(format!(
                "工作表不足 {} 行，无法定位表头",
                header_row + 1
            )));
        }
    }

    let header_cells = rows
        .next()
        .ok_or_else(|| ImportError::ExcelParseError("工作表无表头行".to_string()))?;

    let headers: Vec<String> = header_cells
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut records = Vec::new();
    for data_row in rows {
        let mut row_map = RawRow::new();

        for (col_idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                if !header.is_empty() {
                    row_map.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }
        }

        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}
