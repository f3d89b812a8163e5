//! Excel台帳（.xlsx）
//!
//! 読み込みは calamine、書き出しは rust_xlsxwriter。
//! xlsxは追記できないため、保存のたびに台帳全体を一時ファイルへ書き出して差し替える。

use super::{ListingTable, TableRow, TableStore};
use crate::error::{HarvestError, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use listing_harvester_common::layout::{column_width, is_expected_header};
use listing_harvester_common::{ListingRecord, COLUMN_COUNT};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use std::path::{Path, PathBuf};

/// 台帳シート名
pub const SHEET_NAME: &str = "Listings";

/// Excelの1セルあたりの最大文字数
const MAX_CELL_CHARS: usize = 32_767;

/// .xlsx ファイルの台帳
#[derive(Debug, Clone)]
pub struct XlsxStore {
    path: PathBuf,
}

impl XlsxStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 既存ファイルを読み込む
    pub fn read(&self) -> Result<ListingTable> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range?,
            None => {
                return Err(HarvestError::Store(format!(
                    "シートがありません: {}",
                    self.path.display()
                )))
            }
        };

        if range.is_empty() {
            return Ok(ListingTable::new());
        }

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .map(|cells| cells.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
            .unwrap_or_default();

        if !is_expected_header(&header[..]) {
            return Err(HarvestError::Store(format!(
                "ヘッダが想定と異なります: {} ({})",
                self.path.display(),
                header.join(", ")
            )));
        }
        let extra_headers = header[COLUMN_COUNT..].to_vec();

        // 途中の空行も行位置を保つため空の TableRow として残す
        let rows = rows
            .map(|cells| {
                let mut values = cells.iter().map(cell_text);
                let file_name = values.next().flatten().unwrap_or_default();
                let record = ListingRecord::from_values(values.by_ref().take(COLUMN_COUNT - 1));
                let extra: Vec<Option<String>> = values.collect();
                TableRow { file_name, record, extra }
            })
            .collect();

        Ok(ListingTable::from_parts(extra_headers, rows))
    }

    /// 一時ファイルのパス（同じフォルダ）
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "table.xlsx".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

impl TableStore for XlsxStore {
    fn load_or_init(&self) -> Result<ListingTable> {
        if self.path.exists() {
            return self.read();
        }

        let table = ListingTable::new();
        self.save(&table)?;
        Ok(table)
    }

    fn save(&self, table: &ListingTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut workbook = build_workbook(table)?;
        let temp_path = self.temp_path();
        workbook.save(&temp_path)?;

        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            std::fs::remove_file(&temp_path).ok();
            return Err(e.into());
        }
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// 台帳からワークブックを生成
fn build_workbook(table: &ListingTable) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in table.headers().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, header, &header_format)?;
        worksheet.set_column_width(col, column_width(col as usize))?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (i, row) in table.rows().iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in row.cells().enumerate() {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                worksheet.write_string(r, col as u16, truncate_cell(value))?;
            }
        }
    }

    Ok(workbook)
}

/// セル値を文字列化（空セルは None）
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(unescape_ooxml(s)),
        other => Some(other.to_string()),
    }
}

/// `_xHHHH_` 形式のエスケープを復元
///
/// 書き出し時に制御文字は `_x000C_` に、リテラルの `_x` は `_x005F_x` になる。
/// calamine はこれを戻さないため、読み込み時に1回だけ復元する。
fn unescape_ooxml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &candidate[7..];
            }
            None => {
                out.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Excelのセル上限に収める
fn truncate_cell(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
