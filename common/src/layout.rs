//! 台帳レイアウト定義
//!
//! 1列目がファイル名、続いて ListingRecord の12項目。

/// 台帳の列数（ファイル名 + 12項目）
pub const COLUMN_COUNT: usize = 13;

/// ファイル名列の見出し
pub const FILE_NAME_HEADER: &str = "File Name";

/// 台帳ヘッダ（0行目）
pub const TABLE_HEADERS: [&str; COLUMN_COUNT] = [
    FILE_NAME_HEADER,
    "Price",
    "Address",
    "Bedrooms",
    "Bathrooms",
    "HOA Fees",
    "Realtor Name",
    "Market Value",
    "Description",
    "Year Built",
    "Subdivision",
    "URL",
    "Square Feet",
];

/// 列幅（Excel文字幅単位）
pub fn column_width(column: usize) -> f64 {
    match column {
        0 => 24.0,
        2 => 40.0,
        6 => 28.0,
        8 => 60.0,
        11 => 48.0,
        _ => 14.0,
    }
}

/// ヘッダ行が想定どおりか判定
pub fn is_expected_header<S: AsRef<str>>(row: &[S]) -> bool {
    row.len() >= COLUMN_COUNT
        && TABLE_HEADERS
            .iter()
            .zip(row)
            .all(|(expected, actual)| actual.as_ref().trim() == *expected)
}
