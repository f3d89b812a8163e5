//! 物件テキストパーサー
//!
//! 物件ページをコピーしたプレーンテキストから各項目を正規表現で抽出する。
//! 各項目は独立しており、どの順で適用しても結果は同じ。
//! マッチしない項目は None（市場価格・説明のみ "N/A"）になり、エラーにはならない。

use crate::types::{ListingRecord, NOT_AVAILABLE};
use regex::Regex;
use std::borrow::Cow;

lazy_static::lazy_static! {
    // 価格: "$" + 数字（カンマ区切り1つまで）
    static ref PRICE_RE: Regex = Regex::new(r"\$(\d+(?:,\d+)?)").unwrap();
    // 住所: 2行目以降で "Brooklyn, NY " を含む行
    static ref ADDRESS_RE: Regex = Regex::new(r"\n(.+?Brooklyn, NY .+)").unwrap();
    static ref BEDROOMS_RE: Regex = Regex::new(r"(\d+)\s+beds?").unwrap();
    static ref BATHROOMS_RE: Regex = Regex::new(r"(\d+)\s+baths?").unwrap();
    static ref HOA_RE: Regex = Regex::new(r"\$([\d,]+)/mo\sHOA").unwrap();
    // 担当者: "Listing by:" ～ "Licensed"（改行をまたぐ）
    static ref REALTOR_RE: Regex = Regex::new(r"(?s)Listing by:\s*(.+?)\s*Licensed").unwrap();
    static ref MARKET_VALUE_RE: Regex = Regex::new(r"(?i)\$([0-9,]{6,7})\s*Zestimate").unwrap();
    // 説明: "What's special" の次行から次の "Hide" の手前まで（なければ末尾まで）
    static ref DESCRIPTION_RE: Regex =
        Regex::new(r"(?is)What['’]s\s+special\s*[\r\n]+(.*?)(?:hide|\z)").unwrap();
    static ref YEAR_BUILT_RE: Regex = Regex::new(r"Built in (\d{4})").unwrap();
    static ref SUBDIVISION_RE: Regex = Regex::new(r"Subdivision: (.+)").unwrap();
    static ref URL_RE: Regex = Regex::new(r"(https?://\S+)").unwrap();
    static ref SQUARE_FEET_RE: Regex = Regex::new(r"([\d,]+)\ssqft").unwrap();
}

/// 最初のキャプチャグループを取得
fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// 最初のキャプチャグループを前後空白除去して取得
fn first_capture_trimmed(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// CRLF・単独CRをLFに揃える
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// 物件テキストから全項目を抽出
///
/// # Examples
/// ```
/// use listing_harvester_common::extract;
///
/// let record = extract("$450,000\n3 beds 2 baths");
/// assert_eq!(record.price.as_deref(), Some("450,000"));
/// assert_eq!(record.bedrooms.as_deref(), Some("3"));
/// assert_eq!(record.market_value.as_deref(), Some("N/A"));
/// ```
pub fn extract(text: &str) -> ListingRecord {
    let text = normalize_newlines(text);
    let text = text.as_ref();

    ListingRecord {
        price: first_capture(&PRICE_RE, text),
        address: first_capture(&ADDRESS_RE, text),
        bedrooms: first_capture(&BEDROOMS_RE, text),
        bathrooms: first_capture(&BATHROOMS_RE, text),
        hoa_fee: first_capture(&HOA_RE, text),
        realtor: first_capture_trimmed(&REALTOR_RE, text),
        market_value: Some(
            first_capture(&MARKET_VALUE_RE, text).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        description: Some(
            first_capture_trimmed(&DESCRIPTION_RE, text)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        year_built: first_capture(&YEAR_BUILT_RE, text),
        subdivision: first_capture(&SUBDIVISION_RE, text),
        url: first_capture(&URL_RE, text),
        square_feet: first_capture(&SQUARE_FEET_RE, text),
    }
}
