//! 抽出結果の型定義
//!
//! ListingRecord: 1ファイル分の抽出結果（全項目が独立してOption）

use serde::Serialize;

/// 市場価格・説明が見つからない場合のプレースホルダ
pub const NOT_AVAILABLE: &str = "N/A";

/// 物件情報の抽出結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub price: Option<String>,
    pub address: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub hoa_fee: Option<String>,
    pub realtor: Option<String>,
    /// Zestimate（見つからなければ "N/A"）
    pub market_value: Option<String>,
    /// "What's special" 欄（見つからなければ "N/A"）
    pub description: Option<String>,
    pub year_built: Option<String>,
    pub subdivision: Option<String>,
    pub url: Option<String>,
    pub square_feet: Option<String>,
}

/// 抽出項目（台帳の列順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Price,
    Address,
    Bedrooms,
    Bathrooms,
    HoaFee,
    Realtor,
    MarketValue,
    Description,
    YearBuilt,
    Subdivision,
    Url,
    SquareFeet,
}

impl Field {
    /// 列順の全項目
    pub const ALL: [Field; 12] = [
        Field::Price,
        Field::Address,
        Field::Bedrooms,
        Field::Bathrooms,
        Field::HoaFee,
        Field::Realtor,
        Field::MarketValue,
        Field::Description,
        Field::YearBuilt,
        Field::Subdivision,
        Field::Url,
        Field::SquareFeet,
    ];

    /// 台帳ヘッダの表示名
    pub fn label(&self) -> &'static str {
        match self {
            Field::Price => "Price",
            Field::Address => "Address",
            Field::Bedrooms => "Bedrooms",
            Field::Bathrooms => "Bathrooms",
            Field::HoaFee => "HOA Fees",
            Field::Realtor => "Realtor Name",
            Field::MarketValue => "Market Value",
            Field::Description => "Description",
            Field::YearBuilt => "Year Built",
            Field::Subdivision => "Subdivision",
            Field::Url => "URL",
            Field::SquareFeet => "Square Feet",
        }
    }
}

impl ListingRecord {
    /// 項目値を取得
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Price => &self.price,
            Field::Address => &self.address,
            Field::Bedrooms => &self.bedrooms,
            Field::Bathrooms => &self.bathrooms,
            Field::HoaFee => &self.hoa_fee,
            Field::Realtor => &self.realtor,
            Field::MarketValue => &self.market_value,
            Field::Description => &self.description,
            Field::YearBuilt => &self.year_built,
            Field::Subdivision => &self.subdivision,
            Field::Url => &self.url,
            Field::SquareFeet => &self.square_feet,
        };
        value.as_deref()
    }

    /// 列順に値を並べる
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        Field::ALL.iter().map(move |f| self.get(*f))
    }

    /// 列順の値から復元（台帳の読み戻し用）
    ///
    /// 足りない列は None、余分な列は無視する。
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut record = ListingRecord::default();
        for (field, value) in Field::ALL.iter().zip(values) {
            let slot = match field {
                Field::Price => &mut record.price,
                Field::Address => &mut record.address,
                Field::Bedrooms => &mut record.bedrooms,
                Field::Bathrooms => &mut record.bathrooms,
                Field::HoaFee => &mut record.hoa_fee,
                Field::Realtor => &mut record.realtor,
                Field::MarketValue => &mut record.market_value,
                Field::Description => &mut record.description,
                Field::YearBuilt => &mut record.year_built,
                Field::Subdivision => &mut record.subdivision,
                Field::Url => &mut record.url,
                Field::SquareFeet => &mut record.square_feet,
            };
            *slot = value;
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_record_default() {
        let record = ListingRecord::default();
        assert!(record.values().all(|v| v.is_none()));
    }

    #[test]
    fn test_values_follow_column_order() {
        let record = ListingRecord {
            price: Some("450,000".into()),
            square_feet: Some("1,200".into()),
            ..Default::default()
        };
        let values: Vec<Option<&str>> = record.values().collect();
        assert_eq!(values.len(), 12);
        assert_eq!(values[0], Some("450,000"));
        assert_eq!(values[11], Some("1,200"));
        assert_eq!(values[5], None);
    }

    #[test]
    fn test_from_values_pads_missing_columns() {
        let record = ListingRecord::from_values(vec![Some("1".to_string()), None, Some("3".to_string())]);
        assert_eq!(record.price.as_deref(), Some("1"));
        assert_eq!(record.address, None);
        assert_eq!(record.bedrooms.as_deref(), Some("3"));
        assert_eq!(record.square_feet, None);
    }

    #[test]
    fn test_serialize_camel_case() {
        let record = ListingRecord {
            hoa_fee: Some("350".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"hoaFee\":\"350\""));
        assert!(json.contains("\"yearBuilt\":null"));
    }
}
