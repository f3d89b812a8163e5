//! Listing Harvester Common Library
//!
//! 物件テキストからの項目抽出（IOなし）と台帳の列定義

pub mod types;
pub mod layout;
pub mod parser;

pub use types::{Field, ListingRecord};
pub use layout::{TABLE_HEADERS, COLUMN_COUNT};
pub use parser::extract;
