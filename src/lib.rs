pub mod cli;
pub mod config;
pub mod error;
pub mod harvester;
pub mod logging;
pub mod scanner;
pub mod store;
pub mod tracker;

pub use harvester::{CycleReport, Harvester};
pub use listing_harvester_common::{extract, ListingRecord};
