//! Pipeline stages for a filter run.
//!
//! - `load`: Parse CDX results into a record store
//! - `criteria`: Build the criteria set for the selected strategy
//! - `matcher` / `field`: Decide per record whether it matches
//! - `scan`: Drive matching, link building and output for a whole run
//! - `report`: Hit counters and the end-of-run summary

pub mod criteria;
pub mod field;
pub mod load;
pub mod matcher;
pub mod report;
pub mod scan;

pub use load::{load_records, parse_records};
pub use report::{Counters, ScanReport};
pub use scan::run_scan;
