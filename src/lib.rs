// src/lib.rs

//! CDX Filter Library
//!
//! Matches capture records from a CDX index against search criteria and
//! writes the hits out as archive viewer links.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod utils;
