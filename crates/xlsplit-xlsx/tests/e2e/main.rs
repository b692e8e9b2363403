//! End-to-end tests for xlsplit-xlsx.
//!
//! Fixtures are assembled in memory from raw part XML (see [`common::Fixture`]),
//! so each test controls exactly which XLSX features the source uses.

mod common;
mod reading;
mod writing;

pub use common::*;
