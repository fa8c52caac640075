//! Lookup tables consulted while converting: ZIP codes and county FIPS codes.

mod fips;
mod zip;

pub use fips::{extract_fips_code, CountyLookup, CountyState};
pub use zip::{ZipCodeLookup, ZipRecord};
