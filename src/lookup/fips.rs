//! County and state names keyed by five digit county FIPS code.
//!
//! The table maps codes to `"County, ST"`, e.g. `"37143": "Perquimans, NC"`.
//! TIGER/Line files carry the code in their file name
//! (`tl_2024_37143_addrfeat`).

use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::error::{Error, Result};

fn file_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"tl_\d{4}_(\d{5})_(addrfeat|edges)").expect("static file name pattern")
    })
}

fn county_state_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+), ([A-Z]{2})$").expect("static county pattern"))
}

/// Extract the five digit FIPS code from a TIGER/Line file name
pub fn extract_fips_code(file_name: &str) -> Option<String> {
    file_name_regex()
        .captures(file_name)
        .map(|caps| caps[1].to_string())
}

/// County name and state abbreviation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountyState {
    pub county: String,
    pub state: String,
}

#[derive(Debug, Clone, Default)]
pub struct CountyLookup {
    counties: HashMap<String, String>,
}

impl CountyLookup {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the JSON table from a file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading county FIPS table from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let lookup = Self::from_json(&content)?;
        info!("Loaded {} counties", lookup.counties.len());
        Ok(lookup)
    }

    /// A missing file gives an empty table and a warning
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "County FIPS table {} not found, county and state will be left empty",
                path.display()
            );
            return Ok(Self::empty());
        }
        Self::load(path)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let counties: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { counties })
    }

    /// County and state for a FIPS code, if the table has a well-formed entry
    pub fn get(&self, fips: &str) -> Option<CountyState> {
        let value = self.counties.get(fips)?;
        let caps = county_state_regex().captures(value)?;
        Some(CountyState {
            county: caps[1].to_string(),
            state: caps[2].to_string(),
        })
    }
}
