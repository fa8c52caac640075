//! ZIP code to city lookup backed by a CSV database.

use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// One row of the ZIP database
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ZipRecord {
    pub zip: String,
    pub primary_city: String,
    pub acceptable_cities: String,
    pub unacceptable_cities: String,
    pub state: String,
    pub county: String,
}

fn split_cities(cities: &str) -> Vec<String> {
    cities
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// ZIP code lookup keyed by the five digit code
#[derive(Debug, Clone, Default)]
pub struct ZipCodeLookup {
    zip_data: HashMap<String, ZipRecord>,
}

impl ZipCodeLookup {
    /// Empty lookup: every ZIP misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the database from a CSV file (optionally gzipped)
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading ZIP database from {}", path.display());

        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let lookup = Self::from_reader(reader)?;
        info!("Loaded {} ZIP codes", lookup.len());
        Ok(lookup)
    }

    /// Load from a missing-tolerant path: a file that does not exist gives an
    /// empty lookup and a warning.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "ZIP database {} not found, city names will be left empty",
                path.display()
            );
            return Ok(Self::empty());
        }
        Self::load(path)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if !headers.iter().any(|h| h == "zip") {
            return Err(Error::MissingColumn("zip".to_string()));
        }

        let mut zip_data = HashMap::new();
        for result in csv_reader.deserialize() {
            let record: ZipRecord = result?;
            zip_data.insert(record.zip.clone(), record);
        }

        Ok(Self { zip_data })
    }

    pub fn len(&self) -> usize {
        self.zip_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip_data.is_empty()
    }

    /// All information for a ZIP code
    pub fn lookup(&self, zip: &str) -> Option<&ZipRecord> {
        self.zip_data.get(zip)
    }

    pub fn primary_city(&self, zip: &str) -> Option<&str> {
        self.lookup(zip).and_then(|r| non_empty(&r.primary_city))
    }

    pub fn state(&self, zip: &str) -> Option<&str> {
        self.lookup(zip).and_then(|r| non_empty(&r.state))
    }

    pub fn county(&self, zip: &str) -> Option<&str> {
        self.lookup(zip).and_then(|r| non_empty(&r.county))
    }

    pub fn acceptable_cities(&self, zip: &str) -> Vec<String> {
        self.lookup(zip)
            .map(|r| split_cities(&r.acceptable_cities))
            .unwrap_or_default()
    }

    pub fn unacceptable_cities(&self, zip: &str) -> Vec<String> {
        self.lookup(zip)
            .map(|r| split_cities(&r.unacceptable_cities))
            .unwrap_or_default()
    }

    /// Primary city of a ZIP code, or its first acceptable city if no
    /// primary city is recorded
    pub fn fallback_city(&self, zip: &str) -> Option<String> {
        if zip.is_empty() {
            return None;
        }
        if let Some(city) = self.primary_city(zip) {
            return Some(city.to_string());
        }
        self.acceptable_cities(zip).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DB: &str = "\
zip,type,primary_city,acceptable_cities,unacceptable_cities,state,county
27944,STANDARD,Hertford,,Winfall,NC,Perquimans County
27985,PO BOX,,\"Winfall, Belvidere\",,NC,Perquimans County
10541,STANDARD,Mahopac,\"Lake Mahopac, Mahopac Falls\",Baldwin Place,NY,Putnam County
";

    fn lookup() -> ZipCodeLookup {
        ZipCodeLookup::from_reader(DB.as_bytes()).unwrap()
    }

    #[test]
    fn test_primary_city() {
        let zips = lookup();
        assert_eq!(zips.len(), 3);
        assert_eq!(zips.fallback_city("27944").as_deref(), Some("Hertford"));
        assert_eq!(zips.state("27944"), Some("NC"));
        assert_eq!(zips.county("10541"), Some("Putnam County"));
    }

    #[test]
    fn test_falls_back_to_first_acceptable_city() {
        let zips = lookup();
        assert_eq!(zips.primary_city("27985"), None);
        assert_eq!(zips.fallback_city("27985").as_deref(), Some("Winfall"));
    }

    #[test]
    fn test_city_lists() {
        let zips = lookup();
        assert_eq!(
            zips.acceptable_cities("10541"),
            vec!["Lake Mahopac".to_string(), "Mahopac Falls".to_string()]
        );
        assert_eq!(zips.unacceptable_cities("27944"), vec!["Winfall".to_string()]);
        assert!(zips.acceptable_cities("99999").is_empty());
    }

    #[test]
    fn test_misses() {
        let zips = lookup();
        assert_eq!(zips.fallback_city(""), None);
        assert_eq!(zips.fallback_city("00000"), None);
        assert!(ZipCodeLookup::empty().fallback_city("27944").is_none());
    }

    #[test]
    fn test_missing_zip_column() {
        let err = ZipCodeLookup::from_reader("code,city\n1,A\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DB.as_bytes()).unwrap();
        let zips = ZipCodeLookup::load(file.path()).unwrap();
        assert_eq!(zips.len(), 3);

        let missing = ZipCodeLookup::load_or_empty(Path::new("/nonexistent/zip_db.csv")).unwrap();
        assert!(missing.is_empty());
    }
}
