use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{debug, info};

use crate::error::Result;
use crate::extractor::{
    available_country_codes, extract_coordinates_with_batch_size, normalize_country_code,
};
use crate::model::Coordinate;
use crate::source::RecordSource;

/// Read-through cache of coordinates per country code, backed by a [`RecordSource`].
///
/// Country codes are read once when the cache is created. Coordinates are loaded
/// on the first request for a country, or all at once with [`CoordinateCache::preload`].
#[derive(Debug)]
pub struct CoordinateCache {
    source: RecordSource,
    batch_size: usize,
    country_codes: BTreeSet<String>,
    coordinates: RwLock<HashMap<String, Arc<Vec<Coordinate>>>>,
}

impl CoordinateCache {
    pub fn load(source: RecordSource, batch_size: usize) -> Result<Self> {
        let records = source.read_records()?;
        let country_codes = available_country_codes(&records);
        info!(
            "Loaded {} country codes from {:?}",
            country_codes.len(),
            source.path()
        );

        Ok(Self {
            source,
            batch_size,
            country_codes,
            coordinates: RwLock::new(HashMap::new()),
        })
    }

    pub fn available_country_codes(&self) -> Vec<String> {
        self.country_codes.iter().cloned().collect()
    }

    pub fn has_country(&self, country_code: &str) -> bool {
        self.country_codes
            .contains(&normalize_country_code(country_code))
    }

    /// Coordinates for `country_code`, loading them from the source on a miss.
    /// Unknown codes return an empty list without reading the source.
    pub fn coordinates_for(&self, country_code: &str) -> Result<Arc<Vec<Coordinate>>> {
        let code = normalize_country_code(country_code);
        if !self.country_codes.contains(&code) {
            debug!("Country code {} is not present in the data", code);
            return Ok(Arc::new(Vec::new()));
        }

        if let Some(cached) = self.read_cached(&code) {
            debug!("Cache hit for {}", code);
            return Ok(cached);
        }

        let records = self.source.read_records()?;
        let coords = Arc::new(extract_coordinates_with_batch_size(
            &records,
            &code,
            self.batch_size,
        ));
        info!("Loaded {} coordinates for country code: {}", coords.len(), code);

        let mut guard = self
            .coordinates
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // 並行して読み込まれていた場合は先に入った方を使う
        let entry = guard.entry(code).or_insert(coords);
        Ok(Arc::clone(entry))
    }

    /// Loads every known country from a single read of the source.
    pub fn preload(&self) -> Result<()> {
        let start_time = Instant::now();
        let records = self.source.read_records()?;

        let loaded: Vec<(String, Arc<Vec<Coordinate>>)> = self
            .country_codes
            .par_iter()
            .map(|code| {
                let coords = extract_coordinates_with_batch_size(&records, code, self.batch_size);
                (code.clone(), Arc::new(coords))
            })
            .collect();

        let total: usize = loaded.iter().map(|(_, coords)| coords.len()).sum();
        let mut guard = self
            .coordinates
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.extend(loaded);

        info!(
            "Finished loading data for {} countries ({} coordinates) in {:?}",
            self.country_codes.len(),
            total,
            start_time.elapsed()
        );
        Ok(())
    }

    /// Number of countries whose coordinates are currently cached.
    pub fn cached_country_count(&self) -> usize {
        self.coordinates
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn read_cached(&self, code: &str) -> Option<Arc<Vec<Coordinate>>> {
        self.coordinates
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(code)
            .cloned()
    }
}
