use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, trace};

use crate::config::DEFAULT_BATCH_SIZE;
use crate::model::{Coordinate, Record};

const COUNTRY_CODE_FIELD: usize = 0;
const LATITUDE_FIELD: usize = 9;
const LONGITUDE_FIELD: usize = 10;
const MIN_FIELD_COUNT: usize = LONGITUDE_FIELD + 1;

/// Extracts every valid coordinate of `country_code` from `records`.
///
/// Records with fewer than 11 fields, another country code, or a malformed or
/// out-of-range latitude/longitude are skipped. The order of the result is
/// unspecified.
pub fn extract_coordinates(records: &[Record], country_code: &str) -> Vec<Coordinate> {
    extract_coordinates_with_batch_size(records, country_code, DEFAULT_BATCH_SIZE)
}

pub fn extract_coordinates_with_batch_size(
    records: &[Record],
    country_code: &str,
    batch_size: usize,
) -> Vec<Coordinate> {
    let batch_size = batch_size.max(1);
    debug!(
        "Extracting coordinates for {} from {} records (batch size {})",
        country_code,
        records.len(),
        batch_size
    );

    // バッチごとに並列で抽出し、最後に連結する
    let coordinates: Vec<Coordinate> = records
        .par_chunks(batch_size)
        .map(|batch| extract_batch(batch, country_code))
        .reduce(Vec::new, |mut acc, mut batch| {
            acc.append(&mut batch);
            acc
        });

    debug!(
        "Extracted {} coordinates for {}",
        coordinates.len(),
        country_code
    );
    coordinates
}

fn extract_batch(batch: &[Record], country_code: &str) -> Vec<Coordinate> {
    batch
        .iter()
        .filter(|record| is_eligible(record, country_code))
        .filter_map(|record| {
            match Coordinate::parse(&record[LATITUDE_FIELD], &record[LONGITUDE_FIELD]) {
                Ok(coord) => Some(coord),
                Err(e) => {
                    trace!("Skipping record: {}", e);
                    None
                }
            }
        })
        .collect()
}

// 一覧（available_country_codes）と同じ正規化で比較する
fn is_eligible(record: &[String], country_code: &str) -> bool {
    record.len() >= MIN_FIELD_COUNT
        && record[COUNTRY_CODE_FIELD]
            .trim()
            .eq_ignore_ascii_case(country_code.trim())
}

/// Trims and ASCII upper-cases a country code, from user input or from a record.
pub fn normalize_country_code(country_code: &str) -> String {
    country_code.trim().to_ascii_uppercase()
}

/// Collects the distinct, upper-cased country codes present in `records`.
pub fn available_country_codes(records: &[Record]) -> BTreeSet<String> {
    records
        .par_iter()
        .filter_map(|record| record.get(COUNTRY_CODE_FIELD))
        .map(|code| normalize_country_code(code))
        .filter(|code| !code.is_empty())
        .collect()
}
