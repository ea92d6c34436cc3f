use rayon::prelude::*;

use crate::config::DEFAULT_BATCH_SIZE;
use crate::error::{MapError, Result};
use crate::model::Coordinate;

/// Geographic rectangle enclosing a set of coordinates.
///
/// `min_lat == max_lat` (or `min_lon == max_lon`) is allowed and happens when
/// every point shares that value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    fn from_point(coord: &Coordinate) -> Self {
        Self {
            min_lat: coord.latitude(),
            max_lat: coord.latitude(),
            min_lon: coord.longitude(),
            max_lon: coord.longitude(),
        }
    }

    /// Exact min/max over `coords`, without padding.
    pub fn from_coordinates(coords: &[Coordinate]) -> Result<Self> {
        // バッチ単位で局所的に集計し、最後に結合する
        coords
            .par_chunks(DEFAULT_BATCH_SIZE)
            .filter_map(|batch| {
                let (first, rest) = batch.split_first()?;
                Some(
                    rest.iter()
                        .fold(Self::from_point(first), |acc, c| {
                            acc.merge(&Self::from_point(c))
                        }),
                )
            })
            .reduce_with(|a, b| a.merge(&b))
            .ok_or_else(|| {
                MapError::InvalidInput(
                    "cannot compute a bounding box from zero coordinates".to_string(),
                )
            })
    }

    /// Element-wise min/max of two boxes.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }

    /// Expands each side by `fraction` of the axis range.
    pub fn with_padding(&self, fraction: f64) -> Self {
        let lat_pad = self.lat_range() * fraction;
        let lon_pad = self.lon_range() * fraction;

        Self {
            min_lat: self.min_lat - lat_pad,
            max_lat: self.max_lat + lat_pad,
            min_lon: self.min_lon - lon_pad,
            max_lon: self.max_lon + lon_pad,
        }
    }

    pub fn lat_range(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_range(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}

/// Bounding box of `coords` padded by `padding_fraction` on every side.
pub fn calculate_boundary(coords: &[Coordinate], padding_fraction: f64) -> Result<BoundingBox> {
    let raw = BoundingBox::from_coordinates(coords)?;
    let padded = raw.with_padding(padding_fraction);

    tracing::debug!(
        "Boundary: lat [{}, {}], lon [{}, {}] (padding {})",
        padded.min_lat,
        padded.max_lat,
        padded.min_lon,
        padded.max_lon,
        padding_fraction
    );

    Ok(padded)
}
