use crate::error::CoordinateError;

/// CSVの1行をセミコロンで分割したフィールド列
pub type Record = Vec<String>;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        // NaNはどちらの比較もfalseになるため範囲外として扱われる
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(CoordinateError::OutOfRange {
                field: "latitude",
                value: latitude,
            });
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(CoordinateError::OutOfRange {
                field: "longitude",
                value: longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parses a coordinate from raw latitude and longitude text.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, CoordinateError> {
        let lat = parse_degrees("latitude", latitude)?;
        let lon = parse_degrees("longitude", longitude)?;
        Self::new(lat, lon)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn parse_degrees(field: &'static str, text: &str) -> Result<f64, CoordinateError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| CoordinateError::Malformed {
            field,
            value: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_coordinate() {
        let coord = Coordinate::parse("51.5074", "-0.1278").unwrap();
        assert_eq!(coord.latitude(), 51.5074);
        assert_eq!(coord.longitude(), -0.1278);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let coord = Coordinate::parse(" 40.0 ", "\t-75.0").unwrap();
        assert_eq!(coord.latitude(), 40.0);
        assert_eq!(coord.longitude(), -75.0);
    }

    #[test]
    fn test_boundary_values_are_accepted() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordinateError::OutOfRange {
                field: "latitude",
                value: 90.5
            })
        );
        assert!(matches!(
            Coordinate::new(0.0, -180.1),
            Err(CoordinateError::OutOfRange {
                field: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn test_non_numeric_and_non_finite_values_are_rejected() {
        assert!(matches!(
            Coordinate::parse("abc", "1.0"),
            Err(CoordinateError::Malformed {
                field: "latitude",
                ..
            })
        ));
        assert!(matches!(
            Coordinate::parse("1.0", ""),
            Err(CoordinateError::Malformed {
                field: "longitude",
                ..
            })
        ));
        assert!(Coordinate::parse("NaN", "0.0").is_err());
        assert!(Coordinate::parse("0.0", "inf").is_err());
    }
}
