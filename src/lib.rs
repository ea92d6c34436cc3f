pub mod boundary;
pub mod cache;
pub mod config;
pub mod density;
pub mod error;
pub mod extractor;
pub mod model;
pub mod render;
pub mod source;

pub use boundary::{calculate_boundary, BoundingBox};
pub use cache::CoordinateCache;
pub use config::RenderOptions;
pub use density::DensityGrid;
pub use error::{CoordinateError, MapError, Result};
pub use extractor::{available_country_codes, extract_coordinates};
pub use model::{Coordinate, Record};
pub use render::RenderedMap;
pub use source::RecordSource;

use config::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MIN_HEIGHT, MIN_WIDTH};

/// Renders `coordinates` as a `width x height` ASCII map.
///
/// Fails with [`MapError::InvalidInput`] when the grid is smaller than
/// 10 x 5 or `coordinates` is empty.
pub fn render_map(
    coordinates: &[Coordinate],
    width: usize,
    height: usize,
    options: &RenderOptions,
) -> Result<String> {
    MapRenderer::new(width, height, *options)?
        .render(coordinates)
        .map(RenderedMap::into_string)
}

/// Extracts `country_code` from `records` and renders it.
///
/// Returns [`MapError::NoData`] when no record of that country has a valid coordinate.
pub fn render_country_map(
    records: &[Record],
    country_code: &str,
    width: usize,
    height: usize,
    options: &RenderOptions,
) -> Result<RenderedMap> {
    let renderer = MapRenderer::new(width, height, *options)?;
    let code = extractor::normalize_country_code(country_code);
    if code.is_empty() {
        return Err(MapError::InvalidInput("country code is empty".to_string()));
    }

    let coordinates = extract_coordinates(records, &code);
    renderer.render_country(&code, &coordinates)
}

/// Grid dimensions plus rendering options, validated once at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRenderer {
    width: usize,
    height: usize,
    options: RenderOptions,
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            options: RenderOptions::default(),
        }
    }
}

impl MapRenderer {
    pub fn new(width: usize, height: usize, options: RenderOptions) -> Result<Self> {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return Err(MapError::InvalidInput(format!(
                "width must be at least {} and height at least {} (got {}x{})",
                MIN_WIDTH, MIN_HEIGHT, width, height
            )));
        }
        if !options.padding_fraction.is_finite() || options.padding_fraction < 0.0 {
            return Err(MapError::InvalidInput(format!(
                "padding fraction must be a non-negative number (got {})",
                options.padding_fraction
            )));
        }

        Ok(Self {
            width,
            height,
            options,
        })
    }

    pub fn with_dimensions(&self, width: usize, height: usize) -> Result<Self> {
        Self::new(width, height, self.options)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn render(&self, coordinates: &[Coordinate]) -> Result<RenderedMap> {
        tracing::debug!(
            "Rendering {} coordinates as {}x{} ASCII map",
            coordinates.len(),
            self.width,
            self.height
        );

        let bbox = calculate_boundary(coordinates, self.options.padding_fraction)?;
        let grid = DensityGrid::build(
            coordinates,
            &bbox,
            self.width,
            self.height,
            self.options.density_radius,
        );

        Ok(RenderedMap::from_grid(&grid, self.options.color_enabled))
    }

    /// Like [`MapRenderer::render`], but reports an empty coordinate list as
    /// [`MapError::NoData`] for `country_code`.
    pub fn render_country(
        &self,
        country_code: &str,
        coordinates: &[Coordinate],
    ) -> Result<RenderedMap> {
        if coordinates.is_empty() {
            tracing::warn!("No coordinates found for country code: {}", country_code);
            return Err(MapError::NoData(country_code.to_string()));
        }

        tracing::info!(
            "Rendering ASCII map for country: {}, dimensions: {}x{}",
            country_code,
            self.width,
            self.height
        );
        self.render(coordinates)
    }
}
