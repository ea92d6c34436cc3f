use crate::boundary::BoundingBox;
use crate::model::Coordinate;

/// Row-major `height x width` grid of accumulated point densities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityGrid {
    width: usize,
    height: usize,
    cells: Vec<u32>,
}

impl DensityGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// Projects `coords` into a `width x height` grid spanning `bbox` and spreads
    /// each point over the cells within Manhattan distance `radius` of it.
    ///
    /// A cell at distance `d` from a point receives `radius + 1 - d`.
    pub fn build(
        coords: &[Coordinate],
        bbox: &BoundingBox,
        width: usize,
        height: usize,
        radius: usize,
    ) -> Self {
        let mut grid = Self::new(width, height);
        let mut skipped = 0usize;
        for coord in coords {
            match grid.project(coord, bbox) {
                Some((row, col)) => grid.add_blob(row, col, radius),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!("{} coordinates fell outside the grid and were skipped", skipped);
        }
        tracing::debug!(
            "Built {}x{} density grid from {} coordinates",
            width,
            height,
            coords.len() - skipped
        );

        grid
    }

    /// Maps a coordinate to its `(row, col)` cell. North is row 0.
    pub fn project(&self, coord: &Coordinate, bbox: &BoundingBox) -> Option<(usize, usize)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }

        let lon_fraction = axis_fraction(coord.longitude(), bbox.min_lon, bbox.max_lon);
        let lat_fraction = axis_fraction(coord.latitude(), bbox.min_lat, bbox.max_lat);

        let col = (lon_fraction * (self.width - 1) as f64).floor() as i64;
        let row = (self.height - 1) as i64 - (lat_fraction * (self.height - 1) as f64).floor() as i64;

        if row < 0 || row >= self.height as i64 || col < 0 || col >= self.width as i64 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    fn add_blob(&mut self, row: usize, col: usize, radius: usize) {
        // グリッド外に届く分は走査しない（重みは元の半径で計算する）
        let span = radius.min(self.width + self.height);
        let row_start = row.saturating_sub(span);
        let row_end = (row + span).min(self.height - 1);

        for y in row_start..=row_end {
            let dy = y.abs_diff(row);
            // 菱形の範囲内だけを走査する
            let reach = span - dy;
            let col_start = col.saturating_sub(reach);
            let col_end = (col + reach).min(self.width - 1);

            for x in col_start..=col_end {
                let distance = dy + x.abs_diff(col);
                let cell = &mut self.cells[y * self.width + x];
                *cell = cell.saturating_add(blob_weight(radius, distance));
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        // chunks(0) は panic する
        self.cells.chunks(self.width.max(1)).take(self.height)
    }
}

/// `radius + 1 - distance`, saturated at `u32::MAX`. `distance` never exceeds `radius`.
fn blob_weight(radius: usize, distance: usize) -> u32 {
    u32::try_from((radius - distance).saturating_add(1)).unwrap_or(u32::MAX)
}

/// Normalized position of `value` within `[min, max]`, `0.0` for a zero-width axis.
fn axis_fraction(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        0.0
    } else {
        (value - min) / range
    }
}
