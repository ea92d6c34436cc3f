pub const DEFAULT_WIDTH: usize = 120;
pub const DEFAULT_HEIGHT: usize = 60;
pub const MIN_WIDTH: usize = 10;
pub const MIN_HEIGHT: usize = 5;

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_DENSITY_RADIUS: usize = 1;
pub const DEFAULT_PADDING_FRACTION: f64 = 0.01;
pub const UK_PADDING_FRACTION: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub density_radius: usize,
    pub padding_fraction: f64,
    pub color_enabled: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            density_radius: DEFAULT_DENSITY_RADIUS,
            padding_fraction: DEFAULT_PADDING_FRACTION,
            color_enabled: false,
        }
    }
}

impl RenderOptions {
    /// イギリス向けの設定（余白5%）
    pub fn united_kingdom() -> Self {
        Self {
            padding_fraction: UK_PADDING_FRACTION,
            ..Self::default()
        }
    }
}
