//! Window-geometry-derived grid configuration.

use pathgrid_core::Grid;

/// Presentation-layer geometry the grid dimensions are derived from.
///
/// The window hosts the grid on the left and a control panel of
/// `panel_width` pixels on the right; the grid fills whatever whole
/// cells fit in the remaining area. The defaults match a 1440×720
/// window with a 250 px panel and 12 px cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    pub window_width: i32,
    pub window_height: i32,
    pub panel_width: i32,
    pub cell_px: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            window_width: 1440,
            window_height: 720,
            panel_width: 250,
            cell_px: 12,
        }
    }
}

impl GridConfig {
    /// Number of grid columns that fit left of the panel.
    pub fn cols(&self) -> i32 {
        ((self.window_width - self.panel_width) / self.cell_px.max(1)).max(0)
    }

    /// Number of grid rows that fit in the window.
    pub fn rows(&self) -> i32 {
        (self.window_height / self.cell_px.max(1)).max(0)
    }

    /// Build a grid with these dimensions and pixel size.
    pub fn build(&self) -> Grid {
        Grid::with_cell_px(self.cols(), self.rows(), self.cell_px.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dimensions() {
        let cfg = GridConfig::default();
        assert_eq!(cfg.cols(), 99);
        assert_eq!(cfg.rows(), 60);
        let grid = cfg.build();
        assert_eq!(grid.width(), 99);
        assert_eq!(grid.height(), 60);
        assert_eq!(grid.cell_px(), 12);
    }

    #[test]
    fn degenerate_config_clamps_to_empty() {
        let cfg = GridConfig {
            window_width: 100,
            window_height: 50,
            panel_width: 200,
            cell_px: 12,
        };
        assert_eq!(cfg.cols(), 0);
        assert!(cfg.build().is_empty());
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn config_round_trip() {
        let cfg = GridConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: GridConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
