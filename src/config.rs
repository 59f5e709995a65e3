//! Rendering configuration.

/// Glyph-cell geometry used by the raster painter and the geometry export.
///
/// The cell width is non-integer (the advance of the monospace face the maps
/// are drawn with). The pen position accumulates it, so columns drift by
/// sub-pixel amounts. The background of
/// each cell is painted `overprint_width` wide to hide the seams this causes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMetrics {
    pub cell_width: f64,
    pub cell_height: u32,
    pub overprint_width: u32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            cell_width: 21.3594,
            cell_height: 24,
            overprint_width: 22,
        }
    }
}

impl CellMetrics {
    /// Pixel size of a canvas holding `columns` x `rows` cells.
    pub fn canvas_size(&self, columns: usize, rows: usize) -> (u32, u32) {
        let width = (self.cell_width * columns as f64).round() as u32;
        let height = self.cell_height * rows as u32;
        (width, height)
    }

    /// Left pixel edge of a column.
    pub fn column_x(&self, column: usize) -> u32 {
        (self.cell_width * column as f64).floor() as u32
    }

    /// Top pixel edge of a row.
    pub fn row_y(&self, row: usize) -> u32 {
        self.cell_height * row as u32
    }

    /// Exact `(x1, y1, x2, y2)` rectangle of cell (column, row), unrounded.
    pub fn cell_rect(&self, column: usize, row: usize) -> (f64, f64, f64, f64) {
        let x = column as f64 * self.cell_width;
        let y = row as f64 * self.cell_height as f64;
        (x, y, x + self.cell_width, y + self.cell_height as f64)
    }
}

/// Tile pyramid settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PyramidConfig {
    /// Edge length of every emitted tile in pixels
    pub tile_size: u32,
    /// Round the logical canvas up to whole tiles. Tiles are always
    /// `tile_size` squares, transparent beyond the canvas.
    pub pad: bool,
    /// Leave tile files that already exist untouched
    pub resume: bool,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            tile_size: 256,
            pad: true,
            resume: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderConfig {
    pub metrics: CellMetrics,
    pub pyramid: PyramidConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_size_rounds_width() {
        let m = CellMetrics::default();
        // 360 * 21.3594 = 7689.384
        assert_eq!(m.canvas_size(360, 180), (7689, 4320));
        assert_eq!(m.canvas_size(1, 1), (21, 24));
    }

    #[test]
    fn test_column_edges_are_monotonic() {
        let m = CellMetrics::default();
        let mut last = 0;
        for c in 1..500 {
            let x = m.column_x(c);
            assert!(x > last);
            assert!(x - last <= 22);
            last = x;
        }
    }
}
