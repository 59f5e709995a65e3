//! Raster painter: draws a dense layer into an RGBA canvas, one glyph cell
//! per grid cell.

use image::{Rgba, RgbaImage};
use log::debug;

use crate::config::CellMetrics;
use crate::font::{GlyphAtlas, GlyphMask};
use crate::grid::{Drawable, LayerView};
use crate::templates::tables::BLACK;

/// What to draw in each cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintStyle {
    /// Background fill plus glyph
    Glyphs,
    /// Background fill only
    Solid,
}

/// Paints layers into one reused canvas.
///
/// The canvas is reallocated only when the layer size changes and is
/// cleared to black before every paint.
pub struct Painter {
    metrics: CellMetrics,
    atlas: GlyphAtlas,
    canvas: RgbaImage,
}

impl Painter {
    pub fn new(metrics: CellMetrics) -> Self {
        Self {
            atlas: GlyphAtlas::new(&metrics),
            metrics,
            canvas: RgbaImage::new(0, 0),
        }
    }

    /// Paint `layer` and return the canvas.
    pub fn paint<C: Drawable>(&mut self, layer: &LayerView<'_, C>, style: PaintStyle) -> &RgbaImage {
        let (width, height) = self.metrics.canvas_size(layer.columns(), layer.rows());
        if self.canvas.dimensions() != (width, height) {
            debug!("Allocating {}x{} canvas", width, height);
            self.canvas = RgbaImage::from_pixel(width, height, BLACK);
        } else {
            for pixel in self.canvas.pixels_mut() {
                *pixel = BLACK;
            }
        }

        // One look per palette entry, resolved before the cell loop
        let looks: Vec<(Rgba<u8>, Rgba<u8>, Option<GlyphMask>)> = layer
            .palette
            .iter()
            .map(|cell| {
                let colors = cell.colors();
                let mask = match style {
                    PaintStyle::Glyphs => Some(self.atlas.mask(cell.symbol()))
                        .filter(|mask| !mask.is_empty())
                        .cloned(),
                    PaintStyle::Solid => None,
                };
                (colors.fg, colors.bg, mask)
            })
            .collect();

        let overprint = self.metrics.overprint_width;
        let cell_height = self.metrics.cell_height;
        for row in 0..layer.rows() {
            let y0 = self.metrics.row_y(row);
            for (column, &key) in layer.grid.row(row).iter().enumerate() {
                let x0 = self.metrics.column_x(column);
                let (fg, bg, mask) = &looks[key as usize];
                fill_rect(&mut self.canvas, x0, y0, overprint, cell_height, *bg);
                if let Some(mask) = mask {
                    draw_mask(&mut self.canvas, x0, y0, mask, *fg);
                }
            }
        }

        &self.canvas
    }
}

/// Fill a rectangle, clipped to the canvas.
fn fill_rect(canvas: &mut RgbaImage, x0: u32, y0: u32, width: u32, height: u32, color: Rgba<u8>) {
    let x1 = (x0 + width).min(canvas.width());
    let y1 = (y0 + height).min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, color);
        }
    }
}

fn draw_mask(canvas: &mut RgbaImage, x0: u32, y0: u32, mask: &GlyphMask, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    for &(dx, dy) in &mask.pixels {
        let (x, y) = (x0 + dx, y0 + dy);
        if x < width && y < height {
            canvas.put_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{DenseGrid, TerrainCell};
    use crate::templates::tables::ColorPair;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn palette() -> Vec<TerrainCell> {
        vec![
            TerrainCell::filler(ColorPair { fg: RED, bg: GREEN }),
            TerrainCell {
                id: "forest".into(),
                name: "forest".into(),
                symbol: 'F',
                colors: ColorPair { fg: RED, bg: BLUE },
            },
        ]
    }

    #[test]
    fn test_canvas_size_and_cells() {
        let mut grid = DenseGrid::new(2, 1);
        grid.set(0, 0, 1);
        let palette = palette();
        let mut painter = Painter::new(CellMetrics::default());
        let canvas = painter.paint(&LayerView::new(&grid, &palette), PaintStyle::Glyphs);

        assert_eq!(canvas.dimensions(), (43, 24));
        assert_eq!(*canvas.get_pixel(0, 0), BLUE);
        // Top-left pixel of the F bar
        assert_eq!(*canvas.get_pixel(3, 1), RED);
        // Second cell starts at floor(21.3594)
        assert_eq!(*canvas.get_pixel(21, 0), GREEN);
        assert_eq!(*canvas.get_pixel(42, 23), GREEN);
    }

    #[test]
    fn test_solid_style_skips_glyphs() {
        let mut grid = DenseGrid::new(1, 1);
        grid.set(0, 0, 1);
        let palette = palette();
        let mut painter = Painter::new(CellMetrics::default());
        let canvas = painter.paint(&LayerView::new(&grid, &palette), PaintStyle::Solid);
        assert!(canvas.pixels().all(|p| *p == BLUE));
    }

    #[test]
    fn test_canvas_reuse_clears_previous_layer() {
        let palette = palette();
        let mut painter = Painter::new(CellMetrics::default());

        let mut forest = DenseGrid::new(3, 2);
        forest.fill_row(0, 0, 3, 1);
        let canvas = painter.paint(&LayerView::new(&forest, &palette), PaintStyle::Glyphs);
        assert_eq!(*canvas.get_pixel(3, 1), RED);

        let filler = DenseGrid::new(3, 2);
        let canvas = painter.paint(&LayerView::new(&filler, &palette), PaintStyle::Glyphs);
        assert!(canvas.pixels().all(|p| *p == GREEN));

        let small = DenseGrid::new(1, 1);
        let canvas = painter.paint(&LayerView::new(&small, &palette), PaintStyle::Glyphs);
        assert_eq!(canvas.dimensions(), (21, 24));
    }
}
