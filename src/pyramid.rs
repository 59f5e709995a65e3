//! Tile pyramid cutter.
//!
//! Cuts a painted canvas into `<dir>/<z>/<x>/<y>.png` tiles. Level `Z` (the
//! native zoom) maps canvas pixels 1:1; each level below halves the
//! resolution until level 0 fits the canvas into a single tile.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::PyramidConfig;
use crate::error::{MapError, Result};
use crate::templates::tables::TRANSPARENT;

/// Tile layout of one canvas
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TilePlan {
    pub tile_size: u32,
    /// Canvas size in pixels
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Logical size, rounded up to whole tiles when padding
    pub width: u32,
    pub height: u32,
    /// Tiles per axis at the native zoom
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub native_zoom: u32,
}

impl TilePlan {
    pub fn new(canvas_width: u32, canvas_height: u32, config: &PyramidConfig) -> Self {
        let tile_size = config.tile_size.max(1);
        let tiles_x = canvas_width.div_ceil(tile_size);
        let tiles_y = canvas_height.div_ceil(tile_size);
        let (width, height) = if config.pad {
            (tiles_x * tile_size, tiles_y * tile_size)
        } else {
            (canvas_width, canvas_height)
        };
        Self {
            tile_size,
            canvas_width,
            canvas_height,
            width,
            height,
            tiles_x,
            tiles_y,
            native_zoom: native_zoom(tiles_x.max(tiles_y)),
        }
    }

    /// Source pixels covered by one tile edge at zoom `z`.
    pub fn cover(&self, z: u32) -> u32 {
        self.tile_size << (self.native_zoom - z)
    }

    /// Tiles per axis at zoom `z`.
    pub fn level_size(&self, z: u32) -> (u32, u32) {
        let cover = self.cover(z);
        (self.width.div_ceil(cover), self.height.div_ceil(cover))
    }
}

/// Smallest `z` with `2^z >= tiles`, i.e. `ceil(log2(tiles))`.
pub fn native_zoom(tiles: u32) -> u32 {
    tiles.max(1).next_power_of_two().trailing_zeros()
}

/// Tiles written and left alone by one cut
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PyramidStats {
    pub levels: u32,
    pub written: usize,
    pub skipped: usize,
}

impl std::ops::AddAssign for PyramidStats {
    fn add_assign(&mut self, other: Self) {
        self.levels = self.levels.max(other.levels);
        self.written += other.written;
        self.skipped += other.skipped;
    }
}

pub fn tile_path(dir: &Path, z: u32, x: u32, y: u32) -> PathBuf {
    dir.join(z.to_string()).join(x.to_string()).join(format!("{}.png", y))
}

/// Render tile (x, y) of zoom `z` as a full `tile_size` square, transparent
/// past the canvas edge.
fn render_tile(canvas: &RgbaImage, plan: &TilePlan, z: u32, x: u32, y: u32) -> RgbaImage {
    let size = plan.tile_size;
    let cover = plan.cover(z);
    let x0 = x * cover;
    let y0 = y * cover;
    let region_w = cover.min(plan.canvas_width.saturating_sub(x0));
    let region_h = cover.min(plan.canvas_height.saturating_sub(y0));

    let content = if region_w == 0 || region_h == 0 {
        RgbaImage::new(0, 0)
    } else {
        let crop = imageops::crop_imm(canvas, x0, y0, region_w, region_h).to_image();
        if cover == size {
            crop
        } else {
            let scaled_w = (region_w as u64 * size as u64).div_ceil(cover as u64).max(1) as u32;
            let scaled_h = (region_h as u64 * size as u64).div_ceil(cover as u64).max(1) as u32;
            imageops::resize(&crop, scaled_w, scaled_h, FilterType::Lanczos3)
        }
    };

    let mut tile = RgbaImage::from_pixel(size, size, TRANSPARENT);
    imageops::replace(&mut tile, &content, 0, 0);
    tile
}

/// Cut `canvas` into a tile pyramid under `dir`.
///
/// With `resume`, a tile whose file already exists is skipped without
/// looking at its content.
pub fn cut_pyramid(canvas: &RgbaImage, dir: &Path, config: &PyramidConfig) -> Result<PyramidStats> {
    let plan = TilePlan::new(canvas.width(), canvas.height(), config);
    let mut stats = PyramidStats::default();
    if plan.tiles_x == 0 || plan.tiles_y == 0 {
        warn!("Nothing to tile for {}: empty canvas", dir.display());
        return Ok(stats);
    }
    stats.levels = plan.native_zoom + 1;

    for z in 0..=plan.native_zoom {
        let (nx, ny) = plan.level_size(z);
        for x in 0..nx {
            let column = dir.join(z.to_string()).join(x.to_string());
            fs::create_dir_all(&column).map_err(|e| MapError::io(&column, e))?;
        }

        let tiles: Vec<(u32, u32)> = (0..nx).flat_map(|x| (0..ny).map(move |y| (x, y))).collect();
        let written: Vec<bool> = tiles
            .into_par_iter()
            .map(|(x, y)| -> Result<bool> {
                let path = tile_path(dir, z, x, y);
                if config.resume && path.exists() {
                    return Ok(false);
                }
                let tile = render_tile(canvas, &plan, z, x, y);
                tile.save_with_format(&path, ImageFormat::Png)
                    .map_err(|e| MapError::image(&path, e))?;
                Ok(true)
            })
            .collect::<Result<_>>()?;

        let level_written = written.iter().filter(|w| **w).count();
        stats.written += level_written;
        stats.skipped += written.len() - level_written;
        debug!("Zoom {}: {}x{} tiles, {} written", z, nx, ny, level_written);
    }

    info!(
        "Tiled {} ({} levels): {} written, {} skipped",
        dir.display(),
        stats.levels,
        stats.written,
        stats.skipped
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn config(pad: bool, resume: bool) -> PyramidConfig {
        PyramidConfig {
            tile_size: 256,
            pad,
            resume,
        }
    }

    #[test]
    fn test_native_zoom() {
        assert_eq!(native_zoom(1), 0);
        assert_eq!(native_zoom(2), 1);
        assert_eq!(native_zoom(3), 2);
        assert_eq!(native_zoom(31), 5);
        assert_eq!(native_zoom(32), 5);
        assert_eq!(native_zoom(33), 6);
    }

    #[test]
    fn test_plan_for_two_chunk_world() {
        let plan = TilePlan::new(7689, 4320, &config(true, false));
        assert_eq!((plan.tiles_x, plan.tiles_y), (31, 17));
        assert_eq!((plan.width, plan.height), (31 * 256, 17 * 256));
        assert_eq!(plan.native_zoom, 5);
        assert_eq!(plan.level_size(5), (31, 17));
        assert_eq!(plan.cover(0), 256 * 32);
        assert_eq!(plan.level_size(0), (1, 1));
    }

    #[test]
    fn test_native_level_covers_padded_canvas() {
        let dir = tempdir().unwrap();
        let canvas = RgbaImage::from_pixel(600, 300, RED);
        let stats = cut_pyramid(&canvas, dir.path(), &config(true, false)).unwrap();

        // 3x2 at z=2, 2x1 at z=1, 1x1 at z=0
        assert_eq!(stats, PyramidStats { levels: 3, written: 9, skipped: 0 });

        let mut covered = 0;
        for x in 0..3 {
            for y in 0..2 {
                let tile = image::open(tile_path(dir.path(), 2, x, y)).unwrap().to_rgba8();
                assert_eq!(tile.dimensions(), (256, 256));
                covered += tile.width() * tile.height();
            }
        }
        assert_eq!(covered, 768 * 512);

        let edge = image::open(tile_path(dir.path(), 2, 2, 1)).unwrap().to_rgba8();
        assert_eq!(*edge.get_pixel(0, 0), RED);
        assert_eq!(*edge.get_pixel(87, 43), RED);
        assert_eq!(edge.get_pixel(88, 0)[3], 0);
        assert_eq!(edge.get_pixel(0, 44)[3], 0);

        let overview = image::open(tile_path(dir.path(), 0, 0, 0)).unwrap().to_rgba8();
        assert_eq!(overview.dimensions(), (256, 256));
        // Resampled, so allow rounding
        let centre = overview.get_pixel(75, 37);
        assert!(centre[0] > 250 && centre[1] < 5 && centre[3] > 250);
        assert_eq!(overview.get_pixel(200, 200)[3], 0);
    }

    #[test]
    fn test_unpadded_tiles_keep_full_size() {
        let dir = tempdir().unwrap();
        let canvas = RgbaImage::from_pixel(600, 300, RED);
        let plan = TilePlan::new(600, 300, &config(false, false));
        assert_eq!((plan.width, plan.height), (600, 300));
        assert_eq!(plan.level_size(2), (3, 2));

        let stats = cut_pyramid(&canvas, dir.path(), &config(false, false)).unwrap();
        assert_eq!(stats, PyramidStats { levels: 3, written: 9, skipped: 0 });

        let edge = image::open(tile_path(dir.path(), 2, 2, 1)).unwrap().to_rgba8();
        assert_eq!(edge.dimensions(), (256, 256));
        assert_eq!(*edge.get_pixel(87, 43), RED);
        assert_eq!(edge.get_pixel(88, 43)[3], 0);
        assert_eq!(edge.get_pixel(87, 44)[3], 0);

        let overview = image::open(tile_path(dir.path(), 0, 0, 0)).unwrap().to_rgba8();
        assert_eq!(overview.dimensions(), (256, 256));
        assert_eq!(overview.get_pixel(200, 200)[3], 0);
    }

    #[test]
    fn test_resume_skips_existing_tiles() {
        let dir = tempdir().unwrap();
        let canvas = RgbaImage::from_pixel(600, 300, RED);
        cut_pyramid(&canvas, dir.path(), &config(true, false)).unwrap();

        let mtimes = |dir: &Path| -> Vec<std::time::SystemTime> {
            (0..3)
                .flat_map(|x| (0..2).map(move |y| (x, y)))
                .map(|(x, y)| fs::metadata(tile_path(dir, 2, x, y)).unwrap().modified().unwrap())
                .collect()
        };
        let before = mtimes(dir.path());

        let stats = cut_pyramid(&canvas, dir.path(), &config(true, true)).unwrap();
        assert_eq!(stats.written, 0);
        assert_eq!(stats.skipped, 9);
        assert_eq!(mtimes(dir.path()), before);

        fs::remove_file(tile_path(dir.path(), 1, 1, 0)).unwrap();
        let stats = cut_pyramid(&canvas, dir.path(), &config(true, true)).unwrap();
        assert_eq!(stats.written, 1);
        assert!(tile_path(dir.path(), 1, 1, 0).exists());
    }

    #[test]
    fn test_empty_canvas() {
        let dir = tempdir().unwrap();
        let stats = cut_pyramid(&RgbaImage::new(0, 0), dir.path(), &config(true, false)).unwrap();
        assert_eq!(stats, PyramidStats::default());
    }
}
