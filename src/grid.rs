//! Dense layer grids.
//!
//! A grid stores one small palette key per cell; the palette holds the
//! distinct drawable looks. A world with tens of millions of cells usually
//! has only a few hundred distinct terrain looks, so cells stay four bytes.

use image::Rgba;

use crate::templates::tables::{ColorPair, BLACK, TRANSPARENT};

/// Palette key of the filler cell in every grid
pub const FILLER_KEY: u32 = 0;

/// Terrain IDs that count as nothing-there for empty-layer detection
const BLANK_TERRAIN: [&str; 2] = ["empty_rock", "open_air"];

/// Foreground of unseen cells
pub const UNSEEN_FG: Rgba<u8> = Rgba([44, 44, 44, 255]);

/// Anything the raster painter and text export can draw.
pub trait Drawable {
    /// Glyph painted into the cell
    fn symbol(&self) -> char;

    /// Character written by the text export
    fn text_symbol(&self) -> char {
        self.symbol()
    }

    fn colors(&self) -> ColorPair;

    /// True when the cell shows nothing worth exporting
    fn is_blank(&self) -> bool;
}

/// Resolved look of one terrain ID
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainCell {
    /// Empty for filler cells of absent chunks
    pub id: String,
    pub name: String,
    pub symbol: char,
    pub colors: ColorPair,
}

impl TerrainCell {
    /// Cell used for chunks the save does not contain
    pub fn filler(colors: ColorPair) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            symbol: ' ',
            colors,
        }
    }
}

impl Drawable for TerrainCell {
    fn symbol(&self) -> char {
        self.symbol
    }

    fn colors(&self) -> ColorPair {
        self.colors
    }

    fn is_blank(&self) -> bool {
        self.id.is_empty() || BLANK_TERRAIN.contains(&self.id.as_str())
    }
}

/// Visibility of one cell for one character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeenCell {
    Unseen,
    Seen,
}

impl SeenCell {
    pub fn key(seen: bool) -> u32 {
        if seen {
            SEEN_KEY
        } else {
            UNSEEN_KEY
        }
    }
}

pub const UNSEEN_KEY: u32 = FILLER_KEY;
pub const SEEN_KEY: u32 = 1;

/// Fixed palette of every visibility grid, indexed by key
pub const SEEN_PALETTE: [SeenCell; 2] = [SeenCell::Unseen, SeenCell::Seen];

impl Drawable for SeenCell {
    fn symbol(&self) -> char {
        ' '
    }

    fn text_symbol(&self) -> char {
        match self {
            SeenCell::Unseen => '#',
            SeenCell::Seen => '.',
        }
    }

    fn colors(&self) -> ColorPair {
        match self {
            SeenCell::Unseen => ColorPair { fg: UNSEEN_FG, bg: BLACK },
            SeenCell::Seen => ColorPair { fg: TRANSPARENT, bg: TRANSPARENT },
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, SeenCell::Unseen)
    }
}

/// Row-major grid of palette keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseGrid {
    columns: usize,
    rows: usize,
    keys: Vec<u32>,
}

impl DenseGrid {
    /// Grid of the given size with every cell set to the filler key.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            keys: vec![FILLER_KEY; columns * rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get(&self, column: usize, row: usize) -> u32 {
        self.keys[row * self.columns + column]
    }

    pub fn set(&mut self, column: usize, row: usize, key: u32) {
        self.keys[row * self.columns + column] = key;
    }

    /// Set `len` cells of one row starting at `column`.
    pub fn fill_row(&mut self, column: usize, row: usize, len: usize, key: u32) {
        let start = row * self.columns + column;
        self.keys[start..start + len].fill(key);
    }

    pub fn row(&self, row: usize) -> &[u32] {
        let start = row * self.columns;
        &self.keys[start..start + self.columns]
    }

    pub fn keys(&self) -> &[u32] {
        &self.keys
    }
}

/// A grid together with the palette its keys index.
#[derive(Debug)]
pub struct LayerView<'a, C> {
    pub grid: &'a DenseGrid,
    pub palette: &'a [C],
}

// Manual impls: only references are copied, so `C` needs no bounds
impl<C> Clone for LayerView<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for LayerView<'_, C> {}

impl<'a, C: Drawable> LayerView<'a, C> {
    pub fn new(grid: &'a DenseGrid, palette: &'a [C]) -> Self {
        Self { grid, palette }
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cell(&self, column: usize, row: usize) -> &'a C {
        &self.palette[self.grid.get(column, row) as usize]
    }

    /// Cells of one row, left to right.
    pub fn row_cells(&self, row: usize) -> impl Iterator<Item = &'a C> + 'a {
        let palette = self.palette;
        self.grid.row(row).iter().map(move |&k| &palette[k as usize])
    }

    /// True when every cell of the layer is blank.
    pub fn is_empty(&self) -> bool {
        let blank: Vec<bool> = self.palette.iter().map(Drawable::is_blank).collect();
        self.grid.keys().iter().all(|&k| blank[k as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::tables::unset_color;

    fn terrain(id: &str, symbol: char) -> TerrainCell {
        TerrainCell {
            id: id.to_string(),
            name: id.to_string(),
            symbol,
            colors: unset_color(),
        }
    }

    #[test]
    fn test_fill_row_and_lookup() {
        let mut grid = DenseGrid::new(4, 3);
        grid.fill_row(1, 2, 3, 1);
        grid.set(0, 0, 1);
        let palette = vec![TerrainCell::filler(unset_color()), terrain("forest", 'F')];
        let view = LayerView::new(&grid, &palette);

        let last_row: String = view.row_cells(2).map(|c| c.symbol()).collect();
        assert_eq!(last_row, " FFF");
        assert_eq!(view.cell(0, 0).symbol(), 'F');
        assert_eq!(view.cell(3, 0).symbol(), ' ');
    }

    #[test]
    fn test_empty_layer_detection() {
        let palette = vec![
            TerrainCell::filler(unset_color()),
            terrain("empty_rock", ' '),
            terrain("open_air", ' '),
            terrain("field", '.'),
        ];

        let mut grid = DenseGrid::new(2, 2);
        grid.set(0, 0, 1);
        grid.set(1, 1, 2);
        assert!(LayerView::new(&grid, &palette).is_empty());

        grid.set(1, 0, 3);
        assert!(!LayerView::new(&grid, &palette).is_empty());
    }

    #[test]
    fn test_seen_cells() {
        let mut grid = DenseGrid::new(2, 1);
        let view = LayerView::new(&grid, &SEEN_PALETTE);
        assert!(view.is_empty());
        assert_eq!(view.cell(0, 0).colors().fg, UNSEEN_FG);

        grid.set(1, 0, SeenCell::key(true));
        let view = LayerView::new(&grid, &SEEN_PALETTE);
        assert!(!view.is_empty());
        assert_eq!(view.cell(1, 0).colors().bg, TRANSPARENT);
        let text: String = view.row_cells(0).map(|c| c.text_symbol()).collect();
        assert_eq!(text, "#.");
    }
}
