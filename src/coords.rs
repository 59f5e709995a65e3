//! Chunk bounds and the chunk/cell to flat-index arithmetic.
//!
//! Chunk coordinates are signed and sparse; dense grids are addressed by
//! unsigned column/row with the bounding rectangle's top-left chunk at (0, 0).

use serde::{Deserialize, Serialize};

/// Cells along one edge of a chunk
pub const CHUNK_SIZE: usize = 180;
/// Cells in one layer of one chunk
pub const CELLS_PER_LAYER: usize = CHUNK_SIZE * CHUNK_SIZE;
/// Vertical layers per chunk
pub const LAYER_COUNT: usize = 21;

/// Bounding rectangle of a save, in chunk units.
///
/// Always contains the origin chunk, so `min_x <= 0 <= max_x` and
/// `min_y <= 0 <= max_y` hold even for a save with no chunks at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl ChunkBounds {
    /// Bounds of a set of chunk coordinates, origin included.
    pub fn from_coords<I>(coords: I) -> Self
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        coords
            .into_iter()
            .fold(ChunkBounds::default(), |b, (x, y)| ChunkBounds {
                min_x: b.min_x.min(x),
                max_x: b.max_x.max(x),
                min_y: b.min_y.min(y),
                max_y: b.max_y.max(y),
            })
    }

    /// Chunk columns covered
    pub fn chunks_x(&self) -> usize {
        (self.max_x - self.min_x + 1) as usize
    }

    /// Chunk rows covered
    pub fn chunks_y(&self) -> usize {
        (self.max_y - self.min_y + 1) as usize
    }

    /// Dense grid width in cells
    pub fn columns(&self) -> usize {
        self.chunks_x() * CHUNK_SIZE
    }

    /// Dense grid height in cells
    pub fn rows(&self) -> usize {
        self.chunks_y() * CHUNK_SIZE
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    /// Linear index of chunk (x, y): `(x - min_x) + chunks_x * (y - min_y)`.
    pub fn chunk_index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        let dx = (x - self.min_x) as usize;
        let dy = (y - self.min_y) as usize;
        Some(dx + self.chunks_x() * dy)
    }

    /// Grid column/row of the top-left cell of the chunk at `chunk_index`.
    pub fn chunk_origin(&self, chunk_index: usize) -> (usize, usize) {
        let cx = chunk_index % self.chunks_x();
        let cy = chunk_index / self.chunks_x();
        (cx * CHUNK_SIZE, cy * CHUNK_SIZE)
    }

    /// Grid column/row of in-chunk offset `offset` (row-major, 0..32400).
    pub fn cell_position(&self, chunk_index: usize, offset: usize) -> (usize, usize) {
        let (col0, row0) = self.chunk_origin(chunk_index);
        (col0 + offset % CHUNK_SIZE, row0 + offset / CHUNK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_always_included() {
        let b = ChunkBounds::from_coords([(3, 2), (5, 4)]);
        assert_eq!(b, ChunkBounds { min_x: 0, max_x: 5, min_y: 0, max_y: 4 });
        assert_eq!((b.chunks_x(), b.chunks_y()), (6, 5));

        let b = ChunkBounds::from_coords([(-2, -1)]);
        assert_eq!(b, ChunkBounds { min_x: -2, max_x: 0, min_y: -1, max_y: 0 });
        assert_eq!((b.columns(), b.rows()), (540, 360));

        let b = ChunkBounds::from_coords(std::iter::empty());
        assert_eq!((b.columns(), b.rows()), (180, 180));
    }

    #[test]
    fn test_chunk_index_boundaries() {
        let b = ChunkBounds { min_x: -1, max_x: 1, min_y: -2, max_y: 0 };
        assert_eq!(b.chunk_index(-1, -2), Some(0));
        assert_eq!(b.chunk_index(1, -2), Some(2));
        assert_eq!(b.chunk_index(-1, -1), Some(3));
        assert_eq!(b.chunk_index(1, 0), Some(8));
        assert_eq!(b.chunk_index(2, 0), None);
        assert_eq!(b.chunk_index(0, 1), None);
        assert_eq!(b.chunk_origin(8), (360, 360));
    }

    #[test]
    fn test_cell_position_boundaries() {
        let b = ChunkBounds { min_x: 0, max_x: 1, min_y: 0, max_y: 0 };
        let east = b.chunk_index(1, 0).unwrap();
        assert_eq!(b.cell_position(east, 0), (180, 0));
        assert_eq!(b.cell_position(east, CHUNK_SIZE - 1), (359, 0));
        assert_eq!(b.cell_position(east, CHUNK_SIZE), (180, 1));
        assert_eq!(b.cell_position(east, CELLS_PER_LAYER - 1), (359, 179));
    }
}
