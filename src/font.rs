//! Cell glyphs: a 5x7 bitmap font scaled up to the cell, plus box-drawing
//! glyphs drawn procedurally so connected lines meet across cells.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::config::CellMetrics;

/// Bitmap pixels are drawn as SCALE x SCALE blocks
const SCALE: u32 = 3;
const FONT_WIDTH: u32 = 5;
/// Offset of the scaled bitmap inside the cell
const ORIGIN_X: u32 = 3;
const ORIGIN_Y: u32 = 1;
/// Stroke width of box-drawing lines
const LINE_WIDTH: u32 = 2;

/// Glyph drawn for characters the font does not have
const FALLBACK: char = '?';

// Each entry is 7 rows of 5-bit patterns (MSB = leftmost pixel)
const FONT_5X7: &[(char, [u8; 7])] = &[
    ('!', [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100]),
    ('"', [0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('#', [0b01010, 0b11111, 0b01010, 0b01010, 0b11111, 0b01010, 0b00000]),
    ('$', [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100]),
    ('%', [0b11001, 0b11010, 0b00100, 0b01000, 0b01011, 0b10011, 0b00000]),
    ('&', [0b01100, 0b10010, 0b01100, 0b10110, 0b10001, 0b10001, 0b01110]),
    ('\'', [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('(', [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010]),
    (')', [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000]),
    ('*', [0b00000, 0b10101, 0b01110, 0b11111, 0b01110, 0b10101, 0b00000]),
    ('+', [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000]),
    (',', [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100, 0b11000]),
    ('-', [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000]),
    ('.', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100]),
    ('/', [0b00001, 0b00010, 0b00100, 0b00100, 0b01000, 0b10000, 0b00000]),
    ('0', [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
    ('1', [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('2', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('3', [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
    ('4', [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
    ('5', [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
    ('6', [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
    ('7', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
    ('8', [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
    ('9', [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
    (':', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000]),
    (';', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b11000]),
    ('<', [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010]),
    ('=', [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000]),
    ('>', [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000]),
    ('?', [0b01110, 0b10001, 0b00001, 0b00110, 0b00100, 0b00000, 0b00100]),
    ('@', [0b01110, 0b10001, 0b10111, 0b10101, 0b10111, 0b10000, 0b01110]),
    ('A', [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('B', [0b11110, 0b10001, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110]),
    ('C', [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
    ('D', [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110]),
    ('E', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
    ('F', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('G', [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110]),
    ('H', [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('I', [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('J', [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
    ('K', [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
    ('L', [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
    ('M', [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
    ('N', [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001]),
    ('O', [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('P', [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('Q', [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101]),
    ('R', [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
    ('S', [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110]),
    ('T', [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('U', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('V', [0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100]),
    ('W', [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001]),
    ('X', [0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b01010, 0b10001]),
    ('Y', [0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('Z', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
    ('[', [0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110]),
    ('\\', [0b10000, 0b01000, 0b00100, 0b00100, 0b00010, 0b00001, 0b00000]),
    (']', [0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110]),
    ('^', [0b00100, 0b01010, 0b10001, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('_', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111]),
    ('`', [0b01000, 0b00100, 0b00010, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('a', [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111]),
    ('b', [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110]),
    ('c', [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110]),
    ('d', [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111]),
    ('e', [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110]),
    ('f', [0b00110, 0b01001, 0b01000, 0b11100, 0b01000, 0b01000, 0b01000]),
    ('g', [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110]),
    ('h', [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001]),
    ('i', [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('j', [0b00010, 0b00000, 0b00110, 0b00010, 0b00010, 0b10010, 0b01100]),
    ('k', [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010]),
    ('l', [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('m', [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001]),
    ('n', [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001]),
    ('o', [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('p', [0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('q', [0b00000, 0b01111, 0b10001, 0b01111, 0b00001, 0b00001, 0b00001]),
    ('r', [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000]),
    ('s', [0b00000, 0b00000, 0b01110, 0b10000, 0b01110, 0b00001, 0b11110]),
    ('t', [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110]),
    ('u', [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101]),
    ('v', [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
    ('w', [0b00000, 0b00000, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010]),
    ('x', [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001]),
    ('y', [0b00000, 0b10001, 0b10001, 0b01111, 0b00001, 0b10001, 0b01110]),
    ('z', [0b00000, 0b00000, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('{', [0b00110, 0b00100, 0b00100, 0b01000, 0b00100, 0b00100, 0b00110]),
    ('|', [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('}', [0b01100, 0b00100, 0b00100, 0b00010, 0b00100, 0b00100, 0b01100]),
    ('~', [0b00000, 0b01000, 0b10101, 0b00010, 0b00000, 0b00000, 0b00000]),
    ('░', [0b10101, 0b01010, 0b10101, 0b01010, 0b10101, 0b01010, 0b10101]),
    ('▓', [0b11011, 0b01110, 0b11011, 0b01110, 0b11011, 0b01110, 0b11011]),
    ('≈', [0b00000, 0b01010, 0b10101, 0b00000, 0b01010, 0b10101, 0b00000]),
];

static FONT: LazyLock<HashMap<char, [u8; 7]>> = LazyLock::new(|| FONT_5X7.iter().copied().collect());

/// Arms of a box-drawing glyph: north, east, south, west.
fn box_arms(ch: char) -> Option<[bool; 4]> {
    let arms = match ch {
        '│' => [true, false, true, false],
        '─' => [false, true, false, true],
        '└' => [true, true, false, false],
        '┌' => [false, true, true, false],
        '┐' => [false, false, true, true],
        '┘' => [true, false, false, true],
        '├' => [true, true, true, false],
        '┤' => [true, false, true, true],
        '┬' => [false, true, true, true],
        '┴' => [true, true, false, true],
        '┼' => [true, true, true, true],
        _ => return None,
    };
    Some(arms)
}

/// Foreground pixels of one glyph, relative to the cell's top-left corner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMask {
    pub pixels: Vec<(u32, u32)>,
}

impl GlyphMask {
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    fn bitmap(rows: &[u8; 7]) -> Self {
        let mut pixels = Vec::new();
        for (row, &bits) in rows.iter().enumerate() {
            for col in 0..FONT_WIDTH {
                if bits & (0b10000 >> col) == 0 {
                    continue;
                }
                for dy in 0..SCALE {
                    for dx in 0..SCALE {
                        pixels.push((
                            ORIGIN_X + col * SCALE + dx,
                            ORIGIN_Y + row as u32 * SCALE + dy,
                        ));
                    }
                }
            }
        }
        Self { pixels }
    }

    /// Lines from the cell centre to the edges named by `arms`.
    fn box_lines(arms: [bool; 4], width: u32, height: u32) -> Self {
        let cx = width / 2 - LINE_WIDTH / 2;
        let cy = height / 2 - LINE_WIDTH / 2;
        let mut pixels = Vec::new();
        let [north, east, south, west] = arms;

        let mut rect = |x0: u32, y0: u32, x1: u32, y1: u32| {
            for y in y0..y1 {
                for x in x0..x1 {
                    if !pixels.contains(&(x, y)) {
                        pixels.push((x, y));
                    }
                }
            }
        };
        if north {
            rect(cx, 0, cx + LINE_WIDTH, cy + LINE_WIDTH);
        }
        if south {
            rect(cx, cy, cx + LINE_WIDTH, height);
        }
        if west {
            rect(0, cy, cx + LINE_WIDTH, cy + LINE_WIDTH);
        }
        if east {
            rect(cx, cy, width, cy + LINE_WIDTH);
        }
        Self { pixels }
    }
}

/// Builds and memoises glyph masks for one cell size.
#[derive(Clone, Debug)]
pub struct GlyphAtlas {
    width: u32,
    height: u32,
    masks: HashMap<char, GlyphMask>,
}

impl GlyphAtlas {
    pub fn new(metrics: &CellMetrics) -> Self {
        Self {
            width: metrics.overprint_width,
            height: metrics.cell_height,
            masks: HashMap::new(),
        }
    }

    /// Mask for `ch`, built on first use.
    pub fn mask(&mut self, ch: char) -> &GlyphMask {
        let (width, height) = (self.width, self.height);
        self.masks.entry(ch).or_insert_with(|| build_mask(ch, width, height))
    }
}

fn build_mask(ch: char, width: u32, height: u32) -> GlyphMask {
    if ch == ' ' {
        return GlyphMask::default();
    }
    if let Some(arms) = box_arms(ch) {
        return GlyphMask::box_lines(arms, width, height);
    }
    let rows = FONT
        .get(&ch)
        .or_else(|| FONT.get(&ch.to_ascii_uppercase()))
        .or_else(|| FONT.get(&FALLBACK));
    let mut mask = rows.map(GlyphMask::bitmap).unwrap_or_default();
    mask.pixels.retain(|&(x, y)| x < width && y < height);
    mask
}
