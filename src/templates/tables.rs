//! Static lookup tables: glyph codes, rotation groups, connector glyphs and
//! the named colour palette.
//!
//! All tables are immutable after first use.

use std::collections::HashMap;
use std::sync::LazyLock;

use image::Rgba;

/// ncurses line-drawing codes as they appear in game data `sym` fields.
const LINE_DRAWING: &[(u32, char)] = &[
    (4194424, '│'),
    (4194417, '─'),
    (4194413, '└'),
    (4194412, '┌'),
    (4194411, '┐'),
    (4194410, '┘'),
    (4194420, '├'),
    (4194422, '┴'),
    (4194421, '┤'),
    (4194423, '┬'),
    (4194414, '┼'),
];

static SYMBOLS: LazyLock<HashMap<u32, char>> = LazyLock::new(|| {
    let mut symbols: HashMap<u32, char> = LINE_DRAWING.iter().copied().collect();
    for code in 0u8..128 {
        symbols.insert(code as u32, code as char);
    }
    symbols
});

/// Glyph for a numeric `sym` code.
///
/// Line-drawing codes and ASCII come from the table; any other valid
/// code point is used as-is.
pub fn glyph_for_code(code: u32) -> Option<char> {
    SYMBOLS.get(&code).copied().or_else(|| char::from_u32(code))
}

/// Four glyphs related by 90° clockwise rotation, north first.
pub const ROTATION_GROUPS: [[char; 4]; 4] = [
    ['<', '^', '>', 'v'],
    ['┘', '└', '┌', '┐'],
    ['─', '│', '─', '│'],
    ['├', '┬', '┤', '┴'],
];

pub const ROTATION_SUFFIXES: [&str; 4] = ["_north", "_east", "_south", "_west"];

/// Glyph for rotation step `step` (0 = north .. 3 = west) of `base`.
///
/// A base glyph outside every rotation group is kept unrotated.
pub fn rotated_glyph(base: char, step: usize) -> char {
    ROTATION_GROUPS
        .iter()
        .find_map(|group| {
            group
                .iter()
                .position(|&g| g == base)
                .map(|i| group[(step + i) % 4])
        })
        .unwrap_or(base)
}

/// Connector variants generated for LINEAR terrain, with their fixed glyphs.
pub const LINEAR_SUFFIXES: [(&str, char); 16] = [
    ("_isolated", 'o'),
    ("_end_south", '│'),
    ("_end_west", '─'),
    ("_ne", '└'),
    ("_end_north", '│'),
    ("_ns", '│'),
    ("_es", '┌'),
    ("_nes", '├'),
    ("_end_east", '─'),
    ("_wn", '┘'),
    ("_ew", '─'),
    ("_new", '┴'),
    ("_sw", '┐'),
    ("_nsw", '┤'),
    ("_esw", '┬'),
    ("_nesw", '┼'),
];

/// Foreground/background colour pair for a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorPair {
    pub fg: Rgba<u8>,
    pub bg: Rgba<u8>,
}

impl ColorPair {
    const fn new(fg: Rgba<u8>, bg: Rgba<u8>) -> Self {
        Self { fg, bg }
    }
}

pub const UNSET_COLOR: &str = "unset";

const fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

pub const BLACK: Rgba<u8> = rgb(0, 0, 0);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

static COLORS: LazyLock<HashMap<&'static str, ColorPair>> = LazyLock::new(|| {
    let white = rgb(150, 150, 150);
    let black = BLACK;
    let red = rgb(255, 0, 0);
    let green = rgb(0, 110, 0);
    let brown = rgb(92, 51, 23);
    let blue = rgb(0, 0, 200);
    let magenta = rgb(139, 58, 98);
    let cyan = rgb(0, 150, 180);
    let gray = rgb(150, 150, 150);
    let dark_gray = rgb(99, 99, 99);
    let light_red = rgb(255, 150, 150);
    let light_green = rgb(0, 255, 0);
    let yellow = rgb(255, 255, 0);
    let light_blue = rgb(100, 100, 255);
    let light_magenta = rgb(254, 0, 254);
    let light_cyan = rgb(0, 240, 255);

    HashMap::from([
        ("black_yellow", ColorPair::new(black, yellow)),
        ("blue", ColorPair::new(blue, black)),
        ("brown", ColorPair::new(brown, black)),
        ("c_yellow_green", ColorPair::new(yellow, green)),
        ("cyan", ColorPair::new(cyan, black)),
        ("dark_gray", ColorPair::new(dark_gray, black)),
        ("dark_gray_magenta", ColorPair::new(dark_gray, magenta)),
        ("green", ColorPair::new(green, black)),
        ("h_dark_gray", ColorPair::new(dark_gray, black)),
        ("h_yellow", ColorPair::new(yellow, black)),
        ("i_blue", ColorPair::new(black, blue)),
        ("i_brown", ColorPair::new(black, brown)),
        ("i_cyan", ColorPair::new(black, cyan)),
        ("i_green", ColorPair::new(black, green)),
        ("i_light_blue", ColorPair::new(black, light_blue)),
        ("i_light_cyan", ColorPair::new(black, light_cyan)),
        ("i_light_gray", ColorPair::new(black, gray)),
        ("i_light_green", ColorPair::new(black, light_green)),
        ("i_light_red", ColorPair::new(black, light_red)),
        ("i_magenta", ColorPair::new(black, magenta)),
        ("i_pink", ColorPair::new(black, light_magenta)),
        ("i_red", ColorPair::new(black, red)),
        ("i_yellow", ColorPair::new(black, yellow)),
        ("light_blue", ColorPair::new(light_blue, black)),
        ("light_cyan", ColorPair::new(light_cyan, black)),
        ("light_gray", ColorPair::new(gray, black)),
        ("light_green", ColorPair::new(light_green, black)),
        ("light_green_yellow", ColorPair::new(light_green, yellow)),
        ("light_red", ColorPair::new(light_red, black)),
        ("magenta", ColorPair::new(magenta, black)),
        ("pink", ColorPair::new(light_magenta, black)),
        ("pink_magenta", ColorPair::new(light_magenta, magenta)),
        ("red", ColorPair::new(red, black)),
        ("white", ColorPair::new(white, black)),
        ("white_magenta", ColorPair::new(white, magenta)),
        ("white_white", ColorPair::new(white, white)),
        ("yellow", ColorPair::new(yellow, black)),
        ("yellow_cyan", ColorPair::new(yellow, cyan)),
        ("yellow_magenta", ColorPair::new(yellow, magenta)),
        (UNSET_COLOR, ColorPair::new(white, black)),
    ])
});

/// Look up a named colour pair.
pub fn named_color(name: &str) -> Option<ColorPair> {
    COLORS.get(name).copied()
}

/// The pair used for unknown terrain and unknown colour names.
pub fn unset_color() -> ColorPair {
    COLORS[UNSET_COLOR]
}
