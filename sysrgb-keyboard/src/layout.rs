//! Fixed platform node table
//!
//! Maps the physical key grid of the laptop keyboard to the LED nodes the
//! kernel driver exposes. Per-key nodes are `rgb:kbd_backlight_<n>`; the
//! aggregate backlight is `rgb:kbd_backlight` and the lightbar `rgb:lightbar`.
//!
//! The table is a plain value passed into registry construction so tests can
//! swap it for a small synthetic keyboard.

use std::path::PathBuf;

use sysrgb_channel::{NodeSpec, DEFAULT_LEDS_ROOT};

/// Rows in the default key grid
pub const ROWS: usize = 7;
/// Columns in the default key grid
pub const COLUMNS: usize = 20;

/// Aggregate keyboard backlight node
pub const BACKLIGHT_NODE: &str = "rgb:kbd_backlight";
/// Lightbar node
pub const LIGHTBAR_NODE: &str = "rgb:lightbar";
/// Prefix of per-key nodes, followed by the key's node index
pub const KEY_NODE_PREFIX: &str = "rgb:kbd_backlight_";

/// Brightness ceiling of the aggregate backlight
pub const BACKLIGHT_MAX_BRIGHTNESS: u8 = 50;
/// Brightness ceiling of the lightbar
pub const LIGHTBAR_MAX_BRIGHTNESS: u8 = 100;

type Cell = Option<(&'static str, u8)>;

const fn k(name: &'static str, node: u8) -> Cell {
    Some((name, node))
}

const __: Cell = None;

/// Key grid, top-to-bottom, left-to-right. Wide keys repeat over the cells
/// they cover with the same name and node. Names are plain words so they
/// survive as profile keys.
#[rustfmt::skip]
const DEFAULT_LAYOUT: [[Cell; COLUMNS]; ROWS] = [
    // Row 0: function row
    [k("Esc", 105), k("F1", 106), k("F2", 107), k("F3", 108), k("F4", 109), k("F5", 110),
     k("F6", 111), k("F7", 112), k("F8", 113), k("F9", 114), k("F10", 115), k("F11", 116),
     k("F12", 117), k("PrtSc", 118), k("Ins", 119), k("Del", 120), k("Home", 121),
     k("End", 122), k("PgUp", 123), k("PgDn", 124)],
    // Row 1: number row
    [k("Grave", 84), k("1", 85), k("2", 86), k("3", 87), k("4", 88), k("5", 89), k("6", 90),
     k("7", 91), k("8", 92), k("9", 93), k("0", 94), k("Minus", 95), k("Equal", 96),
     k("Bksp", 98), k("Bksp", 98), k("Bksp", 98),
     k("NumLk", 99), k("KPDiv", 100), k("KPMul", 101), k("KPMinus", 102)],
    // Row 2
    [k("Tab", 63), k("Q", 65), k("W", 66), k("E", 67), k("R", 68), k("T", 69), k("Y", 70),
     k("U", 71), k("I", 72), k("O", 73), k("P", 74), k("LBracket", 75), k("RBracket", 76),
     k("Enter", 77), k("Enter", 77), k("Enter", 77),
     k("KP7", 78), k("KP8", 79), k("KP9", 80), k("KPPlus", 81)],
    // Row 3
    [k("Caps", 42), k("A", 44), k("S", 45), k("D", 46), k("F", 47), k("G", 48), k("H", 49),
     k("J", 50), k("K", 51), k("L", 52), k("Semicolon", 53), k("Quote", 54), k("Hash", 55),
     k("Enter", 77), k("Enter", 77), k("Enter", 77),
     k("KP4", 57), k("KP5", 58), k("KP6", 59), k("KPPlus", 81)],
    // Row 4
    [k("LShift", 22), k("Iso", 23), k("Z", 24), k("X", 25), k("C", 26), k("V", 27), k("B", 28),
     k("N", 29), k("M", 30), k("Comma", 31), k("Period", 32), k("Slash", 33), __,
     k("RShift", 35), k("RShift", 35), k("RShift", 35),
     k("KP1", 36), k("KP2", 37), k("KP3", 38), k("KPEnter", 39)],
    // Row 5: modifiers and space
    [__, k("LCtrl", 2), k("Super", 3), k("LAlt", 4),
     k("Space", 7), k("Space", 7), k("Space", 7), k("Space", 7), k("Space", 7), k("Space", 7),
     k("AltGr", 10), k("RCtrl", 12), k("RCtrl", 12), __, k("Up", 14), __,
     k("KP0", 16), k("KP0", 16), k("KPDot", 17), k("KPEnter", 39)],
    // Row 6: arrow cluster below the modifier row
    [__, __, __, __, __, __, __, __, __, __, __, __, __,
     k("Left", 13), k("Down", 18), k("Right", 15), __, __, __, __],
];

/// One occupied cell of the key grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySlot {
    /// Logical key name (e.g. "A", "F5")
    pub name: String,
    /// Driver node index, appended to the per-key node prefix
    pub node: u8,
}

impl KeySlot {
    pub fn new(name: impl Into<String>, node: u8) -> Self {
        Self {
            name: name.into(),
            node,
        }
    }
}

/// The set of LED nodes a keyboard exposes and where each key sits
#[derive(Debug, Clone)]
pub struct PlatformTable {
    /// LED class directory
    pub leds_root: PathBuf,
    /// Aggregate keyboard backlight (color + global brightness)
    pub backlight: NodeSpec,
    /// Lightbar (color + brightness)
    pub lightbar: NodeSpec,
    /// Per-key node name prefix
    pub key_node_prefix: String,
    /// Key grid rows, each a list of cells
    pub layout: Vec<Vec<Option<KeySlot>>>,
}

impl Default for PlatformTable {
    fn default() -> Self {
        Self {
            leds_root: PathBuf::from(DEFAULT_LEDS_ROOT),
            backlight: NodeSpec::with_brightness(BACKLIGHT_NODE, Some(BACKLIGHT_MAX_BRIGHTNESS)),
            lightbar: NodeSpec::with_brightness(LIGHTBAR_NODE, Some(LIGHTBAR_MAX_BRIGHTNESS)),
            key_node_prefix: KEY_NODE_PREFIX.to_string(),
            layout: DEFAULT_LAYOUT
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| cell.map(|(name, node)| KeySlot::new(name, node)))
                        .collect()
                })
                .collect(),
        }
    }
}

impl PlatformTable {
    /// Default table with a custom LED class directory
    pub fn with_leds_root(root: impl Into<PathBuf>) -> Self {
        Self {
            leds_root: root.into(),
            ..Self::default()
        }
    }

    /// Default node names around a custom key grid
    pub fn with_layout(layout: Vec<Vec<Option<KeySlot>>>) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Node spec of a per-key LED
    pub fn key_node(&self, index: u8) -> NodeSpec {
        NodeSpec::color_only(format!("{}{}", self.key_node_prefix, index))
    }

    /// Widest row of the grid
    pub fn columns(&self) -> usize {
        self.layout.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Occupied cells with their (row, column) position, in layout order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &KeySlot)> {
        self.layout.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.as_ref().map(|slot| (row, col, slot)))
        })
    }
}
