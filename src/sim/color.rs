//! Block/player color palette

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The colors a block or the player disc can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockColor {
    #[default]
    Red,
    Green,
    Blue,
    Yellow,
}

impl BlockColor {
    /// Palette in cycling order
    pub const ALL: [BlockColor; 4] = [
        BlockColor::Red,
        BlockColor::Green,
        BlockColor::Blue,
        BlockColor::Yellow,
    ];

    /// Next color in the cycle (wraps around)
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn index(self) -> usize {
        match self {
            BlockColor::Red => 0,
            BlockColor::Green => 1,
            BlockColor::Blue => 2,
            BlockColor::Yellow => 3,
        }
    }

    /// Pick a palette color uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Display color (linear RGBA)
    pub fn rgba(self) -> [f32; 4] {
        match self {
            BlockColor::Red => [0.95, 0.25, 0.3, 1.0],
            BlockColor::Green => [0.25, 0.85, 0.45, 1.0],
            BlockColor::Blue => [0.25, 0.5, 1.0, 1.0],
            BlockColor::Yellow => [1.0, 0.85, 0.2, 1.0],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockColor::Red => "red",
            BlockColor::Green => "green",
            BlockColor::Blue => "blue",
            BlockColor::Yellow => "yellow",
        }
    }
}
