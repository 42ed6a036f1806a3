//! Level grids and board generation
//!
//! A level is a list of rows; each character is one grid cell: `_` for an
//! empty cell or a block color symbol (`B`, `R`, `G`, `Y`, `P`).

use std::fmt;

use super::geometry::Rect;
use super::state::{Block, BlockColor, GameState};
use crate::config::Config;

/// Empty cell marker
pub const EMPTY_CELL: char = '_';

/// Built-in level sequence
pub const LEVELS: &[&[&str]] = &[
    &["_G_____RR_____B_"],
    &["GGRR___BP___YYGG", "RR____________RR", "BRGYPBRGYPBRGYPB"],
    &["BRGYPBRGYPBRGYPB", "RRRBBBGGGGYYYPPP"],
    &[
        "PPPPPPPPPPPPPPPP",
        "Y______YY______Y",
        "Y_BBBB_YY_GGGG_Y",
        "Y______YY______Y",
        "RRRRRRRRRRRRRRRR",
    ],
    &[
        "__PP________PP__",
        "_YYYY______YYYY_",
        "BBBBBBBBBBBBBBBB",
        "G_G_G_G_G_G_G_G_",
        "_R_R_R_R_R_R_R_R",
        "YYYYPPPPPPPPYYYY",
    ],
];

/// Problems found in a level grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// The level has no blocks at all
    NoBlocks,
    /// A cell holds a character outside the palette
    UnknownSymbol { row: usize, column: usize, symbol: char },
    /// A row has more cells than fit across the arena
    RowTooWide { row: usize, len: usize, max: usize },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::NoBlocks => write!(f, "level contains no blocks"),
            LevelError::UnknownSymbol { row, column, symbol } => {
                write!(f, "unknown symbol {symbol:?} at row {row}, column {column}")
            }
            LevelError::RowTooWide { row, len, max } => {
                write!(f, "row {row} has {len} cells, at most {max} fit")
            }
        }
    }
}

impl std::error::Error for LevelError {}

/// Check a level grid against the palette and the arena width
pub fn validate_level<S: AsRef<str>>(rows: &[S], columns: usize) -> Result<(), LevelError> {
    let mut blocks = 0;
    for (row, line) in rows.iter().enumerate() {
        let line = line.as_ref();
        let len = line.chars().count();
        if len > columns {
            return Err(LevelError::RowTooWide { row, len, max: columns });
        }
        for (column, symbol) in line.chars().enumerate() {
            if symbol == EMPTY_CELL {
                continue;
            }
            if BlockColor::from_symbol(symbol).is_none() {
                return Err(LevelError::UnknownSymbol { row, column, symbol });
            }
            blocks += 1;
        }
    }

    if blocks == 0 {
        return Err(LevelError::NoBlocks);
    }
    Ok(())
}

/// Block cells of a grid, in row-major order
///
/// Characters outside the palette are treated as empty; `validate_level`
/// is where they get rejected.
pub fn layout_cells<S: AsRef<str>>(rows: &[S], config: &Config) -> Vec<(Rect, BlockColor)> {
    let top = config.block_top();
    let mut cells = Vec::new();

    for (row, line) in rows.iter().enumerate() {
        let y = top + row as f32 * config.block_row_spacing;
        for (column, symbol) in line.as_ref().chars().enumerate() {
            if symbol == EMPTY_CELL {
                continue;
            }
            match BlockColor::from_symbol(symbol) {
                Some(color) => {
                    let x = column as f32 * config.block_width;
                    cells.push((Rect::new(x, y, config.block_width, config.block_height), color));
                }
                None => log::warn!("Skipping unknown level symbol {symbol:?}"),
            }
        }
    }

    cells
}

/// Replace the block set with the layout of the current level
pub fn generate_board(state: &mut GameState) {
    let config = state.config();
    let reward_per_hp = config.block_reward_per_hp;
    let cells = layout_cells(&config.levels[state.level_index], config);

    state.blocks.clear();
    for (rect, color) in cells {
        let id = state.next_entity_id();
        state.blocks.push(Block::new(id, rect, color, reward_per_hp));
    }

    log::info!(
        "Level {}: {} blocks",
        state.level_index + 1,
        state.blocks.len()
    );
}
