use bit_set::BitSet;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use thiserror::Error;

use crate::backtracking_search::Assignment;
use crate::word_list::WordList;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the `GridConfig`'s `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed row and column for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A maximal run of fillable cells that needs exactly one word. A slot is identified by its start
/// cell and direction.
#[derive(Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
    pub cells: SmallVec<[GridCoord; MAX_SLOT_LENGTH]>,
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,
}

impl Debug for SlotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotConfig")
            .field("id", &self.id)
            .field("start_cell", &self.start_cell)
            .field("direction", &self.direction)
            .field("length", &self.length)
            .field("crossings", &self.crossings)
            .finish()
    }
}

/// The static shape of a puzzle: which cells are fillable, and the slots and crossings derived
/// from them. Nothing here changes once the config is built.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub structure: Vec<Vec<bool>>,
    pub slot_configs: Vec<SlotConfig>,
}

impl GridConfig {
    /// Derive the slots for a grid where `structure[row][col]` is true for fillable cells. Across
    /// slots come first in reading order, followed by down slots in reading order of their start
    /// cells. Rows are expected to all have the same length.
    pub fn new(structure: Vec<Vec<bool>>) -> GridConfig {
        let height = structure.len();
        let width = structure.first().map(|row| row.len()).unwrap_or(0);
        let is_open = |row: usize, col: usize| structure[row][col];

        let mut runs: Vec<(GridCoord, Direction, usize)> = vec![];

        for row in 0..height {
            for col in 0..width {
                if is_open(row, col) && (col == 0 || !is_open(row, col - 1)) {
                    let length = (col..width).take_while(|&c| is_open(row, c)).count();
                    if length > 1 {
                        runs.push(((row, col), Direction::Across, length));
                    }
                }
            }
        }
        for row in 0..height {
            for col in 0..width {
                if is_open(row, col) && (row == 0 || !is_open(row - 1, col)) {
                    let length = (row..height).take_while(|&r| is_open(r, col)).count();
                    if length > 1 {
                        runs.push(((row, col), Direction::Down, length));
                    }
                }
            }
        }

        let cells_by_slot: Vec<SmallVec<[GridCoord; MAX_SLOT_LENGTH]>> = runs
            .iter()
            .map(|&(start_cell, direction, length)| cell_coords(start_cell, direction, length))
            .collect();

        // Build a map from cell location to the slots passing through it, which we can then use to
        // calculate crossings.
        let mut slots_by_loc: HashMap<GridCoord, Vec<(SlotId, usize)>> = HashMap::new();
        for (slot_id, cells) in cells_by_slot.iter().enumerate() {
            for (cell_idx, &loc) in cells.iter().enumerate() {
                slots_by_loc.entry(loc).or_default().push((slot_id, cell_idx));
            }
        }

        let slot_configs = runs
            .into_iter()
            .zip(cells_by_slot)
            .enumerate()
            .map(|(id, ((start_cell, direction, length), cells))| {
                let crossings = cells
                    .iter()
                    .map(|loc| {
                        slots_by_loc[loc]
                            .iter()
                            .find(|&&(other_slot_id, _)| other_slot_id != id)
                            .map(|&(other_slot_id, other_slot_cell)| Crossing {
                                other_slot_id,
                                other_slot_cell,
                            })
                    })
                    .collect();

                SlotConfig {
                    id,
                    start_cell,
                    direction,
                    length,
                    cells,
                    crossings,
                }
            })
            .collect();

        GridConfig {
            width,
            height,
            structure,
            slot_configs,
        }
    }

    /// All slots in the puzzle, indexed by `SlotId`.
    pub fn slots(&self) -> &[SlotConfig] {
        &self.slot_configs
    }

    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    /// The set of slots sharing a cell with the given slot.
    pub fn neighbors(&self, slot_id: SlotId) -> BitSet {
        self.slot_configs[slot_id]
            .crossings
            .iter()
            .flatten()
            .map(|crossing| crossing.other_slot_id)
            .collect()
    }

    pub fn neighbor_count(&self, slot_id: SlotId) -> usize {
        self.slot_configs[slot_id].crossings.iter().flatten().count()
    }

    /// If the two slots cross, the index of the shared cell within `a` and within `b`.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        if a == b {
            return None;
        }

        self.slot_configs[a]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == b => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }
}

/// Generate the coords for each cell of a slot.
fn cell_coords(
    start_cell: GridCoord,
    direction: Direction,
    length: usize,
) -> SmallVec<[GridCoord; MAX_SLOT_LENGTH]> {
    (0..length)
        .map(|cell_idx| match direction {
            Direction::Across => (start_cell.0, start_cell.1 + cell_idx),
            Direction::Down => (start_cell.0 + cell_idx, start_cell.1),
        })
        .collect()
}

/// Problems with a grid template that keep us from building a `GridConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Grid must have at least one row")]
    Empty,

    #[error("Row {row} has {found} cells, but the first row has {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Generate a grid config from a string template, with `_` or `.` representing fillable cells and
/// anything else (conventionally `#`) representing blocks. Blank lines are ignored.
pub fn generate_grid_config_from_template_string(
    template: &str,
) -> Result<GridConfig, TemplateError> {
    let structure: Vec<Vec<bool>> = template
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().map(|c| c == '_' || c == '.').collect())
        .collect();

    let expected = structure.first().ok_or(TemplateError::Empty)?.len();
    if let Some((row, found)) = structure
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|&(_, len)| len != expected)
    {
        return Err(TemplateError::RaggedRows {
            row,
            expected,
            found,
        });
    }

    Ok(GridConfig::new(structure))
}

/// Turn the given grid config and assignment into a rendered string, with `█` for blocks and a
/// space for any fillable cell the assignment doesn't cover.
pub fn render_grid(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> String {
    let mut grid: Vec<Vec<char>> = config
        .structure
        .iter()
        .map(|row| row.iter().map(|&open| if open { ' ' } else { '█' }).collect())
        .collect();

    for choice in assignment.choices() {
        let slot_config = &config.slot_configs[choice.slot_id];
        let word = word_list.word(choice.word_id);

        for (&(row, col), &glyph) in slot_config.cells.iter().zip(&word.glyphs) {
            grid[row][col] = word_list.glyphs[glyph];
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
