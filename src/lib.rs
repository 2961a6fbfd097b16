pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod grid_config;
pub mod word_list;

pub use backtracking_search::{
    find_fill, solve, Assignment, Choice, FillFailure, FillOptions, FillSuccess, Statistics,
};
pub use grid_config::{
    generate_grid_config_from_template_string, render_grid, Direction, GridConfig, SlotConfig,
    SlotId, TemplateError,
};
pub use word_list::{WordId, WordList};

/// The expected maximum number of distinct characters appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 64;

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
