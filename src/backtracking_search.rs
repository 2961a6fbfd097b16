use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, trace};
use smallvec::SmallVec;
use std::cmp::Reverse;
use thiserror::Error;

use crate::arc_consistency::ac3;
use crate::domains::{DomainStore, GlyphCountsByCell};
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};
use crate::MAX_SLOT_COUNT;

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial or complete mapping from slots to words, kept as a stack of choices so that the
/// search can undo its most recent choice when a branch fails.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    choices: SmallVec<[Choice; MAX_SLOT_COUNT]>,
    filled_slot_ids: BitSet,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// Record a choice. Each slot can only hold one word at a time, so a choice for a slot that's
    /// already filled is refused and this returns false.
    #[must_use]
    pub fn push(&mut self, choice: Choice) -> bool {
        if !self.filled_slot_ids.insert(choice.slot_id) {
            return false;
        }
        self.choices.push(choice);
        true
    }

    /// Undo the most recent choice.
    pub fn pop(&mut self) -> Option<Choice> {
        let choice = self.choices.pop()?;
        self.filled_slot_ids.remove(choice.slot_id);
        Some(choice)
    }

    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.filled_slot_ids.contains(slot_id)
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        if !self.contains(slot_id) {
            return None;
        }
        self.choices
            .iter()
            .find(|choice| choice.slot_id == slot_id)
            .map(|choice| choice.word_id)
    }

    /// The choices in the order they were made.
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn is_complete(&self, config: &GridConfig) -> bool {
        (0..config.slot_count()).all(|slot_id| self.filled_slot_ids.contains(slot_id))
    }

    /// The chosen word for each assigned slot, ordered by slot id.
    pub fn words<'a>(&self, word_list: &'a WordList) -> Vec<(SlotId, &'a str)> {
        let mut words: Vec<_> = self
            .choices
            .iter()
            .map(|choice| (choice.slot_id, word_list.word(choice.word_id).string.as_str()))
            .collect();
        words.sort_by_key(|&(slot_id, _)| slot_id);
        words
    }
}

/// Can these two choices (for different slots) sit in the same assignment? They can't share a
/// word, and if their slots cross they have to agree on the shared letter.
fn choices_are_compatible(
    config: &GridConfig,
    word_list: &WordList,
    choice: &Choice,
    other: &Choice,
) -> bool {
    if choice.word_id == other.word_id {
        return false;
    }

    match config.overlap(choice.slot_id, other.slot_id) {
        Some((cell_idx, other_cell_idx)) => {
            let glyph = word_list.word(choice.word_id).glyphs.get(cell_idx);
            let other_glyph = word_list.word(other.word_id).glyphs.get(other_cell_idx);
            glyph == other_glyph
        }
        None => true,
    }
}

fn fits_slot(config: &GridConfig, word_list: &WordList, choice: &Choice) -> bool {
    word_list.word(choice.word_id).len() == config.slot_configs[choice.slot_id].length
}

/// Would adding `choice` to an already-consistent assignment keep it consistent?
pub fn choice_is_consistent(
    config: &GridConfig,
    word_list: &WordList,
    assignment: &Assignment,
    choice: &Choice,
) -> bool {
    fits_slot(config, word_list, choice)
        && assignment
            .choices()
            .iter()
            .filter(|other| other.slot_id != choice.slot_id)
            .all(|other| choices_are_compatible(config, word_list, choice, other))
}

/// Is the (possibly partial) assignment consistent? Every word must fit its slot, no word may be
/// used twice, crossing slots must agree on their shared letter, and no slot may hold two words.
/// Unassigned slots are ignored.
pub fn consistent(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> bool {
    let choices = assignment.choices();

    choices.iter().enumerate().all(|(idx, choice)| {
        fits_slot(config, word_list, choice)
            && choices[idx + 1..].iter().all(|other| {
                other.slot_id != choice.slot_id
                    && choices_are_compatible(config, word_list, choice, other)
            })
    })
}

/// Choose the unassigned slot with the fewest remaining options, breaking ties in favor of the
/// slot crossing the most others and then the lowest slot id. Returns `None` once every slot is
/// assigned.
pub fn select_unassigned_slot(
    config: &GridConfig,
    domains: &DomainStore,
    assignment: &Assignment,
) -> Option<SlotId> {
    config
        .slots()
        .iter()
        .map(|slot_config| slot_config.id)
        .filter(|&slot_id| !assignment.contains(slot_id))
        .min_by_key(|&slot_id| (domains.len(slot_id), Reverse(config.neighbor_count(slot_id))))
}

/// Return the options for `slot_id` ordered so that the word ruling out the fewest options in
/// unassigned crossing slots comes first. A word rules out a crossing option if the two disagree
/// in their shared cell, or if the crossing option is the same word. Ties keep `WordId` order.
pub fn order_domain_values(
    config: &GridConfig,
    word_list: &WordList,
    domains: &DomainStore,
    slot_id: SlotId,
    assignment: &Assignment,
) -> Vec<WordId> {
    struct OpenCrossing {
        other_slot_id: SlotId,
        cell_idx: usize,
        other_cell_idx: usize,
        glyph_counts_by_cell: GlyphCountsByCell,
    }

    let open_crossings: Vec<OpenCrossing> = config.slot_configs[slot_id]
        .crossings
        .iter()
        .enumerate()
        .filter_map(|(cell_idx, crossing)| {
            let crossing = crossing.as_ref()?;
            if assignment.contains(crossing.other_slot_id) {
                return None;
            }

            let other_length = config.slot_configs[crossing.other_slot_id].length;

            Some(OpenCrossing {
                other_slot_id: crossing.other_slot_id,
                cell_idx,
                other_cell_idx: crossing.other_slot_cell,
                glyph_counts_by_cell: domains.build_glyph_counts_by_cell(
                    word_list,
                    crossing.other_slot_id,
                    other_length,
                ),
            })
        })
        .collect();

    let mut options: Vec<WordId> = domains.options(slot_id).collect();

    options.sort_by_cached_key(|&word_id| {
        let word = word_list.word(word_id);

        open_crossings
            .iter()
            .map(|crossing| {
                let other_option_count = domains.len(crossing.other_slot_id);
                let compatible = word
                    .glyphs
                    .get(crossing.cell_idx)
                    .map_or(0, |&glyph| {
                        crossing.glyph_counts_by_cell[crossing.other_cell_idx][glyph] as usize
                    });

                // The same word sitting in the crossing slot is ruled out even if it happens to
                // agree on the shared letter.
                let identical_compatible = domains.contains(crossing.other_slot_id, word_id)
                    && word.glyphs.get(crossing.other_cell_idx) == word.glyphs.get(crossing.cell_idx);

                other_option_count - compatible + identical_compatible as usize
            })
            .sum::<usize>()
    });

    options
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub duration: Duration,
}

/// Knobs for a fill attempt.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Give up after visiting this many search states. `None` searches exhaustively.
    pub max_states: Option<u64>,
}

/// A struct representing the results of a successful fill operation.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// The reasons a fill operation can come back empty-handed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FillFailure {
    #[error("No words can fill slot {slot_id}")]
    Unsatisfiable { slot_id: SlotId },

    #[error("Search exhausted every option without finding a fill")]
    SearchExhausted,

    #[error("Gave up after visiting {limit} search states")]
    StateLimitReached { limit: u64 },
}

/// State shared by every frame of the recursive search.
struct Search<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    domains: &'a DomainStore,
    max_states: Option<u64>,
    statistics: Statistics,
}

impl<'a> Search<'a> {
    /// Extend `assignment` to a complete, consistent one. Returns `Ok(true)` with the assignment
    /// complete on success; on `Ok(false)` or an error the assignment is left exactly as it was
    /// passed in.
    fn backtrack(&mut self, assignment: &mut Assignment) -> Result<bool, FillFailure> {
        let Some(slot_id) = select_unassigned_slot(self.config, self.domains, assignment) else {
            return Ok(true);
        };

        self.statistics.states += 1;
        if let Some(limit) = self.max_states {
            if self.statistics.states > limit {
                return Err(FillFailure::StateLimitReached { limit });
            }
        }

        trace!(
            "state {}: filling slot {} ({} options, {} of {} slots assigned)",
            self.statistics.states,
            slot_id,
            self.domains.len(slot_id),
            assignment.len(),
            self.config.slot_count()
        );

        for word_id in
            order_domain_values(self.config, self.word_list, self.domains, slot_id, assignment)
        {
            let choice = Choice { slot_id, word_id };
            if !choice_is_consistent(self.config, self.word_list, assignment, &choice) {
                continue;
            }

            if !assignment.push(choice) {
                continue;
            }
            let result = self.backtrack(assignment);
            if !matches!(result, Ok(true)) {
                assignment.pop();
            }

            match result {
                Ok(true) => return Ok(true),
                Ok(false) => self.statistics.backtracks += 1,
                Err(failure) => return Err(failure),
            }
        }

        Ok(false)
    }
}

/// Search for a valid fill for the given grid: prune every slot's options by length, make the
/// grid arc-consistent, then run a backtracking search over the remaining options.
pub fn find_fill(
    config: &GridConfig,
    word_list: &WordList,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    let mut domains = DomainStore::new(config, word_list);
    domains.enforce_node_consistency(config, word_list);
    if let Some(slot_id) = domains.first_empty_slot() {
        debug!("slot {} has no options of the right length", slot_id);
        return Err(FillFailure::Unsatisfiable { slot_id });
    }

    if !ac3(config, word_list, &mut domains, None) {
        return Err(domains
            .first_empty_slot()
            .map_or(FillFailure::SearchExhausted, |slot_id| {
                FillFailure::Unsatisfiable { slot_id }
            }));
    }

    let mut search = Search {
        config,
        word_list,
        domains: &domains,
        max_states: options.max_states,
        statistics: Statistics::default(),
    };
    let mut assignment = Assignment::new();
    let result = search.backtrack(&mut assignment);

    let mut statistics = search.statistics;
    statistics.duration = start.elapsed();
    debug!("search finished with {:?}", statistics);

    match result {
        Ok(true) => Ok(FillSuccess {
            statistics,
            assignment,
        }),
        Ok(false) => Err(FillFailure::SearchExhausted),
        Err(failure) => Err(failure),
    }
}

/// Fill the grid with words from the list, or return `None` if no complete, consistent fill
/// exists.
pub fn solve(config: &GridConfig, word_list: &WordList) -> Option<Assignment> {
    find_fill(config, word_list, &FillOptions::default())
        .ok()
        .map(|success| success.assignment)
}
