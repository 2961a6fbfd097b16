use bit_set::BitSet;
use log::debug;
use smallvec::SmallVec;

use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};
use crate::MAX_GLYPH_COUNT;

/// Structure tracking the number of occurrences in a slot's options of each glyph in each cell.
pub type GlyphCountsByCell = Vec<SmallVec<[u32; MAX_GLYPH_COUNT]>>;

/// The candidate words for every slot. Words are only ever removed; the store is built and pruned
/// before search starts and treated as read-only afterward.
#[derive(Debug, Clone)]
pub struct DomainStore {
    domains: Vec<BitSet>,
}

impl DomainStore {
    /// Start every slot off with the whole word list.
    pub fn new(config: &GridConfig, word_list: &WordList) -> DomainStore {
        let all_words: BitSet = (0..word_list.len()).collect();

        DomainStore {
            domains: config.slots().iter().map(|_| all_words.clone()).collect(),
        }
    }

    pub fn domain(&self, slot_id: SlotId) -> &BitSet {
        &self.domains[slot_id]
    }

    /// The remaining options for a slot, in ascending `WordId` order.
    pub fn options(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.domains[slot_id].iter()
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.domains[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    /// Remove a word from a slot's domain, returning whether it was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].remove(word_id)
    }

    /// The first slot whose domain has been emptied, if any.
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        self.domains.iter().position(BitSet::is_empty)
    }

    /// Remove every option whose length doesn't match the slot it's in.
    pub fn enforce_node_consistency(&mut self, config: &GridConfig, word_list: &WordList) {
        for slot_config in config.slots() {
            let mismatched: Vec<WordId> = self
                .options(slot_config.id)
                .filter(|&word_id| word_list.word(word_id).len() != slot_config.length)
                .collect();

            for word_id in mismatched {
                self.remove(slot_config.id, word_id);
            }
        }

        debug!(
            "node consistency left {:?} options per slot",
            (0..self.domains.len()).map(|slot_id| self.len(slot_id)).collect::<Vec<_>>()
        );
    }

    /// The set of glyphs that appear at `cell_idx` in any remaining option for the slot.
    pub fn glyphs_at_cell(&self, word_list: &WordList, slot_id: SlotId, cell_idx: usize) -> BitSet {
        self.options(slot_id)
            .filter_map(|word_id| word_list.word(word_id).glyphs.get(cell_idx).cloned())
            .collect()
    }

    /// Count, for each cell of the slot, how many remaining options place each glyph there.
    pub fn build_glyph_counts_by_cell(
        &self,
        word_list: &WordList,
        slot_id: SlotId,
        slot_length: usize,
    ) -> GlyphCountsByCell {
        let mut result: GlyphCountsByCell = (0..slot_length)
            .map(|_| (0..word_list.glyphs.len()).map(|_| 0).collect())
            .collect();

        for word_id in self.options(slot_id) {
            let glyphs = &word_list.word(word_id).glyphs;
            for (cell_idx, &glyph) in glyphs.iter().take(slot_length).enumerate() {
                result[cell_idx][glyph] += 1;
            }
        }

        result
    }
}
