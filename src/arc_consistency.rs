//! AC-3 over the crossing constraints of a grid. A pair of slots is arc-consistent when every
//! option for the first slot has at least one option in the second slot placing the same letter
//! in their shared cell. We keep revising arcs until no more eliminations are possible or some
//! slot runs out of options.

use log::{debug, trace};
use std::collections::VecDeque;

use crate::domains::DomainStore;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};

/// An ordered pair of slots `(x, y)`, asking whether `x` is consistent with respect to `y`.
pub type SlotArc = (SlotId, SlotId);

/// Remove from `x`'s domain every word that has no compatible partner in `y`'s domain. Returns
/// whether anything was removed. Slots that don't cross impose no constraint on each other.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut DomainStore,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some((x_cell, y_cell)) = config.overlap(x, y) else {
        return false;
    };

    // Any letter that appears in `y`'s shared cell supports every `x` option with that letter.
    let supported_glyphs = domains.glyphs_at_cell(word_list, y, y_cell);

    let unsupported: Vec<WordId> = domains
        .options(x)
        .filter(|&word_id| {
            word_list
                .word(word_id)
                .glyphs
                .get(x_cell)
                .map_or(true, |&glyph| !supported_glyphs.contains(glyph))
        })
        .collect();

    for &word_id in &unsupported {
        domains.remove(x, word_id);
    }

    if !unsupported.is_empty() {
        trace!(
            "revise({}, {}) removed {} options, {} left",
            x,
            y,
            unsupported.len(),
            domains.len(x)
        );
    }

    !unsupported.is_empty()
}

/// Every ordered pair of distinct slots in the grid.
pub fn all_arcs(config: &GridConfig) -> VecDeque<SlotArc> {
    let slot_count = config.slot_count();

    (0..slot_count)
        .flat_map(|x| (0..slot_count).filter(move |&y| y != x).map(move |y| (x, y)))
        .collect()
}

/// Make the domains arc-consistent, starting from `arcs` (or every arc in the grid if `None`).
/// Returns false as soon as any slot's domain is emptied, leaving the domains in whatever state
/// they had reached; returns true once the queue drains.
pub fn ac3(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut DomainStore,
    arcs: Option<Vec<SlotArc>>,
) -> bool {
    let mut queue: VecDeque<SlotArc> = match arcs {
        Some(arcs) => arcs.into_iter().collect(),
        None => all_arcs(config),
    };
    let mut revisions: u64 = 0;

    while let Some((x, y)) = queue.pop_front() {
        revisions += 1;

        if !revise(config, word_list, domains, x, y) {
            continue;
        }

        if domains.is_empty(x) {
            debug!("arc consistency emptied slot {} after {} revisions", x, revisions);
            return false;
        }

        // Removing options from `x` may leave options in its other neighbors unsupported.
        for neighbor in config.neighbors(x).iter().filter(|&n| n != y) {
            queue.push_back((neighbor, x));
        }
    }

    debug!("arc consistency reached a fixed point after {} revisions", revisions);
    true
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::{ac3, all_arcs, revise};
    use crate::domains::DomainStore;
    use crate::grid_config::{generate_grid_config_from_template_string, GridConfig};
    use crate::word_list::WordList;

    fn node_consistent_domains(config: &GridConfig, word_list: &WordList) -> DomainStore {
        let mut domains = DomainStore::new(config, word_list);
        domains.enforce_node_consistency(config, word_list);
        domains
    }

    fn options(domains: &DomainStore, word_list: &WordList, slot_id: usize) -> Vec<String> {
        domains
            .options(slot_id)
            .map(|word_id| word_list.word(word_id).string.clone())
            .collect()
    }

    /// Asserts that every option in every slot has a partner in each crossing slot.
    fn assert_arc_consistent(config: &GridConfig, word_list: &WordList, domains: &DomainStore) {
        for (x, y) in all_arcs(config) {
            if let Some((p, q)) = config.overlap(x, y) {
                for word_id in domains.options(x) {
                    let glyph = word_list.word(word_id).glyphs[p];
                    assert!(
                        domains
                            .options(y)
                            .any(|other_id| word_list.word(other_id).glyphs[q] == glyph),
                        "{} in slot {} has no partner in slot {}",
                        word_list.word(word_id).string,
                        x,
                        y
                    );
                }
            }
        }
    }

    /// ___
    /// #_#
    /// #_#
    fn crossing_config() -> GridConfig {
        generate_grid_config_from_template_string("___\n#_#\n#_#").unwrap()
    }

    #[test]
    fn test_revise_removes_unsupported_options() {
        let config = crossing_config();
        let word_list = WordList::new(["CAT", "ART", "TAR"]);
        let mut domains = node_consistent_domains(&config, &word_list);

        // The down slot has to start with the across slot's middle letter, which is A or R.
        assert!(revise(&config, &word_list, &mut domains, 1, 0));
        assert_eq!(options(&domains, &word_list, 1), vec!["ART"]);

        // Nothing else changes on a second pass.
        assert!(!revise(&config, &word_list, &mut domains, 1, 0));
    }

    #[test]
    fn test_revise_ignores_slots_that_dont_cross() {
        let config = generate_grid_config_from_template_string("___\n###\n___").unwrap();
        let word_list = WordList::new(["CAT", "DOG"]);
        let mut domains = node_consistent_domains(&config, &word_list);

        assert!(!revise(&config, &word_list, &mut domains, 0, 1));
        assert!(!revise(&config, &word_list, &mut domains, 0, 0));
        assert_eq!(domains.len(0), 2);
    }

    #[test]
    fn test_ac3_on_crossing_slots() {
        let config = crossing_config();
        let word_list = WordList::new(["CAT", "ART", "TAR"]);
        let mut domains = node_consistent_domains(&config, &word_list);

        assert!(ac3(&config, &word_list, &mut domains, None));
        assert_eq!(options(&domains, &word_list, 0), vec!["CAT", "TAR"]);
        assert_eq!(options(&domains, &word_list, 1), vec!["ART"]);
        assert_arc_consistent(&config, &word_list, &domains);
    }

    #[test]
    fn test_ac3_detects_empty_domain() {
        let config = crossing_config();
        let word_list = WordList::new(["CAT", "DOG"]);
        let mut domains = node_consistent_domains(&config, &word_list);

        assert!(!ac3(&config, &word_list, &mut domains, None));
        assert!(domains.first_empty_slot().is_some());
    }

    /// ____
    /// _##_
    /// _##_
    /// ____
    #[test]
    fn test_ac3_propagates_around_a_ring() {
        let config = generate_grid_config_from_template_string("____\n_##_\n_##_\n____").unwrap();
        let word_list = WordList::new([
            "LAMB", "BOAT", "LOST", "TINY", "YARN", "MOLD", "BALD", "ZERO",
        ]);
        let mut domains = node_consistent_domains(&config, &word_list);

        assert!(ac3(&config, &word_list, &mut domains, None));
        assert_arc_consistent(&config, &word_list, &domains);

        // ZERO can't go anywhere: no other word starts with O or ends with Z.
        let zero = word_list.word_id("ZERO").unwrap();
        for slot in config.slots() {
            assert!(!domains.contains(slot.id, zero));
        }
    }

    #[test]
    fn test_ac3_is_idempotent() {
        let config = generate_grid_config_from_template_string("____\n_##_\n_##_\n____").unwrap();
        let word_list = WordList::new([
            "LAMB", "BOAT", "LOST", "TINY", "YARN", "MOLD", "BALD", "ZERO", "TOLD", "LATE",
        ]);
        let mut domains = node_consistent_domains(&config, &word_list);

        assert!(ac3(&config, &word_list, &mut domains, None));
        let first_pass: Vec<_> = (0..config.slot_count())
            .map(|slot_id| domains.domain(slot_id).clone())
            .collect();

        assert!(ac3(&config, &word_list, &mut domains, None));
        for (slot_id, before) in first_pass.iter().enumerate() {
            assert_eq!(domains.domain(slot_id), before);
        }
    }

    #[test]
    fn test_ac3_with_explicit_arcs() {
        let config = crossing_config();
        let word_list = WordList::new(["CAT", "ART", "TAR"]);
        let mut domains = node_consistent_domains(&config, &word_list);

        // Only revising the across slot against the down slot prunes ART from the across slot,
        // then re-enqueues nothing since the down slot is the only neighbor.
        assert!(ac3(&config, &word_list, &mut domains, Some(vec![(0, 1)])));
        assert_eq!(options(&domains, &word_list, 0), vec!["CAT", "TAR"]);
        assert_eq!(options(&domains, &word_list, 1), vec!["CAT", "ART", "TAR"]);

        assert!(ac3(&config, &word_list, &mut domains, Some(vec![])));
        assert_eq!(domains.len(1), 3);
    }
}
