use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given letter, based on its index in the `WordList`'s `glyphs` field.
pub type GlyphId = usize;

/// An identifier for a given word, based on its index in the `WordList`'s `words` field.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// The number of letters in the word, which is what a slot's length is compared against.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The set of candidate words available to the solver. Entries are uppercased and duplicates are
/// collapsed, keeping the order in which each word was first seen so that `WordId`s (and therefore
/// every ordering the solver derives from them) are reproducible.
pub struct WordList {
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,
    pub words: Vec<Word>,
    pub word_id_by_string: HashMap<String, WordId>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &format!("({} entries)", self.words.len()))
            .finish()
    }
}

impl WordList {
    /// Build a word list from raw entries. Surrounding whitespace is trimmed and blank entries are
    /// skipped.
    pub fn new<I, S>(entries: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut word_list = WordList {
            glyphs: SmallVec::new(),
            words: vec![],
            word_id_by_string: HashMap::new(),
        };
        let mut glyph_ids_by_char: HashMap<char, GlyphId> = HashMap::new();

        for entry in entries {
            let string = entry.as_ref().trim().to_uppercase();
            if string.is_empty() || word_list.word_id_by_string.contains_key(&string) {
                continue;
            }

            let glyphs = string
                .chars()
                .map(|c| {
                    *glyph_ids_by_char.entry(c).or_insert_with(|| {
                        word_list.glyphs.push(c);
                        word_list.glyphs.len() - 1
                    })
                })
                .collect();

            word_list
                .word_id_by_string
                .insert(string.clone(), word_list.words.len());
            word_list.words.push(Word { string, glyphs });
        }

        word_list
    }

    /// Build a word list from the contents of a file with one word per line.
    pub fn from_file_contents(contents: &str) -> WordList {
        WordList::new(contents.lines())
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn word_id(&self, string: &str) -> Option<WordId> {
        self.word_id_by_string.get(&string.trim().to_uppercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
