use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use smallvec::SmallVec;

use crate::error::PuzzleError;
use crate::{WordId, MAX_SLOT_LENGTH};

/// A word that can be chosen for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The character at the given offset, counting in characters rather than bytes.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).cloned()
    }
}

/// The de-duplicated list of candidate words. Word ids are assigned in order of first
/// appearance, so iteration over ids is deterministic for a given input.
#[derive(Clone, Default)]
pub struct WordList {
    words: Vec<Word>,
    ids_by_string: HashMap<String, WordId>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl WordList {
    /// Build a word list, upper-casing and trimming each entry. Blank entries are skipped and
    /// repeated entries collapse into a single candidate.
    pub fn new<I, S>(words: I) -> WordList
        where
            I: IntoIterator<Item=S>,
            S: AsRef<str>,
    {
        let mut list = WordList::default();
        let mut duplicates = 0;

        for word in words {
            let normalized = word.as_ref().trim().to_uppercase();
            if normalized.is_empty() {
                continue;
            }
            if list.ids_by_string.contains_key(&normalized) {
                duplicates += 1;
                continue;
            }

            list.ids_by_string.insert(normalized.clone(), list.words.len());
            list.words.push(Word {
                chars: normalized.chars().collect(),
                string: normalized,
            });
        }

        debug!("loaded {} words ({} duplicates dropped)", list.words.len(), duplicates);

        list
    }

    /// Read a word list with one word per line.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<WordList, PuzzleError> {
        Ok(fs::read_to_string(path)?.parse()?)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn id_of(&self, word: &str) -> Option<WordId> {
        self.ids_by_string.get(&word.trim().to_uppercase()).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item=(WordId, &Word)> {
        self.words.iter().enumerate()
    }
}

impl FromStr for WordList {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(WordList::new(s.lines()))
    }
}
