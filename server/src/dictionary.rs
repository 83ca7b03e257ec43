//! Word selection for new rounds
//!
//! The game only needs "give me a word"; [`WordSource`] is that seam.
//! [`Dictionary`] serves random words from a word-list file, [`WordCycle`]
//! serves a fixed list in order.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Supplies the target word for each new round
pub trait WordSource: Send {
    fn next_word(&mut self) -> String;
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("cannot read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("dictionary contains no usable words")]
    Empty,
}

/// Words usable in a round: non-empty and only lowercase ASCII letters
fn is_playable(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_lowercase())
}

/// Reads one word per line, trimmed, skipping blank lines
fn read_words<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut words = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }

    Ok(words)
}

/// Keeps the playable words, failing if none are left
fn playable_words(words: Vec<String>) -> Result<Vec<String>, DictionaryError> {
    let total = words.len();
    let words: Vec<String> = words.into_iter().filter(|w| is_playable(w)).collect();

    let skipped = total - words.len();
    if skipped > 0 {
        warn!("Skipped {} dictionary entries that are not lowercase words", skipped);
    }

    if words.is_empty() {
        return Err(DictionaryError::Empty);
    }
    Ok(words)
}

/// Loads the words of a dictionary file in file order
fn load_words(path: &Path) -> Result<Vec<String>, DictionaryError> {
    let io_error = |source| DictionaryError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;
    let words = read_words(BufReader::new(file)).map_err(io_error)?;
    info!("Loaded {} words from {}", words.len(), path.display());
    Ok(words)
}

/// A word list picked from at random
pub struct Dictionary {
    words: Vec<String>,
    rng: StdRng,
}

impl Dictionary {
    /// Loads a dictionary file, optionally seeding the word picker
    pub fn open(path: impl AsRef<Path>, seed: Option<u64>) -> Result<Self, DictionaryError> {
        Self::from_words(load_words(path.as_ref())?, seed)
    }

    /// Builds a dictionary from words already in memory
    ///
    /// Words that could never be guessed are dropped.
    pub fn from_words(words: Vec<String>, seed: Option<u64>) -> Result<Self, DictionaryError> {
        let words = playable_words(words)?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { words, rng })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordSource for Dictionary {
    /// Skips a random number of words from the start, wrapping past the end
    fn next_word(&mut self) -> String {
        let skip = self.rng.gen_range(0..self.words.len() * 2);
        self.words[skip % self.words.len()].clone()
    }
}

/// Serves words in list order, starting over after the last one
pub struct WordCycle {
    words: Vec<String>,
    next: usize,
}

impl WordCycle {
    pub fn new<I, S>(words: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = playable_words(words.into_iter().map(Into::into).collect())?;
        Ok(Self { words, next: 0 })
    }

    /// Loads the words of a dictionary file, served in file order
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        Self::new(load_words(path.as_ref())?)
    }
}

impl WordSource for WordCycle {
    fn next_word(&mut self) -> String {
        let word = self.words[self.next].clone();
        self.next = (self.next + 1) % self.words.len();
        word
    }
}
