use log::info;

/// What a single letter guess did to the round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Letter was guessed earlier this round; nothing changed
    AlreadyGuessed,
    /// Letter is in the word and the word still has hidden letters
    Hit,
    /// Letter is not in the word and guesses remain
    Miss,
    /// Letter revealed the last hidden letters
    Won,
    /// Letter is not in the word and it was the last guess
    Lost,
}

impl GuessOutcome {
    /// Whether this guess ended the round
    pub fn ends_round(self) -> bool {
        matches!(self, GuessOutcome::Won | GuessOutcome::Lost)
    }
}

/// Interprets a line as a guess: exactly one lowercase ASCII letter
pub fn parse_guess(line: &str) -> Option<char> {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_lowercase() => Some(letter),
        _ => None,
    }
}

/// State of one round: the hidden word and what has been guessed so far
#[derive(Debug, Clone)]
pub struct GameState {
    word: String,
    revealed: Vec<bool>,
    guessed: [bool; 26],
    guesses_left: u32,
    max_guesses: u32,
}

impl GameState {
    pub fn new(word: String, max_guesses: u32) -> Self {
        info!("New round with a {}-letter word", word.len());
        Self {
            revealed: vec![false; word.len()],
            word,
            guessed: [false; 26],
            guesses_left: max_guesses,
            max_guesses,
        }
    }

    /// Replaces the round-scoped state with a fresh round for `word`
    pub fn restart(&mut self, word: String) {
        *self = Self::new(word, self.max_guesses);
    }

    /// Applies a guess; `letter` must be a lowercase ASCII letter
    pub fn guess(&mut self, letter: char) -> GuessOutcome {
        debug_assert!(letter.is_ascii_lowercase());
        let slot = letter_index(letter);
        if self.guessed[slot] {
            return GuessOutcome::AlreadyGuessed;
        }
        self.guessed[slot] = true;

        let mut found = false;
        for (flag, c) in self.revealed.iter_mut().zip(self.word.chars()) {
            if c == letter {
                *flag = true;
                found = true;
            }
        }

        if found {
            if self.is_solved() {
                GuessOutcome::Won
            } else {
                GuessOutcome::Hit
            }
        } else {
            self.guesses_left = self.guesses_left.saturating_sub(1);
            if self.guesses_left == 0 {
                GuessOutcome::Lost
            } else {
                GuessOutcome::Miss
            }
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn guesses_left(&self) -> u32 {
        self.guesses_left
    }

    pub fn is_solved(&self) -> bool {
        self.revealed.iter().all(|&flag| flag)
    }

    pub fn has_guessed(&self, letter: char) -> bool {
        letter.is_ascii_lowercase() && self.guessed[letter_index(letter)]
    }

    /// The word with unrevealed letters shown as `-`
    pub fn mask(&self) -> String {
        self.word
            .chars()
            .zip(&self.revealed)
            .map(|(c, &shown)| if shown { c } else { '-' })
            .collect()
    }

    /// Letters guessed this round in alphabetical order
    pub fn guessed_letters(&self) -> Vec<char> {
        ('a'..='z')
            .zip(self.guessed.iter())
            .filter(|(_, guessed)| **guessed)
            .map(|(c, _)| c)
            .collect()
    }

    /// Multi-line status block sent to players after every change
    pub fn status_message(&self) -> String {
        let letters = self
            .guessed_letters()
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "***************\r\n\
             Word to guess: {}\r\n\
             Guesses remaining: {}\r\n\
             Letters guessed: {}\r\n\
             ***************\r\n",
            self.mask(),
            self.guesses_left,
            letters
        )
    }
}

fn letter_index(letter: char) -> usize {
    (letter as u8 - b'a') as usize
}
