//! Text of every message the server sends
//!
//! Each function returns complete protocol lines, terminator included.

use shared::frame;

pub const NAME_PROMPT: &str = "What is your name?";
pub const GUESS_PROMPT: &str = "Your guess?";

pub fn welcome() -> String {
    frame("Welcome to our word game. What is your name?")
}

pub fn name_empty() -> String {
    frame("Name cannot be empty") + &frame(NAME_PROMPT)
}

pub fn name_too_long() -> String {
    frame("Name too long") + &frame(NAME_PROMPT)
}

pub fn name_taken() -> String {
    frame("Name already exists") + &frame(NAME_PROMPT)
}

pub fn joined(name: &str) -> String {
    frame(&format!("{} has just joined.", name))
}

pub fn your_turn() -> String {
    frame(GUESS_PROMPT)
}

pub fn turn_of(name: &str) -> String {
    frame(&format!("It's {}'s turn.", name))
}

pub fn not_your_turn() -> String {
    frame("It's not your turn.")
}

pub fn invalid_guess() -> String {
    frame("Invalid input") + &frame(GUESS_PROMPT)
}

pub fn already_guessed() -> String {
    frame("Guess already made") + &frame(GUESS_PROMPT)
}

pub fn guessed(name: &str, letter: char) -> String {
    frame(&format!("{} guesses: {}", name, letter))
}

pub fn not_in_word(letter: char) -> String {
    frame(&format!("{} is not in the word", letter))
}

pub fn you_won() -> String {
    frame("Game over! You win!")
}

pub fn winner_is(name: &str) -> String {
    frame(&format!("Game over! {} won!", name))
}

pub fn word_was(word: &str) -> String {
    frame(&format!("The word was {}.", word))
}

pub fn out_of_guesses() -> String {
    frame("No more guesses. Nobody wins this round.")
}

pub fn new_round() -> String {
    frame("Let's start a new game.")
}

pub fn goodbye(name: &str) -> String {
    frame(&format!("Goodbye {}", name))
}
