//! Command tokenizer
//!
//! A [`CommandInput`] is a destructive cursor over the lowercase words of one
//! utterance. Device, action and argument resolution each consume words from
//! its head; popped words are gone for good.

pub mod numbers;

use std::collections::VecDeque;

use serde_json::Value;

use crate::device::ArgSpec;
use crate::{Error, Result};

/// Lowercase word sequence of one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInput {
    original: String,
    words: VecDeque<String>,
}

impl CommandInput {
    /// Tokenize an utterance into lowercase words
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            original: command.to_string(),
            words: command.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    /// The utterance as it was received
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Words not yet consumed
    #[must_use]
    pub fn remaining(&self) -> Vec<&str> {
        self.words.iter().map(String::as_str).collect()
    }

    /// First unconsumed word
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.words.front().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Check whether the input starts with a phrase, popping it if asked
    ///
    /// The phrase is compared word by word, ignoring case.
    pub fn head_is(&mut self, phrase: &str, pop_if_true: bool) -> bool {
        let phrase: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();

        if phrase.is_empty() || phrase.len() > self.words.len() {
            return false;
        }

        let matches = phrase.iter().zip(&self.words).all(|(p, w)| p == w);
        if matches && pop_if_true {
            self.words.drain(..phrase.len());
        }
        matches
    }

    /// Return the first phrase the input starts with
    ///
    /// Underscores in phrases are read as spaces, so `play_movie` matches
    /// the words "play movie". The phrase is returned as given.
    pub fn prefix_from<I, S>(&mut self, phrases: I, pop_if_true: bool) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        phrases.into_iter().find_map(|phrase| {
            let phrase = phrase.as_ref();
            self.head_is(&phrase.replace('_', " "), pop_if_true)
                .then(|| phrase.to_string())
        })
    }

    /// Pop the first `num_words` words, joined by spaces
    ///
    /// # Errors
    ///
    /// Returns `InputExhausted` if fewer than `num_words` words remain
    pub fn pop(&mut self, num_words: usize) -> Result<String> {
        if num_words > self.words.len() {
            return Err(Error::InputExhausted {
                requested: num_words,
                remaining: self.words.len(),
            });
        }

        Ok(self
            .words
            .drain(..num_words)
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Pop every remaining word
    pub fn pop_all(&mut self) -> String {
        self.words.drain(..).collect::<Vec<_>>().join(" ")
    }

    /// Pop `num_words` words and convert them for an argument
    ///
    /// The kind is checked before anything is popped, so an unsupported
    /// kind leaves the input untouched.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedKind` for list and object arguments,
    /// `InputExhausted` if too few words remain, and `TypeConversion` if the
    /// phrase does not convert
    pub fn pop_as(&mut self, spec: &ArgSpec, num_words: usize) -> Result<Value> {
        if !spec.kind().is_spoken() {
            return Err(Error::UnsupportedKind(spec.kind()));
        }
        let phrase = self.pop(num_words)?;
        spec.convert(&phrase)
    }

    /// Pop every remaining word and convert the phrase for an argument
    ///
    /// # Errors
    ///
    /// Same as [`Self::pop_as`]
    pub fn pop_all_as(&mut self, spec: &ArgSpec) -> Result<Value> {
        let len = self.words.len();
        self.pop_as(spec, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ArgKind;

    #[test]
    fn tokenizes_lowercase_words() {
        let input = CommandInput::new("  Roku  Volume UP 3 ");
        assert_eq!(input.remaining(), ["roku", "volume", "up", "3"]);
        assert_eq!(input.original(), "  Roku  Volume UP 3 ");
    }

    #[test]
    fn prefix_treats_underscore_as_space() {
        let mut input = CommandInput::new("Play Movie foo");
        let found = input.prefix_from(["play_movie", "play_show"], true);

        assert_eq!(found.as_deref(), Some("play_movie"));
        assert_eq!(input.remaining(), ["foo"]);
    }

    #[test]
    fn prefix_without_pop_keeps_input() {
        let mut input = CommandInput::new("list devices");
        let found = input.prefix_from(["enter", "list_devices"], false);

        assert_eq!(found.as_deref(), Some("list_devices"));
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn prefix_first_match_wins() {
        let mut input = CommandInput::new("play show now");
        let found = input.prefix_from(["play", "play_show"], true);

        assert_eq!(found.as_deref(), Some("play"));
        assert_eq!(input.remaining(), ["show", "now"]);
    }

    #[test]
    fn head_is_requires_whole_phrase() {
        let mut input = CommandInput::new("quit");
        assert!(!input.head_is("quit now", true));
        assert!(input.head_is("QUIT", true));
        assert!(input.is_empty());
        assert!(!input.head_is("quit", true));
    }

    #[test]
    fn pop_past_end_is_an_error() {
        let mut input = CommandInput::new("one two");
        assert_eq!(input.pop(1).unwrap(), "one");
        assert!(matches!(
            input.pop(2),
            Err(Error::InputExhausted { requested: 2, remaining: 1 })
        ));
        assert_eq!(input.pop(1).unwrap(), "two");
    }

    #[test]
    fn pop_as_converts_to_kind() {
        let mut input = CommandInput::new("three up");
        assert_eq!(
            input.pop_as(&ArgSpec::integer(), 1).unwrap(),
            Value::from(3)
        );
        assert_eq!(
            input.pop_as(&ArgSpec::string(), 1).unwrap(),
            Value::from("up")
        );
    }

    #[test]
    fn pop_as_unsupported_kind_leaves_input() {
        let mut input = CommandInput::new("a b");
        let err = input.pop_as(&ArgSpec::new(ArgKind::List), 1).unwrap_err();

        assert!(matches!(err, Error::UnsupportedKind(ArgKind::List)));
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn pop_all_as_reads_whole_phrase() {
        let mut input = CommandInput::new("twenty one");
        assert_eq!(
            input.pop_all_as(&ArgSpec::integer()).unwrap(),
            Value::from(21)
        );
        assert!(input.is_empty());
    }
}
