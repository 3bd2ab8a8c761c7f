//! Argument slot filling
//!
//! Arguments are filled in three passes:
//! 1. ordered arguments take one word each from the command, by order hint,
//!    until the words run out
//! 2. required arguments still missing are asked for one at a time; the
//!    whole reply is the value
//! 3. arguments with a default take it if still missing

use async_trait::async_trait;
use serde_json::Value;

use super::{Reprompt, Resolution};
use crate::command::CommandInput;
use crate::device::{ArgMap, ArgSpec, Args};
use crate::{Error, Result};

/// Asks the user for one missing value and waits for the reply
#[async_trait]
pub trait Reprompter: Send {
    /// Speak a question and return the full reply
    ///
    /// # Errors
    ///
    /// Returns error if speaking or listening fails
    async fn ask(&mut self, question: &str) -> Result<String>;
}

/// Question asked for a missing required argument
#[must_use]
pub fn question_for(label: &str) -> String {
    format!("Give a value for {label}")
}

/// Fill an action's arguments from the rest of a command
///
/// A reply that is empty or does not convert is asked again, up to
/// `attempts` asks per argument.
///
/// # Errors
///
/// Returns error if the reprompter fails
pub async fn fill_args(
    argmap: &ArgMap,
    input: &mut CommandInput,
    reprompter: &mut dyn Reprompter,
    attempts: u32,
) -> Result<Resolution<Args>> {
    let mut args = Args::new();

    for (name, spec) in argmap.ordered() {
        if input.is_empty() {
            break;
        }
        match input.pop_as(spec, 1) {
            Ok(value) => {
                args.insert(name.to_string(), value);
            }
            Err(Error::TypeConversion { phrase, .. }) => {
                return Ok(Resolution::NeedsReprompt(Reprompt::InvalidArgument {
                    label: spec.label_for(name),
                    phrase,
                }));
            }
            Err(Error::UnsupportedKind(kind)) => {
                tracing::warn!(arg = name, %kind, "ordered argument cannot be spoken, skipped");
            }
            Err(e) => return Err(e),
        }
    }

    for (name, spec) in argmap.required() {
        if args.contains_key(name) {
            continue;
        }
        match ask_for(name, spec, reprompter, attempts).await? {
            Resolution::Resolved(value) => {
                args.insert(name.to_string(), value);
            }
            Resolution::NeedsReprompt(reprompt) => return Ok(Resolution::NeedsReprompt(reprompt)),
        }
    }

    for (name, spec) in argmap.defaulted() {
        if let Some(default) = spec.default() {
            args.entry(name).or_insert_with(|| default.clone());
        }
    }

    if !input.is_empty() {
        tracing::debug!(unused = ?input.remaining(), "words left after filling arguments");
    }
    Ok(Resolution::Resolved(args))
}

async fn ask_for(
    name: &str,
    spec: &ArgSpec,
    reprompter: &mut dyn Reprompter,
    attempts: u32,
) -> Result<Resolution<Value>> {
    let label = spec.label_for(name);
    if !spec.kind().is_spoken() {
        return Ok(Resolution::NeedsReprompt(Reprompt::Unspeakable { label }));
    }

    let question = question_for(&label);
    let mut failure = Reprompt::MissingArgument {
        label: label.clone(),
    };

    for attempt in 1..=attempts.max(1) {
        let reply = reprompter.ask(&question).await?;
        let mut reply = CommandInput::new(&reply);
        if reply.is_empty() {
            tracing::debug!(arg = name, attempt, "empty reply");
            continue;
        }

        match reply.pop_all_as(spec) {
            Ok(value) => return Ok(Resolution::Resolved(value)),
            Err(Error::TypeConversion { phrase, .. }) => {
                tracing::debug!(arg = name, attempt, %phrase, "reply did not convert");
                failure = Reprompt::InvalidArgument {
                    label: label.clone(),
                    phrase,
                };
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Resolution::NeedsReprompt(failure))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Replies from a script, recording every question
    #[derive(Default)]
    struct Script {
        replies: VecDeque<&'static str>,
        asked: Vec<String>,
    }

    impl Script {
        fn new(replies: &[&'static str]) -> Self {
            Self {
                replies: replies.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Reprompter for Script {
        async fn ask(&mut self, question: &str) -> Result<String> {
            self.asked.push(question.to_string());
            self.replies
                .pop_front()
                .map(ToString::to_string)
                .ok_or(Error::InputClosed)
        }
    }

    fn volume() -> ArgMap {
        ArgMap::new()
            .arg(
                "direction",
                ArgSpec::string().required().order(0).one_of(["up", "down"]),
            )
            .arg("units", ArgSpec::integer().default_value(1).order(1))
    }

    fn fill(argmap: &ArgMap, command: &str, script: &mut Script) -> Resolution<Args> {
        let mut input = CommandInput::new(command);
        tokio_test::block_on(fill_args(argmap, &mut input, script, 2)).unwrap()
    }

    #[test]
    fn ordered_words_fill_without_asking() {
        let mut script = Script::default();

        let args = fill(&volume(), "up 3", &mut script).resolved().unwrap();
        assert_eq!(args.get("direction"), Some(&Value::from("up")));
        assert_eq!(args.get("units"), Some(&Value::from(3)));
        assert!(script.asked.is_empty());
    }

    #[test]
    fn defaults_fill_unset_arguments() {
        let mut script = Script::default();

        let args = fill(&volume(), "down", &mut script).resolved().unwrap();
        assert_eq!(args.get("units"), Some(&Value::from(1)));
    }

    #[test]
    fn one_question_per_missing_required_argument() {
        let argmap = ArgMap::new()
            .arg("service", ArgSpec::string().required().order(0))
            .arg("content", ArgSpec::string().required().order(1))
            .arg("season", ArgSpec::integer().required());
        let mut script = Script::new(&["the office", "two"]);

        let args = fill(&argmap, "netflix", &mut script).resolved().unwrap();
        assert_eq!(
            script.asked,
            ["Give a value for Content", "Give a value for Season"]
        );
        assert_eq!(args.get("service"), Some(&Value::from("netflix")));
        assert_eq!(args.get("content"), Some(&Value::from("the office")));
        assert_eq!(args.get("season"), Some(&Value::from(2)));
    }

    #[test]
    fn bad_ordered_word_aborts_turn() {
        let mut script = Script::default();

        let resolution = fill(&volume(), "sideways", &mut script);
        let Resolution::NeedsReprompt(reprompt) = resolution else {
            panic!("expected a reprompt");
        };
        assert_eq!(reprompt.to_string(), "sideways is not a valid Direction");
        assert!(script.asked.is_empty());
    }

    #[test]
    fn bad_reply_is_asked_again() {
        let argmap = ArgMap::new().arg("input", ArgSpec::integer().required().order(0));
        let mut script = Script::new(&["loud", "three"]);

        let args = fill(&argmap, "", &mut script).resolved().unwrap();
        assert_eq!(args.get("input"), Some(&Value::from(3)));
        assert_eq!(script.asked.len(), 2);
    }

    #[test]
    fn gives_up_after_attempts() {
        let argmap = ArgMap::new().arg("input", ArgSpec::integer().required());
        let mut script = Script::new(&["", "loud", "three"]);

        let resolution = fill(&argmap, "", &mut script);
        let Resolution::NeedsReprompt(reprompt) = resolution else {
            panic!("expected a reprompt");
        };
        assert_eq!(
            reprompt,
            Reprompt::InvalidArgument {
                label: "Input".to_string(),
                phrase: "loud".to_string(),
            }
        );
        assert_eq!(script.asked.len(), 2);
    }

    #[test]
    fn unspoken_kinds_are_never_asked() {
        let argmap = ArgMap::new().arg("items", ArgSpec::new(crate::device::ArgKind::List).required());
        let mut script = Script::default();

        let resolution = fill(&argmap, "", &mut script);
        assert!(!resolution.is_resolved());
        assert!(script.asked.is_empty());
    }
}
