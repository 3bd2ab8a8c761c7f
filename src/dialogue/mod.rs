//! Dialogue controller
//!
//! One turn: speak the pending prompt, wait for the wake word unless a
//! dialogue is open, listen, resolve device then action, fill arguments
//! (asking for any that are missing), perform, and keep the response as the
//! next prompt. Context is re-read from disk every turn.

mod resolve;
mod slots;

pub use resolve::{Reprompt, Resolution, resolve_action, resolve_device};
pub use slots::{Reprompter, fill_args, question_for};

use std::path::PathBuf;

use async_trait::async_trait;

use crate::command::CommandInput;
use crate::context::Context;
use crate::registry::Registry;
use crate::voice::{SpeechToText, TextToSpeech};
use crate::{Error, Result};

/// Turns in a row that may fail before anything is heard
const MAX_IDLE_FAILURES: u32 = 3;

/// Where the controller is in a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    AwaitingWakeword,
    AwaitingCommand,
    Resolving,
    Executing,
    Stopped,
}

/// Dialogue settings
#[derive(Debug, Clone)]
pub struct DialogueSettings {
    /// Word that opens a dialogue
    pub wake_word: String,

    /// How many times a missing argument is asked for
    pub reprompt_attempts: u32,

    /// Context file shared by every turn
    pub context_path: PathBuf,
}

/// What a handled utterance produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// The user asked to stop
    Quit,
    /// Message for the user; may be empty
    Reply(String),
}

/// Drives turns between the speech collaborators and the devices
pub struct Controller<'r, S, T> {
    registry: &'r Registry,
    stt: S,
    tts: T,
    settings: DialogueSettings,
    prompt: Option<String>,
    state: DialogueState,
    heard: bool,
}

impl<'r, S, T> Controller<'r, S, T>
where
    S: SpeechToText,
    T: TextToSpeech,
{
    pub const fn new(registry: &'r Registry, stt: S, tts: T, settings: DialogueSettings) -> Self {
        Self {
            registry,
            stt,
            tts,
            settings,
            prompt: None,
            state: DialogueState::AwaitingWakeword,
            heard: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> DialogueState {
        self.state
    }

    /// Message to be spoken at the start of the next turn
    #[must_use]
    pub fn pending_prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Give back the speech collaborators
    pub fn into_parts(self) -> (S, T) {
        (self.stt, self.tts)
    }

    /// Run turns until the user quits or input closes
    ///
    /// The context is cleared before the first turn.
    ///
    /// # Errors
    ///
    /// Returns fatal errors, and the last error once several turns in a row
    /// fail before hearing anything; everything else is spoken to the user
    pub async fn run(&mut self) -> Result<()> {
        Context::fresh(&self.settings.context_path)?;
        self.state = DialogueState::AwaitingWakeword;
        tracing::info!(wake_word = %self.settings.wake_word, "dialogue started");

        let mut idle_failures = 0;
        loop {
            match self.turn().await {
                Ok(Turn::Quit) => {
                    tracing::info!("quit requested");
                    break;
                }
                Ok(Turn::Reply(message)) => {
                    idle_failures = 0;
                    self.prompt = Some(message);
                }
                Err(Error::InputClosed) => {
                    tracing::info!("input closed");
                    break;
                }
                Err(e) if e.is_fatal() => {
                    self.state = DialogueState::Stopped;
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, heard = self.heard, "turn failed");
                    if self.heard {
                        idle_failures = 0;
                    } else {
                        idle_failures += 1;
                        if idle_failures >= MAX_IDLE_FAILURES {
                            self.state = DialogueState::Stopped;
                            return Err(e);
                        }
                    }
                    self.prompt = Some(e.to_string());
                }
            }
        }

        self.state = DialogueState::Stopped;
        Ok(())
    }

    /// Run one full turn
    ///
    /// # Errors
    ///
    /// Returns error if a collaborator fails or the context cannot be saved
    pub async fn turn(&mut self) -> Result<Turn> {
        self.heard = false;
        if let Some(prompt) = self.prompt.take() {
            self.tts.speak(&prompt).await?;
        }

        let context = Context::open(&self.settings.context_path)?;
        if !context.in_dialogue() {
            self.state = DialogueState::AwaitingWakeword;
            self.stt.listen_for_wakeword(&self.settings.wake_word).await?;
            self.tts.recognize_wakeword().await?;
        }

        self.state = DialogueState::AwaitingCommand;
        let utterance = self.stt.listen().await?;
        self.heard = true;
        tracing::debug!(%utterance, "heard");

        self.handle(&utterance, context).await
    }

    /// Handle one utterance against the saved context, without a wake word
    ///
    /// # Errors
    ///
    /// Returns error if a collaborator fails or the context cannot be saved
    pub async fn say(&mut self, utterance: &str) -> Result<Turn> {
        let context = Context::open(&self.settings.context_path)?;
        self.handle(utterance, context).await
    }

    async fn handle(&mut self, utterance: &str, context: Context) -> Result<Turn> {
        let mut input = CommandInput::new(utterance);
        if input.head_is("quit", true) {
            self.state = DialogueState::Stopped;
            return Ok(Turn::Quit);
        }

        self.state = DialogueState::Resolving;

        let mut device = match resolve_device(self.registry, &mut input, &context)? {
            Resolution::Resolved(device) => device,
            Resolution::NeedsReprompt(reprompt) => return reprompt_turn(context, &reprompt),
        };

        let mut action = match resolve_action(&mut input, &context, device.as_ref())? {
            Resolution::Resolved(action) => action,
            Resolution::NeedsReprompt(reprompt) => return reprompt_turn(context, &reprompt),
        };

        let argmap = action.argmap();
        let mut asker = Asker {
            stt: &mut self.stt,
            tts: &mut self.tts,
        };
        let args = match fill_args(
            &argmap,
            &mut input,
            &mut asker,
            self.settings.reprompt_attempts,
        )
        .await?
        {
            Resolution::Resolved(args) => args,
            Resolution::NeedsReprompt(reprompt) => return reprompt_turn(context, &reprompt),
        };
        action.init_args(args)?;

        self.state = DialogueState::Executing;
        tracing::info!(device = device.name(), action = action.name(), "performing");

        let outcome = action
            .perform(device.as_mut())
            .await
            .map(|response| response.message.clone());
        let message = match outcome {
            Ok(message) => message,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(action = action.name(), error = %e, "action failed");
                format!("Sorry, {} failed: {e}", action.name())
            }
        };

        // Actions may have changed the device's copy of the context
        let mut context = device
            .as_context()
            .and_then(|c| c.take_context())
            .unwrap_or(context);
        context.set_in_dialogue(context.device().is_some());
        context.save()?;

        Ok(Turn::Reply(message))
    }
}

/// End a turn with a reprompt, keeping the dialogue open
fn reprompt_turn(mut context: Context, reprompt: &Reprompt) -> Result<Turn> {
    tracing::debug!(%reprompt, "reprompting");
    context.set_in_dialogue(true);
    context.save()?;
    Ok(Turn::Reply(reprompt.to_string()))
}

/// Sub-turn that speaks a question and listens for the whole reply
struct Asker<'a, S, T> {
    stt: &'a mut S,
    tts: &'a mut T,
}

#[async_trait]
impl<S: SpeechToText, T: TextToSpeech> Reprompter for Asker<'_, S, T> {
    async fn ask(&mut self, question: &str) -> Result<String> {
        self.tts.speak(question).await?;
        self.stt.listen().await
    }
}
