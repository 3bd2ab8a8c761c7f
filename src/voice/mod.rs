//! Speech collaborators
//!
//! The dialogue controller only needs two capabilities: something that hears
//! (wake word, then an utterance) and something that talks. Audio engines
//! plug in behind these traits; the console implementations treat stdin
//! lines as utterances and print what would be spoken.

mod console;
mod wake_word;

pub use console::{ConsoleListener, ConsoleSpeaker};
pub use wake_word::WakeWordDetector;

use async_trait::async_trait;

use crate::Result;

/// Cue spoken once the wake word is heard
pub const WAKE_ACK: &str = "Listening";

/// Turns speech into text
#[async_trait]
pub trait SpeechToText: Send {
    /// Block until the wake word is heard
    ///
    /// # Errors
    ///
    /// Returns `InputClosed` when no more input will arrive
    async fn listen_for_wakeword(&mut self, word: &str) -> Result<()>;

    /// Block for one utterance
    ///
    /// # Errors
    ///
    /// Returns `InputClosed` when no more input will arrive
    async fn listen(&mut self) -> Result<String>;
}

/// Turns text into speech
#[async_trait]
pub trait TextToSpeech: Send {
    /// Acknowledge the wake word
    ///
    /// # Errors
    ///
    /// Returns error if playback fails
    async fn recognize_wakeword(&mut self) -> Result<()> {
        self.speak(WAKE_ACK).await
    }

    /// Speak text, returning once playback finishes
    ///
    /// # Errors
    ///
    /// Returns error if playback fails
    async fn speak(&mut self, text: &str) -> Result<()>;
}
