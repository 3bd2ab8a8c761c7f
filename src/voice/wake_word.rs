//! Wake word matching on transcribed text
//!
//! Matching ignores ASCII case so byte offsets in the lowered text line up
//! with the original transcript.

/// Finds one wake word in transcripts
#[derive(Debug, Clone)]
pub struct WakeWordDetector {
    word: String,
}

impl WakeWordDetector {
    /// Create a detector for one wake word (e.g. "jarvis")
    #[must_use]
    pub fn new(wake_word: &str) -> Self {
        Self {
            word: wake_word.trim().to_ascii_lowercase(),
        }
    }

    /// The text after the wake word, if the transcript contains it
    ///
    /// Punctuation between the wake word and the command is dropped, so
    /// "Jarvis, roku home" yields "roku home" and a bare "jarvis" yields "".
    #[must_use]
    pub fn detect(&self, transcript: &str) -> Option<String> {
        if self.word.is_empty() {
            return None;
        }

        let pos = transcript.to_ascii_lowercase().find(&self.word)?;
        let rest = transcript[pos + self.word.len()..]
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == '.')
            .trim_end();

        tracing::debug!(wake_word = %self.word, transcript, "wake word heard");
        Some(rest.to_string())
    }
}
