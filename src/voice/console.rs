//! Console speech: stdin lines in, stdout lines out

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout,
};

use super::{SpeechToText, TextToSpeech, WakeWordDetector};
use crate::{Error, Result};

/// Reads utterances line by line
///
/// Text following the wake word on the same line is kept as the next
/// utterance, so "jarvis roku home" works in one line.
pub struct ConsoleListener<R> {
    lines: Lines<R>,
    pending: VecDeque<String>,
}

impl ConsoleListener<BufReader<Stdin>> {
    /// Listen on the process's stdin
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> ConsoleListener<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending: VecDeque::new(),
        }
    }

    async fn next_line(&mut self) -> Result<String> {
        match self.lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(Error::InputClosed),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> SpeechToText for ConsoleListener<R> {
    async fn listen_for_wakeword(&mut self, word: &str) -> Result<()> {
        let detector = WakeWordDetector::new(word);

        loop {
            let line = self.next_line().await?;
            if let Some(rest) = detector.detect(&line) {
                if !rest.is_empty() {
                    self.pending.push_back(rest);
                }
                return Ok(());
            }
            tracing::trace!(line = %line, "ignored, no wake word");
        }
    }

    async fn listen(&mut self) -> Result<String> {
        if let Some(utterance) = self.pending.pop_front() {
            return Ok(utterance);
        }
        self.next_line().await
    }
}

/// Prints spoken text, one message per line
pub struct ConsoleSpeaker<W> {
    out: W,
}

impl ConsoleSpeaker<Stdout> {
    /// Speak on the process's stdout
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> ConsoleSpeaker<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> TextToSpeech for ConsoleSpeaker<W> {
    async fn speak(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        tracing::debug!(text, "speaking");
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }
}
