//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hub_gateway::dialogue::{Controller, DialogueSettings};
use hub_gateway::{Error, Registry, Result, RokuRemote, SpeechToText, TextToSpeech};

pub const WAKE_WORD: &str = "jarvis";
pub const ROKU_BASE: &str = "http://192.168.1.5";

/// Hears lines from a script; runs out with `InputClosed`
#[derive(Debug, Default)]
pub struct ScriptedEars {
    lines: VecDeque<String>,
    pub wakeups: usize,
}

impl ScriptedEars {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(ToString::to_string).collect(),
            wakeups: 0,
        }
    }

    fn next(&mut self) -> Result<String> {
        self.lines.pop_front().ok_or(Error::InputClosed)
    }
}

#[async_trait]
impl SpeechToText for ScriptedEars {
    async fn listen_for_wakeword(&mut self, word: &str) -> Result<()> {
        loop {
            if self.next()?.eq_ignore_ascii_case(word) {
                self.wakeups += 1;
                return Ok(());
            }
        }
    }

    async fn listen(&mut self) -> Result<String> {
        self.next()
    }
}

/// Records everything it is asked to say, skipping empty text
#[derive(Debug, Default)]
pub struct RecordingMouth {
    pub spoken: Vec<String>,
}

#[async_trait]
impl TextToSpeech for RecordingMouth {
    async fn speak(&mut self, text: &str) -> Result<()> {
        if !text.is_empty() {
            self.spoken.push(text.to_string());
        }
        Ok(())
    }
}

/// One call made to the Roku
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RokuCall {
    Keypress {
        base: String,
        key: String,
    },
    Launch {
        base: String,
        app_id: String,
        content_id: String,
        media_type: String,
    },
}

/// Roku remote that records calls instead of sending them
#[derive(Debug, Default)]
pub struct RecordingRemote {
    calls: Mutex<Vec<RokuCall>>,
    failure: Option<String>,
}

impl RecordingRemote {
    /// A remote whose every call is recorded and then fails
    pub fn failing(reason: &str) -> Self {
        Self {
            calls: Mutex::default(),
            failure: Some(reason.to_string()),
        }
    }

    fn outcome(&self) -> Result<()> {
        match &self.failure {
            Some(reason) => Err(Error::Device(reason.clone())),
            None => Ok(()),
        }
    }

    pub fn calls(&self) -> Vec<RokuCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Keys pressed, in order
    pub fn keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RokuCall::Keypress { key, .. } => Some(key),
                RokuCall::Launch { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl RokuRemote for RecordingRemote {
    async fn keypress(&self, base: &str, key: &str) -> Result<()> {
        self.calls.lock().unwrap().push(RokuCall::Keypress {
            base: base.to_string(),
            key: key.to_string(),
        });
        self.outcome()
    }

    async fn launch(
        &self,
        base: &str,
        app_id: &str,
        content_id: &str,
        media_type: &str,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(RokuCall::Launch {
            base: base.to_string(),
            app_id: app_id.to_string(),
            content_id: content_id.to_string(),
            media_type: media_type.to_string(),
        });
        self.outcome()
    }
}

/// The default registry over a recording remote
pub fn registry(state_dir: &Path) -> (Registry, Arc<RecordingRemote>) {
    registry_with(state_dir, RecordingRemote::default())
}

/// The default registry over the given remote
pub fn registry_with(
    state_dir: &Path,
    remote: RecordingRemote,
) -> (Registry, Arc<RecordingRemote>) {
    let remote = Arc::new(remote);
    let registry = Registry::with_defaults(state_dir, remote.clone())
        .expect("failed to build registry");
    (registry, remote)
}

pub fn settings(state_dir: &Path) -> DialogueSettings {
    DialogueSettings {
        wake_word: WAKE_WORD.to_string(),
        reprompt_attempts: 2,
        context_path: state_dir.join("vui_context.json"),
    }
}

/// Controller over scripted speech
pub fn controller<'r>(
    registry: &'r Registry,
    state_dir: &Path,
    lines: &[&str],
) -> Controller<'r, ScriptedEars, RecordingMouth> {
    Controller::new(
        registry,
        ScriptedEars::new(lines),
        RecordingMouth::default(),
        settings(state_dir),
    )
}

/// Save the Roku address the way "roku set ip" does
pub fn set_roku_address(state_dir: &Path) {
    let path = state_dir.join("roku").join("main_config.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, format!(r#"{{"ip": "{ROKU_BASE}"}}"#)).unwrap();
}
