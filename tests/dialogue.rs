//! Dialogue controller integration tests
//!
//! Runs whole turns against the default registry with scripted speech and a
//! recording Roku remote.

use std::path::PathBuf;

use async_trait::async_trait;
use hub_gateway::device::roku::{MAX_VOLUME_UNITS, NO_ADDRESS};
use hub_gateway::dialogue::{Controller, DialogueState, Turn};
use hub_gateway::{Context, Error, Result, SpeechToText, TextToSpeech};

mod common;

use common::{
    ROKU_BASE, RecordingMouth, RecordingRemote, RokuCall, ScriptedEars, controller, registry,
    registry_with, set_roku_address, settings,
};

/// Speaker that truncates the context file on its second message, the way a
/// concurrent writer caught mid-write would
struct CorruptingMouth {
    context_path: PathBuf,
    spoken: Vec<String>,
}

#[async_trait]
impl TextToSpeech for CorruptingMouth {
    async fn speak(&mut self, text: &str) -> Result<()> {
        self.spoken.push(text.to_string());
        if self.spoken.len() == 2 {
            std::fs::write(&self.context_path, r#"{"device": "ro"#)?;
        }
        Ok(())
    }
}

/// Listener whose microphone is gone
struct DeafEars;

#[async_trait]
impl SpeechToText for DeafEars {
    async fn listen_for_wakeword(&mut self, _word: &str) -> Result<()> {
        Err(Error::Voice("microphone unplugged".to_string()))
    }

    async fn listen(&mut self) -> Result<String> {
        Err(Error::Voice("microphone unplugged".to_string()))
    }
}

fn write_content_table(state_dir: &std::path::Path, file: &str, json: &str) {
    let content = state_dir.join("roku").join("content");
    std::fs::create_dir_all(&content).unwrap();
    std::fs::write(content.join(file), json).unwrap();
}

fn saved_context(state_dir: &std::path::Path) -> Context {
    Context::open(state_dir.join("vui_context.json")).expect("failed to open context")
}

#[tokio::test]
async fn test_set_ip_then_volume() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, remote) = registry(dir.path());
    let mut controller = controller(
        &registry,
        dir.path(),
        &[
            "jarvis",
            "roku set ip 192.168.1.5",
            "jarvis",
            "roku volume up 3",
            "jarvis",
            "quit",
        ],
    );

    controller.run().await.unwrap();
    assert_eq!(controller.state(), DialogueState::Stopped);

    assert_eq!(remote.keys(), ["VolumeUp", "VolumeUp", "VolumeUp"]);
    assert!(remote.calls().iter().all(|call| matches!(
        call,
        RokuCall::Keypress { base, .. } if base == ROKU_BASE
    )));

    let (ears, mouth) = controller.into_parts();
    assert_eq!(ears.wakeups, 3);
    assert_eq!(
        mouth.spoken,
        [
            "Listening",
            "Roku address set to http://192.168.1.5",
            "Listening",
            "Listening",
        ]
    );

    let context = saved_context(dir.path());
    assert_eq!(context.device(), None);
    assert!(!context.in_dialogue());
}

#[tokio::test]
async fn test_spelled_numbers_fill_arguments() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    let (registry, remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &[]);

    let turn = controller.say("Roku volume down two").await.unwrap();
    assert_eq!(turn, Turn::Reply(String::new()));
    assert_eq!(remote.keys(), ["VolumeDown", "VolumeDown"]);
}

#[tokio::test]
async fn test_missing_argument_is_asked_for() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    let (registry, remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &["loud", "two"]);

    controller.say("roku hdmi").await.unwrap();
    assert_eq!(remote.keys(), ["InputHDMI2"]);

    let (_, mouth) = controller.into_parts();
    assert_eq!(
        mouth.spoken,
        ["Give a value for Input", "Give a value for Input"]
    );
}

#[tokio::test]
async fn test_reprompt_attempts_run_out() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    let (registry, remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &["", "loud", "three"]);

    let turn = controller.say("roku hdmi").await.unwrap();
    assert_eq!(turn, Turn::Reply("loud is not a valid Input".to_string()));
    assert!(remote.calls().is_empty());

    let (_, mouth) = controller.into_parts();
    assert_eq!(mouth.spoken.len(), 2);
    assert!(saved_context(dir.path()).in_dialogue());
}

#[tokio::test]
async fn test_entered_device_persists_until_exit() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    let (registry, remote) = registry(dir.path());
    let mut controller = controller(
        &registry,
        dir.path(),
        &["jarvis", "enter roku", "volume down", "exit", "jarvis", "quit"],
    );

    controller.run().await.unwrap();
    assert_eq!(remote.keys(), ["VolumeDown"]);

    let (ears, mouth) = controller.into_parts();
    assert_eq!(ears.wakeups, 2);
    assert_eq!(
        mouth.spoken,
        ["Listening", "Using device roku", "Cleared context", "Listening"]
    );

    let context = saved_context(dir.path());
    assert_eq!(context.device(), None);
    assert!(!context.in_dialogue());
}

#[tokio::test]
async fn test_enter_is_saved_between_runs_of_say() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    let (registry, remote) = registry(dir.path());

    let mut first = controller(&registry, dir.path(), &[]);
    first.say("enter roku").await.unwrap();
    let context = saved_context(dir.path());
    assert_eq!(context.device(), Some("roku"));
    assert!(context.in_dialogue());

    let mut second = controller(&registry, dir.path(), &[]);
    second.say("home").await.unwrap();
    assert_eq!(remote.keys(), ["Home"]);
}

#[tokio::test]
async fn test_unknown_device_keeps_dialogue_open() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, remote) = registry(dir.path());
    let mut controller = controller(
        &registry,
        dir.path(),
        &["jarvis", "toaster on", "roku home", "jarvis", "quit"],
    );

    controller.run().await.unwrap();
    assert!(remote.calls().is_empty());

    let (ears, mouth) = controller.into_parts();
    assert_eq!(ears.wakeups, 2);
    assert_eq!(
        mouth.spoken,
        ["Listening", "No device named toaster", NO_ADDRESS, "Listening"]
    );
}

#[tokio::test]
async fn test_unknown_action_reprompts() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &[]);

    let turn = controller.say("roku rewind").await.unwrap();
    assert_eq!(
        turn,
        Turn::Reply("No action named rewind for device roku".to_string())
    );

    let turn = controller.say("roku").await.unwrap();
    assert_eq!(turn, Turn::Reply("Must specify an action".to_string()));
}

#[tokio::test]
async fn test_play_content_launches_mapped_ids() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    let content = dir.path().join("roku").join("content");
    std::fs::create_dir_all(&content).unwrap();
    std::fs::write(content.join("channel_id_map.json"), r#"{"netflix": "12"}"#).unwrap();
    std::fs::write(
        content.join("content_id_map.json"),
        r#"{"netflix": {"the office": 70136120}}"#,
    )
    .unwrap();

    let (registry, remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &["The Office"]);

    let turn = controller.say("roku play content netflix").await.unwrap();
    assert_eq!(turn, Turn::Reply("Playing the office".to_string()));
    assert_eq!(
        remote.calls(),
        [RokuCall::Launch {
            base: ROKU_BASE.to_string(),
            app_id: "12".to_string(),
            content_id: "70136120".to_string(),
            media_type: "episode".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_quit_stops_before_remaining_input() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    let (registry, remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &["jarvis", "quit", "jarvis", "roku home"]);

    controller.run().await.unwrap();
    assert_eq!(controller.state(), DialogueState::Stopped);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_closed_input_stops_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &["hello", "jarvis"]);

    controller.run().await.unwrap();
    assert_eq!(controller.state(), DialogueState::Stopped);

    let (ears, mouth) = controller.into_parts();
    assert_eq!(ears.wakeups, 1);
    assert_eq!(mouth.spoken, ["Listening"]);
}

#[tokio::test]
async fn test_run_clears_stale_context() {
    let dir = tempfile::tempdir().unwrap();
    let mut stale = saved_context(dir.path());
    stale.set_device(Some("roku".to_string()));
    stale.set_in_dialogue(true);
    stale.save().unwrap();

    let (registry, _remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &["home"]);

    controller.run().await.unwrap();

    // The stale dialogue is gone, so the first line is not taken as a command
    let (ears, mouth) = controller.into_parts();
    assert_eq!(ears.wakeups, 0);
    assert!(mouth.spoken.is_empty());
    assert_eq!(saved_context(dir.path()).device(), None);
}

#[tokio::test]
async fn test_corrupt_context_mid_run_still_waits_for_input() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _remote) = registry(dir.path());
    let dialogue_settings = settings(dir.path());
    let mouth = CorruptingMouth {
        context_path: dialogue_settings.context_path.clone(),
        spoken: Vec::new(),
    };
    let mut controller = Controller::new(
        &registry,
        ScriptedEars::new(&["jarvis", "toaster"]),
        mouth,
        dialogue_settings,
    );

    controller.run().await.unwrap();
    assert_eq!(controller.state(), DialogueState::Stopped);

    let (ears, mouth) = controller.into_parts();
    assert_eq!(ears.wakeups, 1);
    assert_eq!(mouth.spoken, ["Listening", "No device named toaster"]);
}

#[tokio::test]
async fn test_corrupt_context_at_startup_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("vui_context.json"), "not json").unwrap();
    let (registry, _remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &["jarvis", "toaster"]);

    controller.run().await.unwrap();

    let context = saved_context(dir.path());
    assert!(context.in_dialogue());
    assert_eq!(context.device(), None);
}

#[tokio::test]
async fn test_say_reads_corrupt_context_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    std::fs::write(dir.path().join("vui_context.json"), r#"{"device": "ro"#).unwrap();
    let (registry, remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &[]);

    controller.say("roku home").await.unwrap();
    assert_eq!(remote.keys(), ["Home"]);
    assert!(!saved_context(dir.path()).in_dialogue());
}

#[tokio::test]
async fn test_broken_listener_stops_run() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _remote) = registry(dir.path());
    let mut controller = Controller::new(
        &registry,
        DeafEars,
        RecordingMouth::default(),
        settings(dir.path()),
    );

    let err = controller.run().await.unwrap_err();
    assert!(matches!(err, Error::Voice(_)));
    assert_eq!(controller.state(), DialogueState::Stopped);

    let (_, mouth) = controller.into_parts();
    assert_eq!(
        mouth.spoken,
        [
            "voice error: microphone unplugged",
            "voice error: microphone unplugged"
        ]
    );
}

#[tokio::test]
async fn test_device_failure_is_spoken_and_loop_continues() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    let (registry, remote) =
        registry_with(dir.path(), RecordingRemote::failing("connection refused"));
    let mut controller = controller(
        &registry,
        dir.path(),
        &["jarvis", "roku home", "jarvis", "roku ok", "jarvis", "quit"],
    );

    controller.run().await.unwrap();
    assert_eq!(remote.keys(), ["Home", "Select"]);

    let (ears, mouth) = controller.into_parts();
    assert_eq!(ears.wakeups, 3);
    assert_eq!(
        mouth.spoken,
        [
            "Listening",
            "Sorry, home failed: device error: connection refused",
            "Listening",
            "Sorry, ok failed: device error: connection refused",
            "Listening",
        ]
    );
}

#[tokio::test]
async fn test_play_random_launches_an_episode() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    write_content_table(dir.path(), "channel_id_map.json", r#"{"hulu": "2285"}"#);
    write_content_table(
        dir.path(),
        "random_episode_ranges.json",
        r#"{"hulu": {"frasier": [[501, 501]]}}"#,
    );
    let (registry, remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &[]);

    let turn = controller.say("roku play random").await.unwrap();
    assert_eq!(turn, Turn::Reply("Playing frasier".to_string()));
    assert_eq!(
        remote.calls(),
        [RokuCall::Launch {
            base: ROKU_BASE.to_string(),
            app_id: "2285".to_string(),
            content_id: "501".to_string(),
            media_type: "episode".to_string(),
        }]
    );

    let turn = controller.say("roku play random seinfeld").await.unwrap();
    assert_eq!(turn, Turn::Reply("No show found for seinfeld".to_string()));
    assert_eq!(remote.calls().len(), 1);
}

#[tokio::test]
async fn test_volume_steps_are_capped() {
    let dir = tempfile::tempdir().unwrap();
    set_roku_address(dir.path());
    let (registry, remote) = registry(dir.path());
    let mut controller = controller(&registry, dir.path(), &[]);

    let turn = controller.say("roku volume up 900").await.unwrap();
    assert_eq!(turn, Turn::Reply("Cannot change the volume by 900".to_string()));
    assert!(remote.calls().is_empty());

    controller
        .say(&format!("roku volume down {MAX_VOLUME_UNITS}"))
        .await
        .unwrap();
    assert_eq!(remote.calls().len(), usize::try_from(MAX_VOLUME_UNITS).unwrap());
}
