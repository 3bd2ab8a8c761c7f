//! Content launch actions
//!
//! Lookup tables under the content directory:
//! - `channel_id_map.json`: channel name to Roku app id
//! - `content_id_map.json`: channel name to content name to content id
//! - `random_episode_ranges.json`: channel name to show name to a list of
//!   inclusive `[first, last]` episode id ranges

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::{IteratorRandom, SliceRandom};
use serde_json::{Map, Value};

use super::{NO_ADDRESS, RokuRemote, address};
use crate::Result;
use crate::context::ConfigStore;
use crate::device::{ActionHandler, ActionResponse, ArgMap, ArgSpec, Args, Device};

const MEDIA_TYPE: &str = "episode";

fn load_table(dir: &Path, file: &str) -> Result<Map<String, Value>> {
    Ok(ConfigStore::open(dir.join(file))?.content().clone())
}

/// Render an id that may be stored as a string or a number
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Play a random episode of a show, or of anything when the show is `any`
pub struct PlayRandom {
    remote: Arc<dyn RokuRemote>,
    content_dir: PathBuf,
}

impl PlayRandom {
    pub fn new(remote: Arc<dyn RokuRemote>, content_dir: PathBuf) -> Self {
        Self {
            remote,
            content_dir,
        }
    }
}

/// Chosen channel, show and episode id
#[derive(Debug, PartialEq, Eq)]
struct Pick {
    channel: String,
    show: String,
    episode: u64,
}

fn episodes(ranges: &Value) -> Vec<u64> {
    ranges
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|range| {
            let bounds = range.as_array()?;
            Some(bounds.first()?.as_u64()?..=bounds.get(1)?.as_u64()?)
        })
        .flatten()
        .collect()
}

fn pick_episode(table: &Map<String, Value>, show: &str) -> Option<Pick> {
    let mut rng = rand::thread_rng();

    let (channel, show_name, ranges) = if show == "any" {
        let (channel, shows) = table
            .iter()
            .filter(|(_, shows)| shows.as_object().is_some_and(|s| !s.is_empty()))
            .choose(&mut rng)?;
        let (show_name, ranges) = shows.as_object()?.iter().choose(&mut rng)?;
        (channel, show_name, ranges)
    } else {
        table.iter().find_map(|(channel, shows)| {
            shows
                .as_object()?
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(show))
                .map(|(name, ranges)| (channel, name, ranges))
        })?
    };

    let episode = *episodes(ranges).choose(&mut rng)?;
    Some(Pick {
        channel: channel.clone(),
        show: show_name.clone(),
        episode,
    })
}

#[async_trait]
impl ActionHandler for PlayRandom {
    fn name(&self) -> &str {
        "play_random"
    }

    fn description(&self) -> &str {
        "Play a random episode from the shows with known episode ranges"
    }

    fn argmap(&self) -> ArgMap {
        ArgMap::new().arg("show", ArgSpec::string().default_value("any").order(0))
    }

    async fn perform(
        &self,
        args: &Args,
        device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()> {
        let Some(base) = address(device) else {
            response.set_message(NO_ADDRESS);
            return Ok(());
        };

        let show = args.get("show").and_then(Value::as_str).unwrap_or("any");
        let ranges = load_table(&self.content_dir, "random_episode_ranges.json")?;
        let Some(pick) = pick_episode(&ranges, show) else {
            response.set_message(format!("No show found for {show}"));
            return Ok(());
        };

        let channels = load_table(&self.content_dir, "channel_id_map.json")?;
        let Some(app_id) = channels.get(&pick.channel).and_then(id_string) else {
            response.set_message(format!("No app id for channel {}", pick.channel));
            return Ok(());
        };

        let episode = pick.episode.to_string();
        self.remote
            .launch(&base, &app_id, &episode, MEDIA_TYPE)
            .await?;

        tracing::info!(channel = %pick.channel, show = %pick.show, %episode, "random episode launched");
        response.set_message(format!("Playing {}", pick.show));
        response.insert("channel", pick.channel);
        response.insert("show", pick.show);
        response.insert("content_id", episode);
        Ok(())
    }
}

/// Play a named piece of content on a channel
pub struct PlayContent {
    remote: Arc<dyn RokuRemote>,
    content_dir: PathBuf,
}

impl PlayContent {
    pub fn new(remote: Arc<dyn RokuRemote>, content_dir: PathBuf) -> Self {
        Self {
            remote,
            content_dir,
        }
    }
}

#[async_trait]
impl ActionHandler for PlayContent {
    fn name(&self) -> &str {
        "play_content"
    }

    fn description(&self) -> &str {
        "Play a specific piece of content given by service and name"
    }

    fn argmap(&self) -> ArgMap {
        ArgMap::new()
            .arg("service", ArgSpec::string().required().order(0))
            .arg("content", ArgSpec::string().required().order(1))
    }

    async fn perform(
        &self,
        args: &Args,
        device: &mut dyn Device,
        response: &mut ActionResponse,
    ) -> Result<()> {
        let Some(base) = address(device) else {
            response.set_message(NO_ADDRESS);
            return Ok(());
        };

        let service = args.get("service").and_then(Value::as_str).unwrap_or_default();
        let content = args.get("content").and_then(Value::as_str).unwrap_or_default();

        let channels = load_table(&self.content_dir, "channel_id_map.json")?;
        let contents = load_table(&self.content_dir, "content_id_map.json")?;
        let ids = channels.get(service).and_then(id_string).zip(
            contents
                .get(service)
                .and_then(|c| c.get(content))
                .and_then(id_string),
        );
        let Some((app_id, content_id)) = ids else {
            response.set_message(format!(
                "Could not find content for channel {service} and content {content}"
            ));
            return Ok(());
        };

        self.remote
            .launch(&base, &app_id, &content_id, MEDIA_TYPE)
            .await?;
        response.set_message(format!("Playing {content}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn episodes_expand_inclusive_ranges() {
        assert_eq!(episodes(&json!([[1, 3], [7, 7]])), [1, 2, 3, 7]);
        assert!(episodes(&json!([[1]])).is_empty());
        assert!(episodes(&json!("nope")).is_empty());
    }

    #[test]
    fn named_show_matches_ignoring_case() {
        let ranges = table(json!({
            "netflix": {"The Office": [[70, 70]]},
            "hulu": {"futurama": [[5, 6]]},
        }));

        let pick = pick_episode(&ranges, "the office").unwrap();
        assert_eq!(
            pick,
            Pick {
                channel: "netflix".to_string(),
                show: "The Office".to_string(),
                episode: 70,
            }
        );
        assert!(pick_episode(&ranges, "seinfeld").is_none());
    }

    #[test]
    fn any_show_picks_from_non_empty_channels() {
        let ranges = table(json!({
            "empty": {},
            "hulu": {"futurama": [[5, 5]]},
        }));

        let pick = pick_episode(&ranges, "any").unwrap();
        assert_eq!(pick.channel, "hulu");
        assert_eq!(pick.episode, 5);
    }

    #[test]
    fn ids_may_be_numbers_or_strings() {
        assert_eq!(id_string(&json!(12)).as_deref(), Some("12"));
        assert_eq!(id_string(&json!("tvinput.hdmi1")).as_deref(), Some("tvinput.hdmi1"));
        assert_eq!(id_string(&json!(null)), None);
    }
}
