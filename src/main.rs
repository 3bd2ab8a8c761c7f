//! Hub - voice command hub for smart-home devices

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hub_gateway::context::Context;
use hub_gateway::dialogue::{Controller, Turn};
use hub_gateway::voice::{ConsoleListener, ConsoleSpeaker};
use hub_gateway::{Config, ConfigOverrides, HttpRokuRemote, Registry};

#[derive(Parser)]
#[command(name = "hub")]
#[command(about = "Voice command hub for smart-home devices", version)]
struct Cli {
    /// Directory for the context file and device settings
    #[arg(long, env = "HUB_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Word that opens a dialogue
    #[arg(long, env = "HUB_WAKE_WORD")]
    wake_word: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the dialogue loop on stdin and stdout (default)
    Listen,
    /// Handle a single command without the wake word
    Say {
        /// The command, e.g. "roku volume up 3"
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// List registered devices
    Devices {
        /// Print full descriptions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Describe a device's actions and arguments as JSON
    Describe {
        /// Device name
        device: String,
    },
    /// Show the saved dialogue context
    Context {
        /// Forget the saved context
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "info,hub_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(ConfigOverrides {
        state_dir: cli.state_dir,
        wake_word: cli.wake_word,
    })?;

    let remote = HttpRokuRemote::new(config.roku_timeout)?;
    let registry = Registry::with_defaults(config.state_dir.clone(), Arc::new(remote))?;
    tracing::debug!(devices = ?registry.device_names(), "registry built");

    match cli.command.unwrap_or(Command::Listen) {
        Command::Listen => listen(&config, &registry).await,
        Command::Say { words } => say(&config, &registry, &words.join(" ")).await,
        Command::Devices { json } => devices(&registry, json),
        Command::Describe { device } => describe(&registry, &device),
        Command::Context { clear } => context(&config, clear),
    }
}

async fn listen(config: &Config, registry: &Registry) -> anyhow::Result<()> {
    tracing::info!(
        state_dir = %config.state_dir.display(),
        wake_word = %config.wake_word,
        "starting hub"
    );

    let mut controller = Controller::new(
        registry,
        ConsoleListener::stdin(),
        ConsoleSpeaker::stdout(),
        config.dialogue_settings(),
    );
    controller.run().await?;

    tracing::info!("hub stopped");
    Ok(())
}

async fn say(config: &Config, registry: &Registry, utterance: &str) -> anyhow::Result<()> {
    let mut controller = Controller::new(
        registry,
        ConsoleListener::stdin(),
        ConsoleSpeaker::stdout(),
        config.dialogue_settings(),
    );

    match controller.say(utterance).await? {
        Turn::Quit => println!("Bye"),
        Turn::Reply(message) if message.is_empty() => println!("Done"),
        Turn::Reply(message) => println!("{message}"),
    }
    Ok(())
}

fn devices(registry: &Registry, json: bool) -> anyhow::Result<()> {
    if json {
        let descriptions = registry.describe_all()?;
        println!("{}", serde_json::to_string_pretty(&descriptions)?);
        return Ok(());
    }

    for description in registry.describe_all()? {
        println!("{:<12} {}", description.name, description.description);
    }
    Ok(())
}

fn describe(registry: &Registry, name: &str) -> anyhow::Result<()> {
    let Some(description) = registry.describe(name)? else {
        anyhow::bail!("no device named {name}");
    };
    println!("{}", serde_json::to_string_pretty(&description)?);
    Ok(())
}

fn context(config: &Config, clear: bool) -> anyhow::Result<()> {
    let path = config.context_path();
    let context = if clear {
        Context::fresh(&path)?
    } else {
        Context::open(&path)?
    };

    println!("{}", serde_json::to_string_pretty(context.record())?);
    Ok(())
}
