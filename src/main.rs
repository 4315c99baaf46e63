use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use vpendant::console::{Console, ConsoleCommand, Outcome, HELP};
use vpendant::{
    init_logging_with, AppEvent, Config, EventBus, EventCategory, EventFilter, HttpJogTransport,
    JogMode, JogSessionConfig, JogSessionController, LiveJogSettings, PendantClient, StatePoller,
    BUILD_DATE, VERSION,
};
use vpendant::event_bus::{RobotEvent, TransportEvent};

/// Virtual pendant: hold-to-jog a SCARA robot from the terminal
#[derive(Debug, Parser)]
#[command(name = "vpendant", version)]
struct Args {
    /// Config file (.toml or .json); defaults to the platform config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pendant API base URL, overrides the config file
    #[arg(long)]
    server: Option<String>,

    /// Initial step size (0.1 to 10)
    #[arg(long)]
    step: Option<f64>,

    /// Initial jog mode
    #[arg(long)]
    mode: Option<JogMode>,

    /// Do not poll robot state in the background
    #[arg(long)]
    no_poll: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t)]
    log_format: vpendant::LogFormat,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Loading {}", path.display()))?,
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)?,
            Err(err) => {
                tracing::warn!("{}; using defaults", err);
                Config::default()
            }
        },
    };

    if let Some(server) = &args.server {
        config.server.base_url = server.clone();
    }
    if let Some(step) = args.step {
        config.jog.step = step;
    }
    if let Some(mode) = args.mode {
        if mode != config.jog.default_mode {
            config.jog.default_mode = mode;
            config.jog.default_axis = mode.default_axis().to_string();
        }
    }
    if args.no_poll {
        config.polling.enabled = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn log_events(events: &EventBus) {
    events.subscribe(
        EventFilter::Categories(vec![EventCategory::Session, EventCategory::Transport]),
        |event| match &event {
            AppEvent::Transport(TransportEvent::Delivered { .. }) => {
                tracing::debug!("{}", event.description())
            }
            _ => tracing::info!("{}", event.description()),
        },
    );
    // Poll failures are already logged by the poller.
    events.subscribe(
        EventFilter::Categories(vec![EventCategory::Robot]),
        |event| {
            if let AppEvent::Robot(RobotEvent::StateChanged(_)) = &event {
                tracing::debug!("{}", event.description());
            }
        },
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging_with(args.log_format)?;
    tracing::info!("vpendant {} (built {})", VERSION, BUILD_DATE);

    let config = load_config(&args)?;
    tracing::info!("Pendant API at {}", config.server.base_url);

    let events = Arc::new(EventBus::new());
    log_events(&events);

    let settings = Arc::new(
        LiveJogSettings::new(
            config.jog.default_mode,
            &config.jog.default_axis,
            config.jog.step,
        )
        .with_event_bus(events.clone()),
    );
    let client = PendantClient::with_timeout(&config.server.base_url, config.server.timeout())?;
    let transport = Arc::new(HttpJogTransport::from_client(client.clone()));
    let controller = Arc::new(JogSessionController::with_config(
        settings.clone(),
        transport,
        JogSessionConfig {
            repeat_interval: config.jog.repeat_interval(),
        },
        events.clone(),
    ));

    let poller =
        StatePoller::with_interval(client.clone(), events.clone(), config.polling.interval());
    if config.polling.enabled {
        poller.start();
    }

    let console = Console::new(controller.clone(), settings, client, config.server.robot);
    console.sync_backend()?;

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match ConsoleCommand::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match console.execute(command).await {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Print(text)) => println!("{}", text),
            Ok(Outcome::Quit) => break,
            Err(err) => println!("error: {}", err),
        }
    }

    poller.stop();
    controller.shutdown().await;
    tracing::info!("Bye");
    Ok(())
}
