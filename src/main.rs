mod app;
mod config;
mod lyrics;
mod output;
mod player;
mod sync;

use anyhow::Context;
use clap::{Parser, Subcommand};
use player::PlaybackSource;

#[derive(Debug, Parser)]
#[command(name = "waylrc", version, about = "Synced lyrics for your status bar")]
struct Cli {
    /// Override config file path.
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    /// playerctl player name (overrides config).
    #[arg(long, global = true)]
    player: Option<String>,

    /// Poll interval in milliseconds (overrides config).
    #[arg(long, global = true)]
    interval_ms: Option<u64>,

    /// Log debug detail to stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors to stderr.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Stream the current lyric line as JSON lines on stdout (default).
    Run,
    /// Write the default config file.
    InitConfig,
    /// Look up synced lyrics once and print them.
    Lookup { title: String, artist: String },
    /// Query the player once and print what it reports.
    Snapshot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::INFO
    };
    // stdout belongs to the status bar
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut cfg = config::load(cli.config.as_deref()).context("load config")?;
    if let Some(name) = cli.player {
        cfg.player.name = Some(name);
    }
    if let Some(ms) = cli.interval_ms {
        cfg.poll.interval_ms = ms;
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let app = app::App::new(
                player::Playerctl::new(cfg.player.name.clone()),
                make_client(&cfg)?,
                cfg.display.presentation(),
                cfg.poll.clone(),
            );
            let mut sink = output::StatusSink::stdout();
            app.run(&mut sink).await?;
        }
        Command::InitConfig => {
            let path = config::save(&cfg, cli.config.as_deref()).context("save config")?;
            println!("Wrote {}", path.display());
        }
        Command::Lookup { title, artist } => {
            let client = make_client(&cfg)?;
            let lyrics = lyrics::fetch_lyrics(&client, &title, &artist).await;
            if lyrics.is_empty() {
                println!("No synced lyrics found.");
            }
            for line in lyrics.lines() {
                println!("{line}");
            }
        }
        Command::Snapshot => {
            let snapshot = player::Playerctl::new(cfg.player.name.clone())
                .snapshot()
                .await;
            match snapshot.state {
                player::PlaybackState::Unavailable => println!("No active player."),
                state => println!(
                    "{:?}: {} by {} at {}ms",
                    state, snapshot.title, snapshot.artist, snapshot.position_ms
                ),
            }
        }
    }

    Ok(())
}

fn make_client(cfg: &config::Config) -> anyhow::Result<lyrics::LrclibClient> {
    lyrics::LrclibClient::new(&cfg.lyrics.base_url, cfg.lyrics.timeout())
}
