use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

use podplay::{
    ApiConfig, DEFAULT_API_URL, Episode, EpisodeClient, EpisodePage, HomePage, Loadable, Outcome,
    PlaybackStore, Player, ReqwestClient, Session, SessionCommand, SimulatedMedia,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static WAVE: Emoji<'_, '_> = Emoji("👋 ", "");

/// Browse and listen to podcast episodes from a REST backend
#[derive(Parser, Debug)]
#[command(name = "podplay")]
#[command(about = "Browse and listen to podcast episodes")]
#[command(version)]
struct Args {
    /// Base URL of the episode backend
    #[arg(long, env = "PODPLAY_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Maximum number of episodes requested for the listing
    #[arg(short, long)]
    limit: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the latest releases and the full episode listing
    Home,

    /// Show one episode
    Episode {
        /// Episode id
        id: String,
    },

    /// Start an interactive listening session
    Listen {
        /// Clock tick of the headless player, in milliseconds
        #[arg(long, default_value = "1000")]
        tick_ms: u64,
    },
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let level = log_level(verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("podplay={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = ApiConfig::new(&args.api_url)
        .context("Invalid API configuration")?
        .with_list_limit(args.limit);
    let client = EpisodeClient::new(ReqwestClient::new(), config);

    match args.command {
        Command::Home => show_home(&client, args.json).await,
        Command::Episode { id } => show_episode(&client, &id, args.json).await,
        Command::Listen { tick_ms } => listen(client, Duration::from_millis(tick_ms.max(10))).await,
    }
}

async fn show_home(client: &EpisodeClient<ReqwestClient>, json: bool) -> Result<()> {
    let page = HomePage::load(client).await;

    if !json {
        print!("{}", page.render());
        return Ok(());
    }

    let latest = ready_or_bail("latest releases", &page.latest)?;
    let all = ready_or_bail("episodes", &page.all)?;
    let output = serde_json::json!({ "latest": latest, "all": all });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize episodes")?
    );
    Ok(())
}

async fn show_episode(client: &EpisodeClient<ReqwestClient>, id: &str, json: bool) -> Result<()> {
    let page = EpisodePage::load(client, id).await;

    if !json {
        print!("{}", page.render());
        return Ok(());
    }

    match &page.episode {
        Loadable::Ready(episode) => {
            let episode: &Episode = episode;
            println!(
                "{}",
                serde_json::to_string_pretty(episode).context("Failed to serialize episode")?
            );
            Ok(())
        }
        Loadable::Failed(reason) => bail!("Could not load episode '{id}': {reason}"),
    }
}

fn ready_or_bail<'a>(
    what: &str,
    section: &'a Loadable<Vec<std::sync::Arc<Episode>>>,
) -> Result<Vec<&'a Episode>> {
    match section {
        Loadable::Ready(episodes) => Ok(episodes.iter().map(|e| e.as_ref()).collect()),
        Loadable::Failed(reason) => bail!("Could not load {what}: {reason}"),
    }
}

async fn listen(client: EpisodeClient<ReqwestClient>, tick: Duration) -> Result<()> {
    println!(
        "\n{}{} {}\n",
        MICROPHONE,
        "podplay".bold().magenta(),
        "- type 'help' for commands".dimmed()
    );

    let mut session = Session::new(
        client,
        PlaybackStore::new(),
        Player::new(SimulatedMedia::new()),
    );

    if let Outcome::Continue(text) = session.execute(SessionCommand::Home).await {
        print!("{text}");
    }
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };

                match SessionCommand::parse(&line) {
                    Ok(command) => match session.execute(command).await {
                        Outcome::Continue(text) => print!("{text}"),
                        Outcome::Quit => break,
                    },
                    Err(e) => println!("{}", e.to_string().red()),
                }
                prompt()?;
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                let elapsed = now - last_tick;
                last_tick = now;

                if session.tick(elapsed) {
                    print!("\n{}", session.now_playing());
                    prompt()?;
                }
            }
        }
    }

    println!("{WAVE}{}", "Bye!".green());
    Ok(())
}

fn prompt() -> Result<()> {
    print!("{} ", ">".cyan().bold());
    std::io::stdout().flush().context("Failed to flush stdout")
}
