//! yt-insight - AI-powered YouTube video insights in your terminal
//!
//! Paste a link, pick an analysis mode, then explore summaries, roadmaps,
//! transcripts, and a contextual chat about the video.

mod core;
mod error;
mod prompts;
mod session;
mod storage;
mod types;
mod ui;
mod utils;

use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::core::resolver;
use crate::session::Session;
use crate::storage::config;
use crate::types::{AnalysisMode, ChatRole, ChatTurn, MenuItem, ViewKind};
use crate::ui::menu;
use crate::utils::paths::{ensure_app_dirs, get_config_path, get_log_dir};

/// AI-powered YouTube video insights in your terminal.
#[derive(Parser, Debug)]
#[command(name = "yt-insight")]
#[command(version, about, long_about = None)]
struct Cli {
    /// YouTube URL or video id to analyze on startup
    url: Option<String>,

    /// Analysis mode for the startup URL
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Edit the configuration file
    #[arg(short, long)]
    edit: bool,

    /// Print extra diagnostics
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum ModeArg {
    Knowledge,
    Entertainment,
}

impl From<ModeArg> for AnalysisMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Knowledge => AnalysisMode::Knowledge,
            ModeArg::Entertainment => AnalysisMode::Entertainment,
        }
    }
}

/// Top-level actions offered between views
#[derive(Debug, Clone, Copy)]
enum Action {
    Analyze,
    View(ViewKind),
    Audience,
    Quit,
}

fn setup_logging() -> anyhow::Result<()> {
    let log_dir = get_log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = format!("{}/yt-insight.log", log_dir);

    let target = Box::new(
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file);
    Ok(())
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging()?;
    ensure_app_dirs().await?;

    if cli.edit {
        let cfg = config::load_config().await?;
        config::edit_config(&cfg.editor).await?;
        return Ok(());
    }

    let cfg = config::load_config().await?;

    if cli.verbose {
        eprintln!("Config: {}", get_config_path());
        eprintln!("Logs:   {}/yt-insight.log", get_log_dir());
    }

    let mut session = Session::new(cfg)?;

    println!("{}", "YouTube Video Insight".bold());

    let mut startup_url = cli.url.clone();
    let mut startup_mode = cli.mode.map(AnalysisMode::from);

    loop {
        let mut items: Vec<MenuItem<Action>> = vec![MenuItem {
            label: "🎬 Analyze a video".into(),
            value: Action::Analyze,
        }];

        // Views open up once the active video has an analysis
        if session.state.insight().is_some() {
            for view in session.state.available_views() {
                items.push(MenuItem {
                    label: format!("{} {}", view_icon(*view), view.label()),
                    value: Action::View(*view),
                });
            }
            if !session.state.audience_options().is_empty() {
                items.push(MenuItem {
                    label: format!("👥 Audience ({})", session.state.selected_audience()),
                    value: Action::Audience,
                });
            }
        }

        items.push(MenuItem {
            label: "🚪 Quit".into(),
            value: Action::Quit,
        });

        // A startup URL skips straight to processing
        let action = if startup_url.is_some() {
            Action::Analyze
        } else {
            menu::select(&items, "Select Action").unwrap_or(Action::Quit)
        };

        let result = match action {
            Action::Analyze => {
                run_analyze(&mut session, startup_url.take(), startup_mode.take()).await
            }
            Action::View(view) => run_view(&mut session, view).await,
            Action::Audience => {
                run_audience(&mut session);
                Ok(())
            }
            Action::Quit => break,
        };

        if let Err(e) = result {
            warn!("action failed: {}", e);
            eprintln!("{} {}", "Error:".red(), e);
        }
    }

    Ok(())
}

fn view_icon(view: ViewKind) -> &'static str {
    match view {
        ViewKind::Summary => "📄",
        ViewKind::Roadmap => "🗺️",
        ViewKind::SimilarContent => "🎞️",
        ViewKind::Transcript => "📝",
        ViewKind::Chat => "💬",
    }
}

/// Resolve a URL, pick a mode, and run the analysis pipeline
async fn run_analyze(
    session: &mut Session,
    startup_url: Option<String>,
    startup_mode: Option<AnalysisMode>,
) -> error::Result<()> {
    let Some(input) = startup_url.or_else(|| menu::input("YouTube URL")) else {
        return Ok(());
    };

    let Some(video_id) = resolver::extract_video_id(&input) else {
        println!("{}", "Could not extract a video id from that input.".yellow());
        println!(
            "Supported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/v/ID"
        );
        return Ok(());
    };

    println!("{} {}", "Video:".dimmed(), resolver::watch_url(&video_id));

    let mode = match startup_mode.or_else(|| {
        let modes = vec![
            MenuItem {
                label: AnalysisMode::Knowledge.label().into(),
                value: AnalysisMode::Knowledge,
            },
            MenuItem {
                label: AnalysisMode::Entertainment.label().into(),
                value: AnalysisMode::Entertainment,
            },
        ];
        menu::select(&modes, "Select Analysis Type")
    }) {
        Some(mode) => mode,
        None => return Ok(()),
    };

    if mode == AnalysisMode::Entertainment {
        println!(
            "{}",
            "Entertainment analysis downloads the video and takes noticeably longer.".yellow()
        );
        if !menu::confirm("Continue?") {
            return Ok(());
        }
    }

    session.state.select_video(&video_id, mode);

    println!("{}", "Analyzing video...".dimmed());
    session.process().await?;

    println!("{}", "✓ Analysis complete!".green());
    if let Some(insight) = session.state.insight() {
        let video_type = insight.video_type();
        if !video_type.is_empty() {
            println!("{} {}", "Video type:".dimmed(), video_type);
        }
    }

    Ok(())
}

async fn run_view(session: &mut Session, view: ViewKind) -> error::Result<()> {
    if !session.state.allows_view(view) {
        return Ok(());
    }

    match view {
        ViewKind::Summary => {
            println!("{}", "Video Summary".bold());
            let pb = spinner("Generating summary...");
            let summary = session.generate_summary().await;
            pb.finish_and_clear();
            println!("{}", summary?);
        }

        ViewKind::Roadmap => {
            println!("{}", "Learning Roadmap".bold());
            let pb = spinner("Creating roadmap...");
            let roadmap = session.generate_roadmap().await;
            pb.finish_and_clear();
            println!("{}", roadmap?);
        }

        ViewKind::SimilarContent => {
            println!("{}", "Similar Content Recommendations".bold());
            let Some(insight) = session.state.insight() else {
                return Ok(());
            };
            println!("{} {}", "Genre:".bold(), insight.genre());
            println!("{} {}", "Mood:".bold(), insight.mood());
            println!("{} {}", "Key elements:".bold(), insight.key_elements().join(", "));
            println!("{}", "Recommended:".bold());
            for item in insight.similar_content_suggestions() {
                println!("  - {}", item);
            }
        }

        ViewKind::Transcript => {
            println!("{}", "Video Transcript".bold());
            let Some(transcript) = session.state.transcript() else {
                println!("{}", "No transcript available for this video.".yellow());
                return Ok(());
            };
            println!("{}", "English Translation".bold());
            println!("{}", transcript.translated);
            if transcript.language != "en" {
                println!();
                println!("{}", format!("Original ({})", transcript.language).bold());
                println!("{}", transcript.original);
            }
        }

        ViewKind::Chat => run_chat(session).await?,
    }

    Ok(())
}

async fn run_chat(session: &mut Session) -> error::Result<()> {
    println!("{}", "Video Chat Assistant".bold());

    let Some(video_id) = session.state.active_video().map(|v| v.to_string()) else {
        return Ok(());
    };

    for turn in session.state.chat_log(&video_id) {
        print_chat_turn(turn);
    }

    while let Some(question) = menu::input("Ask about the content (empty to go back)") {
        let pb = spinner("Thinking...");
        let answer = session.chat(&question).await;
        pb.finish_and_clear();

        match answer {
            Ok(text) => println!("{} {}", "assistant:".cyan(), text),
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }
    }

    Ok(())
}

fn print_chat_turn(turn: &ChatTurn) {
    let when = chrono::DateTime::from_timestamp(turn.timestamp, 0)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default();

    let speaker = match turn.role {
        ChatRole::User => "you:".green(),
        ChatRole::Assistant => "assistant:".cyan(),
    };

    println!("{} {} {}", format!("[{}]", when).dimmed(), speaker, turn.content);
}

fn run_audience(session: &mut Session) {
    let options = session.state.audience_options();
    if options.is_empty() {
        return;
    }

    let items: Vec<MenuItem<String>> = options
        .iter()
        .map(|o| MenuItem {
            label: o.clone(),
            value: o.clone(),
        })
        .collect();

    if let Some(choice) = menu::select(&items, "Select Audience") {
        session.state.set_audience(&choice);
    }
}
