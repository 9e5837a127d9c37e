//! A scroll-driven portfolio page in the terminal.
//!
//! Scroll with the wheel or keys; on wide terminals the page snaps between
//! its showcase sections with a smooth programmatic scroll.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr, Stderr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    text::Line,
    widgets::Paragraph,
    Terminal,
};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    preview::ModalPhase,
    state::{AppState, Options},
    worker::WorkerUpdate,
};
use crate::ui::{
    layout::AppLayout, lightbox::LightboxWidget, page_widget::PageWidget, spinner::LoadingIndicator,
    theme::Theme,
};

/// Poll interval of the terminal reader; also the spinner's frame time.
const INPUT_TICK: Duration = Duration::from_millis(100);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), version, about = "Scroll-driven portfolio page")]
struct Cli {
    /// Base URL of the file catalog service (serves `/api/files`).
    #[arg(long)]
    catalog_url: Option<String>,

    /// Document to preview: an image or a directory of page images.
    #[arg(long)]
    document: Option<PathBuf>,

    /// Image for the hero showcase and artwork preview.
    #[arg(long)]
    artwork: Option<PathBuf>,

    /// Where board downloads are saved.
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Write logs here instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Disable scroll snapping.
    #[arg(long)]
    no_snap: bool,

    /// Write the effective configuration to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Arc::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let user_config = config::AppConfig::load();
    if cli.write_config {
        user_config.save()?;
        println!("{}", config::config_path().display());
        return Ok(());
    }
    let options = Options {
        catalog_url: cli.catalog_url,
        document: cli.document,
        artwork: cli.artwork,
        download_dir: cli.download_dir,
        no_snap: cli.no_snap,
    };

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, user_config, options).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    user_config: config::AppConfig,
    options: Options,
) -> Result<()> {
    let size = terminal.size()?;
    let mut state = AppState::new(user_config, options, Rect::new(0, 0, size.width, size.height));
    tracing::info!(
        width = state.terminal_area.width,
        height = state.terminal_area.height,
        snap = state.snap_enabled,
        "page ready"
    );

    let mut events = spawn_event_reader(INPUT_TICK);
    let (update_tx, mut updates) = mpsc::unbounded_channel::<WorkerUpdate>();
    let frame_period = Duration::from_secs_f64(1.0 / f64::from(state.config.frame_rate.max(1)));
    let mut frames = tokio::time::interval(frame_period);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        draw(terminal, &mut state)?;
        handler::dispatch_jobs(&mut state, &update_tx);

        let throttle_at = state.throttle.deadline().map(tokio::time::Instant::from_std);
        // The sleep future is built even when its branch is disabled.
        let snap_at = throttle_at.unwrap_or_else(|| tokio::time::Instant::now() + INPUT_TICK);
        let animating = state.needs_frames();

        tokio::select! {
            Some(event) = events.recv() => {
                let now = Instant::now();
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k, now),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m, now),
                    AppEvent::Resize(w, h) => {
                        handler::handle_resize(&mut state, Rect::new(0, 0, w, h), now);
                    }
                    AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
                }
            }

            Some(update) = updates.recv() => {
                handler::apply_worker_update(&mut state, update);
                while let Ok(update) = updates.try_recv() {
                    handler::apply_worker_update(&mut state, update);
                }
            }

            _ = tokio::time::sleep_until(snap_at), if throttle_at.is_some() => {
                handler::run_snap_tick(&mut state, Instant::now());
            }

            _ = frames.tick(), if animating => {
                handler::advance_frame(&mut state, Instant::now());
            }

            else => break,
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(terminal: &mut Terminal<CrosstermBackend<Stderr>>, state: &mut AppState) -> Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        let layout = AppLayout::from_area(area);

        state.board_hits = PageWidget::new(state).render_and_hit(layout.page_area, frame.buffer_mut());

        let hint = state.config.status_bar_hint();
        let status_text = state.status_message.as_deref().unwrap_or(&hint);
        frame.render_widget(
            Paragraph::new(format!(" {status_text}")).style(Theme::status_bar_style()),
            layout.status_area,
        );
        if state.driver.is_animating() {
            let label = format!("{} snapping ", LoadingIndicator::frame(state.tick));
            frame.render_widget(Line::from(label).right_aligned(), layout.status_area);
        }

        state.lightbox_hits = if state.modal.is_visible() {
            let widget = LightboxWidget {
                pane: state.modal.pane(),
                artwork: &state.artwork,
                document: &state.document,
                closing: matches!(state.modal.phase(), ModalPhase::Closing { .. }),
                tick: state.tick,
            };
            Some(widget.render_and_hit(area, frame.buffer_mut()))
        } else {
            None
        };
    })?;
    Ok(())
}
