//! threadpost — compose and post a multi-segment thread from the terminal.
//!
//! Entry point for the `threadpost` binary. Wires together the terminal
//! lifecycle (`tui`), unified event bus (`event`), desktop capability providers
//! (`device`), background composer requests (`worker`), the UI (`ui`), and the
//! SQLite post store from `threadpost-core`.
//!
//! # Startup sequence
//!
//! 1. Load config and start file logging; both are safe before terminal init.
//! 2. `install_panic_hook()` so the terminal is restored before a panic prints.
//! 3. `register_sigterm()`, polled in the event loop.
//! 4. Open the post store before touching the terminal, so a bad database
//!    path is reported on a normal screen.
//! 5. `init_tui()` and `spawn_event_task()`.
//!
//! `restore_tui()` runs after the event loop exits (dismissal, Ctrl-c,
//! SIGTERM, or channel close). Inside the loop `?` is only used in the Render
//! arm, which breaks out through the same exit point.

mod app;
mod config;
mod device;
mod event;
mod theme;
mod tui;
mod ui;
mod worker;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use threadpost_core::capability::Capabilities;
use threadpost_core::composer::{ComposerEvent, DraftComposer};
use threadpost_core::db::PostStore;
use threadpost_core::types::{PostReceipt, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

/// Sends `tracing` output to `path`. The terminal belongs to the TUI, so
/// nothing is logged to stderr. Filter comes from `THREADPOST_LOG`.
fn init_logging(path: &std::path::Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env("THREADPOST_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = config::load_config();
    if let Err(e) = init_logging(&config.log_path()) {
        eprintln!("threadpost: logging disabled: {e}");
    }
    let theme = theme::Theme::from_name(&config.theme);

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm();

    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = PostStore::open(&db_path.to_string_lossy())
        .await
        .map_err(std::io::Error::other)?;
    info!(db = %db_path.display(), author = %config.author, "composer opened");

    let handler = event::EventHandler::new();
    let device = device::DesktopDevice::new(&config, config::config_path(), handler.tx.clone());
    let (composer_tx, mut composer_rx) = tokio::sync::mpsc::unbounded_channel();
    let composer = DraftComposer::new(
        Capabilities::from_device(Arc::new(device)),
        Arc::new(store),
        Session::new(config.author.clone()),
    )
    .with_events(composer_tx);
    let mut state = app::AppState::new(config.author.clone(), composer.snapshot());

    let mut terminal = tui::init_tui()?;
    event::spawn_event_task(handler.tx.clone());
    let tx = handler.tx;
    let mut rx = handler.rx;

    // Exits only via `break`, never via `?`, so `restore_tui()` is always reached.
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50ms even when idle.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            Some(composer_event) = composer_rx.recv() => {
                state.apply_composer_event(composer_event);
                state.refresh(&composer);
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        terminal.draw(|frame| ui::render(frame, &mut state, &theme))?;
                    }
                    Some(AppEvent::Tick) => {
                        state.on_tick();
                        state.refresh(&composer);
                    }
                    Some(AppEvent::Key(key)) => match handle_key(key, &mut state, &composer) {
                        KeyAction::Quit => break 'event_loop,
                        KeyAction::Dispatch(request) => {
                            worker::spawn_request(composer.clone(), request, tx.clone());
                        }
                        KeyAction::Continue => {}
                    },
                    Some(AppEvent::Mouse(mouse)) => {
                        handle_mouse(mouse, &mut state);
                    }
                    Some(AppEvent::RequestDone(result)) => {
                        state.apply_request_result(*result);
                        state.refresh(&composer);
                    }
                    Some(AppEvent::Dismissed) | None => break 'event_loop,
                    // ratatui picks up the new size from frame.area() on the next Render.
                    Some(AppEvent::Resize(_, _)) => {}
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;

    // Dismissal can overtake the Posted notification on the other channel.
    while let Ok(event) = composer_rx.try_recv() {
        if let ComposerEvent::Posted(receipt) = event {
            state.last_receipt = Some(receipt);
        }
    }
    report(state.last_receipt.as_ref());
    Ok(())
}

fn report(receipt: Option<&PostReceipt>) {
    match receipt {
        Some(r) => println!("{}", app::posted_message(r)),
        None => info!("composer closed without posting"),
    }
}
