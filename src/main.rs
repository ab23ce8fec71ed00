//! Terminal cube tutor (default binary).
//!
//! Runs the event loop: keys, animation settling, remote commands and
//! 100 ms ticks are handled one at a time on this thread.

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};

use cube_tutor::adapter::Adapter;
use cube_tutor::app::{App, KeyResult};
use cube_tutor::config::{AppConfig, Cli};
use cube_tutor::core::EngineSnapshot;
use cube_tutor::remote::RemoteBridge;
use cube_tutor::store::Store;
use cube_tutor::term::{AdapterStatusView, CubeView, FrameBuffer, TerminalRenderer, Viewport};
use cube_tutor::types::TICK_MS;
use cube_tutor::{logging, unix_ms};

/// Poll interval while a turn is animating.
const FRAME_MS: u64 = 16;

fn main() -> Result<()> {
    let config = AppConfig::load(Cli::parse());
    logging::init(config.log_file.as_deref())?;
    tracing::info!(data_dir = %config.data_dir.display(), "starting");

    let store = match Store::open(&config.data_dir) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(error = %e, "saving disabled");
            None
        }
    };
    let mut app = App::load(&config, store, unix_ms())?;

    let mut remote = if config.adapter.disabled {
        tracing::info!("remote adapter disabled");
        None
    } else {
        match Adapter::start(config.adapter.clone()) {
            Ok(adapter) => Some(RemoteBridge::new(adapter)),
            Err(e) => {
                tracing::warn!(error = %e, "remote adapter unavailable");
                None
            }
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut app, remote.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    app.save()?;
    tracing::info!("exit");
    result
}

fn run(term: &mut TerminalRenderer, app: &mut App, mut remote: Option<&mut RemoteBridge>) -> Result<()> {
    let view = CubeView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snapshot = EngineSnapshot::default();

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();
    let mut redraw = true;

    loop {
        let now = unix_ms();

        if let Some(bridge) = remote.as_deref_mut() {
            bridge.pump(app, now);
        }

        if redraw {
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            let adapter_view = match remote.as_deref() {
                Some(bridge) => Some(bridge.status_view()),
                None => Some(AdapterStatusView {
                    enabled: false,
                    client_count: 0,
                    controller_id: None,
                }),
            };
            app.engine().snapshot_into(&mut snapshot);
            let hud = app.hud(adapter_view, now);
            view.render_into(&snapshot, &hud, Viewport::new(w, h), &mut fb);
            term.draw_swap(&mut fb)?;
            redraw = false;
        }

        let mut timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if app.animation().is_some() {
            timeout = timeout.min(Duration::from_millis(FRAME_MS));
        }

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key, unix_ms()) == KeyResult::Quit {
                        return Ok(());
                    }
                    redraw = true;
                }
                Event::Resize(_, _) => {
                    term.invalidate();
                    redraw = true;
                }
                _ => {}
            }
        }

        let now = unix_ms();
        if app.tick(now) {
            redraw = true;
        }

        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            // Adapter status changes arrive without an event.
            redraw |= remote.is_some();
            if let Err(e) = app.save_if_dirty() {
                tracing::warn!(error = ?e, "save failed");
            }
        }
    }
}
