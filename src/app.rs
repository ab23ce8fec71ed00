//! Application shell around the engine.
//!
//! The engine is pure: it reports what a command did. This module reacts to
//! those reports by updating the progress record, unlocking achievements,
//! driving the rotation animation and deciding when to save.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::adapter::ClientCommand;
use crate::config::AppConfig;
use crate::core::progress::{ACH_FIRST_MOVE, ACH_FIRST_SOLVE, ACH_TUTORIAL_COMPLETE};
use crate::core::session::Admission;
use crate::core::tutorial::{self, LAST_STEP};
use crate::core::{format_time, Applied, CubeEngine, MoveOutcome, Progress, SimpleRng};
use crate::input::{handle_key_event, parse_line, should_quit};
use crate::store::Store;
use crate::term::{AdapterStatusView, Hud, RotationAnimation};
use crate::types::{clamp_animation_speed, InputCommand, ANIMATION_SPEED_STEP};

/// How long a notice stays on screen.
pub const NOTICE_MS: u64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    Continue,
    Quit,
}

/// Tally of one command (or a batch of remote commands).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandReport {
    /// Moves committed, or admitted for animation.
    pub applied: u32,
    /// Moves rejected because a turn was still animating.
    pub dropped: u32,
}

impl CommandReport {
    fn merge(&mut self, other: CommandReport) {
        self.applied += other.applied;
        self.dropped += other.dropped;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    text: String,
    until_ms: u64,
}

pub struct App {
    engine: CubeEngine,
    progress: Progress,
    store: Option<Store>,
    speed: f32,
    animation: Option<RotationAnimation>,
    rng: SimpleRng,
    scramble_len: usize,
    notice: Option<Notice>,
    /// Typed command line, including the leading `:`.
    prompt: Option<String>,
    state_dirty: bool,
    progress_dirty: bool,
}

impl App {
    pub fn new(engine: CubeEngine, progress: Progress, config: &AppConfig, store: Option<Store>) -> Self {
        let seed = config.seed.unwrap_or_else(|| crate::unix_ms() as u32);
        Self {
            engine,
            progress,
            store,
            speed: clamp_animation_speed(config.animation_speed),
            animation: None,
            rng: SimpleRng::new(seed),
            scramble_len: config.scramble_len,
            notice: None,
            prompt: None,
            state_dirty: false,
            progress_dirty: false,
        }
    }

    /// Build the app from whatever `store` holds.
    pub fn load(config: &AppConfig, store: Option<Store>, now_ms: u64) -> anyhow::Result<Self> {
        let (engine, progress) = match &store {
            Some(store) => {
                let engine = match store.load_state()? {
                    Some(state) if !config.fresh => CubeEngine::from_persisted(state, now_ms),
                    _ => CubeEngine::new(),
                };
                (engine, store.load_progress()?)
            }
            None => (CubeEngine::new(), Progress::default()),
        };
        tracing::info!(
            moves = engine.move_count(),
            mode = engine.mode().as_str(),
            step = engine.current_step(),
            "session loaded"
        );
        Ok(Self::new(engine, progress, config, store))
    }

    pub fn engine(&self) -> &CubeEngine {
        &self.engine
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn animation(&self) -> Option<&RotationAnimation> {
        self.animation.as_ref()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    pub fn is_dirty(&self) -> bool {
        self.state_dirty || self.progress_dirty
    }

    /// Route one key press.
    pub fn handle_key(&mut self, key: KeyEvent, now_ms: u64) -> KeyResult {
        if self.prompt.is_some() {
            self.handle_prompt_key(key, now_ms);
            return KeyResult::Continue;
        }
        if should_quit(key) {
            return KeyResult::Quit;
        }
        if key.code == KeyCode::Char(':') {
            self.prompt = Some(":".to_string());
            return KeyResult::Continue;
        }
        if let Some(cmd) = handle_key_event(key) {
            self.apply(cmd, now_ms, true);
        }
        KeyResult::Continue
    }

    fn handle_prompt_key(&mut self, key: KeyEvent, now_ms: u64) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                if prompt.len() > 1 {
                    prompt.pop();
                } else {
                    self.prompt = None;
                }
            }
            KeyCode::Enter => {
                let line = self.prompt.take().unwrap_or_default();
                self.submit_line(line.trim_start_matches(':'), now_ms);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => prompt.push(c),
            _ => {}
        }
    }

    /// Run a typed line such as `R U R' U'` or `scramble`.
    pub fn submit_line(&mut self, line: &str, now_ms: u64) -> CommandReport {
        match parse_line(line) {
            Ok(commands) => {
                let mut report = CommandReport::default();
                for cmd in commands {
                    report.merge(self.apply(cmd, now_ms, false));
                }
                report
            }
            Err(e) => {
                tracing::debug!(line, error = %e, "typed command rejected");
                self.set_notice(e.to_string(), now_ms);
                CommandReport::default()
            }
        }
    }

    /// Apply a remote command batch. Moves commit immediately.
    pub fn apply_remote(&mut self, cmd: &ClientCommand, now_ms: u64) -> CommandReport {
        let mut report = CommandReport::default();
        for &c in &cmd.commands {
            report.merge(self.apply(c, now_ms, false));
        }
        report
    }

    /// Apply one command. Moves animate when `animate` is set.
    pub fn apply(&mut self, cmd: InputCommand, now_ms: u64, animate: bool) -> CommandReport {
        self.engine.tick(now_ms);
        let mut report = CommandReport::default();
        match cmd {
            InputCommand::Move(mv) if animate => match self.engine.begin_move(mv) {
                Admission::Started => {
                    self.animation = Some(RotationAnimation::start(mv, self.speed, now_ms));
                    report.applied = 1;
                }
                Admission::Busy => report.dropped = 1,
            },
            InputCommand::Move(mv) => match self.engine.apply_move_at(mv, now_ms) {
                MoveOutcome::Applied(applied) => {
                    self.on_applied(&applied, now_ms);
                    report.applied = 1;
                }
                MoveOutcome::Dropped => report.dropped = 1,
            },
            InputCommand::Undo => {
                if self.engine.undo() {
                    self.state_dirty = true;
                }
            }
            InputCommand::Reset => {
                self.animation = None;
                self.engine.reset();
                self.state_dirty = true;
            }
            InputCommand::Scramble => {
                self.animation = None;
                let seed = self.rng.next_u32();
                let moves = self.engine.scramble(seed, self.scramble_len);
                tracing::info!(seed, len = moves.len(), "scramble");
                self.state_dirty = true;
            }
            InputCommand::SetMode(mode) => {
                self.engine.toggle_mode(mode, now_ms);
                tracing::info!(mode = mode.as_str(), "mode changed");
                self.state_dirty = true;
            }
            InputCommand::NextStep => {
                self.engine.next_step();
                self.state_dirty = true;
            }
            InputCommand::PrevStep => {
                self.engine.prev_step();
                self.state_dirty = true;
            }
            InputCommand::SpeedUp => {
                self.speed = clamp_animation_speed(self.speed * ANIMATION_SPEED_STEP);
            }
            InputCommand::SpeedDown => {
                self.speed = clamp_animation_speed(self.speed / ANIMATION_SPEED_STEP);
            }
        }
        report
    }

    /// Advance timers and settle a finished animation.
    ///
    /// Returns true when anything visible changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let mut changed = self.engine.tick(now_ms);

        if let Some(anim) = self.animation {
            changed = true;
            if anim.is_done(now_ms) {
                self.animation = None;
                if let Some(MoveOutcome::Applied(applied)) = self.engine.finish_move_at(now_ms) {
                    self.on_applied(&applied, now_ms);
                }
            }
        }

        if self.notice.as_ref().is_some_and(|n| now_ms >= n.until_ms) {
            self.notice = None;
            changed = true;
        }
        changed
    }

    fn on_applied(&mut self, applied: &Applied, now_ms: u64) {
        self.state_dirty = true;
        self.progress_dirty = true;
        self.progress.record_move();
        if self.progress.unlock_achievement(ACH_FIRST_MOVE) {
            tracing::info!(achievement = ACH_FIRST_MOVE, "achievement unlocked");
        }

        if let Some(step) = applied.step_completed {
            self.progress.complete_step(step);
            let title = tutorial::step(step).map(|s| s.title).unwrap_or("step");
            tracing::info!(step, "tutorial step completed");
            self.set_notice(format!("Step complete: {title}"), now_ms);

            if step + 1 >= LAST_STEP && self.progress.mark_tutorial_completed() {
                self.progress.unlock_achievement(ACH_TUTORIAL_COMPLETE);
                tracing::info!(achievement = ACH_TUTORIAL_COMPLETE, "achievement unlocked");
            }
        }

        if let Some(time_ms) = applied.practice_solved_ms {
            self.progress.record_time(time_ms, crate::unix_ms());
            tracing::info!(time_ms, "practice solve");
            self.set_notice(format!("Solved in {}", format_time(time_ms)), now_ms);
        }

        if applied.is_solved && applied.move_count > 0 && self.progress.unlock_achievement(ACH_FIRST_SOLVE) {
            tracing::info!(achievement = ACH_FIRST_SOLVE, "achievement unlocked");
        }
    }

    fn set_notice(&mut self, text: String, now_ms: u64) {
        self.notice = Some(Notice {
            text,
            until_ms: now_ms + NOTICE_MS,
        });
    }

    /// Presentation state for the renderer.
    pub fn hud(&self, adapter: Option<AdapterStatusView>, now_ms: u64) -> Hud<'_> {
        Hud {
            animation: self.animation.map(|a| (a.mv(), a.progress(now_ms))),
            speed: self.speed,
            best_ms: self.progress.best_time(),
            adapter,
            notice: self.prompt().or_else(|| self.notice()),
        }
    }

    /// Write whatever changed since the last save.
    pub fn save_if_dirty(&mut self) -> anyhow::Result<()> {
        let Some(store) = &self.store else {
            self.state_dirty = false;
            self.progress_dirty = false;
            return Ok(());
        };
        if self.state_dirty {
            store.save_state(&self.engine.to_persisted())?;
            self.state_dirty = false;
        }
        if self.progress_dirty {
            store.save_progress(&self.progress)?;
            self.progress_dirty = false;
        }
        Ok(())
    }

    /// Save everything regardless of dirty flags (on exit).
    pub fn save(&mut self) -> anyhow::Result<()> {
        self.state_dirty = true;
        self.progress_dirty = true;
        self.save_if_dirty()
    }
}
