//! CubeView: maps an `EngineSnapshot` into a terminal framebuffer.
//!
//! The cube is drawn as an unfolded net:
//!
//! ```text
//!        U
//!     L  F  R  B
//!        D
//! ```
//!
//! This module is pure (no I/O) and can be unit-tested.

use crate::core::progress::format_time;
use crate::core::tutorial;
use crate::core::EngineSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Direction, Face, Move, SessionMode};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: usize,
    pub controller_id: Option<u64>,
}

/// Presentation-only state that does not live in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hud<'a> {
    /// Move being animated and its progress in `[0, 1]`.
    pub animation: Option<(Move, f32)>,
    pub speed: f32,
    pub best_ms: Option<u64>,
    pub adapter: Option<AdapterStatusView>,
    /// One-line status message (errors from typed input, achievements).
    pub notice: Option<&'a str>,
}

/// Net slot (column, row) of each face.
fn slot(face: Face) -> (u16, u16) {
    match face {
        Face::Top => (1, 0),
        Face::Left => (0, 1),
        Face::Front => (1, 1),
        Face::Right => (2, 1),
        Face::Back => (3, 1),
        Face::Bottom => (1, 2),
    }
}

const BG: Rgb = Rgb::new(0, 0, 0);
const FRAME: Rgb = Rgb::new(150, 150, 160);
const GOOD: Rgb = Rgb::new(90, 220, 120);
const BAD: Rgb = Rgb::new(230, 90, 90);

pub struct CubeView {
    /// Sticker width in terminal columns.
    cell_w: u16,
    /// Sticker height in terminal rows.
    cell_h: u16,
}

impl Default for CubeView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
        }
    }
}

impl CubeView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    fn face_w(&self) -> u16 {
        self.cell_w * 3
    }

    fn face_h(&self) -> u16 {
        self.cell_h * 3
    }

    fn net_w(&self) -> u16 {
        self.face_w() * 4 + 3
    }

    fn net_h(&self) -> u16 {
        self.face_h() * 3 + 2
    }

    /// Outer frame size (border plus one column of padding each side).
    fn frame_size(&self) -> (u16, u16) {
        (self.net_w() + 4, self.net_h() + 2)
    }

    /// Top-left corner of the frame for a viewport.
    pub fn frame_origin(&self, viewport: Viewport) -> (u16, u16) {
        let (frame_w, frame_h) = self.frame_size();
        let panel_w = 28;
        let total_w = frame_w + 2 + panel_w;
        let x = viewport.width.saturating_sub(total_w) / 2;
        let y = viewport.height.saturating_sub(frame_h + 2) / 2;
        (x, y)
    }

    /// Top-left terminal cell of sticker `index` on `face`.
    pub fn sticker_origin(&self, viewport: Viewport, face: Face, index: usize) -> (u16, u16) {
        let (fx, fy) = self.frame_origin(viewport);
        let (col, row) = slot(face);
        let net_x = fx + 2;
        let net_y = fy + 1;
        let x = net_x + col * (self.face_w() + 1) + (index as u16 % 3) * self.cell_w;
        let y = net_y + row * (self.face_h() + 1) + (index as u16 / 3) * self.cell_h;
        (x, y)
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, snap: &EngineSnapshot, hud: &Hud<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::fg(Rgb::new(220, 220, 220)).cell(' '));

        let (fx, fy) = self.frame_origin(viewport);
        let (frame_w, frame_h) = self.frame_size();
        let frame_style = if snap.is_solved {
            CellStyle::fg(GOOD)
        } else {
            CellStyle::fg(FRAME)
        };
        fb.draw_box(fx, fy, frame_w, frame_h, frame_style);

        let turning = hud.animation.map(|(mv, _)| mv);
        for face in Face::ALL {
            self.draw_face(snap, face, turning, viewport, fb);
        }

        let panel_x = fx.saturating_add(frame_w).saturating_add(2);
        self.draw_side_panel(fb, snap, hud, viewport, panel_x, fy);

        if viewport.height > 0 {
            let help = "f b r l u d turn  Shift prime  z undo  1 2 3 mode  [ ] step  space scramble  : type  q quit";
            fb.put_str(0, viewport.height - 1, help, CellStyle::default().dim());
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &EngineSnapshot, hud: &Hud<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, hud, viewport, &mut fb);
        fb
    }

    fn draw_face(
        &self,
        snap: &EngineSnapshot,
        face: Face,
        turning: Option<Move>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        let stickers = snap.faces.face(face);
        for (i, color) in stickers.iter().enumerate() {
            let (x, y) = self.sticker_origin(viewport, face, i);
            let style = CellStyle {
                fg: Rgb::new(0, 0, 0),
                bg: Rgb::sticker(*color),
                bold: true,
                dim: false,
            };
            fb.fill_rect(x, y, self.cell_w, self.cell_h, ' ', style);
        }

        // Center sticker carries the face letter, or the turn arrow while
        // this face is animating.
        let (cx, cy) = self.sticker_origin(viewport, face, 4);
        let mark = match turning {
            Some(mv) if mv.face == face => match mv.direction {
                Direction::Clockwise => '↻',
                Direction::CounterClockwise => '↺',
            },
            _ => face.letter(),
        };
        let style = CellStyle {
            fg: Rgb::new(20, 20, 20),
            bg: Rgb::sticker(stickers[4]),
            bold: true,
            dim: false,
        };
        fb.put_char(cx + (self.cell_w - 1) / 2, cy + (self.cell_h - 1) / 2, mark, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &EngineSnapshot,
        hud: &Hud<'_>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 12 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::fg(Rgb::new(200, 200, 200));
        let dim = value.dim();
        let mut y = start_y;

        fb.put_str(panel_x, y, "MODE", label);
        fb.put_str(panel_x + 7, y, snap.mode.as_str(), value);
        y += 1;
        fb.put_str(panel_x, y, "MOVES", label);
        fb.put_str(panel_x + 7, y, &snap.move_count().to_string(), value);
        y += 1;
        fb.put_str(panel_x, y, "STATE", label);
        if snap.is_solved {
            fb.put_str(panel_x + 7, y, "SOLVED", CellStyle::fg(GOOD).bold());
        } else {
            fb.put_str(panel_x + 7, y, "scrambled", value);
        }
        y += 1;
        fb.put_str(panel_x, y, "SPEED", label);
        let speed = if hud.speed > 0.0 { hud.speed } else { 1.0 };
        fb.put_str(panel_x + 7, y, &format!("{speed:.2}x"), value);
        y += 2;

        match snap.mode {
            SessionMode::Practice => {
                fb.put_str(panel_x, y, "TIME", label);
                fb.put_str(panel_x + 7, y, &format_time(snap.elapsed_ms), value);
                y += 1;
                fb.put_str(panel_x, y, "BEST", label);
                let best = hud.best_ms.map(format_time).unwrap_or_else(|| "-".to_string());
                fb.put_str(panel_x + 7, y, &best, value);
                y += 2;
            }
            SessionMode::Tutorial => {
                y = self.draw_tutorial(fb, snap, panel_x, panel_w, y);
            }
            SessionMode::Free => {}
        }

        fb.put_str(panel_x, y, "LAST", label);
        let tail_start = snap.moves.len().saturating_sub(8);
        let tail: Vec<&str> = snap.moves[tail_start..].iter().map(|m| m.notation()).collect();
        fb.put_str(panel_x + 7, y, &tail.join(" "), value);
        y += 1;

        if let Some((mv, progress)) = hud.animation {
            fb.put_str(panel_x, y, "TURN", label);
            let x = fb.put_str(panel_x + 7, y, mv.notation(), value);
            let filled = (progress.clamp(0.0, 1.0) * 8.0).round() as usize;
            let bar: String = (0..8).map(|i| if i < filled { '▰' } else { '▱' }).collect();
            fb.put_str(x + 1, y, &bar, dim);
        }
        y += 2;

        fb.put_str(panel_x, y, "AI", label);
        match hud.adapter {
            Some(st) if st.enabled => {
                fb.put_str(panel_x + 7, y, "ON", value);
                y += 1;
                fb.put_str(panel_x, y, "C", dim);
                fb.put_str(panel_x + 2, y, &st.client_count.to_string(), value);
                fb.put_str(panel_x + 6, y, "CTRL", dim);
                let ctrl = st
                    .controller_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                fb.put_str(panel_x + 11, y, &ctrl, value);
            }
            _ => {
                fb.put_str(panel_x + 7, y, "OFF", value);
            }
        }
        y += 2;

        if let Some(notice) = hud.notice {
            fb.put_str(panel_x, y, notice, CellStyle::fg(Rgb::new(240, 200, 90)));
        }
    }

    fn draw_tutorial(
        &self,
        fb: &mut FrameBuffer,
        snap: &EngineSnapshot,
        x: u16,
        width: u16,
        mut y: u16,
    ) -> u16 {
        let Some(step) = tutorial::step(snap.current_step) else {
            return y;
        };
        fb.put_str(x, y, step.title, CellStyle::default().bold());
        y += 1;
        for line in wrap(step.description, width as usize) {
            fb.put_str(x, y, &line, CellStyle::default().dim());
            y += 1;
        }

        if step.is_practice_step() {
            fb.put_str(x, y, "Required Moves:", CellStyle::default().bold());
            y += 1;
            let seq: Vec<&str> = step.required_moves.iter().map(|m| m.notation()).collect();
            for line in wrap(&seq.join(" "), width as usize) {
                fb.put_str(x, y, &line, CellStyle::fg(Rgb::new(120, 180, 255)));
                y += 1;
            }
            let verdict = if snap.validation.is_valid {
                CellStyle::fg(GOOD).bold()
            } else {
                CellStyle::fg(BAD)
            };
            fb.put_str(x, y, snap.validation.message, verdict);
            y += 1;
        }

        if let Some(label) = tutorial::progress_label(snap.current_step) {
            fb.put_str(x, y, &label, CellStyle::default().dim());
            y += 1;
        }
        y + 1
    }
}

/// Greedy word wrap.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
