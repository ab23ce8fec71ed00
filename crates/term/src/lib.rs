//! Terminal cube renderer.
//!
//! A small rendering layer for the cube tutor. It avoids widget/layout
//! frameworks and renders into a plain framebuffer that is flushed to the
//! terminal with cell diffs.
//!
//! - [`fb`]: cells, styles and the framebuffer
//! - [`cube_view`]: unfolded cube net plus the side panel (pure, testable)
//! - [`animation`]: quarter-turn timing driven by the animation speed
//! - [`renderer`]: raw-mode terminal output

pub mod animation;
pub mod cube_view;
pub mod fb;
pub mod renderer;

pub use cube_tutor_core as core;
pub use cube_tutor_types as types;

pub use animation::RotationAnimation;
pub use cube_view::{AdapterStatusView, CubeView, Hud, Viewport};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
