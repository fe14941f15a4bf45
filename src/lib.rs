//! glissade: deterministic transition rendering between two frames.
//!
//! Given two equally sized RGBA frames and a declarative config (effect kind,
//! duration, fps, easing, optional mask blur), glissade produces the full
//! sequence of intermediate frames. Rendering is pure: the same config and
//! inputs always produce byte-identical output, including the seeded effects.
//!
//! ```
//! use glissade::{Frame, FrameSize, Transition};
//!
//! # fn main() -> glissade::GlissadeResult<()> {
//! let a = Frame::filled(64, 48, [0, 0, 0, 255]);
//! let b = Frame::filled(64, 48, [255, 255, 255, 255]);
//! let transition = Transition::from_json(
//!     serde_json::json!({ "type": "wipe", "duration": 0.5, "fps": 24 }),
//!     FrameSize::new(64, 48),
//! )?;
//! let frames = transition.render_all(&a, &b)?;
//! assert_eq!(frames.len(), 12);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod ease;
pub mod effects;
pub mod engine;
pub mod error;
pub mod frame;
pub mod mask_blur;
pub mod raster;
pub mod rng;

pub use config::{MaskBlurSpec, RenderWarning, TransitionSpec};
pub use ease::Ease;
pub use effects::EffectState;
pub use engine::{DEFAULT_FPS, Frames, Transition};
pub use error::{GlissadeError, GlissadeResult};
pub use frame::{CoverageMask, Frame, FrameSize};
pub use mask_blur::MaskBlur;
pub use rng::RandomSequence;
