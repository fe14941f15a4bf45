//! Transition resolution and frame sequencing.
//!
//! [`Transition::new`] performs the entire validation pass up front: duration
//! and fps checks, easing lookup, mask-blur resolution and effect resolution
//! all happen before the first pixel is touched, so rendering itself cannot
//! fail on configuration. After that the per-frame work is pure, which is why
//! [`Transition::render_all`] can hand frames to rayon without coordination.

use rayon::prelude::*;

use crate::{
    config::{Diagnostics, RenderWarning, TransitionSpec},
    ease::Ease,
    effects::{EffectState, resolve_effect},
    error::{GlissadeError, GlissadeResult},
    frame::{Frame, FrameSize},
    mask_blur::MaskBlur,
};

/// Frame rate used when the config does not carry its own `fps`.
pub const DEFAULT_FPS: f64 = 30.0;

/// A fully resolved transition: timing, easing, effect state and mask-blur
/// post-process, bound to one frame geometry.
#[derive(Debug)]
pub struct Transition {
    effect: EffectState,
    ease: Ease,
    mask_blur: MaskBlur,
    size: FrameSize,
    duration: f64,
    fps: f64,
    frame_count: usize,
    warnings: Vec<RenderWarning>,
}

impl Transition {
    pub fn new(spec: &TransitionSpec, size: FrameSize) -> GlissadeResult<Self> {
        Self::with_fps(spec, DEFAULT_FPS, size)
    }

    /// Like [`Transition::new`] but with a caller-supplied fallback frame
    /// rate for configs that omit `fps`.
    pub fn with_fps(
        spec: &TransitionSpec,
        default_fps: f64,
        size: FrameSize,
    ) -> GlissadeResult<Self> {
        if size.width == 0 || size.height == 0 {
            return Err(GlissadeError::geometry(format!(
                "frame size must be non-zero, got {}x{}",
                size.width, size.height
            )));
        }
        if !spec.duration.is_finite() || spec.duration <= 0.0 {
            return Err(GlissadeError::config(format!(
                "duration must be a positive number of seconds, got {}",
                spec.duration
            )));
        }
        let fps = spec.fps.unwrap_or(default_fps);
        if !fps.is_finite() || fps <= 0.0 {
            return Err(GlissadeError::config(format!(
                "fps must be a positive number, got {fps}"
            )));
        }

        let mut diag = Diagnostics::new();
        let ease = match &spec.easing {
            None => Ease::Linear,
            Some(name) => Ease::parse(name).unwrap_or_else(|| {
                diag.warn(format!("unknown easing '{name}', falling back to linear"));
                Ease::Linear
            }),
        };
        let mask_blur = MaskBlur::resolve(spec.mask_blur.as_ref(), &mut diag)?;
        let effect = resolve_effect(spec, size, &mut diag)?;

        let frame_count = ((spec.duration * fps).round() as usize).max(1);
        tracing::debug!(
            target: "glissade::engine",
            kind = %spec.kind,
            frames = frame_count,
            fps,
            "transition resolved"
        );

        Ok(Self {
            effect,
            ease,
            mask_blur,
            size,
            duration: spec.duration,
            fps,
            frame_count,
            warnings: diag.into_warnings(),
        })
    }

    pub fn from_json(value: serde_json::Value, size: FrameSize) -> GlissadeResult<Self> {
        Self::new(&TransitionSpec::from_json(value)?, size)
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }

    pub fn easing(&self) -> Ease {
        self.ease
    }

    /// Non-fatal resolution diagnostics, in the order they were produced.
    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    /// Raw (pre-easing) progress for a frame index: 0 on the first frame,
    /// 1 on the last, evenly spaced. A single-frame transition sits at 1.
    pub fn progress(&self, index: usize) -> f64 {
        if self.frame_count <= 1 {
            1.0
        } else {
            index as f64 / (self.frame_count - 1) as f64
        }
    }

    pub fn render_frame(&self, index: usize, a: &Frame, b: &Frame) -> GlissadeResult<Frame> {
        if index >= self.frame_count {
            return Err(GlissadeError::evaluation(format!(
                "frame index {index} out of range (frame count {})",
                self.frame_count
            )));
        }
        self.check_inputs(a, b)?;
        Ok(self.render_unchecked(index, a, b))
    }

    /// Lazily yields the full frame sequence. Inputs are validated once here;
    /// iteration itself cannot fail.
    pub fn render<'a>(&'a self, a: &'a Frame, b: &'a Frame) -> GlissadeResult<Frames<'a>> {
        self.check_inputs(a, b)?;
        Ok(Frames {
            transition: self,
            a,
            b,
            next: 0,
        })
    }

    /// Renders every frame, fanning the per-frame work out across the rayon
    /// thread pool. Output order matches frame order.
    pub fn render_all(&self, a: &Frame, b: &Frame) -> GlissadeResult<Vec<Frame>> {
        self.check_inputs(a, b)?;
        Ok((0..self.frame_count)
            .into_par_iter()
            .map(|index| self.render_unchecked(index, a, b))
            .collect())
    }

    fn check_inputs(&self, a: &Frame, b: &Frame) -> GlissadeResult<()> {
        for (name, frame) in [("A", a), ("B", b)] {
            if frame.size() != self.size {
                return Err(GlissadeError::geometry(format!(
                    "frame {name} is {}x{}, transition expects {}x{}",
                    frame.width, frame.height, self.size.width, self.size.height
                )));
            }
        }
        Ok(())
    }

    fn render_unchecked(&self, index: usize, a: &Frame, b: &Frame) -> Frame {
        let t = self.ease.apply(self.progress(index));
        self.effect.render(t, a, b, &self.mask_blur)
    }
}

/// Lazy frame iterator produced by [`Transition::render`].
#[derive(Debug)]
pub struct Frames<'a> {
    transition: &'a Transition,
    a: &'a Frame,
    b: &'a Frame,
    next: usize,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.next >= self.transition.frame_count {
            return None;
        }
        let frame = self.transition.render_unchecked(self.next, self.a, self.b);
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.transition.frame_count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}
