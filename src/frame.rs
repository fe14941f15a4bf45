use crate::error::{GlissadeError, GlissadeResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A rectangular RGBA8 pixel buffer, row-major.
///
/// The engine reads two of these (A and B) and allocates one per output tick;
/// ownership of every output frame passes to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 4],
        }
    }

    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> GlissadeResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| GlissadeError::geometry("frame buffer size overflow"))?;
        if data.len() != expected {
            return Err(GlissadeError::geometry(format!(
                "frame data length {} does not match {width}x{height}x4",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut frame = Self::new(width, height);
        for px in frame.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        frame
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }
}

/// Per-pixel interpolation weight toward frame B, in `[0, 1]`.
///
/// Scoped to one output-frame computation; the engine never persists one
/// across frames.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverageMask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl CoverageMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    #[inline]
    pub fn at(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        self.data[y as usize * self.width as usize + x as usize] = value;
    }

    /// Accumulate overlapping shapes: keeps the strongest coverage.
    #[inline]
    pub fn max_at(&mut self, x: u32, y: u32, value: f32) {
        let i = y as usize * self.width as usize + x as usize;
        if value > self.data[i] {
            self.data[i] = value;
        }
    }

    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.data {
            *v *= factor;
        }
    }
}

/// `out[p] = a[p] * (1 - m) + b[p] * m` per channel, with `m` clamped to
/// `[0, 1]` at the last moment (mask values may exceed the unit range when an
/// overshooting easing curve is in play).
pub fn composite_masked(a: &Frame, b: &Frame, mask: &CoverageMask) -> Frame {
    debug_assert_eq!(a.size(), b.size());
    debug_assert_eq!(a.width, mask.width);
    debug_assert_eq!(a.height, mask.height);

    let mut out = Frame::new(a.width, a.height);
    for ((o, av), (bv, m)) in out
        .data
        .chunks_exact_mut(4)
        .zip(a.data.chunks_exact(4))
        .zip(b.data.chunks_exact(4).zip(mask.data.iter()))
    {
        let m = m.clamp(0.0, 1.0);
        let inv = 1.0 - m;
        for c in 0..4 {
            o[c] = (av[c] as f32 * inv + bv[c] as f32 * m + 0.5) as u8;
        }
    }
    out
}

/// Uniform crossfade, equivalent to compositing through a constant mask.
pub fn crossfade(a: &Frame, b: &Frame, t: f64) -> Frame {
    debug_assert_eq!(a.size(), b.size());
    let m = t.clamp(0.0, 1.0) as f32;
    let inv = 1.0 - m;

    let mut out = Frame::new(a.width, a.height);
    for ((o, av), bv) in out
        .data
        .chunks_exact_mut(4)
        .zip(a.data.chunks_exact(4))
        .zip(b.data.chunks_exact(4))
    {
        for c in 0..4 {
            o[c] = (av[c] as f32 * inv + bv[c] as f32 * m + 0.5) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba8_rejects_wrong_length() {
        assert!(Frame::from_rgba8(2, 2, vec![0u8; 15]).is_err());
        assert!(Frame::from_rgba8(2, 2, vec![0u8; 16]).is_ok());
    }

    #[test]
    fn crossfade_endpoints() {
        let a = Frame::filled(3, 2, [10, 20, 30, 255]);
        let b = Frame::filled(3, 2, [200, 210, 220, 255]);
        assert_eq!(crossfade(&a, &b, 0.0), a);
        assert_eq!(crossfade(&a, &b, 1.0), b);
    }

    #[test]
    fn composite_through_binary_mask_selects_sides() {
        let a = Frame::filled(2, 1, [0, 0, 0, 255]);
        let b = Frame::filled(2, 1, [255, 255, 255, 255]);
        let mut mask = CoverageMask::new(2, 1);
        mask.set(1, 0, 1.0);

        let out = composite_masked(&a, &b, &mask);
        assert_eq!(out.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(out.pixel(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn composite_clamps_overshot_mask() {
        let a = Frame::filled(1, 1, [0, 0, 0, 255]);
        let b = Frame::filled(1, 1, [100, 100, 100, 255]);
        let mut mask = CoverageMask::new(1, 1);
        mask.set(0, 0, 1.4);
        assert_eq!(composite_masked(&a, &b, &mask), b);
    }
}
