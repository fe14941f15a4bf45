//! Mask rasterization primitives and the pixel resampling/blur helpers used
//! by the direct-compositing effects.
//!
//! Every moving boundary is antialiased with roughly one pixel of falloff:
//! axis-aligned rects use exact fractional coverage, circles and pie sectors
//! use signed distance to the boundary evaluated at pixel centers.

use crate::frame::{CoverageMask, Frame};

/// Fractional-coverage fill of an axis-aligned rect given in continuous
/// pixel coordinates. Accumulates into the mask with `max`.
pub fn fill_rect(mask: &mut CoverageMask, x0: f64, y0: f64, x1: f64, y1: f64) {
    let x0 = x0.max(0.0);
    let y0 = y0.max(0.0);
    let x1 = x1.min(mask.width as f64);
    let y1 = y1.min(mask.height as f64);
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let xi0 = x0.floor() as u32;
    let yi0 = y0.floor() as u32;
    let xi1 = (x1.ceil() as u32).min(mask.width);
    let yi1 = (y1.ceil() as u32).min(mask.height);

    for y in yi0..yi1 {
        let fy = y as f64;
        let cov_y = ((fy + 1.0).min(y1) - fy.max(y0)).clamp(0.0, 1.0);
        for x in xi0..xi1 {
            let fx = x as f64;
            let cov_x = ((fx + 1.0).min(x1) - fx.max(x0)).clamp(0.0, 1.0);
            mask.max_at(x, y, (cov_x * cov_y) as f32);
        }
    }
}

/// Disc fill with a one-pixel signed-distance edge.
pub fn fill_circle(mask: &mut CoverageMask, cx: f64, cy: f64, r: f64) {
    if r <= 0.0 {
        return;
    }

    let xi0 = (cx - r - 1.0).floor().max(0.0) as u32;
    let yi0 = (cy - r - 1.0).floor().max(0.0) as u32;
    let xi1 = ((cx + r + 1.0).ceil().max(0.0) as u32).min(mask.width);
    let yi1 = ((cy + r + 1.0).ceil().max(0.0) as u32).min(mask.height);

    for y in yi0..yi1 {
        let dy = y as f64 + 0.5 - cy;
        for x in xi0..xi1 {
            let dx = x as f64 + 0.5 - cx;
            let d = (dx * dx + dy * dy).sqrt();
            let cov = (r - d + 0.5).clamp(0.0, 1.0);
            if cov > 0.0 {
                mask.max_at(x, y, cov as f32);
            }
        }
    }
}

/// Square centered on `(cx, cy)` with half-extent `half`.
pub fn fill_square(mask: &mut CoverageMask, cx: f64, cy: f64, half: f64) {
    if half <= 0.0 {
        return;
    }
    fill_rect(mask, cx - half, cy - half, cx + half, cy + half);
}

/// Pie wedge: all points within `radius` of the center whose polar angle lies
/// inside the swept arc. `sweep_deg` is signed; negative sweeps clockwise in
/// the y-down pixel grid convention. A sweep of 360 degrees or more fills the
/// full disc.
///
/// The angular edges are antialiased by converting angular distance to arc
/// length at the pixel's radius, which gives the same one-pixel falloff as
/// the straight and circular boundaries.
pub fn fill_sector(
    mask: &mut CoverageMask,
    cx: f64,
    cy: f64,
    radius: f64,
    start_deg: f64,
    sweep_deg: f64,
) {
    if radius <= 0.0 || sweep_deg == 0.0 {
        return;
    }
    let sweep_abs = sweep_deg.abs();
    if sweep_abs >= 360.0 {
        fill_circle(mask, cx, cy, radius);
        return;
    }
    let a_begin = if sweep_deg >= 0.0 {
        start_deg
    } else {
        start_deg - sweep_abs
    };

    let xi0 = (cx - radius - 1.0).floor().max(0.0) as u32;
    let yi0 = (cy - radius - 1.0).floor().max(0.0) as u32;
    let xi1 = ((cx + radius + 1.0).ceil().max(0.0) as u32).min(mask.width);
    let yi1 = ((cy + radius + 1.0).ceil().max(0.0) as u32).min(mask.height);

    for y in yi0..yi1 {
        let dy = y as f64 + 0.5 - cy;
        for x in xi0..xi1 {
            let dx = x as f64 + 0.5 - cx;
            let d = (dx * dx + dy * dy).sqrt();
            let cov_r = (radius - d + 0.5).clamp(0.0, 1.0);
            if cov_r <= 0.0 {
                continue;
            }

            let angle = dy.atan2(dx).to_degrees();
            let delta = (angle - a_begin).rem_euclid(360.0);
            // Signed angular margin: positive inside the arc, negative out.
            let margin_deg = if delta <= sweep_abs {
                delta.min(sweep_abs - delta)
            } else {
                -(delta - sweep_abs).min(360.0 - delta)
            };
            let arc_px = margin_deg.to_radians() * d;
            let cov_a = (arc_px + 0.5).clamp(0.0, 1.0);

            let cov = cov_r * cov_a;
            if cov > 0.0 {
                mask.max_at(x, y, cov as f32);
            }
        }
    }
}

/// Uniform scale of a frame about its own center, bilinear sampling with
/// replicated borders.
pub fn scale_about_center(src: &Frame, scale: f64) -> Frame {
    let scale = scale.max(1e-6);
    let w = src.width;
    let h = src.height;
    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;

    let mut out = Frame::new(w, h);
    for y in 0..h {
        let sy = cy + (y as f64 + 0.5 - cy) / scale - 0.5;
        for x in 0..w {
            let sx = cx + (x as f64 + 0.5 - cx) / scale - 0.5;
            out.set_pixel(x, y, sample_bilinear(src, sx, sy));
        }
    }
    out
}

fn sample_bilinear(src: &Frame, sx: f64, sy: f64) -> [u8; 4] {
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = (sx - x0) as f32;
    let fy = (sy - y0) as f32;

    let clamp_x = |v: f64| (v.max(0.0) as u32).min(src.width - 1);
    let clamp_y = |v: f64| (v.max(0.0) as u32).min(src.height - 1);
    let p00 = src.pixel(clamp_x(x0), clamp_y(y0));
    let p10 = src.pixel(clamp_x(x0 + 1.0), clamp_y(y0));
    let p01 = src.pixel(clamp_x(x0), clamp_y(y0 + 1.0));
    let p11 = src.pixel(clamp_x(x0 + 1.0), clamp_y(y0 + 1.0));

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
        let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy + 0.5) as u8;
    }
    out
}

/// Normalized 1D Gaussian weights for an odd kernel size. A non-positive
/// sigma derives the usual kernel-size-proportional default.
pub fn gaussian_kernel(ksize: usize, sigma: f64) -> Vec<f64> {
    debug_assert!(ksize % 2 == 1);
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };

    let r = (ksize / 2) as i64;
    let denom = 2.0 * sigma * sigma;
    let mut weights = Vec::with_capacity(ksize);
    let mut sum = 0.0;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights.push(w);
        sum += w;
    }
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Separable Gaussian blur of an RGBA8 frame, clamp-to-edge. A kernel size of
/// 1 is the identity.
pub fn blur_frame(src: &Frame, ksize: usize, sigma: f64) -> Frame {
    if ksize <= 1 {
        return src.clone();
    }
    let ksize = if ksize % 2 == 0 { ksize + 1 } else { ksize };
    let kernel = gaussian_kernel(ksize, sigma);

    let mut tmp = Frame::new(src.width, src.height);
    let mut out = Frame::new(src.width, src.height);
    horizontal_pass(src, &mut tmp, &kernel);
    vertical_pass(&tmp, &mut out, &kernel);
    out
}

fn horizontal_pass(src: &Frame, dst: &mut Frame, kernel: &[f64]) {
    let radius = (kernel.len() / 2) as i64;
    let w = src.width as i64;
    for y in 0..src.height {
        for x in 0..w {
            let mut acc = [0.0f64; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sx = (x + ki as i64 - radius).clamp(0, w - 1) as u32;
                let px = src.pixel(sx, y);
                for c in 0..4 {
                    acc[c] += kw * px[c] as f64;
                }
            }
            dst.set_pixel(x as u32, y, acc.map(|v| (v + 0.5) as u8));
        }
    }
}

fn vertical_pass(src: &Frame, dst: &mut Frame, kernel: &[f64]) {
    let radius = (kernel.len() / 2) as i64;
    let h = src.height as i64;
    for y in 0..h {
        for x in 0..src.width {
            let mut acc = [0.0f64; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sy = (y + ki as i64 - radius).clamp(0, h - 1) as u32;
                let px = src.pixel(x, sy);
                for c in 0..4 {
                    acc[c] += kw * px[c] as f64;
                }
            }
            dst.set_pixel(x, y as u32, acc.map(|v| (v + 0.5) as u8));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::CoverageMask;

    #[test]
    fn rect_interior_is_full_and_exterior_empty() {
        let mut mask = CoverageMask::new(8, 8);
        fill_rect(&mut mask, 2.0, 2.0, 6.0, 6.0);
        assert_eq!(mask.at(3, 3), 1.0);
        assert_eq!(mask.at(0, 0), 0.0);
        assert_eq!(mask.at(7, 7), 0.0);
    }

    #[test]
    fn rect_fractional_edge_is_partial() {
        let mut mask = CoverageMask::new(4, 1);
        fill_rect(&mut mask, 0.0, 0.0, 2.5, 1.0);
        assert_eq!(mask.at(1, 0), 1.0);
        assert!((mask.at(2, 0) - 0.5).abs() < 1e-6);
        assert_eq!(mask.at(3, 0), 0.0);
    }

    #[test]
    fn circle_covers_center_not_corners() {
        let mut mask = CoverageMask::new(16, 16);
        fill_circle(&mut mask, 8.0, 8.0, 4.0);
        assert_eq!(mask.at(8, 8), 1.0);
        assert_eq!(mask.at(0, 0), 0.0);
        assert_eq!(mask.at(15, 15), 0.0);
    }

    #[test]
    fn full_sweep_sector_equals_disc() {
        let mut sector = CoverageMask::new(12, 12);
        let mut disc = CoverageMask::new(12, 12);
        fill_sector(&mut sector, 6.0, 6.0, 5.0, -90.0, 360.0);
        fill_circle(&mut disc, 6.0, 6.0, 5.0);
        assert_eq!(sector, disc);
    }

    #[test]
    fn quarter_sweep_covers_one_quadrant() {
        let mut mask = CoverageMask::new(20, 20);
        // 0..90 degrees in y-down coordinates is the lower-right quadrant.
        fill_sector(&mut mask, 10.0, 10.0, 9.0, 0.0, 90.0);
        assert!(mask.at(14, 14) > 0.9);
        assert_eq!(mask.at(5, 5), 0.0);
    }

    #[test]
    fn identity_scale_is_noop() {
        let mut src = Frame::new(5, 4);
        for (i, b) in src.data.iter_mut().enumerate() {
            *b = (i % 251) as u8;
        }
        assert_eq!(scale_about_center(&src, 1.0), src);
    }

    #[test]
    fn gaussian_kernel_is_normalized() {
        for (k, s) in [(3, 1.0), (5, 0.0), (9, 2.5)] {
            let sum: f64 = gaussian_kernel(k, s).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn blur_of_uniform_frame_is_identity() {
        let src = Frame::filled(6, 5, [10, 20, 30, 255]);
        assert_eq!(blur_frame(&src, 5, 1.0), src);
    }

    #[test]
    fn blur_ksize_1_is_identity() {
        let src = Frame::filled(3, 3, [1, 2, 3, 4]);
        assert_eq!(blur_frame(&src, 1, 0.0), src);
    }
}
