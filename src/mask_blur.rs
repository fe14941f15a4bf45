use crate::{
    config::{Diagnostics, MaskBlurSpec},
    error::{GlissadeError, GlissadeResult},
    frame::CoverageMask,
    raster::gaussian_kernel,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskBlurKind {
    None,
    Box,
    Gaussian,
    Median,
}

/// Resolved mask-blur post-process. Applied to a coverage mask after the
/// effect fills it and before compositing.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskBlur {
    kind: MaskBlurKind,
    ksize: usize,
    sigma: f64,
    opacity_change: bool,
}

impl MaskBlur {
    pub fn disabled() -> Self {
        Self {
            kind: MaskBlurKind::None,
            ksize: 0,
            sigma: 0.0,
            opacity_change: false,
        }
    }

    pub fn resolve(spec: Option<&MaskBlurSpec>, diag: &mut Diagnostics) -> GlissadeResult<Self> {
        let Some(spec) = spec else {
            return Ok(Self::disabled());
        };

        if spec.ksize < 0 {
            return Err(GlissadeError::config(format!(
                "mask_blur.ksize must be >= 0, got {}",
                spec.ksize
            )));
        }

        let mut kind = match spec.kind.trim().to_ascii_lowercase().as_str() {
            "none" => MaskBlurKind::None,
            "blur" => MaskBlurKind::Box,
            "gaussian" | "gaussianblur" => MaskBlurKind::Gaussian,
            "median" | "medianblur" => MaskBlurKind::Median,
            other => {
                diag.warn(format!(
                    "unknown mask_blur type '{other}', mask blur disabled"
                ));
                MaskBlurKind::None
            }
        };

        let mut ksize = spec.ksize as usize;
        if ksize == 0 {
            kind = MaskBlurKind::None;
        } else if ksize % 2 == 0 {
            diag.warn(format!(
                "mask_blur.ksize must be odd, using {} instead of {ksize}",
                ksize + 1
            ));
            ksize += 1;
        }

        if spec.sigma < 0.0 {
            diag.warn("mask_blur.sigma must be >= 0, deriving from kernel size");
        }

        Ok(Self {
            kind,
            ksize,
            sigma: spec.sigma.max(0.0),
            opacity_change: spec.opacity_change,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.kind != MaskBlurKind::None || self.opacity_change
    }

    /// Smooth the mask, then ramp its opacity with the transition progress
    /// when `opacitychange` is set (so edge softness fades in/out rather than
    /// sitting at constant strength).
    pub fn apply(&self, mask: &mut CoverageMask, t: f64) {
        match self.kind {
            MaskBlurKind::None => {}
            MaskBlurKind::Box => {
                let kernel = vec![1.0 / self.ksize as f64; self.ksize];
                convolve_separable(mask, &kernel);
            }
            MaskBlurKind::Gaussian => {
                let kernel = gaussian_kernel(self.ksize, self.sigma);
                convolve_separable(mask, &kernel);
            }
            MaskBlurKind::Median => median_filter(mask, self.ksize),
        }

        if self.opacity_change {
            mask.scale(t.clamp(0.0, 1.0) as f32);
        }
    }
}

fn convolve_separable(mask: &mut CoverageMask, kernel: &[f64]) {
    let w = mask.width as i64;
    let h = mask.height as i64;
    let radius = (kernel.len() / 2) as i64;

    let mut tmp = vec![0.0f32; mask.data.len()];
    for y in 0..h {
        let row = (y * w) as usize;
        for x in 0..w {
            let mut acc = 0.0f64;
            for (ki, &kw) in kernel.iter().enumerate() {
                let sx = (x + ki as i64 - radius).clamp(0, w - 1) as usize;
                acc += kw * mask.data[row + sx] as f64;
            }
            tmp[row + x as usize] = acc as f32;
        }
    }
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f64;
            for (ki, &kw) in kernel.iter().enumerate() {
                let sy = (y + ki as i64 - radius).clamp(0, h - 1);
                acc += kw * tmp[(sy * w + x) as usize] as f64;
            }
            mask.data[(y * w + x) as usize] = acc as f32;
        }
    }
}

fn median_filter(mask: &mut CoverageMask, ksize: usize) {
    let w = mask.width as i64;
    let h = mask.height as i64;
    let radius = (ksize / 2) as i64;
    let src = mask.data.clone();
    let mut window = Vec::with_capacity(ksize * ksize);

    for y in 0..h {
        for x in 0..w {
            window.clear();
            for dy in -radius..=radius {
                let sy = (y + dy).clamp(0, h - 1);
                for dx in -radius..=radius {
                    let sx = (x + dx).clamp(0, w - 1);
                    window.push(src[(sy * w + sx) as usize]);
                }
            }
            let mid = window.len() / 2;
            window.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
            mask.data[(y * w + x) as usize] = window[mid];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(spec: MaskBlurSpec) -> (MaskBlur, usize) {
        let mut diag = Diagnostics::new();
        let blur = MaskBlur::resolve(Some(&spec), &mut diag).unwrap();
        (blur, diag.warnings().len())
    }

    fn gaussian(ksize: i64, sigma: f64) -> MaskBlur {
        resolve(MaskBlurSpec {
            kind: "gaussian".to_string(),
            ksize,
            sigma,
            opacity_change: false,
        })
        .0
    }

    #[test]
    fn absent_spec_is_disabled() {
        let mut diag = Diagnostics::new();
        let blur = MaskBlur::resolve(None, &mut diag).unwrap();
        assert!(!blur.is_enabled());
    }

    #[test]
    fn negative_ksize_is_a_config_error() {
        let mut diag = Diagnostics::new();
        let spec = MaskBlurSpec {
            kind: "gaussian".to_string(),
            ksize: -3,
            ..MaskBlurSpec::default()
        };
        assert!(MaskBlur::resolve(Some(&spec), &mut diag).is_err());
    }

    #[test]
    fn even_ksize_is_bumped_with_warning() {
        let (blur, warnings) = resolve(MaskBlurSpec {
            kind: "gaussian".to_string(),
            ksize: 4,
            sigma: 1.0,
            opacity_change: false,
        });
        assert_eq!(blur.ksize, 5);
        assert_eq!(warnings, 1);
    }

    #[test]
    fn unknown_kind_warns_and_disables() {
        let (blur, warnings) = resolve(MaskBlurSpec {
            kind: "bokeh".to_string(),
            ksize: 5,
            sigma: 1.0,
            opacity_change: false,
        });
        assert!(!blur.is_enabled());
        assert_eq!(warnings, 1);
    }

    #[test]
    fn gaussian_preserves_uniform_fields() {
        let blur = gaussian(5, 1.0);
        for value in [0.0f32, 1.0f32] {
            let mut mask = CoverageMask::new(9, 7);
            mask.fill(value);
            blur.apply(&mut mask, 0.5);
            for &v in &mask.data {
                assert!((v - value).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn gaussian_softens_a_hard_edge() {
        let blur = gaussian(5, 1.0);
        let mut mask = CoverageMask::new(10, 4);
        crate::raster::fill_rect(&mut mask, 0.0, 0.0, 5.0, 4.0);
        blur.apply(&mut mask, 1.0);
        let edge = mask.at(5, 2);
        assert!(edge > 0.0 && edge < 1.0);
    }

    #[test]
    fn median_removes_a_lone_speck() {
        let (blur, _) = resolve(MaskBlurSpec {
            kind: "median".to_string(),
            ksize: 3,
            sigma: 0.0,
            opacity_change: false,
        });
        let mut mask = CoverageMask::new(7, 7);
        mask.set(3, 3, 1.0);
        blur.apply(&mut mask, 1.0);
        assert_eq!(mask.at(3, 3), 0.0);
    }

    #[test]
    fn opacity_change_scales_by_progress() {
        let (blur, _) = resolve(MaskBlurSpec {
            kind: "none".to_string(),
            ksize: 0,
            sigma: 0.0,
            opacity_change: true,
        });
        let mut mask = CoverageMask::new(3, 3);
        mask.fill(1.0);
        blur.apply(&mut mask, 0.25);
        for &v in &mask.data {
            assert!((v - 0.25).abs() < 1e-6);
        }
    }
}
