use std::f64::consts::PI;

/// Timeline remapping curves. Input is clamped to `[0, 1]`; output is NOT
/// clamped, because the elastic and bounce curves deliberately overshoot and
/// that overshoot is part of the look. Final compositing alpha clamps instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    In,
    Out,
    InOut,
    InBounce,
    OutBounce,
    InElastic,
    OutElastic,
    InCirc,
    OutCirc,
    InOutCirc,
    InQuint,
    OutQuint,
    InOutQuint,
}

impl Ease {
    /// Accepts both the dashed and the squashed spelling (`ease-in-circ`,
    /// `easeincirc`), case-insensitive. Returns `None` for unknown names so
    /// the caller can degrade to linear with a warning.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Some(Self::Linear),
            "ease-in" | "easein" => Some(Self::In),
            "ease-out" | "easeout" => Some(Self::Out),
            "ease-in-out" | "easeinout" => Some(Self::InOut),
            "ease-in-bounce" | "easeinbounce" => Some(Self::InBounce),
            "ease-out-bounce" | "easeoutbounce" => Some(Self::OutBounce),
            "ease-in-elastic" | "easeinelastic" => Some(Self::InElastic),
            "ease-out-elastic" | "easeoutelastic" => Some(Self::OutElastic),
            "ease-in-circ" | "easeincirc" => Some(Self::InCirc),
            "ease-out-circ" | "easeoutcirc" => Some(Self::OutCirc),
            "ease-inout-circ" | "easeinoutcirc" => Some(Self::InOutCirc),
            "ease-in-quint" | "easeinquint" => Some(Self::InQuint),
            "ease-out-quint" | "easeoutquint" => Some(Self::OutQuint),
            "ease-inout-quint" | "easeinoutquint" => Some(Self::InOutQuint),
            _ => None,
        }
    }

    pub fn apply(self, u: f64) -> f64 {
        let t = u.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::In => t * t * t,
            Self::Out => {
                let v = 1.0 - t;
                1.0 - v * v * v
            }
            Self::InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::InBounce => 2.0_f64.powf(6.0 * (t - 1.0)) * (t * PI * 3.5).sin().abs(),
            Self::OutBounce => 1.0 - 2.0_f64.powf(-6.0 * t) * (t * PI * 3.5).cos().abs(),
            Self::InElastic => {
                let t2 = t * t;
                t2 * t2 * (t * PI * 4.5).sin()
            }
            Self::OutElastic => {
                let t2 = (t - 1.0) * (t - 1.0);
                1.0 - t2 * t2 * (t * PI * 4.5).cos()
            }
            Self::InCirc => 1.0 - (1.0 - t).sqrt(),
            Self::OutCirc => t.sqrt(),
            Self::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - 2.0 * t).sqrt()) * 0.5
                } else {
                    (1.0 + (2.0 * t - 1.0).sqrt()) * 0.5
                }
            }
            Self::InQuint => t.powi(5),
            Self::OutQuint => 1.0 + (t - 1.0).powi(5),
            Self::InOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 + 16.0 * (t - 1.0).powi(5)
                }
            }
        }
    }

    pub const ALL: [Ease; 14] = [
        Ease::Linear,
        Ease::In,
        Ease::Out,
        Ease::InOut,
        Ease::InBounce,
        Ease::OutBounce,
        Ease::InElastic,
        Ease::OutElastic,
        Ease::InCirc,
        Ease::OutCirc,
        Ease::InOutCirc,
        Ease::InQuint,
        Ease::OutQuint,
        Ease::InOutQuint,
    ];
}
