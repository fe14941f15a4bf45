use crate::error::{GlissadeError, GlissadeResult};

/// One transition request as supplied by the caller, straight out of the
/// configuration document. Recognized top-level keys are modeled as fields;
/// everything else lands in `params` and is interpreted (or ignored) per
/// effect kind.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TransitionSpec {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default = "default_duration")]
    pub duration: f64,

    /// Absent means "use the caller-supplied fallback" (itself defaulting to
    /// 30.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_blur: Option<MaskBlurSpec>,

    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

fn default_duration() -> f64 {
    3.0
}

impl TransitionSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            duration: default_duration(),
            fps: None,
            easing: None,
            mask_blur: None,
            params: serde_json::Map::new(),
        }
    }

    pub fn from_json(value: serde_json::Value) -> GlissadeResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| GlissadeError::config(format!("invalid transition config: {e}")))
    }

    pub fn from_str(text: &str) -> GlissadeResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| GlissadeError::config(format!("invalid transition config: {e}")))
    }

    /// Builder-style param injection, mostly for tests and programmatic use.
    pub fn with_param(mut self, key: &str, value: serde_json::Value) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MaskBlurSpec {
    #[serde(rename = "type", default = "default_blur_kind")]
    pub kind: String,

    /// Kernel size; must be >= 0, forced to the nearest odd value when
    /// enabled. Signed on purpose so a negative value is a config error
    /// rather than a silent wrap.
    #[serde(default)]
    pub ksize: i64,

    #[serde(default)]
    pub sigma: f64,

    #[serde(rename = "opacitychange", default)]
    pub opacity_change: bool,
}

fn default_blur_kind() -> String {
    "none".to_string()
}

impl Default for MaskBlurSpec {
    fn default() -> Self {
        Self {
            kind: default_blur_kind(),
            ksize: 0,
            sigma: 0.0,
            opacity_change: false,
        }
    }
}

/// A non-fatal resolution diagnostic: the engine degraded to the nearest sane
/// default instead of failing on cosmetic misconfiguration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderWarning {
    pub message: String,
}

impl std::fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Collects warnings during config resolution. Everything is also emitted
/// through `tracing` so embedding applications get them on their normal
/// logging path.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<RenderWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "glissade::resolve", "{message}");
        self.warnings.push(RenderWarning { message });
    }

    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<RenderWarning> {
        self.warnings
    }
}

// Typed sub-option extraction. Missing keys take the documented per-effect
// default; present-but-wrong-typed keys are config errors.

pub(crate) fn get_f64(
    params: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    default: f64,
) -> GlissadeResult<f64> {
    match params.get(key) {
        None => Ok(default),
        Some(v) => {
            let n = v
                .as_f64()
                .ok_or_else(|| GlissadeError::config(format!("'{key}' must be a number")))?;
            if !n.is_finite() {
                return Err(GlissadeError::config(format!("'{key}' must be finite")));
            }
            Ok(n)
        }
    }
}

pub(crate) fn get_u64(
    params: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    default: u64,
) -> GlissadeResult<u64> {
    match params.get(key) {
        None => Ok(default),
        Some(v) => v
            .as_u64()
            .ok_or_else(|| GlissadeError::config(format!("'{key}' must be a non-negative integer"))),
    }
}

pub(crate) fn get_bool(
    params: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    default: bool,
) -> GlissadeResult<bool> {
    match params.get(key) {
        None => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| GlissadeError::config(format!("'{key}' must be a boolean"))),
    }
}

pub(crate) fn get_str(
    params: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    default: &str,
) -> GlissadeResult<String> {
    match params.get(key) {
        None => Ok(default.to_string()),
        Some(v) => v
            .as_str()
            .map(|s| s.trim().to_ascii_lowercase())
            .ok_or_else(|| GlissadeError::config(format!("'{key}' must be a string"))),
    }
}
