pub type GlissadeResult<T> = Result<T, GlissadeError>;

#[derive(thiserror::Error, Debug)]
pub enum GlissadeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlissadeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            GlissadeError::config("x")
                .to_string()
                .contains("config error:")
        );
        assert!(
            GlissadeError::geometry("x")
                .to_string()
                .contains("geometry error:")
        );
        assert!(
            GlissadeError::evaluation("x")
                .to_string()
                .contains("evaluation error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = GlissadeError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
