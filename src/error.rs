pub type LayervalResult<T> = Result<T, LayervalError>;

#[derive(thiserror::Error, Debug)]
pub enum LayervalError {
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("layer not found: {0}")]
    LayerNotFound(String),

    #[error("unsupported override kind: {0}")]
    UnsupportedOverride(String),

    #[error("layer refresh failed twice: {0}")]
    EngineRefresh(String),

    #[error("engine query failed: {0}")]
    EngineQuery(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayervalError {
    pub fn attribute_not_found(path: impl Into<String>) -> Self {
        Self::AttributeNotFound(path.into())
    }

    pub fn layer_not_found(name: impl Into<String>) -> Self {
        Self::LayerNotFound(name.into())
    }

    pub fn unsupported_override(kind: impl Into<String>) -> Self {
        Self::UnsupportedOverride(kind.into())
    }

    pub fn engine_refresh(layer: impl Into<String>) -> Self {
        Self::EngineRefresh(layer.into())
    }

    pub fn engine_query(plug: impl Into<String>) -> Self {
        Self::EngineQuery(plug.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            LayervalError::attribute_not_found("cam.focalLength")
                .to_string()
                .contains("attribute not found:")
        );
        assert!(
            LayervalError::layer_not_found("chars")
                .to_string()
                .contains("layer not found:")
        );
        assert!(
            LayervalError::unsupported_override("connection_v2")
                .to_string()
                .contains("unsupported override kind:")
        );
        assert!(
            LayervalError::engine_refresh("chars")
                .to_string()
                .contains("refresh failed twice:")
        );
        assert!(
            LayervalError::invariant("x")
                .to_string()
                .contains("invariant violation:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = LayervalError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
