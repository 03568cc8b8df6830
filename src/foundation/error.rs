/// Convenience result type used across renderq.
pub type RenderqResult<T> = Result<T, RenderqError>;

/// Top-level error taxonomy used by scheduler, task and host APIs.
#[derive(thiserror::Error, Debug)]
pub enum RenderqError {
    /// Invalid user-provided configuration or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A scene object the pipeline depends on is absent.
    #[error("missing object: {0}")]
    MissingObject(String),

    /// Keyframe lookup or edit failed.
    #[error("keyframe error: {0}")]
    Keyframe(String),

    /// Compositor graph could not be built or evaluated.
    #[error("compositor error: {0}")]
    Compositor(String),

    /// The host failed to render a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Undo snapshot push or revert failed.
    #[error("undo error: {0}")]
    Undo(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Filesystem errors while writing outputs.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RenderqError {
    /// Build a [`RenderqError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RenderqError::MissingObject`] value.
    pub fn missing_object(msg: impl Into<String>) -> Self {
        Self::MissingObject(msg.into())
    }

    /// Build a [`RenderqError::Keyframe`] value.
    pub fn keyframe(msg: impl Into<String>) -> Self {
        Self::Keyframe(msg.into())
    }

    /// Build a [`RenderqError::Compositor`] value.
    pub fn compositor(msg: impl Into<String>) -> Self {
        Self::Compositor(msg.into())
    }

    /// Build a [`RenderqError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RenderqError::Undo`] value.
    pub fn undo(msg: impl Into<String>) -> Self {
        Self::Undo(msg.into())
    }

    /// Build a [`RenderqError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
