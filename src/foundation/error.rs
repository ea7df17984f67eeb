/// Convenience result type used across the crate.
pub type MetascoreResult<T> = Result<T, MetascoreError>;

/// Top-level error taxonomy used by the engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum MetascoreError {
    /// A schema constraint was violated on insert or update.
    #[error("validation error: {0}")]
    Validation(String),

    /// A component id collided with one already in the store.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// A reference-list entry points to a missing or wrongly-typed component.
    #[error("reference integrity error: {0}")]
    ReferenceIntegrity(String),

    /// Two capability mixins contributed incompatible specs for one field.
    #[error("schema composition error: {0}")]
    Schema(String),

    /// A behavior graph failed to compile or referenced an unavailable module.
    #[error("behavior error: {0}")]
    Behavior(String),

    /// A trigger callback reported a failure.
    #[error("callback error: {0}")]
    Callback(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MetascoreError {
    /// Build a [`MetascoreError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MetascoreError::DuplicateId`] value.
    pub fn duplicate_id(msg: impl Into<String>) -> Self {
        Self::DuplicateId(msg.into())
    }

    /// Build a [`MetascoreError::ReferenceIntegrity`] value.
    pub fn reference(msg: impl Into<String>) -> Self {
        Self::ReferenceIntegrity(msg.into())
    }

    /// Build a [`MetascoreError::Schema`] value.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Build a [`MetascoreError::Behavior`] value.
    pub fn behavior(msg: impl Into<String>) -> Self {
        Self::Behavior(msg.into())
    }

    /// Build a [`MetascoreError::Callback`] value.
    pub fn callback(msg: impl Into<String>) -> Self {
        Self::Callback(msg.into())
    }

    /// Build a [`MetascoreError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
