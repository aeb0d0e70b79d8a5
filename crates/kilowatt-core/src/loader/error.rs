use thiserror::Error;

/// Failure of one stage of a load.
#[derive(Error, Debug)]
pub enum SourceFailure {
    #[error("remote fetch failed: {0:#}")]
    RemoteFetchFailed(anyhow::Error),

    #[error("fallback failed: {0:#}")]
    FallbackFailed(anyhow::Error),
}

impl SourceFailure {
    pub fn error(&self) -> &anyhow::Error {
        match self {
            SourceFailure::RemoteFetchFailed(e) | SourceFailure::FallbackFailed(e) => e,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SourceFailure::RemoteFetchFailed(_))
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid loader configuration for '{resource}': {reason}")]
    InvalidConfiguration { resource: String, reason: String },

    #[error("Unable to load {resource} data from any source ({})", join_causes(.causes))]
    ResourceUnavailable {
        resource: String,
        causes: Vec<SourceFailure>,
    },
}

fn join_causes(causes: &[SourceFailure]) -> String {
    if causes.is_empty() {
        return "no source attempted".to_string();
    }
    causes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoadError {
    pub(crate) fn invalid(resource: &str, reason: impl Into<String>) -> Self {
        LoadError::InvalidConfiguration {
            resource: resource.to_string(),
            reason: reason.into(),
        }
    }

    pub fn resource(&self) -> &str {
        match self {
            LoadError::InvalidConfiguration { resource, .. }
            | LoadError::ResourceUnavailable { resource, .. } => resource,
        }
    }

    /// Stage failures behind this error. Empty for configuration errors.
    pub fn causes(&self) -> &[SourceFailure] {
        match self {
            LoadError::ResourceUnavailable { causes, .. } => causes,
            LoadError::InvalidConfiguration { .. } => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, LoadError::ResourceUnavailable { .. })
    }
}
