use gravatar_client::GravatarError;
use thiserror::Error;

use crate::types::PersonId;

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("No person was selected")]
    MissingReference,

    #[error("Person could not be found for selected value ('{0}')")]
    PersonNotFound(PersonId),

    #[error("Email address could not be found for {name} ({id})")]
    MissingEmail { name: String, id: PersonId },

    #[error("{name} ({id}) already has a photo")]
    AlreadyHasPhoto { name: String, id: PersonId },

    #[error("Gravatar lookup failed: {0}")]
    Lookup(#[from] GravatarError),

    #[error("Binary asset classification '{0}' is not configured")]
    MissingClassification(String),

    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Run lock conflict: another '{0}' run is in progress")]
    RunInProgress(String),
}

/// Where a candidate's failure sits in the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing or invalid target, missing email.
    Input,
    /// Non-200/404 response, transport failure, malformed body.
    Transient,
    /// Missing classification or a storage write failure.
    Persistence,
    /// Collaborator-level failure that aborts a batch.
    Fatal,
}

impl EnrichmentError {
    pub fn kind(&self) -> FailureKind {
        match self {
            EnrichmentError::MissingReference
            | EnrichmentError::PersonNotFound(_)
            | EnrichmentError::MissingEmail { .. }
            | EnrichmentError::AlreadyHasPhoto { .. } => FailureKind::Input,
            EnrichmentError::Lookup(_) => FailureKind::Transient,
            EnrichmentError::MissingClassification(_) | EnrichmentError::Storage(_) => {
                FailureKind::Persistence
            }
            EnrichmentError::Config(_) | EnrichmentError::RunInProgress(_) => FailureKind::Fatal,
        }
    }
}
