//! Gravatar enrichment for person records.
//!
//! Finds people without a photo, looks each one up on Gravatar by the hash of
//! their email, stores any avatar as a person-image asset, and fills in empty
//! name fields and verified social links from their public profile.
//!
//! Storage, scheduling and invocation are collaborators behind the traits in
//! [`traits`]; `EnrichmentRunner` drives them in batch or single-person mode.

pub mod config;
pub mod error;
pub mod lock;
pub mod merger;
pub mod persister;
pub mod runner;
pub mod stats;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::EnrichmentConfig;
pub use error::{EnrichmentError, FailureKind};
pub use lock::MemoryRunLock;
pub use merger::{merge_profile, MergeOutcome, SocialAttributes};
pub use persister::{image_extension, photo_file_name, sanitize_file_stem, AssetPersister};
pub use runner::{CandidateReport, EnrichmentDeps, EnrichmentRunner, PhotoOutcome, ProfileOutcome};
pub use stats::RunStats;
pub use types::{
    AssetId, ClassificationId, NewAsset, PersonId, PersonRecord, SocialNetwork,
    PERSON_IMAGE_CLASSIFICATION,
};
