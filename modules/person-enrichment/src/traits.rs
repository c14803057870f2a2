// Collaborator boundaries for the enrichment pipeline.
//
// AvatarSource / ProfileSource — the Gravatar service (GravatarClient in production).
// CandidateSelector — yields people without a photo, bounded by a limit.
// PersonStore — load and save individual person records.
// AssetStore — resolve asset classifications and create binary assets.
// AttributeResolver — which attribute key holds each social network's link.
// RunLock — mutual exclusion between batch runs of the same job.
//
// The runner only sees these traits, so tests swap in the in-memory mocks
// from `testing` with no network and no database.

use anyhow::Result;
use async_trait::async_trait;

use gravatar_client::{AvatarLookup, GravatarClient, LookupKey, ProfileLookup};

use crate::types::{AssetId, ClassificationId, NewAsset, PersonId, PersonRecord, SocialNetwork};

// ---------------------------------------------------------------------------
// Gravatar
// ---------------------------------------------------------------------------

#[async_trait]
pub trait AvatarSource: Send + Sync {
    /// Fetch the avatar for `key` at `size` pixels. `Err` is a transient failure.
    async fn fetch_avatar(&self, key: &LookupKey, size: u32) -> gravatar_client::Result<AvatarLookup>;
}

#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the profile for `key`. `Err` is a transient failure.
    async fn fetch_profile(&self, key: &LookupKey) -> gravatar_client::Result<ProfileLookup>;
}

#[async_trait]
impl AvatarSource for GravatarClient {
    async fn fetch_avatar(&self, key: &LookupKey, size: u32) -> gravatar_client::Result<AvatarLookup> {
        GravatarClient::fetch_avatar(self, key, size).await
    }
}

#[async_trait]
impl ProfileSource for GravatarClient {
    async fn fetch_profile(&self, key: &LookupKey) -> gravatar_client::Result<ProfileLookup> {
        GravatarClient::fetch_profile(self, key).await
    }
}

// ---------------------------------------------------------------------------
// Record storage
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CandidateSelector: Send + Sync {
    /// Return at most `limit` people who currently have no photo.
    async fn list_candidates(&self, limit: usize) -> Result<Vec<PersonRecord>>;
}

#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn find_person(&self, id: PersonId) -> Result<Option<PersonRecord>>;

    /// Persist all fields of `person`, including attributes.
    async fn save_person(&self, person: &PersonRecord) -> Result<()>;
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Look up a classification by name. `None` when it is not configured.
    async fn resolve_classification(&self, name: &str) -> Result<Option<ClassificationId>>;

    /// Durably create an asset and return its id.
    async fn create_asset(&self, asset: NewAsset) -> Result<AssetId>;
}

#[async_trait]
pub trait AttributeResolver: Send + Sync {
    /// The attribute key a network's profile link is stored under, if the
    /// host defines one.
    async fn attribute_key(&self, network: SocialNetwork) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// Run exclusivity
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RunLock: Send + Sync {
    /// Try to take the lock for `job`. `false` when another run holds it.
    async fn acquire(&self, job: &str) -> Result<bool>;

    async fn release(&self, job: &str) -> Result<()>;
}
