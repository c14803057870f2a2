// Test mocks for the enrichment pipeline.
//
// Two mocks covering the trait boundaries:
// - MockGravatar (AvatarSource + ProfileSource) — email→response maps
// - MemoryStore (CandidateSelector + PersonStore + AssetStore + AttributeResolver)
//   — stateful in-memory records and assets that log every write
//
// Plus helpers for constructing people and profiles.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use gravatar_client::{
    derive_key, AvatarImage, AvatarLookup, GravatarError, LookupKey, Profile, ProfileLookup,
    SocialAccount,
};
use uuid::Uuid;

use crate::traits::{AssetStore, AttributeResolver, AvatarSource, CandidateSelector, PersonStore, ProfileSource};
use crate::types::{
    AssetId, ClassificationId, NewAsset, PersonId, PersonRecord, SocialNetwork,
    PERSON_IMAGE_CLASSIFICATION,
};

// ---------------------------------------------------------------------------
// MockGravatar
// ---------------------------------------------------------------------------

enum Canned<T> {
    Ok(T),
    Fail(u16),
}

/// Email-keyed Gravatar stand-in. Unregistered addresses are `NotFound`.
/// Builder pattern: `.on_avatar()`, `.on_avatar_as()`, `.on_profile()`, `.avatar_error()`, `.profile_error()`.
pub struct MockGravatar {
    avatars: HashMap<LookupKey, Canned<AvatarImage>>,
    profiles: HashMap<LookupKey, Canned<Profile>>,
    avatar_calls: Mutex<Vec<(LookupKey, u32)>>,
    profile_calls: Mutex<Vec<LookupKey>>,
}

impl MockGravatar {
    pub fn new() -> Self {
        Self {
            avatars: HashMap::new(),
            profiles: HashMap::new(),
            avatar_calls: Mutex::new(Vec::new()),
            profile_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_avatar(self, email: &str, bytes: &[u8]) -> Self {
        self.on_avatar_as(email, bytes, "image/jpeg")
    }

    /// Serve an avatar with a specific MIME type.
    pub fn on_avatar_as(mut self, email: &str, bytes: &[u8], mime_type: &str) -> Self {
        self.avatars.insert(
            derive_key(email),
            Canned::Ok(AvatarImage {
                bytes: bytes.to_vec(),
                mime_type: mime_type.to_string(),
            }),
        );
        self
    }

    pub fn avatar_error(mut self, email: &str, status: u16) -> Self {
        self.avatars.insert(derive_key(email), Canned::Fail(status));
        self
    }

    pub fn on_profile(mut self, email: &str, profile: Profile) -> Self {
        self.profiles.insert(derive_key(email), Canned::Ok(profile));
        self
    }

    pub fn profile_error(mut self, email: &str, status: u16) -> Self {
        self.profiles.insert(derive_key(email), Canned::Fail(status));
        self
    }

    /// Every `(key, size)` the avatar endpoint was asked for, in order.
    pub fn avatar_calls(&self) -> Vec<(LookupKey, u32)> {
        self.avatar_calls.lock().unwrap().clone()
    }

    pub fn profile_calls(&self) -> Vec<LookupKey> {
        self.profile_calls.lock().unwrap().clone()
    }
}

impl Default for MockGravatar {
    fn default() -> Self {
        Self::new()
    }
}

fn api_error(status: u16) -> GravatarError {
    GravatarError::Api {
        status,
        message: "mock failure".to_string(),
    }
}

#[async_trait]
impl AvatarSource for MockGravatar {
    async fn fetch_avatar(&self, key: &LookupKey, size: u32) -> gravatar_client::Result<AvatarLookup> {
        self.avatar_calls.lock().unwrap().push((key.clone(), size));
        match self.avatars.get(key) {
            Some(Canned::Ok(image)) => Ok(AvatarLookup::Found(image.clone())),
            Some(Canned::Fail(status)) => Err(api_error(*status)),
            None => Ok(AvatarLookup::NotFound),
        }
    }
}

#[async_trait]
impl ProfileSource for MockGravatar {
    async fn fetch_profile(&self, key: &LookupKey) -> gravatar_client::Result<ProfileLookup> {
        self.profile_calls.lock().unwrap().push(key.clone());
        match self.profiles.get(key) {
            Some(Canned::Ok(profile)) => Ok(ProfileLookup::Found(profile.clone())),
            Some(Canned::Fail(status)) => Err(api_error(*status)),
            None => Ok(ProfileLookup::NotFound),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// A stored asset plus the id it was given.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAsset {
    pub id: AssetId,
    pub asset: NewAsset,
}

/// In-memory record store. Candidates come back in insertion order.
pub struct MemoryStore {
    people: Mutex<Vec<PersonRecord>>,
    assets: Mutex<Vec<StoredAsset>>,
    saves: Mutex<Vec<PersonId>>,
    classification: Option<ClassificationId>,
    social_keys: BTreeMap<SocialNetwork, String>,
    fail_saves: bool,
    fail_assets: bool,
    fail_listing: bool,
}

impl MemoryStore {
    /// A store with the person-image classification and Twitter/Facebook
    /// attributes configured.
    pub fn new() -> Self {
        Self {
            people: Mutex::new(Vec::new()),
            assets: Mutex::new(Vec::new()),
            saves: Mutex::new(Vec::new()),
            classification: Some(ClassificationId(Uuid::new_v4())),
            social_keys: BTreeMap::from([
                (SocialNetwork::Twitter, "Twitter".to_string()),
                (SocialNetwork::Facebook, "Facebook".to_string()),
            ]),
            fail_saves: false,
            fail_assets: false,
            fail_listing: false,
        }
    }

    pub fn with_person(self, person: PersonRecord) -> Self {
        self.people.lock().unwrap().push(person);
        self
    }

    pub fn without_classification(mut self) -> Self {
        self.classification = None;
        self
    }

    pub fn without_social_attribute(mut self, network: SocialNetwork) -> Self {
        self.social_keys.remove(&network);
        self
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn failing_assets(mut self) -> Self {
        self.fail_assets = true;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn classification(&self) -> Option<ClassificationId> {
        self.classification
    }

    pub fn person(&self, id: PersonId) -> Option<PersonRecord> {
        self.people
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn assets(&self) -> Vec<StoredAsset> {
        self.assets.lock().unwrap().clone()
    }

    /// Ids of every successful `save_person`, in order.
    pub fn saves(&self) -> Vec<PersonId> {
        self.saves.lock().unwrap().clone()
    }

    /// Total successful writes of any kind.
    pub fn write_count(&self) -> usize {
        self.assets.lock().unwrap().len() + self.saves.lock().unwrap().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandidateSelector for MemoryStore {
    async fn list_candidates(&self, limit: usize) -> Result<Vec<PersonRecord>> {
        if self.fail_listing {
            bail!("MemoryStore: candidate query failed");
        }
        Ok(self
            .people
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.photo_id.is_none())
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PersonStore for MemoryStore {
    async fn find_person(&self, id: PersonId) -> Result<Option<PersonRecord>> {
        Ok(self.person(id))
    }

    async fn save_person(&self, person: &PersonRecord) -> Result<()> {
        if self.fail_saves {
            bail!("MemoryStore: save failed for {}", person.id);
        }
        let mut people = self.people.lock().unwrap();
        match people.iter_mut().find(|p| p.id == person.id) {
            Some(existing) => *existing = person.clone(),
            None => people.push(person.clone()),
        }
        self.saves.lock().unwrap().push(person.id);
        Ok(())
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn resolve_classification(&self, name: &str) -> Result<Option<ClassificationId>> {
        if name == PERSON_IMAGE_CLASSIFICATION {
            Ok(self.classification)
        } else {
            Ok(None)
        }
    }

    async fn create_asset(&self, asset: NewAsset) -> Result<AssetId> {
        if self.fail_assets {
            bail!("MemoryStore: asset write failed");
        }
        let id = AssetId(Uuid::new_v4());
        self.assets.lock().unwrap().push(StoredAsset { id, asset });
        Ok(id)
    }
}

#[async_trait]
impl AttributeResolver for MemoryStore {
    async fn attribute_key(&self, network: SocialNetwork) -> Result<Option<String>> {
        Ok(self.social_keys.get(&network).cloned())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn person(email: &str) -> PersonRecord {
    PersonRecord::new(Some(email))
}

pub fn named_person(email: &str, first: &str, last: &str) -> PersonRecord {
    let mut p = person(email);
    p.first_name = Some(first.to_string());
    p.last_name = Some(last.to_string());
    p
}

pub fn profile(given: &str, family: &str, accounts: &[(&str, bool, &str)]) -> Profile {
    Profile {
        given_name: Some(given.to_string()),
        family_name: Some(family.to_string()),
        accounts: accounts
            .iter()
            .map(|(shortname, verified, url)| SocialAccount {
                shortname: shortname.to_string(),
                url: Some(url.to_string()),
                verified: *verified,
            })
            .collect(),
    }
}
