use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

/// Classification name binary assets must carry to be used as a person photo.
pub const PERSON_IMAGE_CLASSIFICATION: &str = "person-image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub Uuid);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(pub Uuid);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassificationId(pub Uuid);

/// A person as held by the record store. The pipeline reads it, fills gaps,
/// and hands it back through `PersonStore::save_person`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonRecord {
    pub id: PersonId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo_id: Option<AssetId>,
    /// Open attribute map; social-account links live here keyed by the
    /// attribute key the store resolves for each network.
    pub attributes: BTreeMap<String, String>,
}

impl Default for PersonId {
    fn default() -> Self {
        PersonId(Uuid::nil())
    }
}

impl PersonRecord {
    pub fn new(email: Option<&str>) -> Self {
        Self {
            id: PersonId(Uuid::new_v4()),
            email: email.map(String::from),
            ..Default::default()
        }
    }

    /// The email to look up, if it has any non-whitespace content.
    pub fn lookup_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.id.to_string()
        } else {
            name
        }
    }
}

/// A binary asset about to be created by the asset store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
    pub classification: ClassificationId,
    pub is_temporary: bool,
}

/// Social networks whose verified profile links are copied onto a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SocialNetwork {
    Twitter,
    Facebook,
}

impl SocialNetwork {
    pub const ALL: [SocialNetwork; 2] = [SocialNetwork::Twitter, SocialNetwork::Facebook];

    /// Map a Gravatar account `shortname` to a recognized network.
    pub fn from_shortname(shortname: &str) -> Option<Self> {
        match shortname.trim().to_ascii_lowercase().as_str() {
            "twitter" => Some(SocialNetwork::Twitter),
            "facebook" => Some(SocialNetwork::Facebook),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialNetwork::Twitter => "twitter",
            SocialNetwork::Facebook => "facebook",
        }
    }
}

impl fmt::Display for SocialNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
