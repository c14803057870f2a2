pub mod error;
pub mod hash;
pub mod types;

pub use error::{GravatarError, Result};
pub use hash::{derive_key, LookupKey};
pub use types::{AvatarImage, AvatarLookup, Profile, ProfileLookup, ProfileResponse, SocialAccount};

use std::time::Duration;

use reqwest::StatusCode;

const AVATAR_BASE_URL: &str = "https://secure.gravatar.com";
const PROFILE_BASE_URL: &str = "https://www.gravatar.com";

/// MIME type assumed when the avatar response does not declare an image type.
pub const DEFAULT_AVATAR_MIME: &str = "image/jpeg";

pub struct GravatarClient {
    client: reqwest::Client,
    avatar_base: String,
    profile_base: String,
}

impl GravatarClient {
    /// Build a client whose requests all give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gravatar-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GravatarError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            avatar_base: AVATAR_BASE_URL.to_string(),
            profile_base: PROFILE_BASE_URL.to_string(),
        })
    }

    /// Point the client at different hosts (fixture servers, proxies).
    pub fn with_base_urls(mut self, avatar_base: &str, profile_base: &str) -> Self {
        self.avatar_base = avatar_base.trim_end_matches('/').to_string();
        self.profile_base = profile_base.trim_end_matches('/').to_string();
        self
    }

    /// Fetch the avatar image for `key` at `size` pixels.
    ///
    /// Asks for `default=404` so an unregistered address yields `NotFound`
    /// instead of a generated placeholder.
    pub async fn fetch_avatar(&self, key: &LookupKey, size: u32) -> Result<AvatarLookup> {
        let url = format!("{}/avatar/{}.jpg", self.avatar_base, key);
        let resp = self
            .client
            .get(&url)
            .query(&[("default", "404".to_string()), ("size", size.to_string())])
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(key = %key, "No avatar registered");
            return Ok(AvatarLookup::NotFound);
        }
        if status != StatusCode::OK {
            let message = resp.text().await.unwrap_or_default();
            return Err(GravatarError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mime_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or_else(|| DEFAULT_AVATAR_MIME.to_string());

        let bytes = resp.bytes().await?.to_vec();
        tracing::debug!(key = %key, size = bytes.len(), mime_type = %mime_type, "Avatar fetched");

        Ok(AvatarLookup::Found(AvatarImage { bytes, mime_type }))
    }

    /// Fetch the public profile for `key`.
    ///
    /// A 404, an empty body, or a body without entries is `NotFound`; an
    /// unparseable body is a `Parse` error.
    pub async fn fetch_profile(&self, key: &LookupKey) -> Result<ProfileLookup> {
        let url = format!("{}/{}.json", self.profile_base, key);
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(key = %key, "No profile registered");
            return Ok(ProfileLookup::NotFound);
        }
        if status != StatusCode::OK {
            let message = resp.text().await.unwrap_or_default();
            return Err(GravatarError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        parse_profile_body(&body)
    }
}

/// Interpret a 200 response body from the profile endpoint.
pub fn parse_profile_body(body: &str) -> Result<ProfileLookup> {
    if body.trim().is_empty() {
        return Ok(ProfileLookup::NotFound);
    }
    let response: ProfileResponse = serde_json::from_str(body)?;
    Ok(match response.into_profile() {
        Some(profile) => ProfileLookup::Found(profile),
        None => ProfileLookup::NotFound,
    })
}
