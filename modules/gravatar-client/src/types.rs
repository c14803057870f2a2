use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

// --- Avatar ---

/// Raw image returned by the avatar endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Outcome of an avatar lookup that reached the service.
#[derive(Debug, Clone, PartialEq)]
pub enum AvatarLookup {
    Found(AvatarImage),
    NotFound,
}

// --- Profile ---

/// A linked account listed on a Gravatar profile.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialAccount {
    pub shortname: String,
    pub url: Option<String>,
    pub verified: bool,
}

/// The fields of a Gravatar profile the enrichment pipeline cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub accounts: Vec<SocialAccount>,
}

/// Outcome of a profile lookup that reached the service.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileLookup {
    Found(Profile),
    NotFound,
}

// --- Wire format ---

/// Body of `GET /{hash}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    /// Only `entry[0]` is read; a first item that is not an entry object
    /// means there is no profile, even when later items would parse.
    #[serde(default, deserialize_with = "lenient_first")]
    pub entry: Option<ProfileEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<ProfileName>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub accounts: Vec<ProfileAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileName {
    #[serde(rename = "givenName", default, deserialize_with = "lenient")]
    pub given_name: Option<String>,
    #[serde(rename = "familyName", default, deserialize_with = "lenient")]
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileAccount {
    #[serde(default, deserialize_with = "lenient")]
    pub shortname: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub verified: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

impl ProfileResponse {
    /// Convert the first entry into a `Profile`. `None` when the body has no
    /// usable first entry.
    pub fn into_profile(self) -> Option<Profile> {
        let entry = self.entry?;
        let (given_name, family_name) = match entry.name {
            Some(name) => (non_blank(name.given_name), non_blank(name.family_name)),
            None => (None, None),
        };
        let accounts = entry
            .accounts
            .into_iter()
            .filter_map(|a| {
                let shortname = non_blank(a.shortname)?;
                Some(SocialAccount {
                    shortname,
                    url: non_blank(a.url),
                    verified: a.verified,
                })
            })
            .collect();
        Some(Profile {
            given_name,
            family_name,
            accounts,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Gravatar is loose with its JSON: `name` comes back as `[]` when unset and
// `verified` is often the string "true". Ill-typed optional fields become absent.

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_first<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .next()
            .and_then(|first| serde_json::from_value(first).ok()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => s.trim().eq_ignore_ascii_case("true") || s.trim() == "1",
        serde_json::Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Option<Profile> {
        serde_json::from_str::<ProfileResponse>(body)
            .unwrap()
            .into_profile()
    }

    #[test]
    fn full_entry_is_extracted() {
        let profile = parse(
            r#"{"entry":[{"name":{"givenName":"Jane","familyName":"Doe"},
                "accounts":[{"shortname":"twitter","verified":true,"url":"https://twitter.com/janedoe"}]}]}"#,
        )
        .unwrap();
        assert_eq!(profile.given_name.as_deref(), Some("Jane"));
        assert_eq!(profile.family_name.as_deref(), Some("Doe"));
        assert_eq!(
            profile.accounts,
            vec![SocialAccount {
                shortname: "twitter".into(),
                url: Some("https://twitter.com/janedoe".into()),
                verified: true,
            }]
        );
    }

    #[test]
    fn empty_entry_list_is_no_profile() {
        assert!(parse(r#"{"entry":[]}"#).is_none());
        assert!(parse(r#"{}"#).is_none());
    }

    #[test]
    fn malformed_first_entry_is_no_profile() {
        assert!(parse(r#"{"entry":["garbage",{"name":{"givenName":"Second"}}]}"#).is_none());
        assert!(parse(r#"{"entry":[null,{"name":{"givenName":"Second"}}]}"#).is_none());
        assert!(parse(r#"{"entry":{"name":{"givenName":"Jane"}}}"#).is_none());
    }

    #[test]
    fn only_the_first_entry_is_used() {
        let profile = parse(
            r#"{"entry":[{"name":{"givenName":"First"}},{"name":{"givenName":"Second"}}]}"#,
        )
        .unwrap();
        assert_eq!(profile.given_name.as_deref(), Some("First"));
    }

    #[test]
    fn name_as_empty_array_yields_absent_names() {
        let profile = parse(r#"{"entry":[{"name":[],"accounts":[]}]}"#).unwrap();
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn string_verified_flag_is_understood() {
        let profile = parse(
            r#"{"entry":[{"accounts":[
                {"shortname":"facebook","verified":"true","url":"https://facebook.com/jd"},
                {"shortname":"twitter","verified":"false","url":"https://twitter.com/jd"}]}]}"#,
        )
        .unwrap();
        assert!(profile.accounts[0].verified);
        assert!(!profile.accounts[1].verified);
    }

    #[test]
    fn malformed_accounts_are_dropped_not_fatal() {
        let profile = parse(
            r#"{"entry":[{"name":{"givenName":"  "},"accounts":[
                "garbage", {"verified":true,"url":"https://x"},
                {"shortname":"twitter"}]}]}"#,
        )
        .unwrap();
        assert_eq!(profile.given_name, None);
        assert_eq!(profile.accounts.len(), 1);
        assert_eq!(profile.accounts[0].shortname, "twitter");
        assert!(!profile.accounts[0].verified);
        assert_eq!(profile.accounts[0].url, None);
    }
}
