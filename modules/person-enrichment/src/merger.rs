//! Non-destructive profile merge.
//!
//! Rules:
//! - First and last name are filled only when the record's value is empty
//!   (absent or blank) and the profile's value is not.
//! - A social account is applied only when it is verified, its shortname maps
//!   to a recognized network, the host defines an attribute for that network,
//!   the attribute is currently empty, and the account has a URL.
//! - Existing data is never overwritten. The first qualifying account per
//!   network wins.

use std::collections::BTreeMap;

use gravatar_client::Profile;

use crate::types::{PersonRecord, SocialNetwork};

/// Resolved attribute key per recognized network.
pub type SocialAttributes = BTreeMap<SocialNetwork, String>;

/// Which fields a merge actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub first_name: bool,
    pub last_name: bool,
    pub social: Vec<SocialNetwork>,
}

impl MergeOutcome {
    pub fn is_empty(&self) -> bool {
        !self.first_name && !self.last_name && self.social.is_empty()
    }

    pub fn changed_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.first_name {
            fields.push("first_name".to_string());
        }
        if self.last_name {
            fields.push("last_name".to_string());
        }
        fields.extend(self.social.iter().map(|n| n.to_string()));
        fields
    }
}

pub fn merge_profile(
    person: &mut PersonRecord,
    profile: &Profile,
    attributes: &SocialAttributes,
) -> MergeOutcome {
    let mut outcome = MergeOutcome {
        first_name: fill_gap(&mut person.first_name, profile.given_name.as_deref()),
        last_name: fill_gap(&mut person.last_name, profile.family_name.as_deref()),
        social: Vec::new(),
    };

    for account in profile.accounts.iter().filter(|a| a.verified) {
        let Some(network) = SocialNetwork::from_shortname(&account.shortname) else {
            continue;
        };
        let Some(key) = attributes.get(&network) else {
            continue;
        };
        let Some(url) = account.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
            continue;
        };
        let populated = person
            .attributes
            .get(key)
            .is_some_and(|v| !v.trim().is_empty());
        if populated {
            continue;
        }
        person.attributes.insert(key.clone(), url.to_string());
        outcome.social.push(network);
    }

    outcome
}

fn fill_gap(field: &mut Option<String>, candidate: Option<&str>) -> bool {
    let current_empty = field.as_deref().map_or(true, |v| v.trim().is_empty());
    match candidate.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) if current_empty => {
            *field = Some(value.to_string());
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gravatar_client::SocialAccount;

    const TWITTER_KEY: &str = "Twitter";
    const FACEBOOK_KEY: &str = "Facebook";

    fn attributes() -> SocialAttributes {
        BTreeMap::from([
            (SocialNetwork::Twitter, TWITTER_KEY.to_string()),
            (SocialNetwork::Facebook, FACEBOOK_KEY.to_string()),
        ])
    }

    fn account(shortname: &str, verified: bool, url: &str) -> SocialAccount {
        SocialAccount {
            shortname: shortname.to_string(),
            url: Some(url.to_string()),
            verified,
        }
    }

    fn jane() -> Profile {
        Profile {
            given_name: Some("Jane".into()),
            family_name: Some("Doe".into()),
            accounts: vec![account("twitter", true, "https://twitter.com/janedoe")],
        }
    }

    #[test]
    fn fills_empty_names_and_verified_link() {
        let mut person = PersonRecord::new(Some("jane.doe@example.com"));
        person.first_name = Some(String::new());

        let outcome = merge_profile(&mut person, &jane(), &attributes());

        assert_eq!(person.first_name.as_deref(), Some("Jane"));
        assert_eq!(person.last_name.as_deref(), Some("Doe"));
        assert_eq!(
            person.attributes.get(TWITTER_KEY).map(String::as_str),
            Some("https://twitter.com/janedoe")
        );
        assert_eq!(
            outcome.changed_fields(),
            vec!["first_name", "last_name", "twitter"]
        );
    }

    #[test]
    fn existing_first_name_is_kept() {
        let mut person = PersonRecord::new(None);
        person.first_name = Some("J.".into());

        let outcome = merge_profile(&mut person, &jane(), &attributes());

        assert_eq!(person.first_name.as_deref(), Some("J."));
        assert!(!outcome.first_name);
        assert!(outcome.last_name);
    }

    #[test]
    fn unverified_account_is_never_applied() {
        let mut person = PersonRecord::new(None);
        let profile = Profile {
            accounts: vec![account("facebook", false, "https://facebook.com/jd")],
            ..Default::default()
        };

        let outcome = merge_profile(&mut person, &profile, &attributes());

        assert!(outcome.is_empty());
        assert!(person.attributes.is_empty());
    }

    #[test]
    fn populated_attribute_is_not_overwritten() {
        let mut person = PersonRecord::new(None);
        person
            .attributes
            .insert(TWITTER_KEY.into(), "https://twitter.com/original".into());

        let outcome = merge_profile(&mut person, &jane(), &attributes());

        assert_eq!(
            person.attributes.get(TWITTER_KEY).map(String::as_str),
            Some("https://twitter.com/original")
        );
        assert!(outcome.social.is_empty());
    }

    #[test]
    fn unrecognized_and_unmapped_networks_are_ignored() {
        let mut person = PersonRecord::new(None);
        let profile = Profile {
            accounts: vec![
                account("flickr", true, "https://flickr.com/jd"),
                account("facebook", true, "https://facebook.com/jd"),
            ],
            ..Default::default()
        };
        let only_twitter = BTreeMap::from([(SocialNetwork::Twitter, TWITTER_KEY.to_string())]);

        let outcome = merge_profile(&mut person, &profile, &only_twitter);

        assert!(outcome.is_empty());
        assert!(person.attributes.is_empty());
    }

    #[test]
    fn first_verified_account_per_network_wins() {
        let mut person = PersonRecord::new(None);
        let profile = Profile {
            accounts: vec![
                account("twitter", false, "https://twitter.com/unverified"),
                account("twitter", true, "https://twitter.com/first"),
                account("twitter", true, "https://twitter.com/second"),
            ],
            ..Default::default()
        };

        let outcome = merge_profile(&mut person, &profile, &attributes());

        assert_eq!(outcome.social, vec![SocialNetwork::Twitter]);
        assert_eq!(
            person.attributes.get(TWITTER_KEY).map(String::as_str),
            Some("https://twitter.com/first")
        );
    }

    #[test]
    fn blank_profile_values_change_nothing() {
        let mut person = PersonRecord::new(None);
        let profile = Profile {
            given_name: Some("  ".into()),
            family_name: None,
            accounts: vec![SocialAccount {
                shortname: "twitter".into(),
                url: None,
                verified: true,
            }],
        };

        let outcome = merge_profile(&mut person, &profile, &attributes());

        assert!(outcome.is_empty());
        assert_eq!(person.first_name, None);
    }
}
