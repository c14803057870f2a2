//! Diagnostic tool: show what Gravatar returns for one email address.
//! Prints the lookup key, the avatar outcome, and the parsed profile, using the
//! same client settings the enrichment runner uses.
//!
//! Usage: cargo run --bin probe_gravatar -- --email jane.doe@example.com

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gravatar_client::{derive_key, AvatarLookup, GravatarClient, ProfileLookup};
use person_enrichment::{merge_profile, EnrichmentConfig, PersonRecord, SocialAttributes, SocialNetwork};

#[derive(Parser, Debug)]
#[command(about = "Look up one email address on Gravatar")]
struct Args {
    /// Email address to look up.
    #[arg(long)]
    email: String,

    /// Avatar size in pixels (defaults to ENRICH_PHOTO_SIZE or 200).
    #[arg(long)]
    size: Option<u32>,

    /// Skip the profile lookup.
    #[arg(long)]
    no_profile: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("person_enrichment=info".parse()?)
                .add_directive("gravatar_client=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let mut config = EnrichmentConfig::from_env()?;
    if let Some(size) = args.size {
        config.photo_size_pixels = size;
        config.validate()?;
    }
    config.log_summary();

    let client = GravatarClient::new(config.request_timeout)?;
    let key = derive_key(&args.email);
    println!("Email:      {}", args.email.trim().to_lowercase());
    println!("Lookup key: {key}");

    match client.fetch_avatar(&key, config.photo_size_pixels).await {
        Ok(AvatarLookup::Found(image)) => println!(
            "Avatar:     found ({} bytes, {})",
            image.bytes.len(),
            image.mime_type
        ),
        Ok(AvatarLookup::NotFound) => println!("Avatar:     not registered"),
        Err(e) => println!("Avatar:     error: {e}"),
    }

    if args.no_profile || !config.enable_profile_enrichment {
        return Ok(());
    }

    match client.fetch_profile(&key).await {
        Ok(ProfileLookup::Found(profile)) => {
            println!("Profile:    found");
            println!("  Given name:  {}", profile.given_name.as_deref().unwrap_or("-"));
            println!("  Family name: {}", profile.family_name.as_deref().unwrap_or("-"));
            for account in &profile.accounts {
                let recognized = if SocialNetwork::from_shortname(&account.shortname).is_some() {
                    ""
                } else {
                    " (ignored)"
                };
                println!(
                    "  Account: {} verified={} url={}{recognized}",
                    account.shortname,
                    account.verified,
                    account.url.as_deref().unwrap_or("-"),
                );
            }

            // Show what a merge onto an empty record would fill.
            let social: SocialAttributes = SocialNetwork::ALL
                .into_iter()
                .map(|n| (n, n.to_string()))
                .collect();
            let mut blank = PersonRecord::new(Some(&args.email));
            let outcome = merge_profile(&mut blank, &profile, &social);
            println!("  Would fill: {:?}", outcome.changed_fields());
        }
        Ok(ProfileLookup::NotFound) => println!("Profile:    not registered"),
        Err(e) => println!("Profile:    error: {e}"),
    }

    Ok(())
}
