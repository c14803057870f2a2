//! Enrichment orchestration.
//!
//! One per-candidate algorithm shared by both entry points:
//!
//! ```text
//! Selected → HashComputed → AvatarQueried → {AssetCreated | NoAvatar}
//!          → ProfileQueried (optional) → {Merged | NoProfile} → Saved
//! ```
//!
//! Any terminal failure (missing email, avatar lookup error, asset or save
//! failure) ends the candidate as `Err(EnrichmentError)` and the batch moves on.
//! A profile lookup failure after a photo was stored is not terminal: the photo
//! is still saved and the failure is reported alongside.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use gravatar_client::{derive_key, AvatarLookup, ProfileLookup};
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;

use crate::config::EnrichmentConfig;
use crate::error::EnrichmentError;
use crate::lock::MemoryRunLock;
use crate::merger::{merge_profile, MergeOutcome, SocialAttributes};
use crate::persister::AssetPersister;
use crate::stats::RunStats;
use crate::traits::{
    AssetStore, AttributeResolver, AvatarSource, CandidateSelector, PersonStore, ProfileSource,
    RunLock,
};
use crate::types::{AssetId, PersonId, PersonRecord, SocialNetwork};

/// Collaborators the runner talks to.
#[derive(Clone, TypedBuilder)]
pub struct EnrichmentDeps {
    pub avatars: Arc<dyn AvatarSource>,
    pub profiles: Arc<dyn ProfileSource>,
    pub candidates: Arc<dyn CandidateSelector>,
    pub people: Arc<dyn PersonStore>,
    pub assets: Arc<dyn AssetStore>,
    pub attributes: Arc<dyn AttributeResolver>,
    #[builder(default = Arc::new(MemoryRunLock::new()) as Arc<dyn RunLock>)]
    pub run_lock: Arc<dyn RunLock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoOutcome {
    Created(AssetId),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    Disabled,
    Merged(MergeOutcome),
    NotFound,
    /// Lookup failed after a photo was stored; the photo was kept.
    Failed(String),
}

/// What happened to a candidate that was not skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReport {
    pub person_id: PersonId,
    pub photo: PhotoOutcome,
    pub profile: ProfileOutcome,
    pub saved: bool,
}

pub struct EnrichmentRunner {
    deps: EnrichmentDeps,
    persister: AssetPersister,
    config: EnrichmentConfig,
    cancelled: Arc<AtomicBool>,
}

impl EnrichmentRunner {
    pub fn new(deps: EnrichmentDeps, config: EnrichmentConfig) -> Self {
        let persister = AssetPersister::new(deps.assets.clone());
        Self {
            deps,
            persister,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an externally owned cancellation flag (e.g. set by a shutdown handler).
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Setting this flag stops a batch before its next candidate. The
    /// candidate in flight always finishes.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Run one batch: up to `max_queries_per_run` people without a photo.
    ///
    /// Holds the run lock for `job_name` for the whole batch. Only a lock
    /// conflict or a failure to list candidates aborts; per-candidate failures
    /// are counted and skipped.
    pub async fn run_batch(&self) -> Result<RunStats, EnrichmentError> {
        let job = self.config.job_name.as_str();
        if !self
            .deps
            .run_lock
            .acquire(job)
            .await
            .map_err(EnrichmentError::Storage)?
        {
            return Err(EnrichmentError::RunInProgress(job.to_string()));
        }

        let result = self.run_batch_inner().await;

        // Always release lock
        if let Err(e) = self.deps.run_lock.release(job).await {
            error!(job, error = %e, "Failed to release run lock");
        }

        result
    }

    async fn run_batch_inner(&self) -> Result<RunStats, EnrichmentError> {
        let mut stats = RunStats::default();
        let limit = self.config.max_queries_per_run;

        let mut candidates = self
            .deps
            .candidates
            .list_candidates(limit)
            .await
            .map_err(EnrichmentError::Storage)?;
        if candidates.len() > limit {
            warn!(
                returned = candidates.len(),
                limit, "Candidate selector exceeded limit, truncating"
            );
            candidates.truncate(limit);
        }
        info!(
            job = self.config.job_name.as_str(),
            candidates = candidates.len(),
            limit,
            "Enrichment batch starting"
        );

        let social = self.resolve_social_attributes().await;

        for person in candidates {
            if self.cancelled.load(Ordering::Relaxed) {
                info!("Enrichment batch cancelled");
                stats.cancelled = true;
                break;
            }

            stats.candidates += 1;
            let person_id = person.id;
            match self.process_candidate(person, &social).await {
                Ok(report) => stats.record(&report),
                Err(e) => {
                    warn!(person_id = %person_id, error = %e, "Candidate skipped");
                    stats.record_skip(e.kind());
                }
            }
        }

        stats.finished_at = Some(Utc::now());
        info!(
            candidates = stats.candidates,
            photos_found = stats.photos_found,
            records_updated = stats.records_updated,
            skipped = stats.skipped(),
            "Enrichment batch finished"
        );
        Ok(stats)
    }

    /// Enrich one externally supplied person.
    ///
    /// Returns human-readable messages, one per failure; empty on success or
    /// when Gravatar simply has nothing for the address. Does not take the
    /// batch run lock, so a batch touching the same person at the same time
    /// can race with this call.
    pub async fn run_single(&self, target: Option<PersonId>) -> Vec<String> {
        let mut messages = Vec::new();

        let person = match self.resolve_target(target).await {
            Ok(person) => person,
            Err(e) => {
                warn!(error = %e, "Single-person enrichment rejected");
                messages.push(e.to_string());
                return messages;
            }
        };

        let social = self.resolve_social_attributes().await;
        let name = person.display_name();
        match self.process_candidate(person, &social).await {
            Ok(report) => {
                if let ProfileOutcome::Failed(reason) = &report.profile {
                    messages.push(format!(
                        "Gravatar profile lookup failed for {name} ({}): {reason}",
                        report.person_id
                    ));
                }
            }
            Err(e) => {
                warn!(error = %e, "Single-person enrichment skipped");
                messages.push(e.to_string());
            }
        }

        messages
    }

    async fn resolve_target(&self, target: Option<PersonId>) -> Result<PersonRecord, EnrichmentError> {
        let id = target.ok_or(EnrichmentError::MissingReference)?;
        self.deps
            .people
            .find_person(id)
            .await
            .map_err(EnrichmentError::Storage)?
            .ok_or(EnrichmentError::PersonNotFound(id))
    }

    async fn resolve_social_attributes(&self) -> SocialAttributes {
        let mut resolved = SocialAttributes::new();
        if !self.config.enable_profile_enrichment {
            return resolved;
        }
        for network in SocialNetwork::ALL {
            match self.deps.attributes.attribute_key(network).await {
                Ok(Some(key)) => {
                    resolved.insert(network, key);
                }
                Ok(None) => debug!(network = %network, "No attribute defined for network"),
                Err(e) => warn!(network = %network, error = %e, "Failed to resolve social attribute"),
            }
        }
        resolved
    }

    async fn process_candidate(
        &self,
        mut person: PersonRecord,
        social: &SocialAttributes,
    ) -> Result<CandidateReport, EnrichmentError> {
        if person.photo_id.is_some() {
            return Err(EnrichmentError::AlreadyHasPhoto {
                name: person.display_name(),
                id: person.id,
            });
        }
        let key = match person.lookup_email() {
            Some(email) => derive_key(email),
            None => {
                return Err(EnrichmentError::MissingEmail {
                    name: person.display_name(),
                    id: person.id,
                })
            }
        };

        let photo = match self
            .deps
            .avatars
            .fetch_avatar(&key, self.config.photo_size_pixels)
            .await?
        {
            AvatarLookup::Found(image) => {
                let asset_id = self.persister.persist(&person, &image).await?;
                person.photo_id = Some(asset_id);
                PhotoOutcome::Created(asset_id)
            }
            AvatarLookup::NotFound => PhotoOutcome::NotFound,
        };

        let profile = if self.config.enable_profile_enrichment {
            match self.deps.profiles.fetch_profile(&key).await {
                Ok(ProfileLookup::Found(profile)) => {
                    ProfileOutcome::Merged(merge_profile(&mut person, &profile, social))
                }
                Ok(ProfileLookup::NotFound) => ProfileOutcome::NotFound,
                Err(e) if photo == PhotoOutcome::NotFound => return Err(e.into()),
                Err(e) => {
                    warn!(person_id = %person.id, error = %e, "Profile lookup failed, keeping photo");
                    ProfileOutcome::Failed(e.to_string())
                }
            }
        } else {
            ProfileOutcome::Disabled
        };

        let changed = matches!(photo, PhotoOutcome::Created(_))
            || matches!(&profile, ProfileOutcome::Merged(m) if !m.is_empty());
        if changed {
            if let Err(e) = self.deps.people.save_person(&person).await {
                if let PhotoOutcome::Created(asset_id) = photo {
                    error!(person_id = %person.id, asset_id = %asset_id, "Person save failed, photo asset left unreferenced");
                }
                return Err(EnrichmentError::Storage(e));
            }
        }

        let report = CandidateReport {
            person_id: person.id,
            photo,
            profile,
            saved: changed,
        };
        if changed {
            info!(person_id = %person.id, photo = ?report.photo, profile = ?report.profile, "Person enriched");
        } else {
            debug!(person_id = %person.id, "Nothing found on Gravatar");
        }
        Ok(report)
    }
}
