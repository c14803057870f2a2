use chrono::{DateTime, Utc};

use crate::error::FailureKind;
use crate::runner::{CandidateReport, PhotoOutcome, ProfileOutcome};

/// Stats from a batch enrichment run.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub candidates: u32,
    pub photos_found: u32,
    pub photos_not_found: u32,
    pub profiles_found: u32,
    pub profiles_not_found: u32,
    pub profile_errors: u32,
    pub records_updated: u32,
    pub names_filled: u32,
    pub social_links_filled: u32,
    pub skipped_input: u32,
    pub skipped_transient: u32,
    pub skipped_persistence: u32,
    pub cancelled: bool,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            candidates: 0,
            photos_found: 0,
            photos_not_found: 0,
            profiles_found: 0,
            profiles_not_found: 0,
            profile_errors: 0,
            records_updated: 0,
            names_filled: 0,
            social_links_filled: 0,
            skipped_input: 0,
            skipped_transient: 0,
            skipped_persistence: 0,
            cancelled: false,
        }
    }
}

impl RunStats {
    pub fn record(&mut self, report: &CandidateReport) {
        match report.photo {
            PhotoOutcome::Created(_) => self.photos_found += 1,
            PhotoOutcome::NotFound => self.photos_not_found += 1,
        }
        match &report.profile {
            ProfileOutcome::Disabled => {}
            ProfileOutcome::Merged(merge) => {
                self.profiles_found += 1;
                self.names_filled += merge.first_name as u32 + merge.last_name as u32;
                self.social_links_filled += merge.social.len() as u32;
            }
            ProfileOutcome::NotFound => self.profiles_not_found += 1,
            ProfileOutcome::Failed(_) => self.profile_errors += 1,
        }
        if report.saved {
            self.records_updated += 1;
        }
    }

    pub fn record_skip(&mut self, kind: FailureKind) {
        match kind {
            FailureKind::Input => self.skipped_input += 1,
            FailureKind::Transient => self.skipped_transient += 1,
            FailureKind::Persistence | FailureKind::Fatal => self.skipped_persistence += 1,
        }
    }

    pub fn skipped(&self) -> u32 {
        self.skipped_input + self.skipped_transient + self.skipped_persistence
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Enrichment Run Complete ===")?;
        writeln!(f, "Candidates:         {}", self.candidates)?;
        writeln!(f, "Photos found:       {}", self.photos_found)?;
        writeln!(f, "Photos not found:   {}", self.photos_not_found)?;
        writeln!(f, "Profiles found:     {}", self.profiles_found)?;
        writeln!(f, "Profiles not found: {}", self.profiles_not_found)?;
        writeln!(f, "Records updated:    {}", self.records_updated)?;
        writeln!(f, "  Names filled:     {}", self.names_filled)?;
        writeln!(f, "  Social links:     {}", self.social_links_filled)?;
        if self.skipped() > 0 || self.profile_errors > 0 {
            writeln!(f, "\nSkipped:")?;
            writeln!(f, "  Input:       {}", self.skipped_input)?;
            writeln!(f, "  Transient:   {}", self.skipped_transient)?;
            writeln!(f, "  Persistence: {}", self.skipped_persistence)?;
            writeln!(f, "  Profile errors (photo kept): {}", self.profile_errors)?;
        }
        if let Some(finished) = self.finished_at {
            let elapsed = finished - self.started_at;
            writeln!(f, "\nElapsed: {}ms", elapsed.num_milliseconds())?;
        }
        if self.cancelled {
            writeln!(f, "Run was cancelled before all candidates were processed")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::MergeOutcome;
    use crate::types::{AssetId, PersonId, SocialNetwork};
    use uuid::Uuid;

    fn enriched_report() -> CandidateReport {
        CandidateReport {
            person_id: PersonId(Uuid::nil()),
            photo: PhotoOutcome::Created(AssetId(Uuid::nil())),
            profile: ProfileOutcome::Merged(MergeOutcome {
                first_name: true,
                last_name: false,
                social: vec![SocialNetwork::Twitter],
            }),
            saved: true,
        }
    }

    #[test]
    fn reports_and_skips_are_counted() {
        let mut stats = RunStats::default();
        stats.record(&enriched_report());
        stats.record_skip(FailureKind::Input);
        stats.record_skip(FailureKind::Transient);

        assert_eq!(stats.photos_found, 1);
        assert_eq!(stats.profiles_found, 1);
        assert_eq!(stats.names_filled, 1);
        assert_eq!(stats.social_links_filled, 1);
        assert_eq!(stats.records_updated, 1);
        assert_eq!(stats.skipped(), 2);
    }

    #[test]
    fn summary_lists_counters_and_skips() {
        let mut stats = RunStats::default();
        stats.candidates = 2;
        stats.record(&enriched_report());
        stats.record_skip(FailureKind::Persistence);
        stats.cancelled = true;

        let summary = stats.to_string();
        assert!(summary.contains("Candidates:         2"), "{summary}");
        assert!(summary.contains("Photos found:       1"), "{summary}");
        assert!(summary.contains("Persistence: 1"), "{summary}");
        assert!(summary.contains("cancelled"), "{summary}");
    }

    #[test]
    fn clean_run_summary_has_no_skip_section() {
        let summary = RunStats::default().to_string();
        assert!(!summary.contains("Skipped:"), "{summary}");
    }
}
