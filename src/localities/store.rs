//! # Locality Store
//!
//! Locality list, ratings and community suggestions with a dual-mode
//! backend (see the ride store for the shared failure policy).
//!
//! Suggestions are inserted into the visible list immediately. When the
//! backend does not accept them on submit they join a queue persisted under
//! `localities.pending`, which is flushed one entry at a time after the next
//! successful `refresh()`.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::{
    suggestion_to_locality, Locality, LocalityAnalytics, LocalityFilters, LocalitySuggestion,
    PartialMetrics, SubmissionOutcome, SubmissionStatus, SuggestionInput,
};
use crate::backend::{LocalityBackend, Offline};
use crate::config::StoreConfig;
use crate::connection::{Connection, ConnectionState};
use crate::error::{CommunityError, Result};
use crate::fixtures;
use crate::storage::{load_json, save_json, KeyValueStore, LOCALITIES_KEY, PENDING_SUGGESTIONS_KEY};

const MIN_RATING: f64 = 0.0;
const MAX_RATING: f64 = 5.0;

/// Locality registry with rating and suggestion support.
pub struct LocalityStore<B: LocalityBackend, S: KeyValueStore> {
    backend: B,
    storage: S,
    localities: Vec<Locality>,
    pending: Vec<LocalitySuggestion>,
    filters: LocalityFilters,
    connection: Connection,
}

impl<S: KeyValueStore> LocalityStore<Offline, S> {
    /// A store that never talks to a backend.
    pub fn offline(storage: S) -> Self {
        Self::new(Offline, storage, StoreConfig::default())
    }
}

#[cfg(feature = "http")]
impl<S: KeyValueStore> LocalityStore<Option<crate::backend::HttpBackend>, S> {
    /// Build from config: an HTTP backend when a base URL is set, otherwise
    /// permanent simulation mode.
    pub fn connect(config: StoreConfig, storage: S) -> Self {
        let backend = match crate::backend::HttpBackend::new(&config) {
            Ok(backend) => Some(backend),
            Err(e) => {
                info!("[LocalityStore] No HTTP backend ({}), using device storage", e);
                None
            }
        };
        Self::new(backend, storage, config)
    }
}

impl<B: LocalityBackend, S: KeyValueStore> LocalityStore<B, S> {
    /// Create a store from device storage (or seed data). Call
    /// [`LocalityStore::refresh`] to pull from the backend.
    pub fn new(backend: B, storage: S, config: StoreConfig) -> Self {
        let connection = Connection::new("LocalityStore", config.backend_configured());
        let pending: Vec<LocalitySuggestion> =
            load_json(&storage, PENDING_SUGGESTIONS_KEY).unwrap_or_default();
        let mut store = Self {
            backend,
            storage,
            localities: Vec::new(),
            pending,
            filters: LocalityFilters::default(),
            connection,
        };
        store.localities = store.load_local();
        store.merge_pending();
        store
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn localities(&self) -> &[Locality] {
        &self.localities
    }

    pub fn locality(&self, id: &str) -> Option<&Locality> {
        self.localities.iter().find(|l| l.id == id)
    }

    /// All localities, best score first.
    pub fn ranked(&self) -> Vec<&Locality> {
        let mut ranked: Vec<&Locality> = self.localities.iter().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// Suggestions still waiting for the backend.
    pub fn pending_submissions(&self) -> &[LocalitySuggestion] {
        &self.pending
    }

    pub fn filters(&self) -> &LocalityFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: LocalityFilters) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters = LocalityFilters::default();
    }

    /// Localities matching the current filters, in list order.
    pub fn filtered_localities(&self) -> Vec<&Locality> {
        self.filters.apply(&self.localities)
    }

    pub fn analytics(&self) -> LocalityAnalytics {
        LocalityAnalytics::compute(&self.localities)
    }

    pub fn connection_state(&self) -> &ConnectionState {
        self.connection.state()
    }

    pub fn is_backend_active(&self) -> bool {
        self.connection.state().is_backend()
    }

    pub fn advisory(&self) -> Option<&str> {
        self.connection.advisory()
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Pull localities from the backend and flush queued suggestions, or
    /// fall back to device storage.
    pub async fn refresh(&mut self) {
        if self.connection.should_try_refresh() {
            match self.backend.fetch_localities().await {
                Ok(localities) => {
                    info!(
                        "[LocalityStore] Loaded {} localities from backend",
                        localities.len()
                    );
                    self.localities = localities;
                    self.connection.mark_reachable();
                    self.flush_pending().await;
                    self.merge_pending();
                    self.persist();
                    return;
                }
                Err(e) => self.connection.downgrade("refresh", &e),
            }
        }
        self.localities = self.load_local();
        self.merge_pending();
    }

    /// Submit queued suggestions one at a time. Failures stay queued.
    async fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let queued = std::mem::take(&mut self.pending);
        let total = queued.len();
        let mut remaining = Vec::new();

        for suggestion in queued {
            match self.backend.submit_suggestion(&suggestion).await {
                Ok(created) => {
                    debug!("[LocalityStore] Synced suggestion {}", suggestion.id);
                    self.adopt_synced(&suggestion.id, created);
                }
                Err(e) => {
                    warn!(
                        "[LocalityStore] Suggestion {} still not synced: {}",
                        suggestion.id, e
                    );
                    remaining.push(suggestion);
                }
            }
        }

        info!(
            "[LocalityStore] Flushed {}/{} queued suggestions",
            total - remaining.len(),
            total
        );
        self.pending = remaining;
        save_json(&self.storage, PENDING_SUGGESTIONS_KEY, &self.pending);
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Blend a rating in `[0, 5]` into a locality. `Ok(None)` when the id is
    /// unknown.
    pub async fn rate_locality(&mut self, id: &str, rating: f64) -> Result<Option<Locality>> {
        if !rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(CommunityError::invalid_input(format!(
                "rating {} outside {}..={}",
                rating, MIN_RATING, MAX_RATING
            )));
        }
        let Some(idx) = self.index_of(id) else {
            return Ok(None);
        };

        // Queued suggestions do not exist on the backend yet
        let known_remotely =
            self.localities[idx].submission_status != Some(SubmissionStatus::Pending);

        if known_remotely && self.connection.should_try_backend() {
            match self.backend.rate_locality(id, rating).await {
                Ok(mut updated) => {
                    updated.normalize_score();
                    self.localities[idx] = updated.clone();
                    self.persist();
                    return Ok(Some(updated));
                }
                Err(e) => self.connection.downgrade("rate locality", &e),
            }
        }

        let locality = &mut self.localities[idx];
        locality.apply_rating(rating);
        debug!(
            "[LocalityStore] Rated {} at {}, score now {}",
            id, rating, locality.score
        );
        let updated = locality.clone();

        // Merges and the next flush read the queued copy
        if !known_remotely {
            if let Some(queued) = self.pending.iter_mut().find(|s| s.id == id) {
                queued.metrics.liveability = Some(updated.metrics.liveability);
                save_json(&self.storage, PENDING_SUGGESTIONS_KEY, &self.pending);
            }
        }

        self.persist();
        Ok(Some(updated))
    }

    /// Propose a new locality. It is visible immediately; the outcome says
    /// whether the backend already has it.
    pub async fn submit_suggestion(&mut self, input: SuggestionInput) -> Result<SubmissionOutcome> {
        if input.name_en.trim().is_empty() {
            return Err(CommunityError::invalid_input("locality name is required"));
        }
        validate_partial_metrics(&input.metrics)?;

        let now = Utc::now();
        let suggestion = LocalitySuggestion::from_input(self.next_suggestion_id(now), input, now);

        if self.connection.should_try_backend() {
            match self.backend.submit_suggestion(&suggestion).await {
                Ok(created) => {
                    info!("[LocalityStore] Suggestion {} accepted", suggestion.id);
                    let locality = self.adopt_synced(&suggestion.id, created);
                    self.persist();
                    return Ok(SubmissionOutcome::Synced(locality));
                }
                Err(e) => self.connection.downgrade("submit suggestion", &e),
            }
        }

        info!("[LocalityStore] Suggestion {} queued", suggestion.id);
        let locality = suggestion_to_locality(&suggestion);
        self.upsert(locality.clone());
        self.pending.push(suggestion);
        save_json(&self.storage, PENDING_SUGGESTIONS_KEY, &self.pending);
        self.persist();
        Ok(SubmissionOutcome::Queued(locality))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn index_of(&self, id: &str) -> Option<usize> {
        self.localities.iter().position(|l| l.id == id)
    }

    fn upsert(&mut self, locality: Locality) {
        match self.index_of(&locality.id) {
            Some(idx) => self.localities[idx] = locality,
            None => self.localities.push(locality),
        }
    }

    /// Replace the local entry for `local_id` with the backend's record.
    fn adopt_synced(&mut self, local_id: &str, mut created: Locality) -> Locality {
        created.normalize_score();
        created.is_community_submission = true;
        created.submission_status = Some(SubmissionStatus::Synced);
        if created.id != local_id {
            self.localities.retain(|l| l.id != local_id);
        }
        self.upsert(created.clone());
        created
    }

    /// Make every queued suggestion visible in the list.
    fn merge_pending(&mut self) {
        for suggestion in &self.pending {
            if !self.localities.iter().any(|l| l.id == suggestion.id) {
                self.localities.push(suggestion_to_locality(suggestion));
            }
        }
    }

    /// `suggestion_<millis>`, bumped while taken.
    fn next_suggestion_id(&self, now: DateTime<Utc>) -> String {
        let mut millis = now.timestamp_millis();
        loop {
            let id = format!("suggestion_{}", millis);
            let taken = self.index_of(&id).is_some() || self.pending.iter().any(|s| s.id == id);
            if !taken {
                return id;
            }
            millis += 1;
        }
    }

    /// Device snapshot, or seed localities.
    fn load_local(&self) -> Vec<Locality> {
        match load_json::<Vec<Locality>, _>(&self.storage, LOCALITIES_KEY) {
            Some(mut localities) => {
                // Scores are derived, never trusted from storage
                for locality in &mut localities {
                    locality.normalize_score();
                }
                debug!(
                    "[LocalityStore] Loaded {} localities from device storage",
                    localities.len()
                );
                localities
            }
            None => fixtures::seed_localities(),
        }
    }

    fn persist(&self) {
        save_json(&self.storage, LOCALITIES_KEY, &self.localities);
    }
}

fn validate_partial_metrics(metrics: &PartialMetrics) -> Result<()> {
    let values = [
        metrics.liveability,
        metrics.connectivity,
        metrics.food_culture,
        metrics.affordability,
        metrics.buzz,
    ];
    for value in values.into_iter().flatten() {
        if !value.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(CommunityError::invalid_input(format!(
                "metric {} outside {}..={}",
                value, MIN_RATING, MAX_RATING
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localities::compute_score;
    use crate::storage::MemoryStorage;

    fn suggestion(name: &str) -> SuggestionInput {
        SuggestionInput {
            name_en: name.to_string(),
            name_ta: "புதிய".to_string(),
            area: "North Chennai".to_string(),
            pincode: Some("600099".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_seeded_on_first_run() {
        let store = LocalityStore::offline(MemoryStorage::new());
        assert!(!store.localities().is_empty());
        assert!(store.locality("mylapore").is_some());
        assert!(store.pending_submissions().is_empty());
    }

    #[tokio::test]
    async fn test_rate_unknown_locality() {
        let mut store = LocalityStore::offline(MemoryStorage::new());
        assert_eq!(store.rate_locality("atlantis", 4.0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rate_rejects_out_of_range() {
        let mut store = LocalityStore::offline(MemoryStorage::new());
        assert!(store.rate_locality("mylapore", 5.5).await.is_err());
        assert!(store.rate_locality("mylapore", -1.0).await.is_err());
        assert!(store.rate_locality("mylapore", f64::NAN).await.is_err());
    }

    #[tokio::test]
    async fn test_rate_blends_liveability() {
        let mut store = LocalityStore::offline(MemoryStorage::new());
        let before = store.locality("adyar").unwrap().clone();
        let after = store.rate_locality("adyar", 2.0).await.unwrap().unwrap();

        assert_eq!(after.metrics.liveability, (before.metrics.liveability + 2.0) / 2.0);
        assert_eq!(after.metrics.connectivity, before.metrics.connectivity);
        assert_eq!(after.score, compute_score(&after.metrics));
    }

    #[tokio::test]
    async fn test_rating_survives_restart() {
        let storage = MemoryStorage::new();
        let mut store = LocalityStore::offline(storage.clone());
        let rated = store.rate_locality("velachery", 5.0).await.unwrap().unwrap();

        let reopened = LocalityStore::offline(storage);
        assert_eq!(reopened.locality("velachery"), Some(&rated));
    }

    #[tokio::test]
    async fn test_offline_suggestion_is_queued_and_visible() {
        let mut store = LocalityStore::offline(MemoryStorage::new());
        let outcome = store.submit_suggestion(suggestion("Kolathur")).await.unwrap();

        assert!(!outcome.is_synced());
        let locality = outcome.locality();
        assert!(locality.is_community_submission);
        assert_eq!(locality.submission_status, Some(SubmissionStatus::Pending));
        assert_eq!(locality.score, 3.0);
        assert_eq!(store.pending_submissions().len(), 1);
        assert!(store.locality(&locality.id).is_some());
    }

    #[tokio::test]
    async fn test_suggestion_requires_name() {
        let mut store = LocalityStore::offline(MemoryStorage::new());
        assert!(store.submit_suggestion(suggestion("  ")).await.is_err());

        let mut bad = suggestion("Kolathur");
        bad.metrics.buzz = Some(7.0);
        assert!(store.submit_suggestion(bad).await.is_err());
        assert!(store.pending_submissions().is_empty());
    }

    #[tokio::test]
    async fn test_queue_survives_restart() {
        let storage = MemoryStorage::new();
        let mut store = LocalityStore::offline(storage.clone());
        let outcome = store.submit_suggestion(suggestion("Perambur")).await.unwrap();

        let mut reopened = LocalityStore::offline(storage);
        reopened.refresh().await;
        assert_eq!(reopened.pending_submissions().len(), 1);
        assert!(reopened.locality(&outcome.locality().id).is_some());
    }

    #[tokio::test]
    async fn test_filters_and_analytics() {
        let mut store = LocalityStore::offline(MemoryStorage::new());
        store.set_filters(LocalityFilters {
            pincode: Some("6000".to_string()),
            ..Default::default()
        });
        let hits: Vec<&str> = store.filtered_localities().iter().map(|l| l.id.as_str()).collect();
        assert!(hits.contains(&"t-nagar"));
        assert!(hits.contains(&"velachery"));

        store.set_filters(LocalityFilters {
            min_score: Some(4.5),
            ..Default::default()
        });
        assert!(store.filtered_localities().iter().all(|l| l.score >= 4.5));

        store.clear_filters();
        assert_eq!(store.filtered_localities().len(), store.localities().len());

        let stats = store.analytics();
        assert_eq!(stats.count, store.localities().len());
        assert_eq!(stats.top_localities.len(), 3);
        assert_eq!(stats.top_localities[0].id, store.ranked()[0].id);
    }

    #[test]
    fn test_ranked_agrees_with_analytics() {
        let storage = MemoryStorage::new();
        let mut tied = crate::fixtures::seed_localities();
        for locality in &mut tied {
            locality.set_metrics(crate::localities::Metrics::new(4.0, 4.0, 4.0, 4.0, 4.0));
        }
        save_json(&storage, LOCALITIES_KEY, &tied);
        let store = LocalityStore::offline(storage);

        let ranked: Vec<&str> = store.ranked().iter().take(3).map(|l| l.id.as_str()).collect();
        let stats = store.analytics();
        let top: Vec<&str> = stats.top_localities.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ranked, top);
    }

    #[test]
    fn test_stored_score_is_rederived() {
        let storage = MemoryStorage::new();
        let mut stale = crate::fixtures::seed_localities();
        stale[0].score = 0.1;
        save_json(&storage, LOCALITIES_KEY, &stale);

        let store = LocalityStore::offline(storage);
        let loaded = store.locality(&stale[0].id).unwrap();
        assert_eq!(loaded.score, compute_score(&loaded.metrics));
    }

    #[tokio::test]
    async fn test_rating_queued_suggestion_updates_queue() {
        let storage = MemoryStorage::new();
        let mut store = LocalityStore::offline(storage.clone());
        let mut input = suggestion("Ennore");
        input.metrics.liveability = Some(3.5);
        let id = store.submit_suggestion(input).await.unwrap().locality().id.clone();

        let rated = store.rate_locality(&id, 5.0).await.unwrap().unwrap();
        assert_eq!(rated.metrics.liveability, 4.25);
        assert_eq!(store.pending_submissions()[0].metrics.liveability, Some(4.25));

        let queued: Vec<LocalitySuggestion> =
            load_json(&storage, PENDING_SUGGESTIONS_KEY).unwrap();
        assert_eq!(queued[0].metrics.liveability, Some(4.25));

        // Rebuilt from the queue on restart
        let mut reopened = LocalityStore::offline(storage);
        reopened.refresh().await;
        assert_eq!(reopened.locality(&id).unwrap().metrics.liveability, 4.25);
    }
}
