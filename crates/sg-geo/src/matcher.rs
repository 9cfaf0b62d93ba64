//! Nearest-reference matching
//!
//! Every valid subject is compared against every reference (O(S x R)).
//! References are sorted by id once at construction; together with the
//! two-pass tie-break in [`GeoMatcher::closest`] this makes the result
//! independent of the order references arrive in.

use crate::error::{GeoError, GeoResult};
use crate::haversine::haversine_km;
use crate::location::{check_coordinates, MatchResult, ReferenceLocation, SkipReason, SubjectLocation};
use serde::{Deserialize, Serialize};
use sg_core::GeoConfig;
use std::collections::BTreeMap;
use std::thread;

/// Default tie window in kilometres
pub const DEFAULT_TIE_EPSILON_KM: f64 = 1e-6;

/// Tunables for a matcher. The sphere radius is not one of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub tie_epsilon_km: f64,
    pub workers: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            tie_epsilon_km: DEFAULT_TIE_EPSILON_KM,
            workers: 1,
        }
    }
}

impl From<&GeoConfig> for MatchOptions {
    fn from(config: &GeoConfig) -> Self {
        Self {
            tie_epsilon_km: config.tie_epsilon_km,
            workers: config.workers,
        }
    }
}

impl MatchOptions {
    fn validate(&self) -> GeoResult<()> {
        if !self.tie_epsilon_km.is_finite() || self.tie_epsilon_km < 0.0 {
            return Err(GeoError::InvalidOptions {
                message: format!(
                    "tie epsilon must be non-negative, got {}",
                    self.tie_epsilon_km
                ),
            });
        }
        if self.workers == 0 {
            return Err(GeoError::InvalidOptions {
                message: "workers must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Result of a matching pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// One match per valid subject, in subject order
    pub matches: Vec<MatchResult>,
    /// Subjects that produced no match
    pub skipped_count: usize,
    /// `skipped_count` broken down by reason
    pub skipped_by_reason: BTreeMap<SkipReason, usize>,
}

impl MatchOutcome {
    fn record(&mut self, outcome: Result<MatchResult, SkipReason>) {
        match outcome {
            Ok(m) => self.matches.push(m),
            Err(reason) => {
                self.skipped_count += 1;
                *self.skipped_by_reason.entry(reason).or_insert(0) += 1;
            }
        }
    }
}

/// Matches subjects to their nearest reference location
#[derive(Debug, Clone)]
pub struct GeoMatcher {
    references: Vec<ReferenceLocation>,
    options: MatchOptions,
}

impl GeoMatcher {
    /// Build a matcher with default options
    pub fn new(references: Vec<ReferenceLocation>) -> GeoResult<Self> {
        Self::with_options(references, MatchOptions::default())
    }

    /// Build a matcher, rejecting an empty or unusable reference set
    pub fn with_options(
        mut references: Vec<ReferenceLocation>,
        options: MatchOptions,
    ) -> GeoResult<Self> {
        options.validate()?;
        if references.is_empty() {
            return Err(GeoError::EmptyReferenceSet);
        }

        for reference in &references {
            if reference.id.trim().is_empty() {
                return Err(GeoError::InvalidReference {
                    id: reference.id.clone(),
                    reason: "empty id".to_string(),
                });
            }
            if let Err(reason) =
                check_coordinates(Some(reference.latitude), Some(reference.longitude))
            {
                return Err(GeoError::InvalidReference {
                    id: reference.id.clone(),
                    reason: format!(
                        "{} ({}, {})",
                        reason, reference.latitude, reference.longitude
                    ),
                });
            }
        }

        references.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(pair) = references.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(GeoError::DuplicateReference {
                id: pair[0].id.clone(),
            });
        }

        log::debug!("Geo matcher ready with {} references", references.len());
        Ok(Self {
            references,
            options,
        })
    }

    /// Scan subjects on `workers` threads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.options.workers = workers.max(1);
        self
    }

    /// References, sorted by id
    pub fn references(&self) -> &[ReferenceLocation] {
        &self.references
    }

    /// Options in effect
    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Find the nearest reference for every subject.
    ///
    /// Subjects without a usable id or coordinates are counted as skipped.
    /// Output is identical for any worker count.
    pub fn nearest(&self, subjects: &[SubjectLocation]) -> MatchOutcome {
        let workers = self.options.workers.min(subjects.len()).max(1);
        let mut outcome = MatchOutcome::default();

        if workers == 1 {
            for subject in subjects {
                outcome.record(self.match_one(subject));
            }
        } else {
            let chunk_size = subjects.len().div_ceil(workers);
            let chunks: Vec<Vec<Result<MatchResult, SkipReason>>> = thread::scope(|scope| {
                let handles: Vec<_> = subjects
                    .chunks(chunk_size)
                    .map(|chunk| {
                        scope.spawn(move || chunk.iter().map(|s| self.match_one(s)).collect())
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                    .collect()
            });
            for result in chunks.into_iter().flatten() {
                outcome.record(result);
            }
        }

        if outcome.skipped_count > 0 {
            log::warn!(
                "Skipped {} of {} subjects: {:?}",
                outcome.skipped_count,
                subjects.len(),
                outcome.skipped_by_reason
            );
        }
        log::info!(
            "Matched {} of {} subjects against {} references",
            outcome.matches.len(),
            subjects.len(),
            self.references.len()
        );
        outcome
    }

    fn match_one(&self, subject: &SubjectLocation) -> Result<MatchResult, SkipReason> {
        let subject_id = subject
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(SkipReason::MissingId)?;
        let (lat, lon) = check_coordinates(subject.latitude, subject.longitude)?;

        let (reference, distance_km) = self.closest(lat, lon);
        Ok(MatchResult {
            subject_id: subject_id.to_string(),
            nearest_reference_id: reference.id.clone(),
            distance_km,
        })
    }

    /// Nearest reference to a point. The minimum distance is found first;
    /// the winner is then the smallest id within epsilon of it.
    fn closest(&self, lat: f64, lon: f64) -> (&ReferenceLocation, f64) {
        let distances: Vec<f64> = self
            .references
            .iter()
            .map(|r| haversine_km(lat, lon, r.latitude, r.longitude))
            .collect();

        let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let limit = min + self.options.tie_epsilon_km;

        // References are sorted by id, so the first hit is the smallest id
        let winner = distances.iter().position(|&d| d <= limit).unwrap_or(0);
        (&self.references[winner], distances[winner])
    }
}

/// Match subjects against a reference set with default options
pub fn nearest(
    subjects: &[SubjectLocation],
    references: &[ReferenceLocation],
) -> GeoResult<MatchOutcome> {
    let matcher = GeoMatcher::new(references.to_vec())?;
    Ok(matcher.nearest(subjects))
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
