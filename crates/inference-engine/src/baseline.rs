//! Personal Heart-Rate Baselines

use crate::{BaselineProfileSource, InferenceError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Fitted heart-rate statistics for one subject
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineProfile {
    /// Mean heart rate (bpm)
    pub mean: f64,
    /// Standard deviation of heart rate (bpm)
    pub std: f64,
}

impl BaselineProfile {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }
}

/// Baseline profiles keyed by subject id, loaded from a JSON artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStore {
    /// Subject used when a reading does not name one
    pub default_subject: String,
    /// Profiles by subject id
    pub profiles: HashMap<String, BaselineProfile>,
}

impl ProfileStore {
    /// Parse a store from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, InferenceError> {
        let store: Self = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(format!("baseline profiles: {}", e)))?;

        if !store.profiles.contains_key(&store.default_subject) {
            return Err(InferenceError::ModelLoadError(format!(
                "baseline profiles: default subject {} has no profile",
                store.default_subject
            )));
        }

        // Degenerate profiles stay loadable; the baseline check rejects them
        // per request so one bad subject does not take the service down.
        for (subject, profile) in &store.profiles {
            if !(profile.std > 0.0) {
                warn!(subject = %subject, std = profile.std, "Baseline profile has non-positive std");
            }
        }

        Ok(store)
    }

    /// Load a store from a JSON file
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;
        let store = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            subjects = store.profiles.len(),
            default_subject = %store.default_subject,
            "Baseline profiles loaded"
        );
        Ok(store)
    }

    /// Store holding a single default profile
    pub fn single(subject: impl Into<String>, profile: BaselineProfile) -> Self {
        let subject = subject.into();
        let mut profiles = HashMap::new();
        profiles.insert(subject.clone(), profile);
        Self {
            default_subject: subject,
            profiles,
        }
    }
}

impl BaselineProfileSource for ProfileStore {
    fn profile(&self, subject_id: Option<&str>) -> Result<BaselineProfile, InferenceError> {
        let subject = subject_id.unwrap_or(&self.default_subject);
        self.profiles
            .get(subject)
            .copied()
            .ok_or_else(|| InferenceError::UnknownSubject(subject.to_string()))
    }

    fn kind(&self) -> &'static str {
        "profile-store"
    }
}
