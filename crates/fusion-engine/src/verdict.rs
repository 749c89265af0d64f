//! Verdicts and the fusion decision table

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall health status, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FusionVerdict {
    Stable,
    Warning,
    Critical,
}

impl FusionVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            FusionVerdict::Stable => "STABLE",
            FusionVerdict::Warning => "WARNING",
            FusionVerdict::Critical => "CRITICAL",
        }
    }

    /// Human-readable guidance shown next to the verdict
    pub fn advice(&self) -> &'static str {
        match self {
            FusionVerdict::Stable => "Vital signs within expected range",
            FusionVerdict::Warning => "Monitor closely",
            FusionVerdict::Critical => "Medical attention required",
        }
    }
}

impl fmt::Display for FusionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucketed deterioration risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Lower edge of MEDIUM, inclusive
    pub const MEDIUM_FROM: f64 = 33.0;
    /// Lower edge of HIGH, inclusive
    pub const HIGH_FROM: f64 = 66.0;

    /// Bucket a percentage in `[0, 100]`; edges belong to the upper tier
    pub fn from_percentage(critical_probability: f64) -> Self {
        if critical_probability < Self::MEDIUM_FROM {
            RiskTier::Low
        } else if critical_probability < Self::HIGH_FROM {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fuse the three signals. First matching rule wins.
///
/// HIGH risk alone is critical; the soft signals (anomaly, baseline) are
/// critical only together. Any single positive signal or MEDIUM risk warns.
pub fn fuse(baseline_elevated: bool, is_anomaly: bool, risk_tier: RiskTier) -> FusionVerdict {
    if risk_tier == RiskTier::High || (is_anomaly && baseline_elevated) {
        FusionVerdict::Critical
    } else if risk_tier == RiskTier::Medium || is_anomaly || baseline_elevated {
        FusionVerdict::Warning
    } else {
        FusionVerdict::Stable
    }
}
