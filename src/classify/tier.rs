//! Priority tier definitions for discovered links

use std::fmt;

/// Coarse relevancy classification attached to a discovered link
///
/// Variants are declared lowest first so the derived ordering gives
/// `High > Medium > Low > None`, which lets callers combine tiers with `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriorityTier {
    /// No usable context and no keyword match
    None,

    /// Has context but matches no keyword
    Low,

    /// Matches a medium-priority keyword
    Medium,

    /// Matches a high-priority keyword
    High,
}

impl PriorityTier {
    /// All tiers, highest first
    pub const ALL: [PriorityTier; 4] = [Self::High, Self::Medium, Self::Low, Self::None];

    /// Converts the tier to its database representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::None => "NONE",
        }
    }

    /// Parses a tier from its database representation (case-insensitive)
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }

    /// Maps a 0..1 relevancy score onto a tier
    ///
    /// Thresholds: `>= 0.7` is High, `>= 0.3` is Medium, anything above zero
    /// is Low, and zero or less is None.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            Self::High
        } else if score >= 0.3 {
            Self::Medium
        } else if score > 0.0 {
            Self::Low
        } else {
            Self::None
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

impl std::str::FromStr for PriorityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_string(s).ok_or_else(|| {
            format!(
                "unknown priority tier '{}' (expected HIGH, MEDIUM, LOW or NONE)",
                s
            )
        })
    }
}

/// Per-tier link counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub none: u64,
}

impl TierCounts {
    /// Increments the counter for `tier`
    pub fn record(&mut self, tier: PriorityTier) {
        match tier {
            PriorityTier::High => self.high += 1,
            PriorityTier::Medium => self.medium += 1,
            PriorityTier::Low => self.low += 1,
            PriorityTier::None => self.none += 1,
        }
    }

    /// Returns the counter for `tier`
    pub fn get(&self, tier: PriorityTier) -> u64 {
        match tier {
            PriorityTier::High => self.high,
            PriorityTier::Medium => self.medium,
            PriorityTier::Low => self.low,
            PriorityTier::None => self.none,
        }
    }

    /// Sum over all tiers
    pub fn total(&self) -> u64 {
        self.high + self.medium + self.low + self.none
    }
}
