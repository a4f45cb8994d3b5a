//! Psychographic archetype table
//!
//! Archetypes are plain data. Every agent runs the same transition code; only
//! the trait values it was created with differ.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Absolute tolerance on the sum of distribution shares
pub const DISTRIBUTION_TOLERANCE: f64 = 0.001;

/// Named population segment
///
/// Declaration order is the fixed iteration order used for agent ids,
/// tie-breaks and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeKind {
    Immune,
    Superspreader,
    Moderate,
    CriticalThinker,
    CynicalContrarian,
}

impl ArchetypeKind {
    pub const ALL: [ArchetypeKind; 5] = [
        ArchetypeKind::Immune,
        ArchetypeKind::Superspreader,
        ArchetypeKind::Moderate,
        ArchetypeKind::CriticalThinker,
        ArchetypeKind::CynicalContrarian,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Immune => "immune",
            Self::Superspreader => "superspreader",
            Self::Moderate => "moderate",
            Self::CriticalThinker => "critical_thinker",
            Self::CynicalContrarian => "cynical_contrarian",
        }
    }

    /// Table entry for this archetype
    pub fn archetype(&self) -> &'static Archetype {
        &ARCHETYPES[*self as usize]
    }
}

impl fmt::Display for ArchetypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArchetypeKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SimError::UnknownArchetype(s.to_string()))
    }
}

/// The four psychographic traits, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    /// Need for cognition: depth of analytical processing
    pub nfc: f64,
    /// Trust in institutions and official corrections
    pub trust: f64,
    /// Confirmation bias: motivated reasoning
    pub cb: f64,
    /// How strongly the narrative maps onto the agent's identity
    pub ia: f64,
}

/// Fixed trait bundle plus its default population share
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archetype {
    pub kind: ArchetypeKind,
    pub traits: Traits,
    pub default_share: f64,
    pub description: &'static str,
    pub hex_color: &'static str,
}

pub const ARCHETYPES: [Archetype; 5] = [
    Archetype {
        kind: ArchetypeKind::Immune,
        traits: Traits {
            nfc: 0.85,
            trust: 0.80,
            cb: 0.20,
            ia: 0.30,
        },
        default_share: 0.20,
        description: "High analytical, high trust, low bias",
        hex_color: "#FFFFFF",
    },
    Archetype {
        kind: ArchetypeKind::Superspreader,
        traits: Traits {
            nfc: 0.15,
            trust: 0.20,
            cb: 0.85,
            ia: 0.90,
        },
        default_share: 0.15,
        description: "Low analytical, low trust, high bias",
        hex_color: "#FF4444",
    },
    Archetype {
        kind: ArchetypeKind::Moderate,
        traits: Traits {
            nfc: 0.50,
            trust: 0.50,
            cb: 0.50,
            ia: 0.50,
        },
        default_share: 0.50,
        description: "Balanced; moveable middle",
        hex_color: "#FFDD44",
    },
    Archetype {
        kind: ArchetypeKind::CriticalThinker,
        traits: Traits {
            nfc: 0.90,
            trust: 0.50,
            cb: 0.25,
            ia: 0.35,
        },
        default_share: 0.10,
        description: "Very high analytical, neutral trust",
        hex_color: "#4444FF",
    },
    Archetype {
        kind: ArchetypeKind::CynicalContrarian,
        traits: Traits {
            nfc: 0.60,
            trust: 0.15,
            cb: 0.70,
            ia: 0.75,
        },
        default_share: 0.05,
        description: "Moderate analytical, very low trust",
        hex_color: "#AA44FF",
    },
];

/// True when shares sum to 1.0 within `DISTRIBUTION_TOLERANCE`
pub fn validate_distribution<'a, I>(shares: I) -> bool
where
    I: IntoIterator<Item = &'a f64>,
{
    let total: f64 = shares.into_iter().sum();
    (total - 1.0).abs() < DISTRIBUTION_TOLERANCE
}

/// Validated archetype -> share mapping
///
/// Only archetypes named by the caller are present. Construction guarantees
/// every share lies in [0, 1] and the total passes `validate_distribution`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchetypeDistribution {
    shares: BTreeMap<ArchetypeKind, f64>,
}

impl ArchetypeDistribution {
    pub fn new(shares: BTreeMap<ArchetypeKind, f64>) -> Result<Self> {
        for (kind, &value) in &shares {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidShare {
                    archetype: kind.name().to_string(),
                    value,
                });
            }
        }

        if !validate_distribution(shares.values()) {
            return Err(SimError::InvalidDistribution {
                total: shares.values().sum(),
            });
        }

        Ok(Self { shares })
    }

    /// Build from archetype names, rejecting names not in the table
    pub fn from_names(shares: &BTreeMap<String, f64>) -> Result<Self> {
        let typed = shares
            .iter()
            .map(|(name, &share)| Ok((name.parse::<ArchetypeKind>()?, share)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Self::new(typed)
    }

    /// Distribution made of each archetype's default share
    pub fn defaults() -> Self {
        Self {
            shares: ARCHETYPES.iter().map(|a| (a.kind, a.default_share)).collect(),
        }
    }

    pub fn share(&self, kind: ArchetypeKind) -> Option<f64> {
        self.shares.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArchetypeKind, f64)> + '_ {
        self.shares.iter().map(|(&kind, &share)| (kind, share))
    }

    /// Map each archetype to an agent count summing exactly to `population`
    ///
    /// Counts start at floor(population × share). The residual goes to the
    /// archetype with the largest share; on ties the first in table order wins.
    pub fn allocate_counts(&self, population: usize) -> BTreeMap<ArchetypeKind, usize> {
        let mut counts: BTreeMap<ArchetypeKind, usize> = self
            .shares
            .iter()
            .map(|(&kind, &share)| (kind, (population as f64 * share).floor() as usize))
            .collect();

        let largest = self
            .shares
            .iter()
            .fold(None::<(ArchetypeKind, f64)>, |best, (&kind, &share)| match best {
                Some((_, best_share)) if best_share >= share => best,
                _ => Some((kind, share)),
            })
            .map(|(kind, _)| kind);

        let total: usize = counts.values().sum();
        if let Some(count) = largest.and_then(|kind| counts.get_mut(&kind)) {
            if total < population {
                *count += population - total;
            } else {
                *count = count.saturating_sub(total - population);
            }
        }

        counts
    }
}
