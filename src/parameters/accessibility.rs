//! Pool accessibility states and the keys built from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Whether a pool can be reached by microbes and enzymes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Accessibility {
    Accessible,
    InaccessibleAggregation,
    InaccessibleMineralAssociation,
    InaccessibleEmbedment,
}

impl Accessibility {
    pub const ALL: [Accessibility; 4] = [
        Accessibility::Accessible,
        Accessibility::InaccessibleAggregation,
        Accessibility::InaccessibleMineralAssociation,
        Accessibility::InaccessibleEmbedment,
    ];

    pub fn is_accessible(self) -> bool {
        self == Accessibility::Accessible
    }

    /// Setup-file key, e.g. `INACCESSIBLE_AGGREGATION`.
    pub fn key(self) -> &'static str {
        match self {
            Accessibility::Accessible => "ACCESSIBLE",
            Accessibility::InaccessibleAggregation => "INACCESSIBLE_AGGREGATION",
            Accessibility::InaccessibleMineralAssociation => "INACCESSIBLE_MINERAL_ASSOCIATION",
            Accessibility::InaccessibleEmbedment => "INACCESSIBLE_EMBEDMENT",
        }
    }

    /// Lower-case label used in output file names.
    pub fn status(self) -> &'static str {
        match self {
            Accessibility::Accessible => "accessible",
            Accessibility::InaccessibleAggregation => "inaccessible_aggregation",
            Accessibility::InaccessibleMineralAssociation => "inaccessible_mineral_association",
            Accessibility::InaccessibleEmbedment => "inaccessible_embedment",
        }
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Accessibility {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, SimError> {
        Accessibility::ALL
            .into_iter()
            .find(|a| a.key() == s)
            .ok_or_else(|| {
                SimError::Setup(format!(
                    "unknown accessibility {}, expected one of ACCESSIBLE, INACCESSIBLE_AGGREGATION, \
                     INACCESSIBLE_MINERAL_ASSOCIATION, INACCESSIBLE_EMBEDMENT",
                    s
                ))
            })
    }
}

/// Identifies one pool: a class and an accessibility.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolKey {
    pub class: String,
    pub accessibility: Accessibility,
}

impl PoolKey {
    pub fn new(class: impl Into<String>, accessibility: Accessibility) -> Self {
        Self {
            class: class.into(),
            accessibility,
        }
    }

    /// `<class>-<status>`, used in observation file names.
    pub fn label(&self) -> String {
        format!("{}-{}", self.class, self.accessibility.status())
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.class, self.accessibility)
    }
}

/// Identifies one pool transfer: class, origin and arrival.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransferKey {
    pub class: String,
    pub origin: Accessibility,
    pub arrival: Accessibility,
}

impl TransferKey {
    pub fn new(class: impl Into<String>, origin: Accessibility, arrival: Accessibility) -> Self {
        Self {
            class: class.into(),
            origin,
            arrival,
        }
    }

    pub fn origin_pool(&self) -> PoolKey {
        PoolKey::new(self.class.clone(), self.origin)
    }

    pub fn arrival_pool(&self) -> PoolKey {
        PoolKey::new(self.class.clone(), self.arrival)
    }

    /// `<class>-<origin>_to_<arrival>`, used in observation file names.
    pub fn label(&self) -> String {
        format!(
            "{}-{}_to_{}",
            self.class,
            self.origin.status(),
            self.arrival.status()
        )
    }
}

impl fmt::Display for TransferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.class, self.origin, self.arrival)
    }
}
