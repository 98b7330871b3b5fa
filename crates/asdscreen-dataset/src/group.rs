use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three independently sourced age cohorts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Child,
    Adolescent,
    Adult,
}

impl AgeGroup {
    pub const ALL: [Self; 3] = [Self::Child, Self::Adolescent, Self::Adult];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Adolescent => "adolescent",
            Self::Adult => "adult",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
