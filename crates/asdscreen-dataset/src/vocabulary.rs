//! Canonical category vocabularies and the tables that map raw labels onto them.
//!
//! Raw sources spell the same category differently (`m` / `Male`,
//! `Self` / `self`, `Middle Eastern ` with a trailing space). Each group's
//! [`GroupEncoding`](crate::encoding::GroupEncoding) carries explicit
//! [`Vocabulary`] tables; nothing is inferred at runtime. Lookups trim
//! whitespace and ignore ASCII case.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lookup table from raw labels to canonical values.
///
/// # Examples
///
/// ```
/// use asdscreen_dataset::vocabulary::{Gender, Vocabulary};
///
/// let vocab = Vocabulary::new([("m", Gender::Male), ("f", Gender::Female)]);
/// assert_eq!(vocab.lookup(" M "), Some(Gender::Male));
/// assert_eq!(vocab.lookup("x"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary<T> {
    entries: BTreeMap<String, T>,
}

fn normalize_label(label: &str) -> String {
    label.trim().to_ascii_lowercase()
}

impl<T> Vocabulary<T> {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(label, value)| (normalize_label(label.as_ref()), value))
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<T>
    where
        T: Copy,
    {
        self.entries.get(&normalize_label(label)).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }
}

impl Vocabulary<bool> {
    /// The `yes`/`no` table used by flag columns.
    #[must_use]
    pub fn yes_no() -> Self {
        Self::new([("yes", true), ("no", false)])
    }
}

impl<T> Serialize for Vocabulary<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.entries.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Vocabulary<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, T>::deserialize(deserializer).map(Self::new)
    }
}

macro_rules! category {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &[Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownCategory;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| UnknownCategory {
                        category: stringify!($name),
                        value: s.to_owned(),
                    })
            }
        }
    };
}

/// A canonical name that matches no variant of its category.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown {category} '{value}'")]
pub struct UnknownCategory {
    pub category: &'static str,
    pub value: String,
}

category! {
    pub enum Gender {
        Male => "male",
        Female => "female",
    }
}

category! {
    pub enum Ethnicity {
        WhiteEuropean => "white_european",
        Asian => "asian",
        MiddleEastern => "middle_eastern",
        Black => "black",
        SouthAsian => "south_asian",
        Hispanic => "hispanic",
        Latino => "latino",
        Pasifika => "pasifika",
        Turkish => "turkish",
        Other => "other",
    }
}

category! {
    /// Who completed the questionnaire.
    pub enum Completer {
        SelfReport => "self_report",
        Parent => "parent",
        Relative => "relative",
        HealthCareProfessional => "health_care_professional",
        Other => "other",
    }
}
