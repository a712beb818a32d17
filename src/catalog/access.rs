use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::model::Area;

/// Per-principal area visibility: either everything (which also grants
/// catalog management) or an explicit allow-list of area names. Principals
/// missing from the permission map get an empty allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaAccess {
    All,
    Allow(Vec<String>),
}

impl Default for AreaAccess {
    fn default() -> Self {
        AreaAccess::Allow(Vec::new())
    }
}

impl AreaAccess {
    pub fn permits(&self, area: &str) -> bool {
        match self {
            AreaAccess::All => true,
            AreaAccess::Allow(names) => names.iter().any(|n| n == area),
        }
    }

    /// Unrestricted access doubles as the management role.
    pub fn is_admin(&self) -> bool {
        matches!(self, AreaAccess::All)
    }

    /// Keep only the areas the principal may see, preserving order.
    pub fn filter(&self, areas: Vec<Area>) -> Vec<Area> {
        match self {
            AreaAccess::All => areas,
            AreaAccess::Allow(_) => areas
                .into_iter()
                .filter(|area| self.permits(&area.name))
                .collect(),
        }
    }
}

// The permission map stores either the string "all" or a list of area names.
impl<'de> Deserialize<'de> for AreaAccess {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Keyword(String),
            List(Vec<String>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Keyword(s) if s.eq_ignore_ascii_case("all") => Ok(AreaAccess::All),
            Raw::Keyword(other) => Err(D::Error::custom(format!(
                "expected \"all\" or a list of area names, got \"{other}\""
            ))),
            Raw::List(names) => Ok(AreaAccess::Allow(names)),
        }
    }
}

impl Serialize for AreaAccess {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AreaAccess::All => serializer.serialize_str("all"),
            AreaAccess::Allow(names) => names.serialize(serializer),
        }
    }
}
