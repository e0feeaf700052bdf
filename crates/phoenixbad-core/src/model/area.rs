// ── Area domain types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use url::Url;

/// One of the monitored zones, each with its own endpoint and state.
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
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Area {
    Pool,
    Sauna,
}

impl Area {
    /// Lowercase identifier used in logs, errors and config keys.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Static description of where and how to poll one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSource {
    pub area: Area,
    pub url: Url,
    /// Extra request headers. The User-Agent comes from the transport.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl AreaSource {
    pub fn new(area: Area, url: Url) -> Self {
        Self {
            area,
            url,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn area_round_trips_through_strings() {
        assert_eq!(Area::Pool.to_string(), "pool");
        assert_eq!(Area::from_str("Sauna").unwrap(), Area::Sauna);
        assert!(Area::from_str("gym").is_err());
    }

    #[test]
    fn areas_iterate_in_declaration_order() {
        let all: Vec<Area> = Area::iter().collect();
        assert_eq!(all, vec![Area::Pool, Area::Sauna]);
    }
}
