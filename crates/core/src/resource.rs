//! The fixed set of served content resources.

use crate::error::Error;
use crate::schema::quote_ident;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A content resource served through the read-through cache.
///
/// The set is closed: every resource owns exactly one cache key and one
/// backing table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Teams,
    Controls,
    Faqs,
}

impl Resource {
    /// Every resource, in a stable order.
    pub const ALL: [Resource; 3] = [Resource::Teams, Resource::Controls, Resource::Faqs];

    /// Lower-case resource name as used in APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Teams => "teams",
            Self::Controls => "controls",
            Self::Faqs => "faqs",
        }
    }

    /// Cache key for the resource's full row set.
    pub fn cache_key(self) -> &'static str {
        match self {
            Self::Teams => "teams:all",
            Self::Controls => "controls:all",
            Self::Faqs => "faqs:all",
        }
    }

    /// Backing Postgres table (unquoted, case preserved).
    pub fn table(self) -> &'static str {
        match self {
            Self::Teams => "allTeams",
            Self::Controls => "allTrustControls",
            Self::Faqs => "allTrustFaqs",
        }
    }

    /// Human-readable label used in user-facing error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Teams => "teams",
            Self::Controls => "trust controls",
            Self::Faqs => "trust FAQs",
        }
    }

    /// Query returning every row of the backing table.
    pub fn select_all_sql(self) -> String {
        format!("SELECT * FROM {}", quote_ident(self.table()))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teams" => Ok(Self::Teams),
            "controls" => Ok(Self::Controls),
            "faqs" => Ok(Self::Faqs),
            _ => Err(Error::UnknownResource(s.to_string())),
        }
    }
}
