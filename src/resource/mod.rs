//! Resource abstraction layer
//!
//! The lab API exposes seven list endpoints, one per [`Resource`]. This
//! module names them and provides the fetcher that turns each endpoint's
//! response into a typed collection.
//!
//! - [`fetcher`] - Fetches a collection, unwrapping bare lists and pagination envelopes
//!
//! # Example
//!
//! ```ignore
//! use labsite::api::LabClient;
//! use labsite::resource::{fetch_collection, Resource};
//!
//! async fn members(client: &LabClient) -> anyhow::Result<()> {
//!     let members: Vec<labsite::api::LabMember> =
//!         fetch_collection(client, Resource::Members).await?;
//!     println!("{} members", members.len());
//!     Ok(())
//! }
//! ```

mod fetcher;

pub use fetcher::{coalesce, fetch_collection, fetch_or_empty, fetch_record, LabSource};

#[cfg(test)]
pub use fetcher::MockLabSource;

use std::fmt;
use std::str::FromStr;

/// One of the seven content collections served by the lab API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Members,
    Projects,
    Collaborations,
    Grants,
    Awards,
    Publications,
    Partnerships,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Members,
        Resource::Projects,
        Resource::Collaborations,
        Resource::Grants,
        Resource::Awards,
        Resource::Publications,
        Resource::Partnerships,
    ];

    /// Path segment of the list endpoint, without slashes
    pub fn path(self) -> &'static str {
        match self {
            Resource::Members => "members",
            Resource::Projects => "projects",
            Resource::Collaborations => "collaborations",
            Resource::Grants => "grants",
            Resource::Awards => "awards",
            Resource::Publications => "publications",
            Resource::Partnerships => "partnerships",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Resource::Members => "Lab Members",
            Resource::Projects => "Projects",
            Resource::Collaborations => "Collaborations",
            Resource::Grants => "Grants",
            Resource::Awards => "Awards",
            Resource::Publications => "Publications",
            Resource::Partnerships => "Partnerships",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_matches('/').to_ascii_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.path() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Resource::ALL.iter().map(|r| r.path()).collect();
                format!("unknown resource `{}` (expected one of: {})", s, known.join(", "))
            })
    }
}
