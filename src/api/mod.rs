//! Lab content API module
//!
//! # Module Structure
//!
//! - [`client`] - Client bound to the configured API root
//! - [`http`] - HTTP wrapper and the [`FetchError`] type
//! - [`envelope`] - Bare list vs. pagination envelope responses
//! - [`types`] - Typed records for the seven resources

pub mod client;
pub mod envelope;
pub mod http;
pub mod types;

pub use client::LabClient;
pub use envelope::{ListResponse, Page};
pub use http::{format_fetch_error, FailureKind, FetchError};
pub use types::{
    Award, Collaboration, Grant, LabMember, Media, Partnership, Project, Publication, Record,
    Relation,
};
