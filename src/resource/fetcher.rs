//! Resource Fetcher
//!
//! Fetches one collection from the lab API and normalizes its shape.

use super::Resource;
use crate::api::types::{
    Award, Collaboration, Grant, LabMember, Partnership, Project, Publication,
};
use crate::api::{FetchError, LabClient, ListResponse};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Fetch a whole collection (bare list or first page of an envelope)
pub async fn fetch_collection<T: DeserializeOwned>(
    client: &LabClient,
    resource: Resource,
) -> Result<Vec<T>, FetchError> {
    let body = client.get(resource.path()).await?;
    let response = ListResponse::from_value(body);

    match &response {
        ListResponse::Paginated(page) if page.next.is_some() => {
            tracing::debug!(
                "{}: envelope reports more pages (count={:?}), keeping first page",
                resource,
                page.count
            );
        }
        ListResponse::Unrecognized(_) => {
            tracing::warn!("{}: unrecognized list response, treating as empty", resource);
        }
        _ => {}
    }

    let items = response.into_items();
    tracing::debug!("{}: {} records", resource, items.len());

    items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(FetchError::from)
}

/// Fetch a collection, downgrading any failure to an empty collection
///
/// Standalone form of the coalescing the aggregation context applies to
/// each of its seven fetches; the context also records the failure.
pub async fn fetch_or_empty<T: DeserializeOwned>(client: &LabClient, resource: Resource) -> Vec<T> {
    let (items, _) = coalesce(resource, fetch_collection(client, resource).await);
    items
}

/// Split a fetch result into its records (empty on failure) and the error, logging it
pub fn coalesce<T>(resource: Resource, result: Result<Vec<T>, FetchError>) -> (Vec<T>, Option<FetchError>) {
    match result {
        Ok(items) => (items, None),
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {} ({:?})", resource, e, e.kind());
            (Vec::new(), Some(e))
        }
    }
}

/// Fetch a single record by slug
pub async fn fetch_record<T: DeserializeOwned>(
    client: &LabClient,
    resource: Resource,
    slug: &str,
) -> Result<T, FetchError> {
    let body: Value = client.get_by_slug(resource, slug).await?;
    Ok(serde_json::from_value(body)?)
}

/// Source of the seven lab collections
///
/// Implemented by [`LabClient`] against the live API; tests substitute mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabSource: Send + Sync {
    async fn members(&self) -> Result<Vec<LabMember>, FetchError>;
    async fn projects(&self) -> Result<Vec<Project>, FetchError>;
    async fn collaborations(&self) -> Result<Vec<Collaboration>, FetchError>;
    async fn grants(&self) -> Result<Vec<Grant>, FetchError>;
    async fn awards(&self) -> Result<Vec<Award>, FetchError>;
    async fn publications(&self) -> Result<Vec<Publication>, FetchError>;
    async fn partnerships(&self) -> Result<Vec<Partnership>, FetchError>;
}

#[async_trait]
impl LabSource for LabClient {
    async fn members(&self) -> Result<Vec<LabMember>, FetchError> {
        fetch_collection(self, Resource::Members).await
    }

    async fn projects(&self) -> Result<Vec<Project>, FetchError> {
        fetch_collection(self, Resource::Projects).await
    }

    async fn collaborations(&self) -> Result<Vec<Collaboration>, FetchError> {
        fetch_collection(self, Resource::Collaborations).await
    }

    async fn grants(&self) -> Result<Vec<Grant>, FetchError> {
        fetch_collection(self, Resource::Grants).await
    }

    async fn awards(&self) -> Result<Vec<Award>, FetchError> {
        fetch_collection(self, Resource::Awards).await
    }

    async fn publications(&self) -> Result<Vec<Publication>, FetchError> {
        fetch_collection(self, Resource::Publications).await
    }

    async fn partnerships(&self) -> Result<Vec<Partnership>, FetchError> {
        fetch_collection(self, Resource::Partnerships).await
    }
}
