//! Lab API client
//!
//! Binds the HTTP wrapper to a base URL and builds resource URLs
//! (`<base>/<resource>/`, `<base>/<resource>/<slug>/`).

use super::http::{FetchError, LabHttpClient};
use crate::resource::Resource;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Main lab API client
#[derive(Clone)]
pub struct LabClient {
    base: Url,
    http: LabHttpClient,
}

impl LabClient {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:8000/api`)
    pub fn new(base_url: &str, connect_timeout: Option<Duration>) -> Result<Self, FetchError> {
        let base = parse_base_url(base_url)?;
        let http = LabHttpClient::new(connect_timeout)?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `<base>/<path>/`
    pub fn resource_url(&self, path: &str) -> Result<Url, FetchError> {
        let relative = format!("{}/", path.trim_matches('/'));
        self.base.join(&relative).map_err(|source| FetchError::Url {
            input: relative,
            source,
        })
    }

    /// Make a GET request against a path under the base URL
    pub async fn get(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.resource_url(path)?;
        self.http.get(url).await
    }

    /// Fetch a single record: `GET <base>/<resource>/<slug>/`
    pub async fn get_by_slug(&self, resource: Resource, slug: &str) -> Result<Value, FetchError> {
        let path = format!("{}/{}", resource.path(), urlencoding::encode(slug));
        self.get(&path).await
    }
}

/// Parse the base URL, making sure it ends with a slash so that
/// `Url::join` appends to the last segment instead of replacing it.
fn parse_base_url(input: &str) -> Result<Url, FetchError> {
    let trimmed = input.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    let url = Url::parse(&normalized).map_err(|source| FetchError::Url {
        input: input.to_string(),
        source,
    })?;

    if url.cannot_be_a_base() {
        return Err(FetchError::Url {
            input: input.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> LabClient {
        LabClient::new(base, None).unwrap()
    }

    #[test]
    fn resource_urls_keep_base_path() {
        let c = client("http://localhost:8000/api");
        assert_eq!(
            c.resource_url("members").unwrap().as_str(),
            "http://localhost:8000/api/members/"
        );
    }

    #[test]
    fn trailing_slashes_are_tolerated() {
        let c = client("http://localhost:8000/api/");
        assert_eq!(
            c.resource_url("/projects/").unwrap().as_str(),
            "http://localhost:8000/api/projects/"
        );
    }

    #[test]
    fn root_base_url() {
        let c = client("https://lab.example.org");
        assert_eq!(
            c.resource_url("grants").unwrap().as_str(),
            "https://lab.example.org/grants/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = LabClient::new("not a url", None).err().unwrap();
        assert!(matches!(err, FetchError::Url { .. }));
    }
}
