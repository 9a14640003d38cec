//! Integration tests for the lab API client using wiremock
//!
//! These tests run the real client, fetcher and context against mocked
//! endpoints, covering both list shapes and the failure paths.

use labsite::api::types::{LabMember, Publication};
use labsite::api::{FailureKind, FetchError, LabClient};
use labsite::context::{LabContext, LoadState};
use labsite::resource::{fetch_collection, fetch_or_empty, fetch_record, Resource};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Base URL the way deployments configure it: API root under `/api`
fn client_for(server: &MockServer) -> LabClient {
    LabClient::new(&format!("{}/api", server.uri()), None).expect("valid base URL")
}

async fn mount_list(server: &MockServer, resource: Resource, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{}/", resource.path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Base URL pointing at a port nothing listens on
fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

/// Mount `[]` for every resource not in `except`
async fn mount_empty_lists(server: &MockServer, except: &[Resource]) {
    for resource in Resource::ALL {
        if !except.contains(&resource) {
            mount_list(server, resource, json!([])).await;
        }
    }
}

mod fetcher_tests {
    use super::*;

    /// A bare array comes back unchanged and in order, for every resource
    #[tokio::test]
    async fn test_bare_array_is_returned_in_order() {
        let server = MockServer::start().await;
        let records = json!([
            {"id": 3, "slug": "c"},
            {"id": 1, "slug": "a"},
            {"id": 2, "slug": "b"}
        ]);
        for resource in Resource::ALL {
            mount_list(&server, resource, records.clone()).await;
        }

        let client = client_for(&server);
        for resource in Resource::ALL {
            let items: Vec<Value> = fetch_collection(&client, resource)
                .await
                .expect("fetch should succeed");
            let ids: Vec<u64> = items.iter().filter_map(|i| i["id"].as_u64()).collect();
            assert_eq!(ids, vec![3, 1, 2], "order preserved for {}", resource);
        }
    }

    /// A pagination envelope yields its inner results, for every resource
    #[tokio::test]
    async fn test_paginated_envelope_is_unwrapped() {
        let server = MockServer::start().await;
        let envelope = json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [{"id": 1, "slug": "a"}, {"id": 2, "slug": "b"}]
        });
        for resource in Resource::ALL {
            mount_list(&server, resource, envelope.clone()).await;
        }

        let client = client_for(&server);
        for resource in Resource::ALL {
            let items: Vec<Value> = fetch_collection(&client, resource).await.unwrap();
            assert_eq!(items.len(), 2, "envelope unwrapped for {}", resource);
            assert_eq!(items[0]["slug"], "a");
        }
    }

    /// Requests carry the JSON content type
    #[tokio::test]
    async fn test_requests_send_json_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/members/"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let members: Vec<LabMember> = fetch_collection(&client, Resource::Members).await.unwrap();
        assert!(members.is_empty());
    }

    /// Non-2xx answers are typed errors, and empty collections once coalesced
    #[tokio::test]
    async fn test_server_error_becomes_empty_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/grants/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = fetch_collection::<Value>(&client, Resource::Grants)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Status(500));

        let items: Vec<Value> = fetch_or_empty(&client, Resource::Grants).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_becomes_empty_collection() {
        let server = MockServer::start().await;
        // Nothing mounted: wiremock answers 404

        let client = client_for(&server);
        let items: Vec<Value> = fetch_or_empty(&client, Resource::Awards).await;
        assert!(items.is_empty());
    }

    /// Unreachable host yields an empty sequence, not an error
    #[tokio::test]
    async fn test_unreachable_host_becomes_empty_collection() {
        let client = LabClient::new(&unreachable_base_url(), None).unwrap();
        let err = fetch_collection::<Value>(&client, Resource::Projects)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));

        let items: Vec<Value> = fetch_or_empty(&client, Resource::Projects).await;
        assert!(items.is_empty());
    }

    /// Invalid JSON is a decode failure
    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/publications/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = fetch_collection::<Publication>(&client, Resource::Publications)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
    }

    /// An object without `results` is an unrecognized shape: empty, not an error
    #[tokio::test]
    async fn test_object_without_results_is_empty() {
        let server = MockServer::start().await;
        mount_list(&server, Resource::Partnerships, json!({"detail": "ok"})).await;

        let client = client_for(&server);
        let items: Vec<Value> = fetch_collection(&client, Resource::Partnerships)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    /// A record with null text fields does not empty its neighbours
    #[tokio::test]
    async fn test_null_fields_keep_whole_collection() {
        let server = MockServer::start().await;
        mount_list(
            &server,
            Resource::Members,
            json!([
                {"id": 1, "slug": "a", "name": "Alice"},
                {"id": 2, "slug": "b", "name": "Bob", "bio": null, "position": null}
            ]),
        )
        .await;

        let client = client_for(&server);
        let members: Vec<LabMember> = fetch_collection(&client, Resource::Members).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].name, "Bob");
        assert_eq!(members[1].bio, "");
    }

    /// Envelope metadata of an unexpected type does not drop the results
    #[tokio::test]
    async fn test_envelope_with_odd_metadata_is_unwrapped() {
        let server = MockServer::start().await;
        mount_list(
            &server,
            Resource::Awards,
            json!({"count": "2", "next": 3, "results": [{"id": 1}, {"id": 2}]}),
        )
        .await;

        let client = client_for(&server);
        let items: Vec<Value> = fetch_collection(&client, Resource::Awards).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    /// Single record lookup by slug
    #[tokio::test]
    async fn test_fetch_record_by_slug() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/members/alice-smith/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "slug": "alice-smith",
                "name": "Alice Smith",
                "member_type": "PROF",
                "is_active": true
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let member: LabMember = fetch_record(&client, Resource::Members, "alice-smith")
            .await
            .unwrap();
        assert_eq!(member.name, "Alice Smith");
        assert_eq!(member.member_type, "PROF");
    }
}

mod context_tests {
    use super::*;

    /// Members returns Alice, everything else is empty
    #[tokio::test]
    async fn test_single_member_scenario() {
        let server = MockServer::start().await;
        mount_list(
            &server,
            Resource::Members,
            json!([{"id": 1, "slug": "a", "name": "Alice", "member_type": "PROF", "is_active": true}]),
        )
        .await;
        mount_empty_lists(&server, &[Resource::Members]).await;

        let context = LabContext::start(Arc::new(client_for(&server)));
        let state = context.settled().await;

        assert!(matches!(state, LoadState::Ready(_)));
        assert!(state.error().is_none());
        let snapshot = state.snapshot();
        assert_eq!(snapshot.lab_members.len(), 1);
        assert_eq!(snapshot.lab_members[0].name, "Alice");
        for resource in Resource::ALL {
            if resource != Resource::Members {
                assert_eq!(snapshot.len_of(resource), 0, "{} should be empty", resource);
            }
        }
        assert!(snapshot.failures.is_empty());
    }

    /// Publications served as an envelope still publish both records
    #[tokio::test]
    async fn test_paginated_publications_scenario() {
        let server = MockServer::start().await;
        mount_list(
            &server,
            Resource::Publications,
            json!({
                "count": 2,
                "next": null,
                "previous": null,
                "results": [
                    {"id": 1, "slug": "p1", "title": "First", "year": 2023},
                    {"id": 2, "slug": "p2", "title": "Second", "year": 2024}
                ]
            }),
        )
        .await;
        mount_empty_lists(&server, &[Resource::Publications]).await;

        let context = LabContext::start(Arc::new(client_for(&server)));
        let state = context.settled().await;

        assert_eq!(state.snapshot().publications.len(), 2);
        assert_eq!(state.snapshot().publications[1].title, "Second");
    }

    /// Whole backend down: still Ready, with seven empty collections
    #[tokio::test]
    async fn test_backend_down_still_ready() {
        let client = LabClient::new(&unreachable_base_url(), None).unwrap();
        let context = LabContext::start(Arc::new(client));
        let state = context.settled().await;

        assert!(matches!(state, LoadState::Ready(_)));
        let snapshot = state.snapshot();
        for resource in Resource::ALL {
            assert_eq!(snapshot.len_of(resource), 0);
            assert_eq!(
                snapshot.failed(resource).map(|f| f.kind),
                Some(FailureKind::Transport)
            );
        }
    }

    /// One round of seven requests per context
    #[tokio::test]
    async fn test_each_resource_requested_once() {
        let server = MockServer::start().await;
        for resource in Resource::ALL {
            Mock::given(method("GET"))
                .and(path(format!("/api/{}/", resource.path())))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
                .expect(1)
                .mount(&server)
                .await;
        }

        let context = LabContext::start(Arc::new(client_for(&server)));
        context.settled().await;
        // Reading the state again does not refetch
        let _ = context.state();

        server.verify().await;
    }
}
