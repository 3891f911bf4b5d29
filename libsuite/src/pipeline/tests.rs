use super::*;
use crate::client::Client;
use crate::config::RegistryConfig;
use crate::fake::{Failure, FakeRegistry, image_manifest};
use crate::oci::parse_timestamp;
use crate::resolver::epoch;
use std::time::Duration;

fn config_created(ts: &str) -> String {
    format!(r#"{{"architecture":"amd64","created":"{}"}}"#, ts)
}

fn names(repo: &RepositoryTags) -> Vec<&str> {
    repo.tags.iter().map(|t| t.name.as_str()).collect()
}

#[tokio::test]
async fn test_zero_tags_makes_no_manifest_calls() {
    let fake = FakeRegistry::new().with_tags("empty", &[]);

    let repo = get_repo_with_tags(&fake, "empty", DEFAULT_BATCH_SIZE).await;

    assert_eq!(repo.name, "empty");
    assert!(repo.tags.is_empty());
    assert_eq!(fake.manifest_calls(), 0);
    assert_eq!(fake.blob_calls(), 0);
}

#[tokio::test]
async fn test_tag_listing_failure_is_empty_repository() {
    let fake = FakeRegistry::new().with_tags_failure("broken", Failure::Status(500));

    let repo = get_repo_with_tags(&fake, "broken", DEFAULT_BATCH_SIZE).await;
    assert_eq!(repo.name, "broken");
    assert!(repo.tags.is_empty());
}

#[tokio::test]
async fn test_batches_bound_concurrency() {
    let tags: Vec<String> = (0..17).map(|i| format!("t{}", i)).collect();
    let tag_refs: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();

    let mut fake = FakeRegistry::new()
        .with_tags("busy", &tag_refs)
        .with_delay(Duration::from_millis(20));
    for (i, tag) in tags.iter().enumerate() {
        let created = format!("2024-01-{:02}T00:00:00Z", i + 1);
        fake = fake.with_image("busy", tag, &config_created(&created));
    }

    let repo = get_repo_with_tags(&fake, "busy", 5).await;

    assert_eq!(repo.tags.len(), 17);
    assert_eq!(fake.manifest_calls(), 17);
    assert_eq!(fake.max_in_flight(), 5);
    // Newest first
    assert_eq!(repo.tags[0].name, "t16");
    assert_eq!(repo.tags[16].name, "t0");
}

#[tokio::test]
async fn test_batch_size_zero_is_sequential() {
    let fake = FakeRegistry::new()
        .with_tags("slow", &["a", "b", "c"])
        .with_delay(Duration::from_millis(5));

    let repo = get_repo_with_tags(&fake, "slow", 0).await;

    assert_eq!(repo.tags.len(), 3);
    assert_eq!(fake.max_in_flight(), 1);
}

#[tokio::test]
async fn test_every_failure_keeps_full_count() {
    // No manifests registered: every resolution fails with 404
    let fake = FakeRegistry::new().with_tags("ghost", &["v1", "v2", "v3", "v4", "v5", "v6"]);

    let repo = get_repo_with_tags(&fake, "ghost", DEFAULT_BATCH_SIZE).await;

    assert_eq!(repo.tags.len(), 6);
    assert!(repo.tags.iter().all(|t| t.created == epoch()));
    // Ties keep listing order
    assert_eq!(names(&repo), vec!["v1", "v2", "v3", "v4", "v5", "v6"]);
}

#[tokio::test]
async fn test_partial_failure_sorts_unknown_last() {
    let fake = FakeRegistry::new()
        .with_tags("mixed", &["broken", "old", "new"])
        .with_image("mixed", "old", &config_created("2023-01-01T00:00:00Z"))
        .with_image("mixed", "new", &config_created("2024-01-01T00:00:00Z"));

    let repo = get_repo_with_tags(&fake, "mixed", DEFAULT_BATCH_SIZE).await;

    assert_eq!(names(&repo), vec!["new", "old", "broken"]);
    assert!(repo.tags[2].is_unknown());
}

#[test]
fn test_sort_newest_first_is_stable() {
    let early = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
    let late = parse_timestamp("2024-06-01T00:00:00Z").unwrap();
    let mut tags = vec![
        Tag::new("a", early),
        Tag::new("b", late),
        Tag::new("c", early),
        Tag::new("d", late),
    ];

    sort_newest_first(&mut tags);

    let order: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(order, vec!["b", "d", "a", "c"]);
}

#[test]
fn test_repository_tags_wire_shape() {
    let repo = RepositoryTags {
        name: "demo/app".to_string(),
        tags: vec![Tag::unknown("v1")],
    };
    let value = serde_json::to_value(&repo).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "name": "demo/app",
            "tags": [{"name": "v1", "created": "1970-01-01T00:00:00Z"}]
        })
    );
}

#[tokio::test]
async fn test_end_to_end_against_http_registry() {
    let mut server = mockito::Server::new_async().await;

    let v1_config = config_created("2024-01-01T00:00:00Z");
    let v2_config = config_created("2024-06-01T00:00:00Z");
    let (v1_manifest, v1_digest) = image_manifest(&v1_config);
    let (v2_manifest, v2_digest) = image_manifest(&v2_config);

    let _tags = server
        .mock("GET", "/v2/demo/app/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"demo/app","tags":["v1","v2"]}"#)
        .create_async()
        .await;
    let _m1 = server
        .mock("GET", "/v2/demo/app/manifests/v1")
        .with_status(200)
        .with_body(v1_manifest)
        .create_async()
        .await;
    let _m2 = server
        .mock("GET", "/v2/demo/app/manifests/v2")
        .with_status(200)
        .with_body(v2_manifest)
        .create_async()
        .await;
    let _b1 = server
        .mock("GET", format!("/v2/demo/app/blobs/{}", v1_digest).as_str())
        .with_status(200)
        .with_body(v1_config.as_str())
        .create_async()
        .await;
    let _b2 = server
        .mock("GET", format!("/v2/demo/app/blobs/{}", v2_digest).as_str())
        .with_status(200)
        .with_body(v2_config.as_str())
        .create_async()
        .await;

    let registry = RegistryConfig {
        endpoint: server.host_with_port(),
        ..Default::default()
    };
    let client = Client::new(&registry).unwrap();

    let repo = get_repo_with_tags(&client, "demo/app", DEFAULT_BATCH_SIZE).await;

    assert_eq!(repo.name, "demo/app");
    assert_eq!(names(&repo), vec!["v2", "v1"]);
    assert_eq!(
        repo.tags[0].created,
        parse_timestamp("2024-06-01T00:00:00Z").unwrap()
    );
}
