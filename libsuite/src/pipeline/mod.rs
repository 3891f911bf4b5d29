//! Tag aggregation pipeline.
//!
//! Resolves every tag of a repository in bounded batches and returns them
//! newest first.
//!
//! Batches run one after another. Within a batch all tags are resolved
//! concurrently on the calling task with `join_all`, so at most `batch_size`
//! manifest/blob chains hit the registry at once.

use crate::client::RegistryApi;
use crate::resolver::{Tag, TagResolver};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(test)]
mod tests;

/// Tags resolved concurrently per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// A repository and its resolved tags, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryTags {
    pub name: String,
    pub tags: Vec<Tag>,
}

/// Lists and resolves all tags of `repository`.
///
/// Never fails. A repository whose tags cannot be listed comes back with no
/// tags; a tag that cannot be resolved keeps its place in the output with
/// the epoch as its creation time. A `batch_size` of 0 is treated as 1.
///
/// # Examples
///
/// ```no_run
/// use libsuite::client::Client;
/// use libsuite::config::RegistryConfig;
/// use libsuite::pipeline::{get_repo_with_tags, DEFAULT_BATCH_SIZE};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = RegistryConfig {
///     endpoint: "localhost:5000".to_string(),
///     ..Default::default()
/// };
/// let client = Client::new(&registry)?;
/// let repo = get_repo_with_tags(&client, "demo/app", DEFAULT_BATCH_SIZE).await;
/// for tag in repo.tags {
///     println!("{} {}", tag.name, tag.created);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn get_repo_with_tags(
    api: &dyn RegistryApi,
    repository: &str,
    batch_size: usize,
) -> RepositoryTags {
    let resolver = TagResolver::new(api);
    let names = resolver.list_tags(repository).await;

    if names.is_empty() {
        return RepositoryTags {
            name: repository.to_string(),
            tags: Vec::new(),
        };
    }

    let batch_size = batch_size.max(1);
    let mut tags = Vec::with_capacity(names.len());

    for (index, batch) in names.chunks(batch_size).enumerate() {
        debug!(
            repository,
            batch = index + 1,
            size = batch.len(),
            "resolving tag batch"
        );
        let resolved = join_all(batch.iter().map(|name| resolver.resolve_tag(repository, name))).await;
        tags.extend(resolved);
    }

    let unknown = tags.iter().filter(|t| t.is_unknown()).count();
    if unknown > 0 {
        debug!(repository, unknown, total = tags.len(), "tags without creation time");
    }

    sort_newest_first(&mut tags);

    RepositoryTags {
        name: repository.to_string(),
        tags,
    }
}

/// Sorts tags by creation time, newest first. Equal times keep their
/// relative order.
pub fn sort_newest_first(tags: &mut [Tag]) {
    tags.sort_by(|a, b| b.created.cmp(&a.created));
}
