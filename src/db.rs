use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::errors::{BackendError, StorageError};
use crate::review::{Review, ReviewCollection};

#[cfg(test)]
pub(crate) mod mock;

/// Durable storage for the review collection. Callers read the whole
/// collection, change it in memory and write the whole thing back;
/// there is no locking, so the last writer wins.
pub trait Db {
    fn read_all(&self) -> BoxFuture<Result<ReviewCollection, BackendError>>;

    fn persist(&self, reviews: &ReviewCollection) -> BoxFuture<Result<(), BackendError>>;
}

/// The on-disk layout of the record file.
#[derive(Debug, Default, Deserialize, Serialize)]
struct Document {
    #[serde(default)]
    reviews: Vec<Review>,
}

fn decode(raw: &[u8]) -> Result<ReviewCollection, StorageError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReviewCollection::default());
    }

    let document: Document =
        serde_json::from_slice(raw).map_err(|source| StorageError::Malformed { source })?;

    Ok(ReviewCollection::new(document.reviews))
}

fn encode(reviews: &ReviewCollection) -> Result<Vec<u8>, StorageError> {
    #[derive(Serialize)]
    struct DocumentRef<'a> {
        reviews: &'a [Review],
    }

    serde_json::to_vec_pretty(&DocumentRef {
        reviews: reviews.as_slice(),
    })
    .map_err(|source| StorageError::Malformed { source })
}

pub use self::json::*;

mod json {
    use std::future::Future;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use tokio::fs;

    use crate::errors::{BackendError, StorageError};
    use crate::review::ReviewCollection;

    /// Keeps the collection in a single JSON file.
    pub struct JsonDb {
        path: PathBuf,
        timeout: Duration,
    }

    impl JsonDb {
        pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
            JsonDb {
                path: path.into(),
                timeout,
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn scratch_path(&self) -> PathBuf {
            let mut name = self
                .path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_default();
            name.push(".tmp");

            self.path.with_file_name(name)
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for JsonDb {
        fn read_all(&self) -> BoxFuture<Result<ReviewCollection, BackendError>> {
            async move {
                let raw = match bounded(self.timeout, fs::read(&self.path)).await {
                    Ok(raw) => raw,
                    Err(StorageError::Io { source }) if source.kind() == ErrorKind::NotFound => {
                        return Ok(ReviewCollection::default())
                    }
                    Err(e) => return Err(e.into()),
                };

                Ok(super::decode(&raw)?)
            }
            .boxed()
        }

        fn persist(&self, reviews: &ReviewCollection) -> BoxFuture<Result<(), BackendError>> {
            let encoded = super::encode(reviews);

            async move {
                let encoded = encoded?;
                let scratch = self.scratch_path();

                if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    bounded(self.timeout, fs::create_dir_all(parent)).await?;
                }

                bounded(self.timeout, fs::write(&scratch, encoded)).await?;
                bounded(self.timeout, fs::rename(&scratch, &self.path)).await?;

                Ok(())
            }
            .boxed()
        }
    }

    async fn bounded<T>(
        timeout: Duration,
        operation: impl Future<Output = std::io::Result<T>>,
    ) -> Result<T, StorageError> {
        tokio::time::timeout(timeout, operation)
            .await
            .map_err(|_| StorageError::TimedOut)?
            .map_err(|source| StorageError::Io { source })
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::review::{HostedImage, ReviewFields};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn sample() -> ReviewCollection {
        ReviewCollection::new(vec![
            Review::new(
                "one".to_owned(),
                ReviewFields::new("Peru", "Trip", "Great", "5"),
                None,
            ),
            Review::new(
                "two".to_owned(),
                ReviewFields::new("Japan", "Spring", "Busy", "4"),
                Some(HostedImage::new("https://img/two.jpg", "travel-reviews/two")),
            ),
        ])
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = JsonDb::new(dir.path().join("db.json"), TIMEOUT);

        let reviews = db.read_all().await.unwrap();

        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn persisted_collection_reads_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let db = JsonDb::new(dir.path().join("nested").join("db.json"), TIMEOUT);

        db.persist(&sample()).await.unwrap();
        let reviews = db.read_all().await.unwrap();

        assert_eq!(reviews, sample());
        assert!(!dir.path().join("nested").join("db.json.tmp").exists());
    }

    #[tokio::test]
    async fn persist_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let db = JsonDb::new(dir.path().join("db.json"), TIMEOUT);

        db.persist(&sample()).await.unwrap();
        db.persist(&ReviewCollection::default()).await.unwrap();

        assert!(db.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reads_file_written_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(
            &path,
            r#"{"reviews":[{"id":"x","destination":"Peru","title":"Trip","comment":"Great","rating":5}]}"#,
        )
        .unwrap();

        let reviews = JsonDb::new(&path, TIMEOUT).read_all().await.unwrap();

        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews.find_by_id("x").unwrap().fields().rating, "5");
    }

    #[tokio::test]
    async fn document_without_reviews_key_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{}").unwrap();

        let reviews = JsonDb::new(&path, TIMEOUT).read_all().await.unwrap();

        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn empty_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "").unwrap();

        let reviews = JsonDb::new(&path, TIMEOUT).read_all().await.unwrap();

        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn whitespace_only_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "\n  ").unwrap();

        let reviews = JsonDb::new(&path, TIMEOUT).read_all().await.unwrap();

        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = JsonDb::new(&path, TIMEOUT).read_all().await;

        assert!(matches!(
            result,
            Err(BackendError::StorageUnavailable {
                source: StorageError::Malformed { .. }
            })
        ));
    }
}
