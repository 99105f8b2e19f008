use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use futures::future::BoxFuture;

use crate::db::Db;
use crate::errors::{BackendError, StorageError};
use crate::review::ReviewCollection;

#[derive(Default)]
pub(crate) struct MockDb {
    pub(crate) reviews: RwLock<ReviewCollection>,
    fail_writes: AtomicBool,
}

impl MockDb {
    pub fn new(reviews: ReviewCollection) -> Self {
        MockDb {
            reviews: RwLock::new(reviews),
            ..Default::default()
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ReviewCollection {
        self.reviews.read().unwrap().clone()
    }
}

impl Db for MockDb {
    fn read_all(&self) -> BoxFuture<Result<ReviewCollection, BackendError>> {
        use futures::FutureExt;

        let reviews = self.snapshot();

        async move { Ok(reviews) }.boxed()
    }

    fn persist(&self, reviews: &ReviewCollection) -> BoxFuture<Result<(), BackendError>> {
        use futures::FutureExt;

        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::TimedOut.into())
        } else {
            *self.reviews.write().unwrap() = reviews.clone();
            Ok(())
        };

        async move { result }.boxed()
    }
}
