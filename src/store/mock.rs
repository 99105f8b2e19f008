use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use futures::future::BoxFuture;

use crate::errors::{BackendError, ImageHostError};
use crate::review::HostedImage;
use crate::store::{Store, FOLDER};

#[derive(Default)]
pub(crate) struct MockStore {
    pub(crate) map: RwLock<HashMap<String, Vec<u8>>>,
    uploads: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, public_id: &str) -> bool {
        self.map.read().unwrap().contains_key(public_id)
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap().len()
    }
}

impl Store for MockStore {
    fn save(&self, raw: Vec<u8>) -> BoxFuture<Result<HostedImage, BackendError>> {
        use futures::FutureExt;

        mock_save(self, raw).boxed()
    }

    fn delete(&self, public_id: &str) -> BoxFuture<Result<(), BackendError>> {
        use futures::FutureExt;

        mock_delete(self, public_id.to_owned()).boxed()
    }
}

async fn mock_save(store: &MockStore, raw: Vec<u8>) -> Result<HostedImage, BackendError> {
    if store.fail_uploads.load(Ordering::SeqCst) {
        return Err(BackendError::UploadFailed {
            source: rejected(),
        });
    }

    let n = store.uploads.fetch_add(1, Ordering::SeqCst);
    let public_id = format!("{}/mock-{}", FOLDER, n);
    let url = format!("https://images.example.com/{}.jpg", public_id);

    store.map.write().unwrap().insert(public_id.clone(), raw);

    Ok(HostedImage::new(url, public_id))
}

async fn mock_delete(store: &MockStore, public_id: String) -> Result<(), BackendError> {
    if store.fail_deletes.load(Ordering::SeqCst) {
        return Err(BackendError::DeleteFailed {
            source: rejected(),
        });
    }

    store.map.write().unwrap().remove(&public_id);

    Ok(())
}

fn rejected() -> ImageHostError {
    ImageHostError::Remote {
        status: 500,
        message: "mock failure".to_owned(),
    }
}
