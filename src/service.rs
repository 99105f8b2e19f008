use std::sync::Arc;

use slog::{debug, o, warn, Logger};
use uuid::Uuid;

use crate::db::Db;
use crate::errors::BackendError;
use crate::io::Submission;
use crate::review::{HostedImage, Review, ReviewCollection};
use crate::store::Store;

/// Combines the record file and the image host. Holds no reviews
/// between calls: every operation reads the whole collection first and
/// every change writes the whole collection back.
pub struct ReviewService {
    logger: Arc<Logger>,
    db: Arc<dyn Db + Send + Sync>,
    store: Arc<dyn Store>,
}

impl ReviewService {
    pub fn new(logger: Arc<Logger>, db: Arc<dyn Db + Send + Sync>, store: Arc<dyn Store>) -> Self {
        Self { logger, db, store }
    }

    /// Returns every review in stored order.
    pub async fn list(&self) -> Result<Vec<Review>, BackendError> {
        Ok(self.db.read_all().await?.into_vec())
    }

    pub async fn get(&self, id: &str) -> Result<Review, BackendError> {
        let reviews = self.db.read_all().await?;

        reviews.find_by_id(id).map(Clone::clone)
    }

    /// Stores a new review, uploading its image first. Nothing is
    /// written if the upload fails.
    pub async fn create(&self, submission: Submission) -> Result<Review, BackendError> {
        let Submission { fields, image } = submission;
        let mut reviews = self.db.read_all().await?;

        let image = match image {
            Some(raw) => {
                debug!(self.logger, "Uploading image..."; "bytes" => raw.len());
                Some(self.store.save(raw).await?)
            }
            None => None,
        };

        let id = mint_id(&reviews);
        let logger = self.logger.new(o!("id" => id.clone()));
        let review = Review::new(id, fields, image);

        reviews.append(review.clone());

        debug!(logger, "Writing reviews..."; "count" => reviews.len());
        if let Err(e) = self.db.persist(&reviews).await {
            self.discard_image(&logger, review.image()).await;
            return Err(e);
        }

        Ok(review)
    }

    /// Replaces every field of a review. Its image changes only when a
    /// new one is submitted; the old one is then deleted from the image
    /// host after the new one is safely uploaded.
    pub async fn update(&self, id: &str, submission: Submission) -> Result<Review, BackendError> {
        let Submission { fields, image } = submission;
        let logger = self.logger.new(o!("id" => id.to_owned()));
        let mut reviews = self.db.read_all().await?;

        let previous = reviews.find_by_id(id)?.clone();

        let image = match image {
            Some(raw) => {
                debug!(logger, "Uploading replacement image..."; "bytes" => raw.len());
                Some(self.store.save(raw).await?)
            }
            None => None,
        };
        let replaced_image = image.is_some();

        let review = previous.revise(fields, image);
        reviews.replace_by_id(id, review.clone())?;

        debug!(logger, "Writing reviews..."; "count" => reviews.len());
        if let Err(e) = self.db.persist(&reviews).await {
            if replaced_image {
                self.discard_image(&logger, review.image()).await;
            }
            return Err(e);
        }

        if replaced_image {
            self.discard_image(&logger, previous.image()).await;
        }

        Ok(review)
    }

    /// Removes a review. Its image is deleted from the image host first,
    /// but failing to do so doesn't keep the review.
    pub async fn delete(&self, id: &str) -> Result<Review, BackendError> {
        let logger = self.logger.new(o!("id" => id.to_owned()));
        let mut reviews = self.db.read_all().await?;

        let image = reviews.find_by_id(id)?.image().cloned();
        self.discard_image(&logger, image.as_ref()).await;

        let removed = reviews.remove_by_id(id)?;

        debug!(logger, "Writing reviews..."; "count" => reviews.len());
        self.db.persist(&reviews).await?;

        Ok(removed)
    }

    /// Deletes an image from the image host, logging instead of failing.
    async fn discard_image(&self, logger: &Logger, image: Option<&HostedImage>) {
        let image = match image {
            Some(image) => image,
            None => return,
        };

        debug!(logger, "Deleting image..."; "public_id" => &image.public_id);
        if let Err(e) = self.store.delete(&image.public_id).await {
            warn!(logger, "Failed to delete image"; "public_id" => &image.public_id, "error" => ?e);
        }
    }
}

fn mint_id(reviews: &ReviewCollection) -> String {
    loop {
        let id = Uuid::new_v4().to_string();

        if !reviews.contains(&id) {
            return id;
        }
    }
}
