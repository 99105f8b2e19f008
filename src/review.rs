use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::BackendError;

/// A single review in the record file.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Review {
    /// The ID of the review. Minted at creation and never reassigned.
    id: String,

    /// The fields provided by the author.
    #[serde(flatten)]
    fields: ReviewFields,

    /// The uploaded image, if any. The URL and deletion handle are
    /// stored as `imageUrl` and `imagePublicId` and are only ever read
    /// or written together.
    #[serde(flatten)]
    image: Option<HostedImage>,
}

impl Review {
    pub fn new(id: String, fields: ReviewFields, image: Option<HostedImage>) -> Self {
        Self { id, fields, image }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &ReviewFields {
        &self.fields
    }

    pub fn image(&self) -> Option<&HostedImage> {
        self.image.as_ref()
    }

    /// Returns a copy of this review with every user field replaced and
    /// the image replaced only when `image` is `Some`.
    pub fn revise(&self, fields: ReviewFields, image: Option<HostedImage>) -> Self {
        Self {
            id: self.id.clone(),
            fields,
            image: image.or_else(|| self.image.clone()),
        }
    }
}

/// The user-supplied fields of a review. None of them are validated
/// beyond being present.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ReviewFields {
    pub destination: String,
    pub title: String,
    pub comment: String,
    #[serde(deserialize_with = "string_or_number")]
    pub rating: String,
}

impl ReviewFields {
    pub const NAMES: [&'static str; 4] = ["destination", "title", "comment", "rating"];

    pub fn new(
        destination: impl Into<String>,
        title: impl Into<String>,
        comment: impl Into<String>,
        rating: impl Into<String>,
    ) -> Self {
        Self {
            destination: destination.into(),
            title: title.into(),
            comment: comment.into(),
            rating: rating.into(),
        }
    }

    /// Extracts the fields from a decoded form. Every field must be
    /// present, though it may be blank.
    pub fn from_form(mut form: HashMap<String, String>) -> Result<Self, BackendError> {
        let mut take = |field: &'static str| {
            form.remove(field)
                .ok_or(BackendError::PartsMissing { field })
        };

        Ok(Self {
            destination: take("destination")?,
            title: take("title")?,
            comment: take("comment")?,
            rating: take("rating")?,
        })
    }
}

/// An image stored on the image host.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HostedImage {
    /// The public URL of the image.
    #[serde(rename = "imageUrl")]
    pub url: String,

    /// The opaque handle needed to delete the image.
    #[serde(rename = "imagePublicId")]
    pub public_id: String,
}

impl HostedImage {
    pub fn new(url: impl Into<String>, public_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            public_id: public_id.into(),
        }
    }
}

/// The full, ordered list of reviews as read from the record file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReviewCollection(Vec<Review>);

impl ReviewCollection {
    pub fn new(reviews: Vec<Review>) -> Self {
        Self(reviews)
    }

    pub fn as_slice(&self) -> &[Review] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Review> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Adds a review at the end.
    pub fn append(&mut self, review: Review) {
        self.0.push(review);
    }

    pub fn find_by_id(&self, id: &str) -> Result<&Review, BackendError> {
        self.0
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Replaces the review with the given ID in place and returns the
    /// previous version.
    pub fn replace_by_id(&mut self, id: &str, review: Review) -> Result<Review, BackendError> {
        let index = self.position(id).ok_or_else(|| not_found(id))?;

        Ok(std::mem::replace(&mut self.0[index], review))
    }

    pub fn remove_by_id(&mut self, id: &str) -> Result<Review, BackendError> {
        let index = self.position(id).ok_or_else(|| not_found(id))?;

        Ok(self.0.remove(index))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|r| r.id == id)
    }
}

fn not_found(id: &str) -> BackendError {
    BackendError::NotFound { id: id.to_owned() }
}

// older records may carry the rating as a JSON number
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
