use std::collections::HashMap;

use bytes::BufMut;
use futures::TryStreamExt;
use warp::multipart::{FormData, Part};

use crate::errors::BackendError;
use crate::review::ReviewFields;

/// The name of the form part carrying the optional image.
pub const IMAGE_PART: &str = "image";

/// A create or update form, decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub fields: ReviewFields,

    /// The raw image, if one was chosen.
    pub image: Option<Vec<u8>>,
}

impl Submission {
    pub fn new(fields: ReviewFields, image: Option<Vec<u8>>) -> Self {
        Self { fields, image }
    }

    /// Decodes a urlencoded form, which never carries an image.
    pub fn from_urlencoded(form: HashMap<String, String>) -> Result<Self, BackendError> {
        Ok(Self::new(ReviewFields::from_form(form)?, None))
    }
}

/// Decodes a multipart form. An empty `image` part, which browsers send
/// when no file was chosen, counts as no image.
pub async fn parse_submission(mut content: FormData) -> Result<Submission, BackendError> {
    let mut text = HashMap::new();
    let mut image = None;

    // each part must be drained before the next one is requested
    while let Some(part) = content
        .try_next()
        .await
        .map_err(|_| BackendError::MalformedFormSubmission)?
    {
        let name = part.name().to_owned();
        let data = part_as_vec(part).await?;

        if name == IMAGE_PART {
            image = Some(data).filter(|d| !d.is_empty());
        } else {
            let value = String::from_utf8(data).map_err(|_| BackendError::MalformedFormSubmission)?;
            text.insert(name, value);
        }
    }

    Ok(Submission::new(ReviewFields::from_form(text)?, image))
}

/// Collects the chunks of a [`Part`].
pub async fn part_as_vec(raw: Part) -> Result<Vec<u8>, BackendError> {
    raw.stream()
        .try_fold(Vec::new(), |mut vec, data| {
            vec.put(data);
            async move { Ok::<_, warp::Error>(vec) }
        })
        .await
        .map_err(|_| BackendError::MalformedFormSubmission)
}

#[cfg(test)]
mod test {
    use super::*;

    const BOUNDARY: &str = "B";

    fn body(image: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();

        for (name, value) in &[
            ("destination", "Peru"),
            ("title", "Trip"),
            ("comment", "Great"),
            ("rating", "5"),
        ] {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }

        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        body
    }

    async fn decode(body: Vec<u8>) -> Result<Submission, BackendError> {
        let form = warp::test::request()
            .method("POST")
            .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(body)
            .filter(&warp::multipart::form())
            .await
            .expect("multipart filter accepts body");

        parse_submission(form).await
    }

    #[tokio::test]
    async fn browser_form_is_decoded_part_by_part() {
        let submission = decode(body(b"jpeg bytes")).await.unwrap();

        assert_eq!(submission.fields, ReviewFields::new("Peru", "Trip", "Great", "5"));
        assert_eq!(submission.image, Some(b"jpeg bytes".to_vec()));
    }

    #[tokio::test]
    async fn empty_file_part_is_no_image() {
        let submission = decode(body(b"")).await.unwrap();

        assert_eq!(submission.image, None);
    }

    #[test]
    fn urlencoded_form_needs_every_field() {
        let mut form = HashMap::new();
        form.insert("destination".to_owned(), "Peru".to_owned());

        assert!(matches!(
            Submission::from_urlencoded(form),
            Err(BackendError::PartsMissing { field: "title" })
        ));
    }
}
