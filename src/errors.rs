use thiserror::Error;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a lookup for an ID that isn't in the collection.
    #[error("Review {id} not found")]
    NotFound { id: String },

    /// Represents a failure to upload an image to the image host.
    #[error("Failed to upload image")]
    UploadFailed { source: ImageHostError },

    /// Represents a failure to delete an image from the image host.
    #[error("Failed to delete image")]
    DeleteFailed { source: ImageHostError },

    /// Represents a failure to read or write the record file.
    #[error("Record storage unavailable")]
    StorageUnavailable { source: StorageError },

    /// Represents a form submission that couldn't be read.
    #[error("Malformed form submission")]
    MalformedFormSubmission,

    /// Represents a form submission without one of the required fields.
    #[error("Missing form field {field}")]
    PartsMissing { field: &'static str },

    /// Represents a template that failed to compile at startup.
    #[error("Invalid template")]
    InvalidTemplate { source: handlebars::TemplateError },

    /// Represents a failure to render a view.
    #[error("Failed to render view")]
    RenderFailed { source: handlebars::RenderError },

    /// Represents a failure to build the HTTP client.
    #[error("Failed to build HTTP client")]
    HttpClient { source: reqwest::Error },
}

/// Enumerates errors returned by the image host.
#[derive(Debug, Error)]
pub enum ImageHostError {
    /// The request never produced a response.
    #[error("Transport error")]
    Transport { source: reqwest::Error },

    /// The image host answered with an error.
    #[error("Image host returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// The image host answered with something other than the expected JSON.
    #[error("Malformed response from image host")]
    MalformedResponse { source: serde_json::Error },

    /// The API endpoint could not be derived from the configured base.
    #[error("Invalid endpoint")]
    InvalidEndpoint { source: url::ParseError },
}

/// Enumerates errors returned by the record file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error")]
    Io { source: std::io::Error },

    #[error("Malformed record file")]
    Malformed { source: serde_json::Error },

    #[error("Timed out")]
    TimedOut,
}

/// Enumerates errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("must define {name} environment variable")]
    Missing { name: &'static str },

    #[error("could not parse {name} from {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl From<StorageError> for BackendError {
    fn from(source: StorageError) -> Self {
        BackendError::StorageUnavailable { source }
    }
}
