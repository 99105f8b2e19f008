use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    /// The plain-text message shown to the client. Internal details
    /// stay in the log.
    pub fn public_message(&self) -> &'static str {
        match &self.error {
            BackendError::NotFound { .. } => "Review not found",
            BackendError::PartsMissing { .. } | BackendError::MalformedFormSubmission => {
                "Malformed form submission"
            }
            _ => self.context.failure_message(),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Clone, Debug)]
pub enum Context {
    List,
    NewForm,
    Retrieve { id: String },
    EditForm { id: String },
    Create,
    Update { id: String },
    Delete { id: String },
    Submission,
}

impl Context {
    pub fn list() -> Context {
        Context::List
    }

    pub fn new_form() -> Context {
        Context::NewForm
    }

    pub fn retrieve(id: String) -> Context {
        Context::Retrieve { id }
    }

    pub fn edit_form(id: String) -> Context {
        Context::EditForm { id }
    }

    pub fn create() -> Context {
        Context::Create
    }

    pub fn update(id: String) -> Context {
        Context::Update { id }
    }

    pub fn delete(id: String) -> Context {
        Context::Delete { id }
    }

    pub fn submission() -> Context {
        Context::Submission
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Context::List | Context::NewForm | Context::Retrieve { .. } | Context::EditForm { .. } => {
                "Failed to load page"
            }
            Context::Create => "Failed to create review",
            Context::Update { .. } => "Failed to update review",
            Context::Delete { .. } => "Failed to delete review",
            Context::Submission => "Malformed form submission",
        }
    }
}
