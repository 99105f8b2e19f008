/// Convenience wrapper for the paths the site redirects to.
#[derive(Clone, Debug)]
pub struct Urls {
    /// Mount point for all review pages, without slashes.
    pub(crate) reviews_path: String,
}

impl Urls {
    /// Create a new instance. `reviews_path` should *not* include any
    /// slashes.
    pub fn new(reviews_path: impl Into<String>) -> Self {
        Urls {
            reviews_path: reviews_path.into(),
        }
    }

    pub fn reviews(&self) -> String {
        format!("/{}", self.reviews_path)
    }

    pub fn review(&self, id: &str) -> String {
        format!("/{}/{}", self.reviews_path, id)
    }
}

impl Default for Urls {
    fn default() -> Self {
        Urls::new("reviews")
    }
}
