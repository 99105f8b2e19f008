use std::sync::Arc;

use slog::Logger;

use crate::service::ReviewService;
use crate::urls::Urls;
use crate::views::Views;

/// Everything a request handler needs, shared across requests.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub service: Arc<ReviewService>,
    pub views: Arc<Views>,
    pub urls: Arc<Urls>,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        service: Arc<ReviewService>,
        views: Arc<Views>,
        urls: Arc<Urls>,
    ) -> Self {
        Self {
            logger,
            service,
            views,
            urls,
        }
    }
}
