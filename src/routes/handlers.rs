use std::time::{Duration, Instant};

use slog::debug;
use warp::{
    http::StatusCode,
    reject,
    reply::{html, with_header, with_status, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::io::Submission;
use crate::routes::rejection::{Context, Rejection};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {
        let start = Instant::now();

        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn list(environment: Environment) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::list(), e);

        let reviews = environment.service.list().await.map_err(error_handler)?;

        html(environment.views.list(&reviews).map_err(error_handler)?)
    }
}

pub async fn new_form(environment: Environment) -> RouteResult {
    timed! {
        let page = environment
            .views
            .new_form()
            .map_err(|e| Rejection::new(Context::new_form(), e))?;

        html(page)
    }
}

pub async fn retrieve(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::retrieve(id.clone()), e);
        debug!(environment.logger, "Retrieving review..."; "id" => &id);

        let review = environment.service.get(&id).await.map_err(error_handler)?;

        html(environment.views.detail(&review).map_err(error_handler)?)
    }
}

pub async fn edit_form(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::edit_form(id.clone()), e);

        let review = environment.service.get(&id).await.map_err(error_handler)?;

        html(environment.views.edit_form(&review).map_err(error_handler)?)
    }
}

pub async fn create(environment: Environment, submission: Submission) -> RouteResult {
    timed! {
        debug!(environment.logger, "Creating review..."; "with_image" => submission.image.is_some());

        let review = environment
            .service
            .create(submission)
            .await
            .map_err(|e| Rejection::new(Context::create(), e))?;

        redirect(environment.urls.review(review.id()))
    }
}

pub async fn update(environment: Environment, id: String, submission: Submission) -> RouteResult {
    timed! {
        debug!(environment.logger, "Updating review..."; "id" => &id, "with_image" => submission.image.is_some());

        environment
            .service
            .update(&id, submission)
            .await
            .map_err(|e| Rejection::new(Context::update(id.clone()), e))?;

        redirect(environment.urls.review(&id))
    }
}

pub async fn delete(environment: Environment, id: String) -> RouteResult {
    timed! {
        debug!(environment.logger, "Deleting review..."; "id" => &id);

        environment
            .service
            .delete(&id)
            .await
            .map_err(|e| Rejection::new(Context::delete(id.clone()), e))?;

        redirect(environment.urls.reviews())
    }
}

/// Sends the browser to another page after a form post.
pub fn redirect(location: String) -> impl Reply {
    with_status(
        with_header(warp::reply(), "location", location),
        StatusCode::FOUND,
    )
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
