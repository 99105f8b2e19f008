use std::sync::Arc;

use slog::{debug, error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{with_status, Reply, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The maximum form data size to accept. This should be enforced by
/// the HTTP gateway, so on the Rust side it's set to a generous limit
/// for a single image.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024 * 1024;

/// Directory served as-is for stylesheets and other assets.
const PUBLIC_DIR: &str = "public";

/// Assembles every route of the site, including error formatting.
pub fn make_routes(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();

    make_root_route(environment.clone())
        .or(make_list_route(environment.clone()))
        .or(make_new_form_route(environment.clone()))
        .or(make_create_route(environment.clone()))
        .or(make_edit_form_route(environment.clone()))
        .or(make_delete_route(environment.clone()))
        .or(make_retrieve_route(environment.clone()))
        .or(make_update_route(environment))
        .or(admin::make_healthz_route())
        .or(warp::get().and(warp::fs::dir(PUBLIC_DIR)))
        .recover(move |r| format_rejection(logger.clone(), r))
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<&'static str>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let status = status_code_for(&r.error);

        if status.is_server_error() {
            error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        } else {
            debug!(logger, "Request rejected"; "context" => ?r.context, "status" => %status, "message" => %r.error);
        }

        return Ok(with_status(r.public_message(), status));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        NotFound { .. } => StatusCode::NOT_FOUND,
        PartsMissing { .. } | MalformedFormSubmission => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use std::collections::HashMap;

    use warp::filters::multipart::{form, FormData};
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{get as g, path as p, path::param as par, post, reject};

    use super::rejection::{Context, Rejection};
    use super::{handlers, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;
    use crate::io::{parse_submission, Submission};

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let r = environment.urls.reviews_path.clone();

            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p(r));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_list_route => list, rt; end(), g());
    route!(make_new_form_route => new_form, rt; p("new"), end(), g());
    route!(make_create_route => create, rt; p("new"), end(), post(), submission());
    route!(make_retrieve_route => retrieve, rt; par::<String>(), end(), g());
    route!(make_edit_form_route => edit_form, rt; par::<String>(), p("edit"), end(), g());
    route!(make_update_route => update, rt; par::<String>(), end(), post(), submission());
    route!(make_delete_route => delete, rt; par::<String>(), p("delete"), end(), post());

    pub fn make_root_route(environment: Environment) -> Route {
        end()
            .and(g())
            .map(move || Box::new(handlers::redirect(environment.urls.reviews())) as Box<dyn Reply>)
            .boxed()
    }

    /// Decodes a create or update form, multipart or urlencoded.
    fn submission() -> BoxedFilter<(Submission,)> {
        let multipart = form()
            .max_length(MAX_CONTENT_LENGTH)
            .and_then(|content: FormData| async move {
                parse_submission(content).await.map_err(reject_submission)
            });

        let urlencoded = warp::body::form().and_then(|fields: HashMap<String, String>| async move {
            Submission::from_urlencoded(fields).map_err(reject_submission)
        });

        multipart.or(urlencoded).unify().boxed()
    }

    fn reject_submission(e: crate::errors::BackendError) -> reject::Rejection {
        Rejection::new(Context::submission(), e).into()
    }
}
