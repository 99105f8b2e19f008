use std::error::Error;
use std::sync::Arc;

use log::initialize_logger;
use slog::info;

use travel_reviews::config::Config;
use travel_reviews::db::JsonDb;
use travel_reviews::environment::Environment;
use travel_reviews::routes;
use travel_reviews::service::ReviewService;
use travel_reviews::store::CloudinaryStore;
use travel_reviews::urls::Urls;
use travel_reviews::views::Views;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let config = Config::from_env()?;

    let db = Arc::new(JsonDb::new(config.data_path.clone(), config.timeout));

    info!(logger, "Starting..."; "port" => config.port, "data_path" => %db.path().display());
    let logger = Arc::new(logger);

    let store = Arc::new(CloudinaryStore::new(&config.cloudinary, config.timeout)?);
    let service = Arc::new(ReviewService::new(logger.clone(), db, store));

    let views = Arc::new(Views::new()?);
    let urls = Arc::new(Urls::default());

    let environment = Environment::new(logger.clone(), service, views, urls);
    let routes = routes::make_routes(environment);

    let (address, server) =
        warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], config.port), async {
            tokio::signal::ctrl_c().await.ok();
        });

    info!(logger, "Listening"; "address" => %address);
    server.await;

    info!(logger, "Exiting gracefully...");

    Ok(())
}
