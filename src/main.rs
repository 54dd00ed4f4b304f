//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use projectlearn_mock_api::config::Config;
use projectlearn_mock_api::routes;
use projectlearn_mock_api::utils::database::{self, DatabaseProvider};
use projectlearn_mock_api::utils::latency::SimulatedLatency;
use projectlearn_mock_api::utils::seed;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let provider = DatabaseProvider::new();

    if config.seed {
        let store = provider.get_database();
        let mut db = database::write(&store)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        seed::populate(&mut db, config.invitation_ttl_days);
    }

    let address = config.address.clone();
    let latency = SimulatedLatency::new(config.latency_ms);
    let provider = web::Data::new(provider);
    let config = web::Data::new(config);

    info!("Mock API started at {} (latency {}ms)", address, config.latency_ms);

    HttpServer::new(move || {
        App::new()
            .wrap(latency)
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(provider.clone())
            .app_data(config.clone())
            .configure(routes::configure)
    })
    .bind(address)?
    .run()
    .await
}
