use crate::config::Config;
use crate::models::ServiceError;
use crate::utils::database::{self, DatabaseProvider};
use crate::utils::seed;
use actix_web::{get, post, web, HttpResponse, Responder};
use log::{info, warn};
use serde_json::json;

#[get("/api/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Cross-check entity maps against indexes
#[get("/api/admin/integrity")]
async fn integrity(provider: web::Data<DatabaseProvider>) -> Result<HttpResponse, ServiceError> {
    let store = provider.get_database();
    let report = database::read(&store)?.integrity_report();

    if report.clean {
        info!("✅ Integrity check passed");
    } else {
        warn!("⚠️ Integrity check found {} issues", report.issues.len());
    }

    Ok(HttpResponse::Ok().json(report))
}

// Throw away the current store and start over
#[post("/api/admin/reset")]
async fn reset(
    provider: web::Data<DatabaseProvider>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ServiceError> {
    info!("♻️ Resetting mock database");

    let store = provider.initialize_database();
    if config.seed {
        let mut db = database::write(&store)?;
        seed::populate(&mut db, config.invitation_ttl_days);
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Database reset",
        "seeded": config.seed
    })))
}

// Register maintenance routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(integrity).service(reset);
}
