// src/routes/mod.rs
use crate::models::ServiceError;
use actix_web::web;

pub mod admin_routes;
pub mod analytics_routes;
pub mod invitation_routes;
pub mod project_routes;
pub mod task_routes;
pub mod team_routes;
pub mod user_routes;

// Register every mock API route, with malformed bodies and queries
// reported in the same {"error": ...} shape as handler errors
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ServiceError::BadRequest(format!("Invalid JSON body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ServiceError::BadRequest(format!("Invalid query string: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ServiceError::BadRequest(format!("Invalid path: {}", err)).into()
    }));

    admin_routes::init_routes(cfg);
    user_routes::init_routes(cfg);
    team_routes::init_routes(cfg);
    invitation_routes::init_routes(cfg);
    project_routes::init_routes(cfg);
    task_routes::init_routes(cfg);
    analytics_routes::init_routes(cfg);
}
