use crate::models::{CreateUserRequest, ServiceError, User};
use crate::utils::database::{self, DatabaseProvider};
use crate::utils::validate;
use actix_web::{delete, get, post, web, HttpResponse};
use log::{error, info};
use serde_json::json;

// List all users
#[get("/api/users")]
async fn list_users(provider: web::Data<DatabaseProvider>) -> Result<HttpResponse, ServiceError> {
    let store = provider.get_database();
    let db = database::read(&store)?;
    let users: Vec<&User> = db.users();

    info!("📋 Listing {} users", users.len());

    Ok(HttpResponse::Ok().json(users))
}

// Create a new user
#[post("/api/users")]
async fn create_user(
    provider: web::Data<DatabaseProvider>,
    data: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ServiceError> {
    let request = data.into_inner();
    validate::non_blank("name", &request.name)?;
    validate::email(&request.email)?;

    info!("📝 Creating user: {}", request.email);

    let store = provider.get_database();
    let mut db = database::write(&store)?;

    if db.user_by_email(&request.email).is_some() {
        error!("❌ Email already registered: {}", request.email);
        return Err(ServiceError::Conflict(format!(
            "Email already registered: {}",
            request.email
        )));
    }

    let user = User::new(
        request.name.trim().to_string(),
        request.email.trim().to_string(),
        request.role,
        request.avatar,
    );
    db.insert_user(user.clone());

    info!("✅ User created: {}", user.id);

    Ok(HttpResponse::Created().json(user))
}

// Get a specific user
#[get("/api/users/{user_id}")]
async fn get_user(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = path.into_inner();
    let store = provider.get_database();
    let db = database::read(&store)?;

    let user = db.user(&user_id).ok_or_else(|| {
        error!("❌ User not found: {}", user_id);
        ServiceError::not_found("User", &user_id)
    })?;

    Ok(HttpResponse::Ok().json(user))
}

// Tasks assigned to a user
#[get("/api/users/{user_id}/tasks")]
async fn get_user_tasks(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = path.into_inner();
    let store = provider.get_database();
    let db = database::read(&store)?;

    if db.user(&user_id).is_none() {
        error!("❌ User not found: {}", user_id);
        return Err(ServiceError::not_found("User", &user_id));
    }

    let tasks = db.tasks_for_assignee(&user_id);

    Ok(HttpResponse::Ok().json(tasks))
}

// Teams the user belongs to
#[get("/api/users/{user_id}/teams")]
async fn get_user_teams(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = path.into_inner();
    let store = provider.get_database();
    let db = database::read(&store)?;

    if db.user(&user_id).is_none() {
        error!("❌ User not found: {}", user_id);
        return Err(ServiceError::not_found("User", &user_id));
    }

    let teams: Vec<_> = db
        .memberships_of_user(&user_id)
        .into_iter()
        .filter_map(|member| db.team(&member.team_id))
        .collect();

    info!("✅ Found {} teams for user: {}", teams.len(), user_id);

    Ok(HttpResponse::Ok().json(teams))
}

// Delete a user. Users who still own projects cannot be deleted.
#[delete("/api/users/{user_id}")]
async fn delete_user(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = path.into_inner();

    info!("🗑️ Deleting user: {}", user_id);

    let store = provider.get_database();
    let mut db = database::write(&store)?;

    if db.user(&user_id).is_none() {
        error!("❌ User not found: {}", user_id);
        return Err(ServiceError::not_found("User", &user_id));
    }

    let owned = db.projects_for_owner(&user_id).len();
    if owned > 0 {
        error!("❌ User {} still owns {} projects", user_id, owned);
        return Err(ServiceError::Conflict(format!(
            "User still owns {} projects",
            owned
        )));
    }

    db.remove_user(&user_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User deleted successfully",
        "id": user_id
    })))
}

// Register all user routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(create_user)
        .service(get_user)
        .service(get_user_tasks)
        .service(get_user_teams)
        .service(delete_user);
}
