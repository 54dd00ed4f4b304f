use crate::models::{
    CreateProjectRequest, Project, ProjectFilter, ServiceError, UpdateProjectRequest,
};
use crate::utils::database::{self, Database, DatabaseProvider};
use crate::utils::validate;
use actix_web::{delete, get, post, put, web, HttpResponse};
use log::{debug, error, info};
use serde_json::json;

// References a project makes must resolve before it is stored
fn check_project(db: &Database, project: &Project) -> Result<(), ServiceError> {
    validate::non_blank("title", &project.title)?;
    validate::progress(project.progress)?;

    if db.user(&project.owner_id).is_none() {
        error!("❌ Owner not found: {}", project.owner_id);
        return Err(ServiceError::not_found("User", &project.owner_id));
    }
    if let Some(team_id) = &project.team_id {
        if db.team(team_id).is_none() {
            error!("❌ Team not found: {}", team_id);
            return Err(ServiceError::not_found("Team", team_id));
        }
    }
    Ok(())
}

// List projects, optionally filtered by owner, team or status
#[get("/api/projects")]
async fn list_projects(
    provider: web::Data<DatabaseProvider>,
    query: web::Query<ProjectFilter>,
) -> Result<HttpResponse, ServiceError> {
    let filter = query.into_inner();
    debug!("Project filter: {:?}", filter);

    let store = provider.get_database();
    let db = database::read(&store)?;

    let candidates = match (&filter.owner_id, &filter.team_id) {
        (Some(owner_id), _) => db.projects_for_owner(owner_id),
        (None, Some(team_id)) => db.projects_for_team(team_id),
        (None, None) => db.projects(),
    };
    let projects: Vec<&Project> = candidates
        .into_iter()
        .filter(|project| project.matches(&filter))
        .collect();

    info!("📋 Listing {} projects", projects.len());

    Ok(HttpResponse::Ok().json(projects))
}

// Create a new project
#[post("/api/projects")]
async fn create_project(
    provider: web::Data<DatabaseProvider>,
    data: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse, ServiceError> {
    let project = Project::new(data.into_inner());

    info!("📝 Creating project: {}", project.title);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    check_project(&db, &project)?;
    db.insert_project(project.clone());

    info!("✅ Project created: {}", project.id);

    Ok(HttpResponse::Created().json(project))
}

// Get a specific project
#[get("/api/projects/{project_id}")]
async fn get_project(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = path.into_inner();
    let store = provider.get_database();
    let db = database::read(&store)?;

    let project = db.project(&project_id).ok_or_else(|| {
        error!("❌ Project not found: {}", project_id);
        ServiceError::not_found("Project", &project_id)
    })?;

    Ok(HttpResponse::Ok().json(project))
}

// Update a project
#[put("/api/projects/{project_id}")]
async fn update_project(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
    data: web::Json<UpdateProjectRequest>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = path.into_inner();

    info!("🔄 Updating project: {}", project_id);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    let mut project = db.project(&project_id).cloned().ok_or_else(|| {
        error!("❌ Project not found: {}", project_id);
        ServiceError::not_found("Project", &project_id)
    })?;

    project.apply(data.into_inner());
    check_project(&db, &project)?;
    db.insert_project(project.clone());

    info!("✅ Project updated: {}", project_id);

    Ok(HttpResponse::Ok().json(project))
}

// Delete a project and all of its tasks
#[delete("/api/projects/{project_id}")]
async fn delete_project(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = path.into_inner();

    info!("🗑️ Deleting project: {}", project_id);

    let store = provider.get_database();
    if database::write(&store)?.remove_project(&project_id).is_none() {
        error!("❌ Project not found: {}", project_id);
        return Err(ServiceError::not_found("Project", &project_id));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Project deleted successfully",
        "id": project_id
    })))
}

// Tasks belonging to a project
#[get("/api/projects/{project_id}/tasks")]
async fn get_project_tasks(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = path.into_inner();
    let store = provider.get_database();
    let db = database::read(&store)?;

    if db.project(&project_id).is_none() {
        error!("❌ Project not found: {}", project_id);
        return Err(ServiceError::not_found("Project", &project_id));
    }

    let tasks = db.tasks_for_project(&project_id);

    info!("✅ Found {} tasks for project: {}", tasks.len(), project_id);

    Ok(HttpResponse::Ok().json(tasks))
}

// Register all project routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_projects)
        .service(create_project)
        .service(get_project)
        .service(update_project)
        .service(delete_project)
        .service(get_project_tasks);
}
