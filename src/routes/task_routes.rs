use crate::models::{CreateTaskRequest, ServiceError, Task, TaskFilter, UpdateTaskRequest};
use crate::utils::database::{self, Database, DatabaseProvider};
use crate::utils::validate;
use actix_web::{delete, get, post, put, web, HttpResponse};
use log::{debug, error, info};
use serde_json::json;

fn check_task(db: &Database, task: &Task) -> Result<(), ServiceError> {
    validate::non_blank("title", &task.title)?;

    if db.project(&task.project_id).is_none() {
        error!("❌ Project not found: {}", task.project_id);
        return Err(ServiceError::not_found("Project", &task.project_id));
    }
    if let Some(assignee_id) = &task.assignee_id {
        if db.user(assignee_id).is_none() {
            error!("❌ Assignee not found: {}", assignee_id);
            return Err(ServiceError::not_found("User", assignee_id));
        }
    }
    if let Some(unknown) = task.dependencies.iter().find(|id| db.task(id).is_none()) {
        error!("❌ Unknown dependency {} on task {}", unknown, task.id);
        return Err(ServiceError::BadRequest(format!("Unknown dependency: {}", unknown)));
    }
    if db.would_create_cycle(&task.id, &task.dependencies) {
        error!("❌ Dependencies of task {} would form a cycle", task.id);
        return Err(ServiceError::BadRequest(
            "Task dependencies would form a cycle".to_string(),
        ));
    }
    Ok(())
}

// List tasks, optionally filtered by project, assignee or status
#[get("/api/tasks")]
async fn list_tasks(
    provider: web::Data<DatabaseProvider>,
    query: web::Query<TaskFilter>,
) -> Result<HttpResponse, ServiceError> {
    let filter = query.into_inner();
    debug!("Task filter: {:?}", filter);

    let store = provider.get_database();
    let db = database::read(&store)?;

    let candidates = match (&filter.project_id, &filter.assignee_id) {
        (Some(project_id), _) => db.tasks_for_project(project_id),
        (None, Some(assignee_id)) => db.tasks_for_assignee(assignee_id),
        (None, None) => db.tasks(),
    };
    let tasks: Vec<&Task> = candidates
        .into_iter()
        .filter(|task| task.matches(&filter))
        .collect();

    info!("📋 Listing {} tasks", tasks.len());

    Ok(HttpResponse::Ok().json(tasks))
}

// Create a new task
#[post("/api/tasks")]
async fn create_task(
    provider: web::Data<DatabaseProvider>,
    data: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, ServiceError> {
    let task = Task::new(data.into_inner());

    info!("📝 Creating task: {} in project: {}", task.title, task.project_id);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    check_task(&db, &task)?;
    db.insert_task(task.clone());

    info!("✅ Task created: {}", task.id);

    Ok(HttpResponse::Created().json(task))
}

// Get a specific task
#[get("/api/tasks/{task_id}")]
async fn get_task(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    let store = provider.get_database();
    let db = database::read(&store)?;

    let task = db.task(&task_id).ok_or_else(|| {
        error!("❌ Task not found: {}", task_id);
        ServiceError::not_found("Task", &task_id)
    })?;

    Ok(HttpResponse::Ok().json(task))
}

// Update a task
#[put("/api/tasks/{task_id}")]
async fn update_task(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
    data: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();

    info!("🔄 Updating task: {}", task_id);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    let mut task = db.task(&task_id).cloned().ok_or_else(|| {
        error!("❌ Task not found: {}", task_id);
        ServiceError::not_found("Task", &task_id)
    })?;

    task.apply(data.into_inner());
    check_task(&db, &task)?;
    db.insert_task(task.clone());

    info!("✅ Task updated: {} ({:?})", task_id, task.status);

    Ok(HttpResponse::Ok().json(task))
}

// Delete a task; other tasks drop it from their dependencies
#[delete("/api/tasks/{task_id}")]
async fn delete_task(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();

    info!("🗑️ Deleting task: {}", task_id);

    let store = provider.get_database();
    if database::write(&store)?.remove_task(&task_id).is_none() {
        error!("❌ Task not found: {}", task_id);
        return Err(ServiceError::not_found("Task", &task_id));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted successfully",
        "id": task_id
    })))
}

// Register all task routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_tasks)
        .service(create_task)
        .service(get_task)
        .service(update_task)
        .service(delete_task);
}
