use crate::models::{ServiceError, Task, User};
use crate::services::analytics;
use crate::utils::database::{self, Database, DatabaseProvider};
use actix_web::{get, web, HttpResponse};
use chrono::{Duration, NaiveDate, Utc};
use log::{error, info};
use serde::Deserialize;

const DEFAULT_BURNDOWN_DAYS: i64 = 14;
const MAX_BURNDOWN_DAYS: i64 = 366;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub project_id: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

// Tasks in scope, cloned so the lock is released before aggregating
fn scoped_tasks(db: &Database, project_id: Option<&str>) -> Result<Vec<Task>, ServiceError> {
    match project_id {
        Some(project_id) => {
            if db.project(project_id).is_none() {
                error!("❌ Project not found: {}", project_id);
                return Err(ServiceError::not_found("Project", project_id));
            }
            Ok(db.tasks_for_project(project_id).into_iter().cloned().collect())
        }
        None => Ok(db.tasks().into_iter().cloned().collect()),
    }
}

// A team project is measured against its members, everything else against all users
fn scoped_users(db: &Database, project_id: Option<&str>) -> Vec<User> {
    let team_id = project_id
        .and_then(|id| db.project(id))
        .and_then(|project| project.team_id.as_deref());

    match team_id {
        Some(team_id) => db
            .members_of_team(team_id)
            .into_iter()
            .filter_map(|member| db.user(&member.user_id))
            .cloned()
            .collect(),
        None => db.users().into_iter().cloned().collect(),
    }
}

#[get("/api/analytics/burndown")]
async fn burndown(
    provider: web::Data<DatabaseProvider>,
    query: web::Query<AnalyticsQuery>,
) -> Result<HttpResponse, ServiceError> {
    let query = query.into_inner();
    let end = query.end.unwrap_or_else(|| Utc::now().date_naive());
    let start = match query.start {
        Some(start) => start,
        None => end
            .checked_sub_signed(Duration::days(DEFAULT_BURNDOWN_DAYS - 1))
            .ok_or_else(|| {
                ServiceError::BadRequest(format!("Burndown end date out of range: {}", end))
            })?,
    };

    if (end - start).num_days() >= MAX_BURNDOWN_DAYS {
        return Err(ServiceError::BadRequest(format!(
            "Burndown range is limited to {} days",
            MAX_BURNDOWN_DAYS
        )));
    }

    let tasks = {
        let store = provider.get_database();
        let db = database::read(&store)?;
        scoped_tasks(&db, query.project_id.as_deref())?
    };

    info!("📉 Burndown over {} tasks from {} to {}", tasks.len(), start, end);

    Ok(HttpResponse::Ok().json(analytics::burndown(&tasks, start, end)))
}

#[get("/api/analytics/workload")]
async fn workload(
    provider: web::Data<DatabaseProvider>,
    query: web::Query<AnalyticsQuery>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = query.into_inner().project_id;
    let (tasks, users) = {
        let store = provider.get_database();
        let db = database::read(&store)?;
        let tasks = scoped_tasks(&db, project_id.as_deref())?;
        (tasks, scoped_users(&db, project_id.as_deref()))
    };

    info!("📊 Workload over {} tasks and {} users", tasks.len(), users.len());

    Ok(HttpResponse::Ok().json(analytics::workload_distribution(&tasks, &users)))
}

#[get("/api/analytics/completion")]
async fn completion(
    provider: web::Data<DatabaseProvider>,
    query: web::Query<AnalyticsQuery>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = query.into_inner().project_id;
    let tasks = {
        let store = provider.get_database();
        let db = database::read(&store)?;
        scoped_tasks(&db, project_id.as_deref())?
    };

    Ok(HttpResponse::Ok().json(analytics::completion_stats(&tasks, Utc::now())))
}

#[get("/api/analytics/priority")]
async fn priority(
    provider: web::Data<DatabaseProvider>,
    query: web::Query<AnalyticsQuery>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = query.into_inner().project_id;
    let tasks = {
        let store = provider.get_database();
        let db = database::read(&store)?;
        scoped_tasks(&db, project_id.as_deref())?
    };

    Ok(HttpResponse::Ok().json(analytics::priority_distribution(&tasks)))
}

// Register all analytics routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(burndown)
        .service(workload)
        .service(completion)
        .service(priority);
}
