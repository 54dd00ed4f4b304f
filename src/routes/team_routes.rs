use crate::models::{
    AddMemberRequest, CreateTeamRequest, ServiceError, Team, TeamMember, UpdateMemberRequest,
    UpdateTeamRequest,
};
use crate::utils::database::{self, DatabaseProvider};
use crate::utils::validate;
use actix_web::{delete, get, post, put, web, HttpResponse};
use log::{error, info};
use serde_json::json;

// List all teams
#[get("/api/teams")]
async fn list_teams(provider: web::Data<DatabaseProvider>) -> Result<HttpResponse, ServiceError> {
    let store = provider.get_database();
    let db = database::read(&store)?;
    let teams = db.teams();

    info!("📋 Listing {} teams", teams.len());

    Ok(HttpResponse::Ok().json(teams))
}

// Create a new team
#[post("/api/teams")]
async fn create_team(
    provider: web::Data<DatabaseProvider>,
    data: web::Json<CreateTeamRequest>,
) -> Result<HttpResponse, ServiceError> {
    let request = data.into_inner();
    validate::non_blank("name", &request.name)?;

    info!("📝 Creating new team: {}", request.name);

    let team = Team::new(request.name.trim().to_string(), request.description, request.color);

    let store = provider.get_database();
    database::write(&store)?.insert_team(team.clone());

    info!("✅ Team created successfully: {}", team.id);

    Ok(HttpResponse::Created().json(team))
}

// Get a specific team by ID
#[get("/api/teams/{team_id}")]
async fn get_team(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let team_id = path.into_inner();

    info!("🔍 Fetching team: {}", team_id);

    let store = provider.get_database();
    let db = database::read(&store)?;
    let team = db.team(&team_id).ok_or_else(|| {
        error!("❌ Team not found: {}", team_id);
        ServiceError::not_found("Team", &team_id)
    })?;

    Ok(HttpResponse::Ok().json(team))
}

// Update team details
#[put("/api/teams/{team_id}")]
async fn update_team(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
    data: web::Json<UpdateTeamRequest>,
) -> Result<HttpResponse, ServiceError> {
    let team_id = path.into_inner();
    let update = data.into_inner();
    if let Some(name) = &update.name {
        validate::non_blank("name", name)?;
    }

    info!("🔄 Updating team: {}", team_id);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    let mut team = db.team(&team_id).cloned().ok_or_else(|| {
        error!("❌ Team not found: {}", team_id);
        ServiceError::not_found("Team", &team_id)
    })?;

    team.apply(update);
    db.insert_team(team.clone());

    info!("✅ Team updated: {}", team_id);

    Ok(HttpResponse::Ok().json(team))
}

// Delete a team along with its memberships and invitations
#[delete("/api/teams/{team_id}")]
async fn delete_team(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let team_id = path.into_inner();

    info!("🗑️ Deleting team: {}", team_id);

    let store = provider.get_database();
    if database::write(&store)?.remove_team(&team_id).is_none() {
        error!("❌ Team not found: {}", team_id);
        return Err(ServiceError::not_found("Team", &team_id));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Team deleted successfully",
        "id": team_id
    })))
}

// Get team members
#[get("/api/teams/{team_id}/members")]
async fn get_team_members(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let team_id = path.into_inner();

    info!("📋 Fetching members for team: {}", team_id);

    let store = provider.get_database();
    let db = database::read(&store)?;
    if db.team(&team_id).is_none() {
        error!("❌ Team not found: {}", team_id);
        return Err(ServiceError::not_found("Team", &team_id));
    }

    let members = db.members_of_team(&team_id);

    info!("✅ Found {} team members", members.len());

    Ok(HttpResponse::Ok().json(members))
}

// Projects assigned to a team
#[get("/api/teams/{team_id}/projects")]
async fn get_team_projects(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let team_id = path.into_inner();
    let store = provider.get_database();
    let db = database::read(&store)?;
    if db.team(&team_id).is_none() {
        error!("❌ Team not found: {}", team_id);
        return Err(ServiceError::not_found("Team", &team_id));
    }

    let projects = db.projects_for_team(&team_id);

    Ok(HttpResponse::Ok().json(projects))
}

// Add a user to a team
#[post("/api/teams/{team_id}/members")]
async fn add_team_member(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
    data: web::Json<AddMemberRequest>,
) -> Result<HttpResponse, ServiceError> {
    let team_id = path.into_inner();
    let request = data.into_inner();

    info!("👥 Adding user: {} to team: {}", request.user_id, team_id);

    let store = provider.get_database();
    let mut db = database::write(&store)?;

    if db.team(&team_id).is_none() {
        error!("❌ Team not found: {}", team_id);
        return Err(ServiceError::not_found("Team", &team_id));
    }
    if db.user(&request.user_id).is_none() {
        error!("❌ User not found: {}", request.user_id);
        return Err(ServiceError::not_found("User", &request.user_id));
    }
    if let Some(inviter) = &request.invited_by {
        if db.user(inviter).is_none() {
            error!("❌ Inviting user not found: {}", inviter);
            return Err(ServiceError::not_found("User", inviter));
        }
    }
    if db.membership(&team_id, &request.user_id).is_some() {
        error!("❌ User: {} is already in team: {}", request.user_id, team_id);
        return Err(ServiceError::Conflict(
            "User is already a member of the team".to_string(),
        ));
    }

    let member = TeamMember::new(team_id.clone(), request.user_id, request.role, request.invited_by);
    db.insert_team_member(member.clone());

    info!("✅ User: {} added to team: {} with role: {:?}", member.user_id, team_id, member.role);

    Ok(HttpResponse::Created().json(member))
}

// Update a team member's role
#[put("/api/teams/{team_id}/members/{user_id}")]
async fn update_team_member_role(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<(String, String)>,
    data: web::Json<UpdateMemberRequest>,
) -> Result<HttpResponse, ServiceError> {
    let (team_id, user_id) = path.into_inner();

    info!("🔄 Updating role for user: {} in team: {}", user_id, team_id);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    let mut member = db.membership(&team_id, &user_id).cloned().ok_or_else(|| {
        error!("❌ User: {} is not a member of team: {}", user_id, team_id);
        ServiceError::NotFound(format!("User {} is not a member of team {}", user_id, team_id))
    })?;

    member.role = data.role;
    db.insert_team_member(member.clone());

    Ok(HttpResponse::Ok().json(member))
}

// Remove a member from a team
#[delete("/api/teams/{team_id}/members/{user_id}")]
async fn remove_team_member(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (team_id, user_id) = path.into_inner();

    info!("🗑️ Removing user: {} from team: {}", user_id, team_id);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    let member_id = db
        .membership(&team_id, &user_id)
        .map(|member| member.id.clone())
        .ok_or_else(|| {
            error!("❌ User: {} is not a member of team: {}", user_id, team_id);
            ServiceError::NotFound(format!("User {} is not a member of team {}", user_id, team_id))
        })?;

    db.remove_team_member(&member_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User removed from team successfully",
        "userId": user_id,
        "teamId": team_id
    })))
}

// Register all team routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_teams)
        .service(create_team)
        .service(get_team)
        .service(update_team)
        .service(delete_team)
        .service(get_team_members)
        .service(get_team_projects)
        .service(add_team_member)
        .service(update_team_member_role)
        .service(remove_team_member);
}
