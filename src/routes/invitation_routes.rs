// projectlearn-mock-api/src/routes/invitation_routes.rs
use crate::config::Config;
use crate::models::{
    CreateInvitationRequest, InvitationStatus, RespondInvitationRequest, ServiceError,
    TeamInvitation, TeamMember,
};
use crate::utils::database::{self, DatabaseProvider};
use crate::utils::validate;
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, Debug)]
pub struct InvitationQuery {
    pub email: Option<String>,
}

// Create a new team invitation
#[post("/api/teams/{team_id}/invitations")]
async fn create_invitation(
    provider: web::Data<DatabaseProvider>,
    config: web::Data<Config>,
    path: web::Path<String>,
    data: web::Json<CreateInvitationRequest>,
) -> Result<HttpResponse, ServiceError> {
    let team_id = path.into_inner();
    let request = data.into_inner();
    validate::email(&request.email)?;
    let email = request.email.trim().to_string();

    info!("📧 Creating invitation to team: {} for email: {}", team_id, email);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    db.expire_invitations(Utc::now());

    if db.team(&team_id).is_none() {
        error!("❌ Team not found: {}", team_id);
        return Err(ServiceError::not_found("Team", &team_id));
    }
    if let Some(inviter) = &request.invited_by {
        if db.user(inviter).is_none() {
            error!("❌ Inviting user not found: {}", inviter);
            return Err(ServiceError::not_found("User", inviter));
        }
    }

    // Already a member?
    if let Some(user) = db.user_by_email(&email) {
        if db.membership(&team_id, &user.id).is_some() {
            error!("❌ {} is already a member of team: {}", email, team_id);
            return Err(ServiceError::Conflict(
                "User is already a member of the team".to_string(),
            ));
        }
    }

    let duplicate = db
        .invitations_for_email(&email)
        .iter()
        .any(|invitation| {
            invitation.team_id == team_id && invitation.status == InvitationStatus::Pending
        });
    if duplicate {
        error!("❌ Pending invitation already exists for {} in team: {}", email, team_id);
        return Err(ServiceError::Conflict(
            "An invitation for this user to this team already exists".to_string(),
        ));
    }

    let invitation = TeamInvitation::new(
        team_id,
        email,
        request.role,
        request.invited_by,
        config.invitation_ttl_days,
    );
    db.insert_invitation(invitation.clone());

    info!("✅ Invitation created: {}", invitation.id);

    Ok(HttpResponse::Created().json(invitation))
}

// Get all invitations for a team
#[get("/api/teams/{team_id}/invitations")]
async fn get_team_invitations(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let team_id = path.into_inner();

    info!("📋 Fetching invitations for team: {}", team_id);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    db.expire_invitations(Utc::now());

    if db.team(&team_id).is_none() {
        error!("❌ Team not found: {}", team_id);
        return Err(ServiceError::not_found("Team", &team_id));
    }

    let invitations = db.invitations_for_team(&team_id);

    info!("✅ Found {} invitations for team", invitations.len());

    Ok(HttpResponse::Ok().json(invitations))
}

// Get all invitations addressed to an email
#[get("/api/invitations")]
async fn get_email_invitations(
    provider: web::Data<DatabaseProvider>,
    query: web::Query<InvitationQuery>,
) -> Result<HttpResponse, ServiceError> {
    let email = match query.into_inner().email {
        Some(email) if !email.trim().is_empty() => email,
        _ => {
            return Err(ServiceError::BadRequest(
                "Missing 'email' query parameter".to_string(),
            ))
        }
    };

    info!("📋 Fetching invitations for email: {}", email);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    db.expire_invitations(Utc::now());
    let invitations = db.invitations_for_email(&email);

    info!("✅ Found {} invitations for email", invitations.len());

    Ok(HttpResponse::Ok().json(invitations))
}

// Respond to an invitation (accept/decline)
#[put("/api/invitations/{invitation_id}")]
async fn respond_to_invitation(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
    data: web::Json<RespondInvitationRequest>,
) -> Result<HttpResponse, ServiceError> {
    let invitation_id = path.into_inner();
    let status = data.status;

    if !matches!(status, InvitationStatus::Accepted | InvitationStatus::Declined) {
        return Err(ServiceError::BadRequest(format!(
            "Invalid status: {}. Must be 'accepted' or 'declined'",
            status.as_str()
        )));
    }

    info!("🔄 Responding to invitation {}: {:?}", invitation_id, status);

    let store = provider.get_database();
    let mut db = database::write(&store)?;
    db.expire_invitations(Utc::now());

    let mut invitation = db.invitation(&invitation_id).cloned().ok_or_else(|| {
        error!("❌ Invitation not found: {}", invitation_id);
        ServiceError::not_found("Invitation", &invitation_id)
    })?;

    if invitation.status != InvitationStatus::Pending {
        error!("❌ Invitation {} is already {}", invitation_id, invitation.status.as_str());
        return Err(ServiceError::BadRequest(format!(
            "Invitation is already {}",
            invitation.status.as_str()
        )));
    }

    if status == InvitationStatus::Accepted {
        let user_id = db
            .user_by_email(&invitation.email)
            .map(|user| user.id.clone())
            .ok_or_else(|| {
                error!("❌ No user registered with email: {}", invitation.email);
                ServiceError::NotFound(format!(
                    "No user registered with email: {}",
                    invitation.email
                ))
            })?;

        if db.membership(&invitation.team_id, &user_id).is_none() {
            db.insert_team_member(TeamMember::new(
                invitation.team_id.clone(),
                user_id.clone(),
                invitation.role,
                invitation.invited_by.clone(),
            ));
            info!("✅ User {} added to team: {}", user_id, invitation.team_id);
        }
    }

    invitation.status = status;
    db.insert_invitation(invitation.clone());

    Ok(HttpResponse::Ok().json(invitation))
}

// Cancel (delete) an invitation
#[delete("/api/invitations/{invitation_id}")]
async fn delete_invitation(
    provider: web::Data<DatabaseProvider>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let invitation_id = path.into_inner();

    info!("🗑️ Deleting invitation: {}", invitation_id);

    let store = provider.get_database();
    if database::write(&store)?.remove_invitation(&invitation_id).is_none() {
        error!("❌ Invitation not found: {}", invitation_id);
        return Err(ServiceError::not_found("Invitation", &invitation_id));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Invitation deleted successfully",
        "id": invitation_id
    })))
}

// Register all invitation routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_invitation)
        .service(get_team_invitations)
        .service(get_email_invitations)
        .service(respond_to_invitation)
        .service(delete_invitation);
}
