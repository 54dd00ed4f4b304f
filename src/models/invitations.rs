// projectlearn-mock-api/src/models/invitations.rs
use crate::models::MemberRole;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// Status for team invitations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
            InvitationStatus::Expired => "expired",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamInvitation {
    pub id: String,
    pub team_id: String,
    pub email: String,
    pub role: MemberRole,
    pub status: InvitationStatus,
    pub token: String,
    pub invited_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// Request to create a new invitation
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationRequest {
    pub email: String,
    #[serde(default)]
    pub role: MemberRole,
    pub invited_by: Option<String>,
}

// Body of PUT /api/invitations/{id}
#[derive(Serialize, Deserialize, Debug)]
pub struct RespondInvitationRequest {
    pub status: InvitationStatus,
}

impl TeamInvitation {
    pub fn new(
        team_id: String,
        email: String,
        role: MemberRole,
        invited_by: Option<String>,
        ttl_days: i64,
    ) -> Self {
        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();
        let token = invitation_token(&id, &email);

        Self {
            id,
            team_id,
            email,
            role,
            status: InvitationStatus::Pending,
            token,
            invited_by,
            created_at: now,
            expires_at: now + Duration::days(ttl_days),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    // Pending invitations past their deadline become expired
    pub fn refresh_status(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == InvitationStatus::Pending && self.is_expired_at(now) {
            self.status = InvitationStatus::Expired;
            return true;
        }
        false
    }
}

fn invitation_token(id: &str, email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(email.to_lowercase().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_invitation_is_pending_with_hex_token() {
        let invitation = TeamInvitation::new(
            "team-1".to_string(),
            "dev@example.com".to_string(),
            MemberRole::Member,
            None,
            7,
        );

        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(invitation.token.len(), 64);
        assert!(invitation.token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(invitation.expires_at - invitation.created_at, Duration::days(7));
    }

    #[test]
    fn refresh_status_only_expires_pending() {
        let mut invitation = TeamInvitation::new(
            "team-1".to_string(),
            "dev@example.com".to_string(),
            MemberRole::Member,
            None,
            1,
        );
        let later = invitation.expires_at + Duration::hours(1);

        assert!(!invitation.refresh_status(invitation.created_at));
        assert!(invitation.refresh_status(later));
        assert_eq!(invitation.status, InvitationStatus::Expired);

        invitation.status = InvitationStatus::Accepted;
        assert!(!invitation.refresh_status(later));
        assert_eq!(invitation.status, InvitationStatus::Accepted);
    }
}
