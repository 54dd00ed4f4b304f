use crate::models::MemberRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_TEAM_COLOR: &str = "#3b82f6";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub is_active: bool,
    // Maintained by the store from the membership rows
    pub member_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub team_id: String,
    pub user_id: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub invited_by: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub color: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: String,
    #[serde(default)]
    pub role: MemberRole,
    pub invited_by: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub role: MemberRole,
}

impl Team {
    pub fn new(name: String, description: String, color: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            color: color.unwrap_or_else(|| DEFAULT_TEAM_COLOR.to_string()),
            is_active: true,
            member_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: UpdateTeamRequest) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

impl TeamMember {
    pub fn new(team_id: String, user_id: String, role: MemberRole, invited_by: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            team_id,
            user_id,
            role,
            joined_at: Utc::now(),
            invited_by,
        }
    }
}
