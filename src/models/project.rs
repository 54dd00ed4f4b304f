use crate::models::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    // Percent complete, 0 to 100
    pub progress: u8,
    pub owner_id: String,
    pub team_id: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub progress: u8,
    pub owner_id: String,
    pub team_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// `teamId: null` is indistinguishable from an absent field, so detaching
// a project from its team goes through `clearTeam`.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub progress: Option<u8>,
    pub owner_id: Option<String>,
    pub team_id: Option<String>,
    #[serde(default)]
    pub clear_team: bool,
    pub tags: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilter {
    pub owner_id: Option<String>,
    pub team_id: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl Project {
    pub fn new(request: CreateProjectRequest) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            progress: request.progress,
            owner_id: request.owner_id,
            team_id: request.team_id,
            tags: request.tags,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: UpdateProjectRequest) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(progress) = update.progress {
            self.progress = progress;
        }
        if let Some(owner_id) = update.owner_id {
            self.owner_id = owner_id;
        }
        if update.clear_team {
            self.team_id = None;
        } else if let Some(team_id) = update.team_id {
            self.team_id = Some(team_id);
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        self.updated_at = Utc::now();
    }

    pub fn matches(&self, filter: &ProjectFilter) -> bool {
        filter.status.map_or(true, |status| self.status == status)
            && filter.owner_id.as_ref().map_or(true, |owner| &self.owner_id == owner)
            && filter
                .team_id
                .as_ref()
                .map_or(true, |team| self.team_id.as_ref() == Some(team))
    }
}
