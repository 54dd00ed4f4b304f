use crate::models::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub project_id: String,
    pub assignee_id: Option<String>,
    // Ids of tasks that must finish first
    pub dependencies: Vec<String>,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    pub project_id: String,
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<String>,
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub unassign: bool,
    pub dependencies: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub project_id: Option<String>,
    pub assignee_id: Option<String>,
    pub status: Option<TaskStatus>,
}

impl Task {
    pub fn new(request: CreateTaskRequest) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            project_id: request.project_id,
            assignee_id: request.assignee_id,
            dependencies: request.dependencies,
            tags: request.tags,
            due_date: request.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: UpdateTaskRequest) {
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
        if let Some(project_id) = update.project_id {
            self.project_id = project_id;
        }
        if update.unassign {
            self.assignee_id = None;
        } else if let Some(assignee_id) = update.assignee_id {
            self.assignee_id = Some(assignee_id);
        }
        if let Some(dependencies) = update.dependencies {
            self.dependencies = dependencies;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = Utc::now();
    }

    pub fn matches(&self, filter: &TaskFilter) -> bool {
        filter.status.map_or(true, |status| self.status == status)
            && filter
                .project_id
                .as_ref()
                .map_or(true, |project| &self.project_id == project)
            && filter
                .assignee_id
                .as_ref()
                .map_or(true, |assignee| self.assignee_id.as_ref() == Some(assignee))
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}
