// projectlearn-mock-api/src/utils/database.rs
// In-memory relational store backing the mock API. Every write goes through
// an insert_* or remove_* method that updates the entity map and its indexes
// together; the last id removed from an index key drops the key.
use crate::models::{Project, ServiceError, Task, Team, TeamInvitation, TeamMember, User};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type Index = HashMap<String, HashSet<String>>;

pub type SharedDatabase = Arc<RwLock<Database>>;

// Secondary indexes, foreign key -> dependent ids
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Indexes {
    pub users_by_email: Index,
    pub members_by_team: Index,
    pub members_by_user: Index,
    pub invitations_by_team: Index,
    pub invitations_by_email: Index,
    pub projects_by_owner: Index,
    pub projects_by_team: Index,
    pub tasks_by_project: Index,
    pub tasks_by_assignee: Index,
    // dependency id -> tasks that depend on it
    pub dependents_by_task: Index,
}

impl Indexes {
    pub fn named(&self) -> Vec<(&'static str, &Index)> {
        vec![
            ("usersByEmail", &self.users_by_email),
            ("membersByTeam", &self.members_by_team),
            ("membersByUser", &self.members_by_user),
            ("invitationsByTeam", &self.invitations_by_team),
            ("invitationsByEmail", &self.invitations_by_email),
            ("projectsByOwner", &self.projects_by_owner),
            ("projectsByTeam", &self.projects_by_team),
            ("tasksByProject", &self.tasks_by_project),
            ("tasksByAssignee", &self.tasks_by_assignee),
            ("dependentsByTask", &self.dependents_by_task),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.named().iter().all(|(_, index)| index.is_empty())
    }
}

fn link(index: &mut Index, key: &str, id: &str) {
    index.entry(key.to_string()).or_default().insert(id.to_string());
}

fn unlink(index: &mut Index, key: &str, id: &str) {
    if let Some(ids) = index.get_mut(key) {
        ids.remove(id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn ids_in(index: &Index, key: &str) -> Vec<String> {
    index
        .get(key)
        .map(|ids| ids.iter().cloned().collect())
        .unwrap_or_default()
}

// Deterministic ordering for listings: creation time, then id
fn sorted_by_creation<'a, T, F>(items: impl Iterator<Item = &'a T>, key: F) -> Vec<&'a T>
where
    T: 'a,
    F: Fn(&T) -> (DateTime<Utc>, &str),
{
    let mut items: Vec<&T> = items.collect();
    items.sort_by(|a, b| key(*a).cmp(&key(*b)));
    items
}

#[derive(Debug, Default)]
pub struct Database {
    users: HashMap<String, User>,
    teams: HashMap<String, Team>,
    team_members: HashMap<String, TeamMember>,
    invitations: HashMap<String, TeamInvitation>,
    projects: HashMap<String, Project>,
    tasks: HashMap<String, Task>,
    indexes: Indexes,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indexes(&self) -> &Indexes {
        &self.indexes
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.teams.is_empty()
            && self.team_members.is_empty()
            && self.invitations.is_empty()
            && self.projects.is_empty()
            && self.tasks.is_empty()
            && self.indexes.is_empty()
    }

    // ---- users ----

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn users(&self) -> Vec<&User> {
        sorted_by_creation(self.users.values(), |u| (u.created_at, u.id.as_str()))
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        let ids = self.indexes.users_by_email.get(&email_key(email))?;
        sorted_by_creation(ids.iter().filter_map(|id| self.users.get(id)), |u| {
            (u.created_at, u.id.as_str())
        })
        .into_iter()
        .next()
    }

    pub fn insert_user(&mut self, user: User) -> Option<User> {
        let previous = self.users.remove(&user.id);
        if let Some(old) = &previous {
            unlink(&mut self.indexes.users_by_email, &email_key(&old.email), &old.id);
        }
        link(&mut self.indexes.users_by_email, &email_key(&user.email), &user.id);
        self.users.insert(user.id.clone(), user);
        previous
    }

    // Drops the user's memberships and unassigns their tasks. Owned projects
    // are left in place.
    pub fn remove_user(&mut self, id: &str) -> Option<User> {
        let user = self.users.remove(id)?;
        unlink(&mut self.indexes.users_by_email, &email_key(&user.email), id);

        for member_id in ids_in(&self.indexes.members_by_user, id) {
            self.remove_team_member(&member_id);
        }

        for task_id in ids_in(&self.indexes.tasks_by_assignee, id) {
            if let Some(task) = self.tasks.get_mut(&task_id) {
                task.assignee_id = None;
            }
        }
        self.indexes.tasks_by_assignee.remove(id);

        let invited_by_user = |invited_by: &Option<String>| invited_by.as_deref() == Some(id);
        for member in self.team_members.values_mut() {
            if invited_by_user(&member.invited_by) {
                member.invited_by = None;
            }
        }
        for invitation in self.invitations.values_mut() {
            if invited_by_user(&invitation.invited_by) {
                invitation.invited_by = None;
            }
        }

        debug!("Removed user {} and their memberships", id);
        Some(user)
    }

    // ---- teams ----

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.get(id)
    }

    pub fn teams(&self) -> Vec<&Team> {
        sorted_by_creation(self.teams.values(), |t| (t.created_at, t.id.as_str()))
    }

    pub fn insert_team(&mut self, mut team: Team) -> Option<Team> {
        team.member_count = self
            .indexes
            .members_by_team
            .get(&team.id)
            .map_or(0, |ids| ids.len());
        self.teams.insert(team.id.clone(), team)
    }

    // Cascades to memberships and invitations; projects are detached.
    pub fn remove_team(&mut self, id: &str) -> Option<Team> {
        let team = self.teams.remove(id)?;

        for member_id in ids_in(&self.indexes.members_by_team, id) {
            self.remove_team_member(&member_id);
        }
        for invitation_id in ids_in(&self.indexes.invitations_by_team, id) {
            self.remove_invitation(&invitation_id);
        }
        for project_id in ids_in(&self.indexes.projects_by_team, id) {
            if let Some(project) = self.projects.get_mut(&project_id) {
                project.team_id = None;
            }
        }
        self.indexes.projects_by_team.remove(id);

        debug!("Removed team {} with its members and invitations", id);
        Some(team)
    }

    fn refresh_member_count(&mut self, team_id: &str) {
        let count = self
            .indexes
            .members_by_team
            .get(team_id)
            .map_or(0, |ids| ids.len());
        if let Some(team) = self.teams.get_mut(team_id) {
            team.member_count = count;
        }
    }

    // ---- team members ----

    pub fn team_member(&self, id: &str) -> Option<&TeamMember> {
        self.team_members.get(id)
    }

    pub fn members_of_team(&self, team_id: &str) -> Vec<&TeamMember> {
        let ids = self.indexes.members_by_team.get(team_id);
        sorted_by_creation(
            ids.into_iter()
                .flatten()
                .filter_map(|id| self.team_members.get(id)),
            |m| (m.joined_at, m.id.as_str()),
        )
    }

    pub fn memberships_of_user(&self, user_id: &str) -> Vec<&TeamMember> {
        let ids = self.indexes.members_by_user.get(user_id);
        sorted_by_creation(
            ids.into_iter()
                .flatten()
                .filter_map(|id| self.team_members.get(id)),
            |m| (m.joined_at, m.id.as_str()),
        )
    }

    pub fn membership(&self, team_id: &str, user_id: &str) -> Option<&TeamMember> {
        self.members_of_team(team_id)
            .into_iter()
            .find(|member| member.user_id == user_id)
    }

    pub fn insert_team_member(&mut self, member: TeamMember) -> Option<TeamMember> {
        let previous = self.team_members.remove(&member.id);
        if let Some(old) = &previous {
            unlink(&mut self.indexes.members_by_team, &old.team_id, &old.id);
            unlink(&mut self.indexes.members_by_user, &old.user_id, &old.id);
            self.refresh_member_count(&old.team_id);
        }
        link(&mut self.indexes.members_by_team, &member.team_id, &member.id);
        link(&mut self.indexes.members_by_user, &member.user_id, &member.id);
        let team_id = member.team_id.clone();
        self.team_members.insert(member.id.clone(), member);
        self.refresh_member_count(&team_id);
        previous
    }

    pub fn remove_team_member(&mut self, id: &str) -> Option<TeamMember> {
        let member = self.team_members.remove(id)?;
        unlink(&mut self.indexes.members_by_team, &member.team_id, id);
        unlink(&mut self.indexes.members_by_user, &member.user_id, id);
        self.refresh_member_count(&member.team_id);
        Some(member)
    }

    // ---- invitations ----

    pub fn invitation(&self, id: &str) -> Option<&TeamInvitation> {
        self.invitations.get(id)
    }

    pub fn invitations_for_team(&self, team_id: &str) -> Vec<&TeamInvitation> {
        let ids = self.indexes.invitations_by_team.get(team_id);
        sorted_by_creation(
            ids.into_iter()
                .flatten()
                .filter_map(|id| self.invitations.get(id)),
            |i| (i.created_at, i.id.as_str()),
        )
    }

    pub fn invitations_for_email(&self, email: &str) -> Vec<&TeamInvitation> {
        let ids = self.indexes.invitations_by_email.get(&email_key(email));
        sorted_by_creation(
            ids.into_iter()
                .flatten()
                .filter_map(|id| self.invitations.get(id)),
            |i| (i.created_at, i.id.as_str()),
        )
    }

    pub fn insert_invitation(&mut self, invitation: TeamInvitation) -> Option<TeamInvitation> {
        let previous = self.invitations.remove(&invitation.id);
        if let Some(old) = &previous {
            unlink(&mut self.indexes.invitations_by_team, &old.team_id, &old.id);
            unlink(&mut self.indexes.invitations_by_email, &email_key(&old.email), &old.id);
        }
        link(&mut self.indexes.invitations_by_team, &invitation.team_id, &invitation.id);
        link(
            &mut self.indexes.invitations_by_email,
            &email_key(&invitation.email),
            &invitation.id,
        );
        self.invitations.insert(invitation.id.clone(), invitation);
        previous
    }

    pub fn remove_invitation(&mut self, id: &str) -> Option<TeamInvitation> {
        let invitation = self.invitations.remove(id)?;
        unlink(&mut self.indexes.invitations_by_team, &invitation.team_id, id);
        unlink(&mut self.indexes.invitations_by_email, &email_key(&invitation.email), id);
        Some(invitation)
    }

    // Marks overdue pending invitations as expired, returns how many changed
    pub fn expire_invitations(&mut self, now: DateTime<Utc>) -> usize {
        let expired = self
            .invitations
            .values_mut()
            .map(|invitation| invitation.refresh_status(now))
            .filter(|changed| *changed)
            .count();
        if expired > 0 {
            debug!("Expired {} pending invitations", expired);
        }
        expired
    }

    // ---- projects ----

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn projects(&self) -> Vec<&Project> {
        sorted_by_creation(self.projects.values(), |p| (p.created_at, p.id.as_str()))
    }

    pub fn projects_for_owner(&self, owner_id: &str) -> Vec<&Project> {
        let ids = self.indexes.projects_by_owner.get(owner_id);
        sorted_by_creation(
            ids.into_iter().flatten().filter_map(|id| self.projects.get(id)),
            |p| (p.created_at, p.id.as_str()),
        )
    }

    pub fn projects_for_team(&self, team_id: &str) -> Vec<&Project> {
        let ids = self.indexes.projects_by_team.get(team_id);
        sorted_by_creation(
            ids.into_iter().flatten().filter_map(|id| self.projects.get(id)),
            |p| (p.created_at, p.id.as_str()),
        )
    }

    pub fn insert_project(&mut self, project: Project) -> Option<Project> {
        let previous = self.projects.remove(&project.id);
        if let Some(old) = &previous {
            unlink(&mut self.indexes.projects_by_owner, &old.owner_id, &old.id);
            if let Some(team_id) = &old.team_id {
                unlink(&mut self.indexes.projects_by_team, team_id, &old.id);
            }
        }
        link(&mut self.indexes.projects_by_owner, &project.owner_id, &project.id);
        if let Some(team_id) = &project.team_id {
            link(&mut self.indexes.projects_by_team, team_id, &project.id);
        }
        self.projects.insert(project.id.clone(), project);
        previous
    }

    // Cascades to the project's tasks
    pub fn remove_project(&mut self, id: &str) -> Option<Project> {
        let project = self.projects.remove(id)?;
        unlink(&mut self.indexes.projects_by_owner, &project.owner_id, id);
        if let Some(team_id) = &project.team_id {
            unlink(&mut self.indexes.projects_by_team, team_id, id);
        }

        let task_ids = ids_in(&self.indexes.tasks_by_project, id);
        for task_id in &task_ids {
            self.remove_task(task_id);
        }

        debug!("Removed project {} and {} tasks", id, task_ids.len());
        Some(project)
    }

    // ---- tasks ----

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn tasks(&self) -> Vec<&Task> {
        sorted_by_creation(self.tasks.values(), |t| (t.created_at, t.id.as_str()))
    }

    pub fn tasks_for_project(&self, project_id: &str) -> Vec<&Task> {
        let ids = self.indexes.tasks_by_project.get(project_id);
        sorted_by_creation(
            ids.into_iter().flatten().filter_map(|id| self.tasks.get(id)),
            |t| (t.created_at, t.id.as_str()),
        )
    }

    pub fn tasks_for_assignee(&self, user_id: &str) -> Vec<&Task> {
        let ids = self.indexes.tasks_by_assignee.get(user_id);
        sorted_by_creation(
            ids.into_iter().flatten().filter_map(|id| self.tasks.get(id)),
            |t| (t.created_at, t.id.as_str()),
        )
    }

    pub fn insert_task(&mut self, task: Task) -> Option<Task> {
        let previous = self.tasks.remove(&task.id);
        if let Some(old) = &previous {
            self.unindex_task(old);
        }
        link(&mut self.indexes.tasks_by_project, &task.project_id, &task.id);
        if let Some(assignee_id) = &task.assignee_id {
            link(&mut self.indexes.tasks_by_assignee, assignee_id, &task.id);
        }
        for dependency in &task.dependencies {
            link(&mut self.indexes.dependents_by_task, dependency, &task.id);
        }
        self.tasks.insert(task.id.clone(), task);
        previous
    }

    // Also strips the task from every dependency list that names it
    pub fn remove_task(&mut self, id: &str) -> Option<Task> {
        let task = self.tasks.remove(id)?;
        self.unindex_task(&task);

        for dependent_id in ids_in(&self.indexes.dependents_by_task, id) {
            if let Some(dependent) = self.tasks.get_mut(&dependent_id) {
                dependent.dependencies.retain(|dependency| dependency != id);
            }
        }
        self.indexes.dependents_by_task.remove(id);

        Some(task)
    }

    fn unindex_task(&mut self, task: &Task) {
        unlink(&mut self.indexes.tasks_by_project, &task.project_id, &task.id);
        if let Some(assignee_id) = &task.assignee_id {
            unlink(&mut self.indexes.tasks_by_assignee, assignee_id, &task.id);
        }
        for dependency in &task.dependencies {
            unlink(&mut self.indexes.dependents_by_task, dependency, &task.id);
        }
    }

    pub(crate) fn all_users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub(crate) fn all_team_members(&self) -> impl Iterator<Item = &TeamMember> {
        self.team_members.values()
    }

    pub(crate) fn all_invitations(&self) -> impl Iterator<Item = &TeamInvitation> {
        self.invitations.values()
    }

    pub(crate) fn all_teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    pub(crate) fn all_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub(crate) fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }
}

// Owns the shared store handle. Built by the server bootstrap or a test
// harness and passed to whoever needs the store.
#[derive(Debug, Default)]
pub struct DatabaseProvider {
    slot: Mutex<Option<SharedDatabase>>,
}

impl DatabaseProvider {
    pub fn new() -> Self {
        Self::default()
    }

    // Replaces any previous instance with a fresh empty store
    pub fn initialize_database(&self) -> SharedDatabase {
        let database: SharedDatabase = Arc::new(RwLock::new(Database::new()));
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(Arc::clone(&database));
        info!("🗄️ Initialized empty mock database");
        database
    }

    // Lazily creates the store on first access; the slot lock is held
    // across creation so concurrent first callers share one instance
    pub fn get_database(&self) -> SharedDatabase {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let database = slot.get_or_insert_with(|| {
            info!("🗄️ Initialized empty mock database");
            Arc::new(RwLock::new(Database::new()))
        });
        Arc::clone(database)
    }
}

pub fn read(database: &SharedDatabase) -> Result<RwLockReadGuard<'_, Database>, ServiceError> {
    database.read().map_err(|e| {
        error!("Database lock poisoned: {:?}", e);
        ServiceError::InternalServerError
    })
}

pub fn write(database: &SharedDatabase) -> Result<RwLockWriteGuard<'_, Database>, ServiceError> {
    database.write().map_err(|e| {
        error!("Database lock poisoned: {:?}", e);
        ServiceError::InternalServerError
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateProjectRequest, CreateTaskRequest, MemberRole};
    use crate::utils::integrity::IntegrityIssue;
    use std::sync::Barrier;
    use std::thread;

    fn project(id: &str, owner_id: &str, team_id: Option<&str>) -> Project {
        let mut project = Project::new(CreateProjectRequest {
            title: format!("Project {}", id),
            description: String::new(),
            status: Default::default(),
            priority: Default::default(),
            progress: 0,
            owner_id: owner_id.to_string(),
            team_id: team_id.map(str::to_string),
            tags: Vec::new(),
        });
        project.id = id.to_string();
        project
    }

    fn task(id: &str, project_id: &str, assignee_id: Option<&str>, dependencies: &[&str]) -> Task {
        let mut task = Task::new(CreateTaskRequest {
            title: format!("Task {}", id),
            description: String::new(),
            status: Default::default(),
            priority: Default::default(),
            project_id: project_id.to_string(),
            assignee_id: assignee_id.map(str::to_string),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            tags: Vec::new(),
            due_date: None,
        });
        task.id = id.to_string();
        task
    }

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn get_database_returns_same_handle() {
        let provider = DatabaseProvider::new();
        let first = provider.get_database();
        let second = provider.get_database();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn initialize_database_replaces_previous_instance() {
        let provider = DatabaseProvider::new();
        let first = provider.get_database();
        first.write().unwrap().insert_project(project("p1", "u1", None));

        let second = provider.initialize_database();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &provider.get_database()));
        assert!(second.read().unwrap().is_empty());
    }

    #[test]
    fn fresh_database_is_empty() {
        let provider = DatabaseProvider::new();
        let database = provider.initialize_database();
        let db = database.read().unwrap();
        assert!(db.is_empty());
        assert!(db.indexes().named().iter().all(|(_, index)| index.is_empty()));
    }

    #[test]
    fn task_insert_registers_project_index() {
        let mut db = Database::new();
        db.insert_project(project("p1", "u1", None));
        db.insert_task(task("t1", "p1", None, &[]));

        assert_eq!(db.task("t1").unwrap().project_id, "p1");
        assert!(db.indexes().tasks_by_project.get("p1").unwrap().contains("t1"));
    }

    #[test]
    fn replacing_task_moves_index_entries() {
        let mut db = Database::new();
        db.insert_project(project("p1", "u1", None));
        db.insert_project(project("p2", "u1", None));
        db.insert_task(task("t1", "p1", Some("u1"), &[]));

        let previous = db.insert_task(task("t1", "p2", Some("u2"), &[]));
        assert!(previous.is_some());

        assert!(db.indexes().tasks_by_project.get("p1").is_none());
        assert_eq!(db.indexes().tasks_by_project.get("p2"), Some(&set(&["t1"])));
        assert!(db.indexes().tasks_by_assignee.get("u1").is_none());
        assert_eq!(db.indexes().tasks_by_assignee.get("u2"), Some(&set(&["t1"])));
    }

    #[test]
    fn removing_task_strips_it_from_dependents() {
        let mut db = Database::new();
        db.insert_project(project("p1", "u1", None));
        db.insert_task(task("t1", "p1", None, &[]));
        db.insert_task(task("t2", "p1", None, &["t1"]));

        assert_eq!(db.indexes().dependents_by_task.get("t1"), Some(&set(&["t2"])));

        db.remove_task("t1");
        assert!(db.task("t2").unwrap().dependencies.is_empty());
        assert!(db.indexes().dependents_by_task.is_empty());
        assert_eq!(db.indexes().tasks_by_project.get("p1"), Some(&set(&["t2"])));
    }

    #[test]
    fn removing_project_cascades_to_tasks() {
        let mut db = Database::new();
        db.insert_project(project("p1", "u1", Some("team-1")));
        db.insert_task(task("t1", "p1", Some("u1"), &[]));
        db.insert_task(task("t2", "p1", None, &["t1"]));

        assert!(db.remove_project("p1").is_some());
        assert!(db.is_empty());
    }

    #[test]
    fn remove_unknown_id_changes_nothing() {
        let mut db = Database::new();
        db.insert_project(project("p1", "u1", None));
        let before = db.indexes().clone();

        assert!(db.remove_task("missing").is_none());
        assert!(db.remove_project("missing").is_none());
        assert_eq!(db.indexes(), &before);
    }

    #[test]
    fn member_count_follows_memberships() {
        let mut db = Database::new();
        let team = Team::new("Core".to_string(), String::new(), None);
        let team_id = team.id.clone();
        db.insert_team(team);

        let alice = TeamMember::new(team_id.clone(), "u1".to_string(), MemberRole::Admin, None);
        let bob = TeamMember::new(team_id.clone(), "u2".to_string(), MemberRole::Member, None);
        let bob_id = bob.id.clone();
        db.insert_team_member(alice);
        db.insert_team_member(bob);
        assert_eq!(db.team(&team_id).unwrap().member_count, 2);

        db.remove_team_member(&bob_id);
        assert_eq!(db.team(&team_id).unwrap().member_count, 1);
        assert!(db.membership(&team_id, "u1").is_some());
        assert!(db.membership(&team_id, "u2").is_none());
    }

    #[test]
    fn removing_team_detaches_projects_and_drops_members() {
        let mut db = Database::new();
        let team = Team::new("Core".to_string(), String::new(), None);
        let team_id = team.id.clone();
        db.insert_team(team);
        db.insert_team_member(TeamMember::new(team_id.clone(), "u1".to_string(), MemberRole::Admin, None));
        db.insert_invitation(TeamInvitation::new(
            team_id.clone(),
            "new@example.com".to_string(),
            MemberRole::Member,
            None,
            7,
        ));
        db.insert_project(project("p1", "u1", Some(&team_id)));

        db.remove_team(&team_id);
        assert!(db.project("p1").unwrap().team_id.is_none());
        assert!(db.memberships_of_user("u1").is_empty());
        assert!(db.invitations_for_email("NEW@example.com").is_empty());
        assert!(db.indexes().projects_by_team.is_empty());
    }

    #[test]
    fn removing_user_unassigns_tasks() {
        let mut db = Database::new();
        let user = User::new("Ada".to_string(), "Ada@Example.com".to_string(), MemberRole::Member, None);
        let user_id = user.id.clone();
        db.insert_user(user);
        db.insert_project(project("p1", &user_id, None));
        db.insert_task(task("t1", "p1", Some(&user_id), &[]));

        assert_eq!(db.user_by_email("ada@example.com").unwrap().id, user_id);

        db.remove_user(&user_id);
        assert!(db.task("t1").unwrap().assignee_id.is_none());
        assert!(db.indexes().tasks_by_assignee.is_empty());
        assert!(db.user_by_email("ada@example.com").is_none());
    }

    #[test]
    fn removing_user_clears_invited_by() {
        let mut db = Database::new();
        let inviter = User::new("Ada".to_string(), "ada@example.com".to_string(), MemberRole::Admin, None);
        let inviter_id = inviter.id.clone();
        db.insert_user(inviter);
        let guest = User::new("Bob".to_string(), "bob@example.com".to_string(), MemberRole::Member, None);
        let guest_id = guest.id.clone();
        db.insert_user(guest);

        let team = Team::new("Core".to_string(), String::new(), None);
        let team_id = team.id.clone();
        db.insert_team(team);
        let member = TeamMember::new(team_id.clone(), guest_id.clone(), MemberRole::Member, Some(inviter_id.clone()));
        let member_id = member.id.clone();
        db.insert_team_member(member);
        let invitation = TeamInvitation::new(
            team_id,
            "carol@example.com".to_string(),
            MemberRole::Member,
            Some(inviter_id.clone()),
            7,
        );
        let invitation_id = invitation.id.clone();
        db.insert_invitation(invitation);

        db.remove_user(&inviter_id);
        assert!(db.team_member(&member_id).unwrap().invited_by.is_none());
        assert!(db.invitation(&invitation_id).unwrap().invited_by.is_none());

        let report = db.integrity_report();
        assert!(report.clean, "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn concurrent_first_access_shares_one_store() {
        for _ in 0..200 {
            let provider = DatabaseProvider::new();
            let barrier = Barrier::new(16);
            let handles: Vec<SharedDatabase> = thread::scope(|scope| {
                let workers: Vec<_> = (0..16)
                    .map(|_| {
                        scope.spawn(|| {
                            barrier.wait();
                            provider.get_database()
                        })
                    })
                    .collect();
                workers.into_iter().map(|worker| worker.join().unwrap()).collect()
            });

            assert!(handles.iter().all(|handle| Arc::ptr_eq(handle, &handles[0])));
            assert!(Arc::ptr_eq(&handles[0], &provider.get_database()));
        }
    }

    #[test]
    fn corrupted_index_and_member_count_are_reported() {
        let mut db = Database::new();
        db.insert_project(project("p1", "u1", None));
        db.insert_task(task("t1", "p1", None, &[]));

        let team = Team::new("Core".to_string(), String::new(), None);
        let team_id = team.id.clone();
        db.insert_team(team);
        db.insert_team_member(TeamMember::new(team_id.clone(), "u1".to_string(), MemberRole::Admin, None));

        db.indexes
            .tasks_by_project
            .get_mut("p1")
            .unwrap()
            .insert("ghost".to_string());
        db.indexes.members_by_team.remove(&team_id);
        db.teams.get_mut(&team_id).unwrap().member_count = 3;

        let issues = db.integrity_report().issues;
        assert!(issues.contains(&IntegrityIssue::IndexMismatch {
            index: "tasksByProject",
            key: "p1".to_string(),
            expected: vec!["t1".to_string()],
            actual: vec!["ghost".to_string(), "t1".to_string()],
        }));
        assert!(issues.iter().any(|issue| matches!(
            issue,
            IntegrityIssue::IndexMismatch { index: "membersByTeam", key, .. } if *key == team_id
        )));
        assert!(issues.contains(&IntegrityIssue::MemberCountMismatch {
            team_id: team_id.clone(),
            recorded: 3,
            actual: 1,
        }));
    }
}
