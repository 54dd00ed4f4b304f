// projectlearn-mock-api/src/utils/integrity.rs
// Consistency checks over the mock database: dangling references, index
// drift, stale member counts and dependency cycles between tasks.
use crate::utils::database::{Database, Index, Indexes};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IntegrityIssue {
    #[serde(rename_all = "camelCase")]
    DanglingReference {
        entity: &'static str,
        id: String,
        field: &'static str,
        target: String,
    },
    #[serde(rename_all = "camelCase")]
    IndexMismatch {
        index: &'static str,
        key: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    MemberCountMismatch {
        team_id: String,
        recorded: usize,
        actual: usize,
    },
    #[serde(rename_all = "camelCase")]
    DependencyCycle { task_ids: Vec<String> },
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub clean: bool,
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    fn from_issues(issues: Vec<IntegrityIssue>) -> Self {
        Self {
            clean: issues.is_empty(),
            issues,
        }
    }
}

fn link(index: &mut Index, key: &str, id: &str) {
    index.entry(key.to_string()).or_default().insert(id.to_string());
}

// What the indexes should hold, derived from the entity maps alone
fn expected_indexes(db: &Database) -> Indexes {
    let mut indexes = Indexes::default();
    for user in db.all_users() {
        link(&mut indexes.users_by_email, &user.email.trim().to_lowercase(), &user.id);
    }
    for member in db.all_team_members() {
        link(&mut indexes.members_by_team, &member.team_id, &member.id);
        link(&mut indexes.members_by_user, &member.user_id, &member.id);
    }
    for invitation in db.all_invitations() {
        link(&mut indexes.invitations_by_team, &invitation.team_id, &invitation.id);
        link(
            &mut indexes.invitations_by_email,
            &invitation.email.trim().to_lowercase(),
            &invitation.id,
        );
    }
    for project in db.all_projects() {
        link(&mut indexes.projects_by_owner, &project.owner_id, &project.id);
        if let Some(team_id) = &project.team_id {
            link(&mut indexes.projects_by_team, team_id, &project.id);
        }
    }
    for task in db.all_tasks() {
        link(&mut indexes.tasks_by_project, &task.project_id, &task.id);
        if let Some(assignee_id) = &task.assignee_id {
            link(&mut indexes.tasks_by_assignee, assignee_id, &task.id);
        }
        for dependency in &task.dependencies {
            link(&mut indexes.dependents_by_task, dependency, &task.id);
        }
    }
    indexes
}

fn sorted(ids: Option<&HashSet<String>>) -> Vec<String> {
    let ids: BTreeSet<&String> = ids.into_iter().flatten().collect();
    ids.into_iter().cloned().collect()
}

fn index_mismatches(expected: &Indexes, actual: &Indexes) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    for ((name, want), (_, have)) in expected.named().into_iter().zip(actual.named()) {
        let keys: BTreeSet<&String> = want.keys().chain(have.keys()).collect();
        for key in keys {
            let wanted = sorted(want.get(key));
            let found = sorted(have.get(key));
            if wanted != found {
                issues.push(IntegrityIssue::IndexMismatch {
                    index: name,
                    key: key.clone(),
                    expected: wanted,
                    actual: found,
                });
            }
        }
    }
    issues
}

fn dangling_references(db: &Database) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    let mut dangling = |entity: &'static str, id: &str, field: &'static str, target: &str| {
        issues.push(IntegrityIssue::DanglingReference {
            entity,
            id: id.to_string(),
            field,
            target: target.to_string(),
        });
    };

    for member in db.all_team_members() {
        if db.team(&member.team_id).is_none() {
            dangling("teamMember", &member.id, "teamId", &member.team_id);
        }
        if db.user(&member.user_id).is_none() {
            dangling("teamMember", &member.id, "userId", &member.user_id);
        }
        if let Some(inviter) = &member.invited_by {
            if db.user(inviter).is_none() {
                dangling("teamMember", &member.id, "invitedBy", inviter);
            }
        }
    }
    for invitation in db.all_invitations() {
        if db.team(&invitation.team_id).is_none() {
            dangling("invitation", &invitation.id, "teamId", &invitation.team_id);
        }
        if let Some(inviter) = &invitation.invited_by {
            if db.user(inviter).is_none() {
                dangling("invitation", &invitation.id, "invitedBy", inviter);
            }
        }
    }
    for project in db.all_projects() {
        if db.user(&project.owner_id).is_none() {
            dangling("project", &project.id, "ownerId", &project.owner_id);
        }
        if let Some(team_id) = &project.team_id {
            if db.team(team_id).is_none() {
                dangling("project", &project.id, "teamId", team_id);
            }
        }
    }
    for task in db.all_tasks() {
        if db.project(&task.project_id).is_none() {
            dangling("task", &task.id, "projectId", &task.project_id);
        }
        if let Some(assignee_id) = &task.assignee_id {
            if db.user(assignee_id).is_none() {
                dangling("task", &task.id, "assigneeId", assignee_id);
            }
        }
        for dependency in &task.dependencies {
            if db.task(dependency).is_none() {
                dangling("task", &task.id, "dependencies", dependency);
            }
        }
    }

    issues.sort_by(|a, b| format!("{:?}", a).cmp(&format!("{:?}", b)));
    issues
}

// Counts membership rows directly so index drift cannot mask a stale count
fn member_count_mismatches(db: &Database) -> Vec<IntegrityIssue> {
    let mut rows: HashMap<&str, usize> = HashMap::new();
    for member in db.all_team_members() {
        *rows.entry(member.team_id.as_str()).or_default() += 1;
    }

    let mut issues: Vec<IntegrityIssue> = db
        .all_teams()
        .filter_map(|team| {
            let actual = rows.get(team.id.as_str()).copied().unwrap_or(0);
            (team.member_count != actual).then(|| IntegrityIssue::MemberCountMismatch {
                team_id: team.id.clone(),
                recorded: team.member_count,
                actual,
            })
        })
        .collect();
    issues.sort_by(|a, b| format!("{:?}", a).cmp(&format!("{:?}", b)));
    issues
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    InProgress,
    Done,
}

fn walk_cycles<'a>(
    db: &'a Database,
    task_id: &'a str,
    state: &mut HashMap<&'a str, Visit>,
    path: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    state.insert(task_id, Visit::InProgress);
    path.push(task_id);

    if let Some(task) = db.task(task_id) {
        for dependency in &task.dependencies {
            let dependency = dependency.as_str();
            if db.task(dependency).is_none() {
                continue;
            }
            match state.get(dependency).copied() {
                Some(Visit::InProgress) => {
                    if let Some(start) = path.iter().position(|id| *id == dependency) {
                        cycles.push(path[start..].iter().map(|id| id.to_string()).collect());
                    }
                }
                Some(Visit::Done) => {}
                None => walk_cycles(db, dependency, state, path, cycles),
            }
        }
    }

    path.pop();
    state.insert(task_id, Visit::Done);
}

// Every back edge in the dependency graph, each reported as the path it closes
pub fn dependency_cycles(db: &Database) -> Vec<Vec<String>> {
    let mut state = HashMap::new();
    let mut cycles = Vec::new();
    let mut ids: Vec<&str> = db.all_tasks().map(|task| task.id.as_str()).collect();
    ids.sort_unstable();

    for id in ids {
        if !state.contains_key(id) {
            walk_cycles(db, id, &mut state, &mut Vec::new(), &mut cycles);
        }
    }
    cycles
}

impl Database {
    pub fn integrity_report(&self) -> IntegrityReport {
        let mut issues = dangling_references(self);
        issues.extend(index_mismatches(&expected_indexes(self), self.indexes()));
        issues.extend(member_count_mismatches(self));
        issues.extend(
            dependency_cycles(self)
                .into_iter()
                .map(|task_ids| IntegrityIssue::DependencyCycle { task_ids }),
        );
        IntegrityReport::from_issues(issues)
    }

    // True when giving `task_id` these dependencies would close a cycle
    pub fn would_create_cycle(&self, task_id: &str, dependencies: &[String]) -> bool {
        let mut stack: Vec<&str> = dependencies.iter().map(String::as_str).collect();
        let mut seen: HashSet<&str> = HashSet::new();

        while let Some(current) = stack.pop() {
            if current == task_id {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(task) = self.task(current) {
                stack.extend(task.dependencies.iter().map(String::as_str));
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateProjectRequest, CreateTaskRequest, MemberRole, Project, Task, User};

    fn user(db: &mut Database) -> String {
        let user = User::new("Ada".to_string(), "ada@example.com".to_string(), MemberRole::Admin, None);
        let id = user.id.clone();
        db.insert_user(user);
        id
    }

    fn project(db: &mut Database, owner_id: &str) -> String {
        let project = Project::new(CreateProjectRequest {
            title: "Website".to_string(),
            description: String::new(),
            status: Default::default(),
            priority: Default::default(),
            progress: 0,
            owner_id: owner_id.to_string(),
            team_id: None,
            tags: Vec::new(),
        });
        let id = project.id.clone();
        db.insert_project(project);
        id
    }

    fn task(db: &mut Database, id: &str, project_id: &str, dependencies: &[&str]) {
        let mut task = Task::new(CreateTaskRequest {
            title: id.to_string(),
            description: String::new(),
            status: Default::default(),
            priority: Default::default(),
            project_id: project_id.to_string(),
            assignee_id: None,
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            tags: Vec::new(),
            due_date: None,
        });
        task.id = id.to_string();
        db.insert_task(task);
    }

    #[test]
    fn writes_through_the_store_stay_consistent() {
        let mut db = Database::new();
        let owner = user(&mut db);
        let project_id = project(&mut db, &owner);
        task(&mut db, "t1", &project_id, &[]);
        task(&mut db, "t2", &project_id, &["t1"]);
        task(&mut db, "t3", &project_id, &["t1", "t2"]);
        db.remove_task("t2");

        let report = db.integrity_report();
        assert!(report.clean, "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn dangling_project_reference_is_reported() {
        let mut db = Database::new();
        task(&mut db, "t1", "ghost", &[]);

        let report = db.integrity_report();
        assert!(!report.clean);
        assert_eq!(
            report.issues,
            vec![IntegrityIssue::DanglingReference {
                entity: "task",
                id: "t1".to_string(),
                field: "projectId",
                target: "ghost".to_string(),
            }]
        );
    }

    #[test]
    fn cycles_are_reported_and_predicted() {
        let mut db = Database::new();
        let owner = user(&mut db);
        let project_id = project(&mut db, &owner);
        task(&mut db, "a", &project_id, &[]);
        task(&mut db, "b", &project_id, &["a"]);
        task(&mut db, "c", &project_id, &["b"]);

        assert!(db.would_create_cycle("a", &["c".to_string()]));
        assert!(db.would_create_cycle("a", &["a".to_string()]));
        assert!(!db.would_create_cycle("c", &["a".to_string()]));
        assert!(dependency_cycles(&db).is_empty());

        task(&mut db, "a", &project_id, &["c"]);
        let cycles = dependency_cycles(&db);
        assert_eq!(cycles.len(), 1);
        let mut members = cycles[0].clone();
        members.sort();
        assert_eq!(members, vec!["a", "b", "c"]);
    }
}
