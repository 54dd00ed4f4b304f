// projectlearn-mock-api/src/utils/seed.rs
use crate::models::{
    CreateProjectRequest, CreateTaskRequest, MemberRole, Priority, Project, ProjectStatus, Task,
    TaskStatus, Team, TeamInvitation, TeamMember, User,
};
use crate::utils::database::Database;
use chrono::{Duration, Utc};
use log::info;

// Demo dataset so the UI has something to render on first start
pub fn populate(db: &mut Database, invitation_ttl_days: i64) {
    let now = Utc::now();

    let alice = User::new(
        "Alice Johnson".to_string(),
        "alice@projectlearn.dev".to_string(),
        MemberRole::Admin,
        Some("https://i.pravatar.cc/150?u=alice".to_string()),
    );
    let bob = User::new(
        "Bob Smith".to_string(),
        "bob@projectlearn.dev".to_string(),
        MemberRole::Member,
        Some("https://i.pravatar.cc/150?u=bob".to_string()),
    );
    let carol = User::new(
        "Carol Diaz".to_string(),
        "carol@projectlearn.dev".to_string(),
        MemberRole::Member,
        None,
    );

    let frontend = Team::new(
        "Frontend".to_string(),
        "UI and design system".to_string(),
        Some("#8b5cf6".to_string()),
    );
    let platform = Team::new(
        "Platform".to_string(),
        "APIs and infrastructure".to_string(),
        Some("#10b981".to_string()),
    );

    let memberships = vec![
        TeamMember::new(frontend.id.clone(), alice.id.clone(), MemberRole::Admin, None),
        TeamMember::new(frontend.id.clone(), bob.id.clone(), MemberRole::Member, Some(alice.id.clone())),
        TeamMember::new(platform.id.clone(), alice.id.clone(), MemberRole::Admin, None),
        TeamMember::new(platform.id.clone(), carol.id.clone(), MemberRole::Member, Some(alice.id.clone())),
    ];

    let invitation = TeamInvitation::new(
        platform.id.clone(),
        "dana@projectlearn.dev".to_string(),
        MemberRole::Member,
        Some(alice.id.clone()),
        invitation_ttl_days,
    );

    let redesign = Project::new(CreateProjectRequest {
        title: "Website Redesign".to_string(),
        description: "Refresh the marketing site".to_string(),
        status: ProjectStatus::Active,
        priority: Priority::High,
        progress: 40,
        owner_id: alice.id.clone(),
        team_id: Some(frontend.id.clone()),
        tags: vec!["design".to_string(), "web".to_string()],
    });
    let api = Project::new(CreateProjectRequest {
        title: "Public API".to_string(),
        description: "Versioned REST API for integrations".to_string(),
        status: ProjectStatus::Planning,
        priority: Priority::Medium,
        progress: 10,
        owner_id: carol.id.clone(),
        team_id: Some(platform.id.clone()),
        tags: vec!["backend".to_string()],
    });

    let task = |title: &str,
                project: &Project,
                status: TaskStatus,
                priority: Priority,
                assignee: Option<&User>,
                dependencies: Vec<String>,
                age_days: i64| {
        let mut task = Task::new(CreateTaskRequest {
            title: title.to_string(),
            description: String::new(),
            status,
            priority,
            project_id: project.id.clone(),
            assignee_id: assignee.map(|user| user.id.clone()),
            dependencies,
            tags: Vec::new(),
            due_date: Some(now + Duration::days(7 - age_days)),
        });
        task.created_at = now - Duration::days(age_days);
        task.updated_at = task.created_at;
        task
    };

    let wireframes = task("Wireframes", &redesign, TaskStatus::Done, Priority::High, Some(&bob), vec![], 10);
    let mockups = task(
        "High fidelity mockups",
        &redesign,
        TaskStatus::InProgress,
        Priority::High,
        Some(&bob),
        vec![wireframes.id.clone()],
        8,
    );
    let build = task(
        "Build landing page",
        &redesign,
        TaskStatus::Todo,
        Priority::Medium,
        Some(&alice),
        vec![mockups.id.clone()],
        5,
    );
    let schema = task("Draft API schema", &api, TaskStatus::InProgress, Priority::Medium, Some(&carol), vec![], 6);
    let auth = task("Choose auth scheme", &api, TaskStatus::Todo, Priority::Low, None, vec![schema.id.clone()], 2);

    for user in [alice, bob, carol] {
        db.insert_user(user);
    }
    for team in [frontend, platform] {
        db.insert_team(team);
    }
    for member in memberships {
        db.insert_team_member(member);
    }
    db.insert_invitation(invitation);
    for project in [redesign, api] {
        db.insert_project(project);
    }
    for task in [wireframes, mockups, build, schema, auth] {
        db.insert_task(task);
    }

    info!("🌱 Seeded mock database with demo data");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_database_is_consistent() {
        let mut db = Database::new();
        populate(&mut db, 7);

        assert_eq!(db.users().len(), 3);
        assert_eq!(db.teams().len(), 2);
        assert!(db.teams().iter().all(|team| team.member_count == 2));
        assert_eq!(db.projects().len(), 2);
        assert_eq!(db.tasks().len(), 5);

        let report = db.integrity_report();
        assert!(report.clean, "unexpected issues: {:?}", report.issues);
    }
}
