// src/services/analytics.rs
// Aggregations behind the analytics dashboard. Empty input yields zeroed
// or empty results, never an error.

use crate::models::{Priority, Task, TaskStatus, User};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BurndownPoint {
    pub date: NaiveDate,
    pub remaining: usize,
    pub ideal: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadEntry {
    pub user_id: String,
    pub user_name: String,
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub overdue: usize,
    // Percent, one decimal place
    pub completion_rate: f64,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriorityShare {
    pub count: usize,
    pub percent: f64,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriorityDistribution {
    pub total: usize,
    pub low: PriorityShare,
    pub medium: PriorityShare,
    pub high: PriorityShare,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

fn done_on_or_before(task: &Task, day: NaiveDate) -> bool {
    task.status == TaskStatus::Done && task.updated_at.date_naive() <= day
}

// One point per day in [start, end]. A done task counts as finished on the
// day it was last updated.
pub fn burndown(tasks: &[Task], start: NaiveDate, end: NaiveDate) -> Vec<BurndownPoint> {
    if end < start {
        return Vec::new();
    }

    let days = (end - start).num_days() as usize + 1;
    let mut remaining = vec![0usize; days];

    for task in tasks {
        let created = task.created_at.date_naive();
        for (offset, slot) in remaining.iter_mut().enumerate() {
            let day = start + Duration::days(offset as i64);
            if created <= day && !done_on_or_before(task, day) {
                *slot += 1;
            }
        }
    }

    let first = remaining[0] as f64;
    let steps = (days - 1).max(1) as f64;

    remaining
        .into_iter()
        .enumerate()
        .map(|(offset, count)| {
            let ideal = if days == 1 {
                first
            } else {
                first * (1.0 - offset as f64 / steps)
            };
            BurndownPoint {
                date: start + Duration::days(offset as i64),
                remaining: count,
                ideal: (ideal * 100.0).round() / 100.0,
            }
        })
        .collect()
}

pub fn workload_distribution(tasks: &[Task], users: &[User]) -> Vec<WorkloadEntry> {
    let mut entries: Vec<WorkloadEntry> = users
        .iter()
        .map(|user| WorkloadEntry {
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            total: 0,
            todo: 0,
            in_progress: 0,
            done: 0,
        })
        .collect();
    let positions: HashMap<&str, usize> = users
        .iter()
        .enumerate()
        .map(|(position, user)| (user.id.as_str(), position))
        .collect();

    for task in tasks {
        let Some(position) = task
            .assignee_id
            .as_deref()
            .and_then(|assignee| positions.get(assignee))
        else {
            continue;
        };
        let entry = &mut entries[*position];
        entry.total += 1;
        match task.status {
            TaskStatus::Todo => entry.todo += 1,
            TaskStatus::InProgress => entry.in_progress += 1,
            TaskStatus::Done => entry.done += 1,
        }
    }

    entries
}

pub fn completion_stats(tasks: &[Task], now: DateTime<Utc>) -> CompletionStats {
    let mut stats = CompletionStats::default();
    for task in tasks {
        stats.total += 1;
        match task.status {
            TaskStatus::Todo => stats.todo += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::Done => stats.done += 1,
        }
        if !task.is_done() && task.due_date.map_or(false, |due| due < now) {
            stats.overdue += 1;
        }
    }
    stats.completion_rate = percent(stats.done, stats.total);
    stats
}

pub fn priority_distribution(tasks: &[Task]) -> PriorityDistribution {
    let mut distribution = PriorityDistribution::default();
    for task in tasks {
        distribution.total += 1;
        match task.priority {
            Priority::Low => distribution.low.count += 1,
            Priority::Medium => distribution.medium.count += 1,
            Priority::High => distribution.high.count += 1,
        }
    }
    let total = distribution.total;
    for share in [
        &mut distribution.low,
        &mut distribution.medium,
        &mut distribution.high,
    ] {
        share.percent = percent(share.count, total);
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateTaskRequest, MemberRole};
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn task(status: TaskStatus, priority: Priority, assignee: Option<&str>, created: u32, updated: u32) -> Task {
        let mut task = Task::new(CreateTaskRequest {
            title: "task".to_string(),
            description: String::new(),
            status,
            priority,
            project_id: "p1".to_string(),
            assignee_id: assignee.map(str::to_string),
            dependencies: Vec::new(),
            tags: Vec::new(),
            due_date: None,
        });
        task.created_at = at(created);
        task.updated_at = at(updated);
        task
    }

    fn user(id: &str, name: &str) -> User {
        let mut user = User::new(name.to_string(), format!("{}@example.com", id), MemberRole::Member, None);
        user.id = id.to_string();
        user
    }

    #[test]
    fn burndown_tracks_completion_days() {
        let tasks = vec![
            task(TaskStatus::Done, Priority::Low, None, 1, 2),
            task(TaskStatus::Done, Priority::Low, None, 1, 3),
            task(TaskStatus::Todo, Priority::Low, None, 1, 1),
            task(TaskStatus::InProgress, Priority::Low, None, 3, 3),
        ];

        let points = burndown(&tasks, date(1), date(4));
        let remaining: Vec<usize> = points.iter().map(|p| p.remaining).collect();
        assert_eq!(remaining, vec![3, 2, 2, 2]);

        let ideal: Vec<f64> = points.iter().map(|p| p.ideal).collect();
        assert_eq!(ideal, vec![3.0, 2.0, 1.0, 0.0]);
        assert_eq!(points[0].date, date(1));
        assert_eq!(points[3].date, date(4));
    }

    #[test]
    fn burndown_edge_cases() {
        assert!(burndown(&[], date(5), date(4)).is_empty());

        let empty = burndown(&[], date(1), date(3));
        assert_eq!(empty.len(), 3);
        assert!(empty.iter().all(|p| p.remaining == 0 && p.ideal == 0.0));

        let tasks = vec![task(TaskStatus::Todo, Priority::Low, None, 1, 1)];
        let single = burndown(&tasks, date(2), date(2));
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].remaining, 1);
        assert_eq!(single[0].ideal, 1.0);
    }

    #[test]
    fn workload_counts_per_user() {
        let users = vec![user("u1", "Ada"), user("u2", "Grace")];
        let tasks = vec![
            task(TaskStatus::Todo, Priority::Low, Some("u1"), 1, 1),
            task(TaskStatus::Done, Priority::Low, Some("u1"), 1, 1),
            task(TaskStatus::InProgress, Priority::Low, Some("ghost"), 1, 1),
            task(TaskStatus::InProgress, Priority::Low, None, 1, 1),
        ];

        let workload = workload_distribution(&tasks, &users);
        assert_eq!(workload.len(), 2);
        assert_eq!(workload[0].user_name, "Ada");
        assert_eq!((workload[0].total, workload[0].todo, workload[0].done), (2, 1, 1));
        assert_eq!(workload[1].total, 0);
        assert!(workload_distribution(&[], &[]).is_empty());
    }

    #[test]
    fn completion_stats_counts_overdue() {
        let mut late = task(TaskStatus::Todo, Priority::Low, None, 1, 1);
        late.due_date = Some(at(2));
        let mut finished_late = task(TaskStatus::Done, Priority::Low, None, 1, 1);
        finished_late.due_date = Some(at(2));
        let tasks = vec![late, finished_late, task(TaskStatus::InProgress, Priority::Low, None, 1, 1)];

        let stats = completion_stats(&tasks, at(10));
        assert_eq!(stats.total, 3);
        assert_eq!(stats.done, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completion_rate, 33.3);

        assert_eq!(completion_stats(&[], at(10)), CompletionStats::default());
    }

    #[test]
    fn priority_distribution_shares() {
        let tasks = vec![
            task(TaskStatus::Todo, Priority::High, None, 1, 1),
            task(TaskStatus::Todo, Priority::High, None, 1, 1),
            task(TaskStatus::Todo, Priority::Low, None, 1, 1),
            task(TaskStatus::Todo, Priority::Medium, None, 1, 1),
        ];

        let distribution = priority_distribution(&tasks);
        assert_eq!(distribution.total, 4);
        assert_eq!(distribution.high.count, 2);
        assert_eq!(distribution.high.percent, 50.0);
        assert_eq!(distribution.low.percent, 25.0);

        assert_eq!(priority_distribution(&[]), PriorityDistribution::default());
    }
}
