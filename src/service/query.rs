use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::db::{hierarchy_repo, in_read_transaction, task_repo};
use crate::error::TaskError;
use crate::models::{Task, TaskStatus};
use crate::service::lifecycle::parse_status;

pub const PRIORITY_RANGE: &str = "priority_range";
pub const STATUS: &str = "status";
pub const DEADLINE_RANGE: &str = "deadline_range";
pub const START_DATE_RANGE: &str = "start_date_range";

pub const FILTER_KEYS: [&str; 4] = [PRIORITY_RANGE, STATUS, DEADLINE_RANGE, START_DATE_RANGE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    PriorityDesc,
    PriorityAsc,
    StartDateAsc,
    StartDateDesc,
    DeadlineAsc,
    DeadlineDesc,
    Status,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriorityDesc => "priority_desc",
            Self::PriorityAsc => "priority_asc",
            Self::StartDateAsc => "start_date_asc",
            Self::StartDateDesc => "start_date_desc",
            Self::DeadlineAsc => "deadline_asc",
            Self::DeadlineDesc => "deadline_desc",
            Self::Status => "status",
        }
    }

    pub fn parse(value: &str) -> Result<Self, TaskError> {
        match value {
            "priority_desc" => Ok(Self::PriorityDesc),
            "priority_asc" => Ok(Self::PriorityAsc),
            "start_date_asc" => Ok(Self::StartDateAsc),
            "start_date_desc" => Ok(Self::StartDateDesc),
            "deadline_asc" => Ok(Self::DeadlineAsc),
            "deadline_desc" => Ok(Self::DeadlineDesc),
            "status" => Ok(Self::Status),
            _ => Err(TaskError::invalid_sort(value)),
        }
    }

    /// Total order for this key, ending with ascending id.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let priority_desc = || b.priority.cmp(&a.priority);
        let primary = match self {
            Self::PriorityDesc => priority_desc().then_with(|| dates(a.deadline, b.deadline, false)),
            Self::PriorityAsc => a
                .priority
                .cmp(&b.priority)
                .then_with(|| dates(a.deadline, b.deadline, false)),
            Self::StartDateAsc => dates(a.start_date, b.start_date, false).then_with(priority_desc),
            Self::StartDateDesc => dates(a.start_date, b.start_date, true).then_with(priority_desc),
            Self::DeadlineAsc => dates(a.deadline, b.deadline, false).then_with(priority_desc),
            Self::DeadlineDesc => dates(a.deadline, b.deadline, true).then_with(priority_desc),
            Self::Status => a.status.rank().cmp(&b.status.rank()).then_with(priority_desc),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Nulls last in both directions.
fn dates(a: Option<NaiveDate>, b: Option<NaiveDate>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    fn contains(&self, date: Option<NaiveDate>) -> bool {
        date.is_some_and(|d| self.start <= d && d <= self.end)
    }
}

/// A validated filter. Only the two date ranges may be combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    PriorityRange { min: i32, max: i32 },
    Status(TaskStatus),
    Dates {
        deadline: Option<DateRange>,
        start_date: Option<DateRange>,
    },
}

impl TaskFilter {
    /// Validate a `filter_by` object. `Ok(None)` means no filtering.
    pub fn parse(filter_by: &Map<String, Value>) -> Result<Option<Self>, TaskError> {
        if let Some(unknown) = filter_by.keys().find(|k| !FILTER_KEYS.contains(&k.as_str())) {
            return Err(TaskError::invalid_filter(unknown));
        }
        if filter_by.len() > 1 {
            let date_only = filter_by
                .keys()
                .all(|k| k == DEADLINE_RANGE || k == START_DATE_RANGE);
            if !date_only {
                let keys: Vec<&str> = filter_by.keys().map(String::as_str).collect();
                return Err(TaskError::invalid_filter_combination(&keys));
            }
        }

        if let Some(value) = filter_by.get(PRIORITY_RANGE) {
            let (min, max) = parse_pair(PRIORITY_RANGE, value, |v| {
                v.as_i64().and_then(|n| i32::try_from(n).ok())
            })?;
            return Ok(Some(Self::PriorityRange { min, max }));
        }
        if let Some(value) = filter_by.get(STATUS) {
            let status = value.as_str().ok_or_else(|| {
                TaskError::validation("status filter must be a string")
            })?;
            return Ok(Some(Self::Status(parse_status(status)?)));
        }

        let deadline = filter_by
            .get(DEADLINE_RANGE)
            .map(|v| parse_date_range(DEADLINE_RANGE, v))
            .transpose()?;
        let start_date = filter_by
            .get(START_DATE_RANGE)
            .map(|v| parse_date_range(START_DATE_RANGE, v))
            .transpose()?;
        if deadline.is_none() && start_date.is_none() {
            return Ok(None);
        }
        Ok(Some(Self::Dates { deadline, start_date }))
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::PriorityRange { min, max } => (*min..=*max).contains(&task.priority),
            Self::Status(status) => task.status == *status,
            Self::Dates { deadline, start_date } => {
                deadline.map_or(true, |r| r.contains(task.deadline))
                    && start_date.map_or(true, |r| r.contains(task.start_date))
            }
        }
    }
}

fn parse_pair<T, F>(key: &str, value: &Value, item: F) -> Result<(T, T), TaskError>
where
    T: PartialOrd,
    F: Fn(&Value) -> Option<T>,
{
    let malformed = || TaskError::validation(format!("{key} must be a two-element array [min, max]"));
    let items = value.as_array().ok_or_else(malformed)?;
    if items.len() != 2 {
        return Err(malformed());
    }
    let low = item(&items[0]).ok_or_else(malformed)?;
    let high = item(&items[1]).ok_or_else(malformed)?;
    if low > high {
        return Err(TaskError::validation(format!(
            "{key} lower bound is greater than its upper bound"
        )));
    }
    Ok((low, high))
}

fn parse_date_range(key: &str, value: &Value) -> Result<DateRange, TaskError> {
    let (start, end) = parse_pair(key, value, |v| {
        v.as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    })?;
    Ok(DateRange { start, end })
}

/// Parameters for [`list_tasks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub filter_by: Option<Map<String, Value>>,
    #[serde(default)]
    pub parents_only: bool,
    #[serde(default = "default_active_only")]
    pub active_only: bool,
    #[serde(default)]
    pub project_id: Option<i64>,
}

fn default_active_only() -> bool {
    true
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            sort_by: None,
            filter_by: None,
            parents_only: false,
            active_only: true,
            project_id: None,
        }
    }
}

/// Filtered, sorted view over tasks. Read-only.
pub fn list_tasks(conn: &Connection, query: &ListQuery) -> Result<Vec<Task>, TaskError> {
    let sort = match query.sort_by.as_deref() {
        Some(value) => SortKey::parse(value)?,
        None => SortKey::default(),
    };
    let filter = match query.filter_by {
        Some(ref map) => TaskFilter::parse(map)?,
        None => None,
    };
    debug!(sort = sort.as_str(), ?filter, parents_only = query.parents_only, "listing tasks");

    let (subtask_ids, rows) = in_read_transaction(conn, |conn| {
        let subtask_ids: HashSet<i64> = if query.parents_only {
            hierarchy_repo::get_all_subtask_ids(conn)?.into_iter().collect()
        } else {
            HashSet::new()
        };
        Ok((subtask_ids, task_repo::list_tasks(conn, query.active_only)?))
    })?;

    let mut tasks: Vec<Task> = rows
        .into_iter()
        .filter(|t| !subtask_ids.contains(&t.id))
        .filter(|t| query.project_id.map_or(true, |p| t.project_id == p))
        .filter(|t| filter.as_ref().map_or(true, |f| f.matches(t)))
        .collect();
    tasks.sort_by(|a, b| sort.compare(a, b));
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::error::ErrorCode;
    use crate::models::NewTask;
    use crate::service::{hierarchy, lifecycle, store};
    use serde_json::json;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Days::new(n)
    }

    fn add(
        conn: &Connection,
        title: &str,
        priority: i32,
        start: Option<NaiveDate>,
        deadline: Option<NaiveDate>,
    ) -> Task {
        let mut input = NewTask::new(title, 1);
        input.priority = priority;
        input.start_date = start;
        input.deadline = deadline;
        store::create(conn, &input).unwrap()
    }

    fn filter(value: Value) -> ListQuery {
        ListQuery {
            filter_by: value.as_object().cloned(),
            ..Default::default()
        }
    }

    fn sorted(conn: &Connection, key: &str) -> Vec<String> {
        let q = ListQuery { sort_by: Some(key.into()), ..Default::default() };
        list_tasks(conn, &q).unwrap().into_iter().map(|t| t.title).collect()
    }

    #[test]
    fn test_priority_desc_breaks_ties_by_deadline() {
        let conn = open_in_memory().unwrap();
        add(&conn, "3-late", 3, None, Some(day(5)));
        add(&conn, "3-early", 3, None, Some(day(1)));
        add(&conn, "9", 9, None, Some(day(2)));
        add(&conn, "1", 1, None, Some(day(3)));

        let tasks = list_tasks(&conn, &ListQuery::default()).unwrap();
        let order: Vec<(i32, Option<NaiveDate>)> =
            tasks.iter().map(|t| (t.priority, t.deadline)).collect();
        assert_eq!(
            order,
            vec![(9, Some(day(2))), (3, Some(day(1))), (3, Some(day(5))), (1, Some(day(3)))]
        );
        assert_eq!(sorted(&conn, "priority_desc"), vec!["9", "3-early", "3-late", "1"]);
    }

    #[test]
    fn test_priority_asc_with_null_deadline_last() {
        let conn = open_in_memory().unwrap();
        add(&conn, "none", 2, None, None);
        add(&conn, "soon", 2, None, Some(day(1)));
        add(&conn, "high", 7, None, Some(day(0)));
        assert_eq!(sorted(&conn, "priority_asc"), vec!["soon", "none", "high"]);
    }

    #[test]
    fn test_date_sorts_tie_break_by_priority_and_nulls_last() {
        let conn = open_in_memory().unwrap();
        add(&conn, "a", 2, Some(day(3)), Some(day(10)));
        add(&conn, "b", 8, Some(day(3)), None);
        add(&conn, "c", 5, None, Some(day(4)));
        add(&conn, "d", 5, Some(day(1)), Some(day(10)));

        assert_eq!(sorted(&conn, "start_date_asc"), vec!["d", "b", "a", "c"]);
        assert_eq!(sorted(&conn, "start_date_desc"), vec!["b", "a", "d", "c"]);
        assert_eq!(sorted(&conn, "deadline_asc"), vec!["c", "d", "a", "b"]);
        assert_eq!(sorted(&conn, "deadline_desc"), vec!["d", "a", "c", "b"]);
    }

    #[test]
    fn test_status_sort_order() {
        let conn = open_in_memory().unwrap();
        let blocked = add(&conn, "blocked", 9, None, None);
        let done = add(&conn, "done", 1, None, None);
        let doing = add(&conn, "doing", 4, None, None);
        add(&conn, "todo-low", 2, None, None);
        add(&conn, "todo-high", 6, None, None);
        lifecycle::set_status(&conn, blocked.id, "Blocked").unwrap();
        lifecycle::set_status(&conn, done.id, "Completed").unwrap();
        lifecycle::set_status(&conn, doing.id, "In-progress").unwrap();

        assert_eq!(
            sorted(&conn, "status"),
            vec!["todo-high", "todo-low", "doing", "done", "blocked"]
        );
    }

    #[test]
    fn test_invalid_sort() {
        let conn = open_in_memory().unwrap();
        let q = ListQuery { sort_by: Some("title".into()), ..Default::default() };
        assert_eq!(list_tasks(&conn, &q).unwrap_err().code, ErrorCode::InvalidSort);
    }

    #[test]
    fn test_unknown_filter_key() {
        let conn = open_in_memory().unwrap();
        let err = list_tasks(&conn, &filter(json!({"due_before": "2025-01-01"}))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFilter);
    }

    #[test]
    fn test_heterogeneous_filters_rejected() {
        let conn = open_in_memory().unwrap();
        let combos = [
            json!({"priority_range": [3, 7], "status": "To-do"}),
            json!({"priority_range": [3, 7], "deadline_range": ["2025-01-01", "2025-02-01"]}),
            json!({"status": "To-do", "start_date_range": ["2025-01-01", "2025-02-01"]}),
        ];
        for combo in combos {
            let err = list_tasks(&conn, &filter(combo)).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidFilterCombination);
        }
    }

    #[test]
    fn test_priority_range_inclusive() {
        let conn = open_in_memory().unwrap();
        for p in [2, 3, 5, 7, 8] {
            add(&conn, &p.to_string(), p, None, None);
        }
        let tasks = list_tasks(&conn, &filter(json!({"priority_range": [3, 7]}))).unwrap();
        let priorities: Vec<i32> = tasks.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![7, 5, 3]);
    }

    #[test]
    fn test_status_filter() {
        let conn = open_in_memory().unwrap();
        let a = add(&conn, "a", 5, None, None);
        add(&conn, "b", 5, None, None);
        lifecycle::set_status(&conn, a.id, "In-progress").unwrap();
        let tasks = list_tasks(&conn, &filter(json!({"status": "In-progress"}))).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, a.id);

        let err = list_tasks(&conn, &filter(json!({"status": "Done"}))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatus);
    }

    #[test]
    fn test_date_ranges_compose() {
        let conn = open_in_memory().unwrap();
        add(&conn, "both", 5, Some(day(2)), Some(day(12)));
        add(&conn, "deadline-only", 5, Some(day(20)), Some(day(11)));
        add(&conn, "start-only", 5, Some(day(3)), Some(day(30)));
        add(&conn, "no-dates", 5, None, None);

        let q = filter(json!({
            "deadline_range": [day(10).to_string(), day(15).to_string()],
            "start_date_range": [day(1).to_string(), day(5).to_string()],
        }));
        let titles: Vec<String> = list_tasks(&conn, &q).unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["both"]);

        let q = filter(json!({"deadline_range": [day(10).to_string(), day(12).to_string()]}));
        assert_eq!(list_tasks(&conn, &q).unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_filter_values() {
        let conn = open_in_memory().unwrap();
        for bad in [
            json!({"priority_range": [7, 3]}),
            json!({"priority_range": [3]}),
            json!({"priority_range": "3-7"}),
            json!({"deadline_range": ["2025-13-01", "2025-12-01"]}),
            json!({"start_date_range": ["2025-02-01", "2025-01-01"]}),
            json!({"status": 3}),
        ] {
            let err = list_tasks(&conn, &filter(bad)).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }
    }

    #[test]
    fn test_empty_filter_object_lists_everything() {
        let conn = open_in_memory().unwrap();
        add(&conn, "a", 5, None, None);
        assert_eq!(list_tasks(&conn, &filter(json!({}))).unwrap().len(), 1);
    }

    #[test]
    fn test_parents_only_excludes_subtasks() {
        let conn = open_in_memory().unwrap();
        let p = add(&conn, "p", 5, None, None);
        let c = add(&conn, "c", 9, None, None);
        let loose = add(&conn, "loose", 1, None, None);
        hierarchy::attach(&conn, p.id, &[c.id]).unwrap();

        let q = ListQuery { parents_only: true, ..Default::default() };
        let ids: Vec<i64> = list_tasks(&conn, &q).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![p.id, loose.id]);

        let q = ListQuery {
            parents_only: true,
            filter_by: json!({"priority_range": [5, 10]}).as_object().cloned(),
            ..Default::default()
        };
        let ids: Vec<i64> = list_tasks(&conn, &q).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![p.id]);

        store::soft_delete(&conn, p.id).unwrap();
        let q = ListQuery { parents_only: true, ..Default::default() };
        let ids: Vec<i64> = list_tasks(&conn, &q).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![c.id, loose.id]);
    }

    #[test]
    fn test_list_closes_its_read_transaction() {
        let conn = open_in_memory().unwrap();
        let p = add(&conn, "p", 5, None, None);
        let c = add(&conn, "c", 5, None, None);
        let q = ListQuery { parents_only: true, ..Default::default() };
        list_tasks(&conn, &q).unwrap();
        assert!(conn.is_autocommit());

        hierarchy::attach(&conn, p.id, &[c.id]).unwrap();
        let ids: Vec<i64> = list_tasks(&conn, &q).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![p.id]);
    }

    #[test]
    fn test_active_only_and_project() {
        let conn = open_in_memory().unwrap();
        let a = add(&conn, "a", 5, None, None);
        let mut other = NewTask::new("other-project", 2);
        other.priority = 5;
        store::create(&conn, &other).unwrap();
        store::soft_delete(&conn, a.id).unwrap();

        assert_eq!(list_tasks(&conn, &ListQuery::default()).unwrap().len(), 1);
        let q = ListQuery { active_only: false, ..Default::default() };
        assert_eq!(list_tasks(&conn, &q).unwrap().len(), 2);
        let q = ListQuery { active_only: false, project_id: Some(1), ..Default::default() };
        let tasks = list_tasks(&conn, &q).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, a.id);
    }

    #[test]
    fn test_list_query_from_json_defaults() {
        let q: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q, ListQuery::default());
        assert!(q.active_only);
    }
}
