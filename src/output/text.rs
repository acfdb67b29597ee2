use crate::models::{Task, TaskWithSubtasks};

pub fn print_task(t: &Task) {
    println!("Task: {} (#{})", t.title, t.id);
    if let Some(ref desc) = t.description {
        println!("  Description: {desc}");
    }
    println!("  Status: {}", t.status.as_str());
    println!("  Priority: {}", t.priority);
    println!("  Project: {}", t.project_id);
    if let Some(ref start) = t.start_date {
        println!("  Start: {start}");
    }
    if let Some(ref deadline) = t.deadline {
        println!("  Deadline: {deadline}");
    }
    if t.recurring > 0 {
        println!("  Recurs every {} day(s)", t.recurring);
    }
    if let Some(ref tag) = t.tag {
        println!("  Tag: {tag}");
    }
    if !t.active {
        println!("  (deleted)");
    }
}

pub fn print_task_line(t: &Task) {
    let deadline = t
        .deadline
        .map(|d| format!(" due {d}"))
        .unwrap_or_default();
    println!(
        "  [{}] {} (#{}) p={}{}{}",
        t.status.as_str(),
        t.title,
        t.id,
        t.priority,
        deadline,
        if t.active { "" } else { " (deleted)" }
    );
}

pub fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for t in tasks {
        print_task_line(t);
    }
}

pub fn print_subtasks(t: &TaskWithSubtasks) {
    if t.subtasks.is_empty() {
        return;
    }
    println!("\nSubtasks:");
    for s in &t.subtasks {
        print_task_line(s);
    }
}
