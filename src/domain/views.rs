use super::task::Task;

/// Format a countdown as "MM:SS" (minutes may exceed 59)
pub fn format_countdown(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format a minute count as "Xh Ym" (omits 0 values)
pub fn format_minutes(total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 && minutes > 0 {
        format!("{}h {}m", hours, minutes)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", minutes)
    }
}

/// Progress text like "3/4"
pub fn session_badge(task: &Task) -> String {
    format!("{}/{}", task.completed_sessions, task.repeats)
}

/// Text gauge for a ratio, e.g. "[####------]"
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let clamped = ratio.clamp(0.0, 1.0);
    let filled = (clamped * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Indices of tasks in display order: the current task first, then the rest
/// in creation order
pub fn display_order(tasks: &[Task]) -> Vec<usize> {
    let mut order: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.is_current)
        .map(|(idx, _)| idx)
        .collect();
    order.extend(
        tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| !task.is_current)
            .map(|(idx, _)| idx),
    );
    order
}
