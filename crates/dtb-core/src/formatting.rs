//! Reply formatting (to-do list rendering, message splitting).

use crate::store::GuildTodo;

pub const EMPTY_LIST: &str = "The to-do list is empty.";
pub const NOBODY_ASSIGNED: &str = "No one is assigned yet.";

/// Render a guild's list as a numbered list followed by the assignee line.
pub fn format_todo_list(todo: &GuildTodo) -> String {
    let assignee = match &todo.assigned_user {
        Some(user) => format!("Assigned to: @{user}"),
        None => NOBODY_ASSIGNED.to_string(),
    };

    if todo.tasks.is_empty() {
        return match todo.assigned_user {
            Some(_) => format!("{EMPTY_LIST}\n{assignee}"),
            None => EMPTY_LIST.to_string(),
        };
    }

    let mut lines = vec!["**To-Do List:**".to_string()];
    lines.extend(
        todo.tasks
            .iter()
            .enumerate()
            .map(|(i, task)| format!("{}. {task}", i + 1)),
    );
    lines.push(String::new());
    lines.push(assignee);
    lines.join("\n")
}

/// Split `text` into chunks of at most `limit` bytes, breaking on newlines
/// where possible and on char boundaries otherwise.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut out: Vec<String> = Vec::new();
    // `None` until a line is taken, so a blank first line still counts.
    let mut chunk: Option<String> = None;

    for line in text.split('\n') {
        if let Some(c) = chunk.as_mut() {
            if c.len() + 1 + line.len() <= limit {
                c.push('\n');
                c.push_str(line);
                continue;
            }
        }
        out.extend(chunk.take());

        let mut rest = line;
        while rest.len() > limit {
            let (head, tail) = split_utf8_prefix(rest, limit);
            out.push(head.to_string());
            rest = tail;
        }
        chunk = Some(rest.to_string());
    }

    out.extend(chunk);
    out.retain(|c| !c.is_empty());
    out
}

fn split_utf8_prefix(s: &str, max_bytes: usize) -> (&str, &str) {
    if s.len() <= max_bytes {
        return (s, "");
    }
    let mut idx = 0usize;
    for (i, _) in s.char_indices() {
        if i > max_bytes {
            break;
        }
        idx = i;
    }
    if idx == 0 {
        // A single char wider than the limit; emit it alone to make progress.
        let next = s.char_indices().nth(1).map(|(i, _)| i).unwrap_or(s.len());
        return (&s[..next], &s[next..]);
    }
    (&s[..idx], &s[idx..])
}
