use codexbot_core::types::{Task, TaskItem};

/// Build the instruction string passed to the agent for one task.
///
/// Composes a title tag, one description tag per message item (in order),
/// and one comment tag per issue comment on the origin item. Items with
/// unrecognized types contribute nothing, and a task without an origin
/// item simply has no comments. Tags are newline-joined.
pub fn build_instruction(task: &Task) -> String {
    let mut tags = vec![format!("<title>{}</title>", task.title)];

    for item in &task.items {
        if let TaskItem::Message { data, .. } = item {
            tags.push(format!("<description>{}</description>", data.content));
        }
    }

    for item in &task.items {
        if let TaskItem::Origin { data, .. } = item {
            for comment in &data.issue_comments {
                tags.push(format!(
                    "<comment author=\"{}\">{}</comment>",
                    comment.user_name, comment.body
                ));
            }
        }
    }

    tags.join("\n")
}
