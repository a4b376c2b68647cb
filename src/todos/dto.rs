use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Add/edit form body. The field is named after the templates' input.
#[derive(Debug, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub task: String,
}

impl TaskForm {
    /// Trimmed task text, or `None` when nothing usable was submitted.
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.task.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Debug, Serialize)]
pub struct TaskView {
    pub id: Uuid,
    pub task: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_trims_whitespace() {
        let form = TaskForm {
            task: "  buy milk  ".into(),
        };
        assert_eq!(form.text(), Some("buy milk"));
    }

    #[test]
    fn empty_and_blank_are_rejected() {
        assert_eq!(TaskForm { task: "".into() }.text(), None);
        assert_eq!(TaskForm { task: "   ".into() }.text(), None);
    }

    #[test]
    fn missing_field_deserializes_empty() {
        let form: TaskForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.text(), None);
    }
}
