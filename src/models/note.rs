use chrono::NaiveDateTime;
use diesel::Queryable;
use serde_derive::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Queryable)]
pub struct Note {
    pub id: String,
    pub content: String,
    pub opened_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Note {
    pub fn is_opened(&self) -> bool {
        self.opened_at.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub content: String,
}

impl NewNote {
    /// Returns the submitted content, or `None` if there is nothing worth sharing.
    pub fn content(&self) -> Option<&str> {
        if self.content.trim().is_empty() {
            None
        } else {
            Some(&self.content)
        }
    }
}
