//! Task data structures exchanged with the remote service.
//!
//! These types mirror the service's JSON payloads closely enough to decode
//! them directly. Once received they are treated as read-only snapshots:
//! edits are expressed as diffs (see [`crate::api::TaskUpdate`]) rather than
//! by mutating these values.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::fields::Priority;

/// Decode an explicit JSON `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Status label attached to a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

/// Identifier-only reference to a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

/// Named reference to a container (list or folder).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A task as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: StatusRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub space: IdRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: NamedRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub folder: NamedRef,
}

impl RemoteTask {
    pub fn status_label(&self) -> &str {
        &self.status.status
    }

    /// One-line location summary used by the task list.
    pub fn location(&self) -> String {
        format!(
            "In: {} / {} | Status: {}",
            self.folder.name, self.list.name, self.status.status
        )
    }
}

/// A space within a team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A list that can hold tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInfo {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A folder together with the lists nested in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lists: Vec<ListInfo>,
}

impl Folder {
    /// Nested lists with their display names qualified by the folder name.
    pub fn qualified_lists(&self) -> Vec<ListInfo> {
        self.lists
            .iter()
            .map(|l| ListInfo {
                id: l.id.clone(),
                name: format!("{} / {}", self.name, l.name),
            })
            .collect()
    }
}

/// A workflow status defined on a space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(rename = "status")]
    pub label: String,
    #[serde(rename = "orderindex", default)]
    pub order: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
}

/// A user who can be assigned to tasks in a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPart {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentUser {
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
}

/// A comment on a task. The body arrives split into rich-text parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: Vec<CommentPart>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: CommentUser,
}

impl Comment {
    pub fn author(&self) -> &str {
        &self.user.username
    }

    /// Full comment text with all parts concatenated.
    pub fn text(&self) -> String {
        self.comment.iter().map(|p| p.text.as_str()).collect()
    }

    /// Parse the timestamp, accepting RFC3339 or epoch milliseconds.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.date) {
            return Some(ts.with_timezone(&Utc));
        }
        self.date
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    /// Timestamp formatted for display, or the raw value if it can't be parsed.
    pub fn display_time(&self) -> String {
        match self.timestamp() {
            Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
            None => self.date.clone(),
        }
    }
}

/// Set of member ids picked in the creation wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssigneeSelection {
    ids: BTreeSet<u64>,
}

impl AssigneeSelection {
    /// Flip membership of `id`.
    pub fn toggle(&mut self, id: u64) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn to_vec(&self) -> Vec<u64> {
        self.ids.iter().copied().collect()
    }
}

/// Fields accumulated by the creation wizard before a single create call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: String,
    pub assignees: AssigneeSelection,
    pub priority: Priority,
}
