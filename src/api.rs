//! Remote task service contract and its HTTP implementation.
//!
//! [`TaskService`] is the seam the rest of the program talks to. The
//! production implementation, [`ClickUpClient`], maps each call onto one
//! request against the service's REST API and decodes the response.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::task::{Comment, Folder, ListInfo, Member, RemoteTask, Space, TaskDraft, TaskStatus};

pub const DEFAULT_API_URL: &str = "https://api.clickup.com/api/v2";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{op} failed: {source}")]
    Transport {
        op: &'static str,
        source: reqwest::Error,
    },

    #[error("{op} failed: {body}")]
    Status {
        op: &'static str,
        status: u16,
        body: String,
    },

    #[error("{op} failed: malformed response: {source}")]
    Decode {
        op: &'static str,
        source: serde_json::Error,
    },

    #[error("no statuses found for space {space_id}")]
    NoStatuses { space_id: String },
}

/// Payload for creating a task from a completed wizard draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub status: String,
    pub assignees: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

impl NewTask {
    pub fn from_draft(draft: &TaskDraft) -> Self {
        Self {
            name: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status.clone(),
            assignees: draft.assignees.to_vec(),
            priority: draft.priority.payload_value(),
        }
    }
}

/// Partial update for an existing task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl TaskUpdate {
    /// Diff the edited values against the task as it was received.
    pub fn between(original: &RemoteTask, description: &str, status: &str) -> Self {
        Self {
            description: (description != original.description).then(|| description.to_string()),
            status: (status != original.status_label()).then(|| status.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.status.is_none()
    }
}

#[derive(Serialize)]
struct CommentBody<'a> {
    comment_text: &'a str,
}

#[derive(Deserialize)]
struct SpacesEnvelope {
    #[serde(default)]
    spaces: Vec<Space>,
}

#[derive(Deserialize)]
struct ListsEnvelope {
    #[serde(default)]
    lists: Vec<ListInfo>,
}

#[derive(Deserialize)]
struct FoldersEnvelope {
    #[serde(default)]
    folders: Vec<Folder>,
}

#[derive(Deserialize)]
struct MembersEnvelope {
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Deserialize)]
struct SpaceEnvelope {
    #[serde(default)]
    statuses: Vec<TaskStatus>,
}

#[derive(Deserialize)]
struct TasksEnvelope {
    #[serde(default)]
    tasks: Vec<RemoteTask>,
}

#[derive(Deserialize)]
struct CommentsEnvelope {
    #[serde(default)]
    comments: Vec<Comment>,
}

/// Every operation the program performs against the remote service.
///
/// The API token is passed per call so the caller's current credentials
/// are always the ones used.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn spaces(&self, token: &str, team_id: &str) -> Result<Vec<Space>, ApiError>;
    async fn folderless_lists(&self, token: &str, space_id: &str) -> Result<Vec<ListInfo>, ApiError>;
    async fn folders(&self, token: &str, space_id: &str) -> Result<Vec<Folder>, ApiError>;
    async fn members(&self, token: &str, list_id: &str) -> Result<Vec<Member>, ApiError>;
    /// Statuses of a space in service order. An empty set is an error.
    async fn statuses(&self, token: &str, space_id: &str) -> Result<Vec<TaskStatus>, ApiError>;
    async fn create_task(&self, token: &str, list_id: &str, task: &NewTask) -> Result<(), ApiError>;
    async fn tasks(
        &self,
        token: &str,
        team_id: &str,
        space_id: Option<&str>,
    ) -> Result<Vec<RemoteTask>, ApiError>;
    async fn task(&self, token: &str, task_id: &str) -> Result<RemoteTask, ApiError>;
    async fn comments(&self, token: &str, task_id: &str) -> Result<Vec<Comment>, ApiError>;
    async fn post_comment(&self, token: &str, task_id: &str, text: &str) -> Result<(), ApiError>;
    async fn update_task(&self, token: &str, task_id: &str, update: &TaskUpdate) -> Result<(), ApiError>;
    /// Succeeds only on a no-content response.
    async fn delete_task(&self, token: &str, task_id: &str) -> Result<(), ApiError>;
}

/// HTTP client for the ClickUp REST API.
#[derive(Debug, Clone)]
pub struct ClickUpClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClickUpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn spaces_url(&self, team_id: &str) -> String {
        self.url(&format!("/team/{team_id}/space?archived=false"))
    }

    fn lists_url(&self, space_id: &str) -> String {
        self.url(&format!("/space/{space_id}/list"))
    }

    fn folders_url(&self, space_id: &str) -> String {
        self.url(&format!("/space/{space_id}/folder?archived=false"))
    }

    fn members_url(&self, list_id: &str) -> String {
        self.url(&format!("/list/{list_id}/member"))
    }

    fn space_url(&self, space_id: &str) -> String {
        self.url(&format!("/space/{space_id}"))
    }

    fn create_task_url(&self, list_id: &str) -> String {
        self.url(&format!("/list/{list_id}/task"))
    }

    fn tasks_url(&self, team_id: &str, space_id: Option<&str>) -> String {
        match space_id {
            Some(space) => self.url(&format!("/team/{team_id}/task?space_ids[]={space}")),
            None => self.url(&format!("/team/{team_id}/task")),
        }
    }

    fn task_url(&self, task_id: &str) -> String {
        self.url(&format!("/task/{task_id}"))
    }

    fn comments_url(&self, task_id: &str) -> String {
        self.url(&format!("/task/{task_id}/comment"))
    }

    /// Send a request and return the status and body text.
    async fn send(
        &self,
        op: &'static str,
        request: RequestBuilder,
        token: &str,
    ) -> Result<(StatusCode, String), ApiError> {
        let response = request
            .header("Authorization", token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Transport { op, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport { op, source })?;
        debug!(op, status = status.as_u16(), "response received");
        Ok((status, body))
    }

    /// Send a request that must succeed with any 2xx status.
    async fn send_ok(
        &self,
        op: &'static str,
        request: RequestBuilder,
        token: &str,
    ) -> Result<String, ApiError> {
        let (status, body) = self.send(op, request, token).await?;
        if !status.is_success() {
            warn!(op, status = status.as_u16(), "request rejected");
            return Err(ApiError::Status {
                op,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        op: &'static str,
        url: String,
        token: &str,
    ) -> Result<T, ApiError> {
        let body = self.send_ok(op, self.http.get(url), token).await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { op, source })
    }
}

#[async_trait]
impl TaskService for ClickUpClient {
    async fn spaces(&self, token: &str, team_id: &str) -> Result<Vec<Space>, ApiError> {
        let envelope: SpacesEnvelope = self
            .get_json("fetch spaces", self.spaces_url(team_id), token)
            .await?;
        Ok(envelope.spaces)
    }

    async fn folderless_lists(&self, token: &str, space_id: &str) -> Result<Vec<ListInfo>, ApiError> {
        let envelope: ListsEnvelope = self
            .get_json("fetch lists", self.lists_url(space_id), token)
            .await?;
        Ok(envelope.lists)
    }

    async fn folders(&self, token: &str, space_id: &str) -> Result<Vec<Folder>, ApiError> {
        let envelope: FoldersEnvelope = self
            .get_json("fetch folders", self.folders_url(space_id), token)
            .await?;
        Ok(envelope.folders)
    }

    async fn members(&self, token: &str, list_id: &str) -> Result<Vec<Member>, ApiError> {
        let envelope: MembersEnvelope = self
            .get_json("fetch assignees", self.members_url(list_id), token)
            .await?;
        Ok(envelope.members)
    }

    async fn statuses(&self, token: &str, space_id: &str) -> Result<Vec<TaskStatus>, ApiError> {
        let envelope: SpaceEnvelope = self
            .get_json("fetch statuses", self.space_url(space_id), token)
            .await?;
        if envelope.statuses.is_empty() {
            return Err(ApiError::NoStatuses {
                space_id: space_id.to_string(),
            });
        }
        Ok(envelope.statuses)
    }

    async fn create_task(&self, token: &str, list_id: &str, task: &NewTask) -> Result<(), ApiError> {
        let request = self.http.post(self.create_task_url(list_id)).json(task);
        self.send_ok("create task", request, token).await?;
        Ok(())
    }

    async fn tasks(
        &self,
        token: &str,
        team_id: &str,
        space_id: Option<&str>,
    ) -> Result<Vec<RemoteTask>, ApiError> {
        let op = if space_id.is_some() { "fetch tasks" } else { "fetch all tasks" };
        let envelope: TasksEnvelope = self
            .get_json(op, self.tasks_url(team_id, space_id), token)
            .await?;
        Ok(envelope.tasks)
    }

    async fn task(&self, token: &str, task_id: &str) -> Result<RemoteTask, ApiError> {
        self.get_json("fetch task details", self.task_url(task_id), token)
            .await
    }

    async fn comments(&self, token: &str, task_id: &str) -> Result<Vec<Comment>, ApiError> {
        let envelope: CommentsEnvelope = self
            .get_json("fetch comments", self.comments_url(task_id), token)
            .await?;
        Ok(envelope.comments)
    }

    async fn post_comment(&self, token: &str, task_id: &str, text: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.comments_url(task_id))
            .json(&CommentBody { comment_text: text });
        self.send_ok("post comment", request, token).await?;
        Ok(())
    }

    async fn update_task(&self, token: &str, task_id: &str, update: &TaskUpdate) -> Result<(), ApiError> {
        let request = self.http.put(self.task_url(task_id)).json(update);
        self.send_ok("update task", request, token).await?;
        Ok(())
    }

    async fn delete_task(&self, token: &str, task_id: &str) -> Result<(), ApiError> {
        let op = "delete task";
        let (status, body) = self
            .send(op, self.http.delete(self.task_url(task_id)), token)
            .await?;
        if status != StatusCode::NO_CONTENT {
            warn!(op, status = status.as_u16(), "delete rejected");
            return Err(ApiError::Status {
                op,
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
