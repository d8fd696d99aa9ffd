//! Commands issued by the screen state machine and the outcomes they produce.
//!
//! Each [`Command`] performs at most one network or filesystem operation and
//! resolves to exactly one [`Outcome`], which the event loop feeds back into
//! [`crate::tui::app::App::apply`]. Errors are flattened into
//! [`Outcome::Failed`] carrying the message shown to the user.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::api::{NewTask, TaskService, TaskUpdate};
use crate::config::{CredentialStore, Credentials};
use crate::task::{Comment, Folder, ListInfo, Member, RemoteTask, Space, TaskStatus};

/// Marker for a side-effecting operation that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    TaskCreated,
    ListRefresh,
    TaskDeleted,
}

impl Sentinel {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentinel::TaskCreated => "create_success",
            Sentinel::ListRefresh => "refresh_list_success",
            Sentinel::TaskDeleted => "delete_success",
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of asynchronous work requested by a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SaveCredentials(Credentials),
    FetchSpaces { team_id: String },
    FetchFolderlessLists { space_id: String },
    FetchFolders { space_id: String },
    FetchMembers { list_id: String },
    FetchStatuses { space_id: String },
    CreateTask { list_id: String, task: NewTask },
    FetchTasks { team_id: String, space_id: Option<String> },
    FetchTask { task_id: String },
    FetchComments { task_id: String },
    PostComment { task_id: String, text: String },
    UpdateTask { task_id: String, update: TaskUpdate },
    DeleteTask { task_id: String },
    /// Resolve with [`Outcome::Tick`] after the given pause.
    Delay(Duration),
    /// Stop the event loop. Never reaches the bridge.
    Quit,
}

/// Result of one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Spaces(Vec<Space>),
    Lists(Vec<ListInfo>),
    Folders(Vec<Folder>),
    Members(Vec<Member>),
    Statuses(Vec<TaskStatus>),
    Tasks(Vec<RemoteTask>),
    Task(RemoteTask),
    Comments { task_id: String, comments: Vec<Comment> },
    Done(Sentinel),
    CredentialsSaved,
    Nothing,
    Tick,
    Failed(String),
}

/// Executes commands against the remote service and the credential store.
#[derive(Clone)]
pub struct Bridge {
    service: Arc<dyn TaskService>,
    store: CredentialStore,
}

impl Bridge {
    pub fn new(service: Arc<dyn TaskService>, store: CredentialStore) -> Self {
        Self { service, store }
    }

    /// Run one command to completion using `token` for remote calls.
    pub async fn execute(&self, command: Command, token: &str) -> Outcome {
        debug!(?command, "executing");
        let svc = self.service.as_ref();
        let result = match command {
            Command::SaveCredentials(creds) => self
                .store
                .save(&creds)
                .map(|_| Outcome::CredentialsSaved)
                .map_err(|e| e.to_string()),
            Command::FetchSpaces { team_id } => svc
                .spaces(token, &team_id)
                .await
                .map(Outcome::Spaces)
                .map_err(|e| e.to_string()),
            Command::FetchFolderlessLists { space_id } => svc
                .folderless_lists(token, &space_id)
                .await
                .map(Outcome::Lists)
                .map_err(|e| e.to_string()),
            Command::FetchFolders { space_id } => svc
                .folders(token, &space_id)
                .await
                .map(Outcome::Folders)
                .map_err(|e| e.to_string()),
            Command::FetchMembers { list_id } => svc
                .members(token, &list_id)
                .await
                .map(Outcome::Members)
                .map_err(|e| e.to_string()),
            Command::FetchStatuses { space_id } => svc
                .statuses(token, &space_id)
                .await
                .map(Outcome::Statuses)
                .map_err(|e| e.to_string()),
            Command::CreateTask { list_id, task } => svc
                .create_task(token, &list_id, &task)
                .await
                .map(|_| Outcome::Done(Sentinel::TaskCreated))
                .map_err(|e| e.to_string()),
            Command::FetchTasks { team_id, space_id } => svc
                .tasks(token, &team_id, space_id.as_deref())
                .await
                .map(Outcome::Tasks)
                .map_err(|e| e.to_string()),
            Command::FetchTask { task_id } => svc
                .task(token, &task_id)
                .await
                .map(Outcome::Task)
                .map_err(|e| e.to_string()),
            Command::FetchComments { task_id } => svc
                .comments(token, &task_id)
                .await
                .map(|comments| Outcome::Comments {
                    task_id: task_id.clone(),
                    comments,
                })
                .map_err(|e| e.to_string()),
            Command::PostComment { text, .. } if text.is_empty() => Ok(Outcome::Nothing),
            Command::PostComment { task_id, text } => svc
                .post_comment(token, &task_id, &text)
                .await
                .map(|_| Outcome::Done(Sentinel::ListRefresh))
                .map_err(|e| e.to_string()),
            Command::UpdateTask { update, .. } if update.is_empty() => Ok(Outcome::Nothing),
            Command::UpdateTask { task_id, update } => svc
                .update_task(token, &task_id, &update)
                .await
                .map(|_| Outcome::Done(Sentinel::ListRefresh))
                .map_err(|e| e.to_string()),
            Command::DeleteTask { task_id } => svc
                .delete_task(token, &task_id)
                .await
                .map(|_| Outcome::Done(Sentinel::TaskDeleted))
                .map_err(|e| e.to_string()),
            Command::Delay(pause) => {
                tokio::time::sleep(pause).await;
                Ok(Outcome::Tick)
            }
            Command::Quit => Ok(Outcome::Nothing),
        };

        result.unwrap_or_else(|message| {
            error!(%message, "command failed");
            Outcome::Failed(message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory service recording every call it receives.
    #[derive(Default)]
    struct FakeService {
        calls: Mutex<Vec<String>>,
        delete_body: Option<&'static str>,
    }

    impl FakeService {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskService for FakeService {
        async fn spaces(&self, token: &str, team_id: &str) -> Result<Vec<Space>, ApiError> {
            self.record(format!("spaces {token} {team_id}"));
            Ok(vec![Space { id: "1".into(), name: "Eng".into() }])
        }

        async fn folderless_lists(&self, _: &str, space_id: &str) -> Result<Vec<ListInfo>, ApiError> {
            self.record(format!("lists {space_id}"));
            Ok(Vec::new())
        }

        async fn folders(&self, _: &str, space_id: &str) -> Result<Vec<Folder>, ApiError> {
            self.record(format!("folders {space_id}"));
            Ok(Vec::new())
        }

        async fn members(&self, _: &str, list_id: &str) -> Result<Vec<Member>, ApiError> {
            self.record(format!("members {list_id}"));
            Ok(Vec::new())
        }

        async fn statuses(&self, _: &str, space_id: &str) -> Result<Vec<TaskStatus>, ApiError> {
            self.record(format!("statuses {space_id}"));
            Err(ApiError::NoStatuses { space_id: space_id.to_string() })
        }

        async fn create_task(&self, _: &str, list_id: &str, task: &NewTask) -> Result<(), ApiError> {
            self.record(format!("create {list_id} {}", task.name));
            Ok(())
        }

        async fn tasks(&self, _: &str, team_id: &str, space_id: Option<&str>) -> Result<Vec<RemoteTask>, ApiError> {
            self.record(format!("tasks {team_id} {space_id:?}"));
            Ok(Vec::new())
        }

        async fn task(&self, _: &str, task_id: &str) -> Result<RemoteTask, ApiError> {
            self.record(format!("task {task_id}"));
            Ok(RemoteTask { id: task_id.to_string(), ..RemoteTask::default() })
        }

        async fn comments(&self, _: &str, task_id: &str) -> Result<Vec<Comment>, ApiError> {
            self.record(format!("comments {task_id}"));
            Ok(Vec::new())
        }

        async fn post_comment(&self, _: &str, task_id: &str, text: &str) -> Result<(), ApiError> {
            self.record(format!("comment {task_id} {text}"));
            Ok(())
        }

        async fn update_task(&self, _: &str, task_id: &str, _: &TaskUpdate) -> Result<(), ApiError> {
            self.record(format!("update {task_id}"));
            Ok(())
        }

        async fn delete_task(&self, _: &str, task_id: &str) -> Result<(), ApiError> {
            self.record(format!("delete {task_id}"));
            match self.delete_body {
                Some(body) => Err(ApiError::Status { op: "delete task", status: 404, body: body.to_string() }),
                None => Ok(()),
            }
        }
    }

    fn bridge_with(service: Arc<FakeService>) -> (Bridge, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().unwrap();
        let store = CredentialStore::with_paths(dir.path().join(".clup.env"), dir.path().join(".env"));
        (Bridge::new(service, store), dir)
    }

    #[test]
    fn test_sentinel_strings() {
        assert_eq!(Sentinel::TaskCreated.to_string(), "create_success");
        assert_eq!(Sentinel::ListRefresh.to_string(), "refresh_list_success");
        assert_eq!(Sentinel::TaskDeleted.to_string(), "delete_success");
    }

    #[tokio::test]
    async fn test_fetch_passes_token() {
        let service = Arc::new(FakeService::default());
        let (bridge, _dir) = bridge_with(service.clone());

        let outcome = bridge
            .execute(Command::FetchSpaces { team_id: "9".into() }, "pk_1")
            .await;
        assert!(matches!(outcome, Outcome::Spaces(ref s) if s.len() == 1));
        assert_eq!(service.calls(), vec!["spaces pk_1 9"]);
    }

    #[tokio::test]
    async fn test_comments_carry_their_task_id() {
        let service = Arc::new(FakeService::default());
        let (bridge, _dir) = bridge_with(service.clone());

        let outcome = bridge.execute(Command::FetchComments { task_id: "t7".into() }, "tok").await;
        assert_eq!(outcome, Outcome::Comments { task_id: "t7".into(), comments: Vec::new() });
        assert_eq!(service.calls(), vec!["comments t7"]);
    }

    #[tokio::test]
    async fn test_empty_comment_and_update_are_no_ops() {
        let service = Arc::new(FakeService::default());
        let (bridge, _dir) = bridge_with(service.clone());

        let comment = Command::PostComment { task_id: "t1".into(), text: String::new() };
        assert_eq!(bridge.execute(comment, "tok").await, Outcome::Nothing);

        let update = Command::UpdateTask { task_id: "t1".into(), update: TaskUpdate::default() };
        assert_eq!(bridge.execute(update, "tok").await, Outcome::Nothing);

        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_side_effects_resolve_to_sentinels() {
        let service = Arc::new(FakeService::default());
        let (bridge, _dir) = bridge_with(service.clone());

        let comment = Command::PostComment { task_id: "t1".into(), text: "done".into() };
        assert_eq!(bridge.execute(comment, "tok").await, Outcome::Done(Sentinel::ListRefresh));

        let delete = Command::DeleteTask { task_id: "t1".into() };
        assert_eq!(bridge.execute(delete, "tok").await, Outcome::Done(Sentinel::TaskDeleted));
    }

    #[tokio::test]
    async fn test_errors_become_failed_with_message() {
        let service = Arc::new(FakeService { delete_body: Some("Task not found"), ..FakeService::default() });
        let (bridge, _dir) = bridge_with(service);

        let outcome = bridge.execute(Command::DeleteTask { task_id: "t1".into() }, "tok").await;
        assert_eq!(outcome, Outcome::Failed("delete task failed: Task not found".into()));

        let outcome = bridge.execute(Command::FetchStatuses { space_id: "s1".into() }, "tok").await;
        assert_eq!(outcome, Outcome::Failed("no statuses found for space s1".into()));
    }

    #[tokio::test]
    async fn test_save_credentials_writes_store() {
        let service = Arc::new(FakeService::default());
        let (bridge, dir) = bridge_with(service);

        let creds = Credentials::new("pk_1", "9");
        let outcome = bridge.execute(Command::SaveCredentials(creds), "").await;
        assert_eq!(outcome, Outcome::CredentialsSaved);

        let written = std::fs::read_to_string(dir.path().join(".clup.env")).unwrap();
        assert!(written.contains("CLICKUP_TEAM_ID=\"9\""));
    }

    #[tokio::test]
    async fn test_delay_ticks() {
        let service = Arc::new(FakeService::default());
        let (bridge, _dir) = bridge_with(service);
        assert_eq!(bridge.execute(Command::Delay(Duration::ZERO), "").await, Outcome::Tick);
    }
}
