//! Screen variants and the transient state each one owns.
//!
//! Exactly one [`Screen`] is active. Leaving a screen drops its state; data
//! that must survive navigation lives on [`crate::tui::app::App`] instead.

use crate::fields::Priority;
use crate::task::{Comment, Folder, ListInfo, Member, RemoteTask, Space, TaskStatus};
use crate::tui::editor::TextEditor;
use crate::tui::enums::{EditFocus, EditMode};
use crate::tui::input::InputField;
use crate::tui::picker::Picker;

const CREDENTIAL_LIMIT: usize = 128;
const COMMAND_LIMIT: usize = 5;

/// Two-field form for the API token and team id.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialForm {
    pub token: InputField,
    pub team: InputField,
    pub focus: usize,
}

impl Default for CredentialForm {
    fn default() -> Self {
        Self {
            token: InputField::with_limit(CREDENTIAL_LIMIT),
            team: InputField::with_limit(CREDENTIAL_LIMIT),
            focus: 0,
        }
    }
}

impl CredentialForm {
    pub const FIELDS: usize = 2;

    /// Field receiving typed characters.
    pub fn focused_mut(&mut self) -> &mut InputField {
        match self.focus {
            0 => &mut self.token,
            _ => &mut self.team,
        }
    }

    /// Move focus to the next field, wrapping around.
    pub fn next(&mut self) {
        self.focus = (self.focus + 1) % Self::FIELDS;
    }

    /// Move focus to the previous field, wrapping around.
    pub fn prev(&mut self) {
        self.focus = (self.focus + Self::FIELDS - 1) % Self::FIELDS;
    }

    /// Whether `enter` submits the form.
    pub fn on_last_field(&self) -> bool {
        self.focus == Self::FIELDS - 1
    }
}

/// Lists of a space, assembled from two independent fetches.
///
/// The displayed order is always folder-less lists followed by folder lists,
/// whichever response arrived first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListSelection {
    folderless: Option<Vec<ListInfo>>,
    foldered: Option<Vec<ListInfo>>,
    pub picker: Picker<ListInfo>,
}

impl ListSelection {
    /// Record the lists that sit directly in the space.
    pub fn set_folderless(&mut self, lists: Vec<ListInfo>) {
        self.folderless = Some(lists);
        self.rebuild();
    }

    /// Record folder lists, named `Folder / List`.
    pub fn set_folders(&mut self, folders: &[Folder]) {
        self.foldered = Some(folders.iter().flat_map(Folder::qualified_lists).collect());
        self.rebuild();
    }

    /// Whether either fetch is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.folderless.is_none() || self.foldered.is_none()
    }

    fn rebuild(&mut self) {
        let merged = self
            .folderless
            .iter()
            .chain(self.foldered.iter())
            .flatten()
            .cloned()
            .collect();
        self.picker.set_items(merged);
    }
}

/// Fixed four-step progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    step: u8,
}

impl Progress {
    pub const STEPS: u8 = 4;

    /// Advance one step. Returns `true` when the bar was already full,
    /// meaning the animation is over.
    pub fn tick(&mut self) -> bool {
        if self.step >= Self::STEPS {
            return true;
        }
        self.step += 1;
        false
    }

    /// Completed fraction in `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        f64::from(self.step) / f64::from(Self::STEPS)
    }
}

/// Task detail view, filled by two concurrent fetches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDetail {
    pub task: Option<RemoteTask>,
    pub comments: Option<Vec<Comment>>,
    pub scroll: u16,
}

/// Working copy of a task in the modal editor.
#[derive(Debug, Clone, PartialEq)]
pub struct EditState {
    pub original: RemoteTask,
    pub description: TextEditor,
    pub comment: InputField,
    pub status: String,
    pub mode: EditMode,
    pub focus: EditFocus,
    pub command: InputField,
}

impl EditState {
    /// Editor seeded from `task`, in Normal mode with the description focused.
    pub fn new(task: RemoteTask) -> Self {
        Self {
            description: TextEditor::with_text(&task.description),
            comment: InputField::new(),
            status: task.status_label().to_string(),
            mode: EditMode::Normal,
            focus: EditFocus::Description,
            command: InputField::with_limit(COMMAND_LIMIT),
            original: task,
        }
    }
}

/// Task collection shown by the browsing screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskBrowser {
    pub picker: Picker<RemoteTask>,
    pub loading: bool,
    pub loaded: bool,
    /// Set when the remote list changed while another screen was active.
    pub stale: bool,
    pub title: String,
}

impl TaskBrowser {
    /// Show the spinner until the next task list arrives.
    pub fn start_loading(&mut self) {
        self.loading = true;
    }

    /// Replace the collection with the latest fetch.
    pub fn finish_loading(&mut self, tasks: Vec<RemoteTask>) {
        self.picker.set_items(tasks);
        self.loading = false;
        self.loaded = true;
        self.stale = false;
    }
}

/// The active screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    CredentialEntry(CredentialForm),
    SpaceSelection(Picker<Space>),
    ListSelection(ListSelection),
    CreateTitle(InputField),
    CreateDescription(TextEditor),
    CreateStatus(Picker<TaskStatus>),
    CreateAssignees(Picker<Member>),
    CreatePriority { picker: Picker<Priority>, submitted: bool },
    TaskCreated(Progress),
    TaskList,
    TaskDetail(TaskDetail),
    EditTask(EditState),
    StatusUpdate { picker: Picker<TaskStatus>, editor: Box<EditState> },
    DeleteConfirmation { task: RemoteTask },
    TaskDeleted { progress: Progress, confirmed: bool },
    Error(String),
}

impl Screen {
    /// Short identifier used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Screen::CredentialEntry(_) => "credential_entry",
            Screen::SpaceSelection(_) => "space_selection",
            Screen::ListSelection(_) => "list_selection",
            Screen::CreateTitle(_) => "create_title",
            Screen::CreateDescription(_) => "create_description",
            Screen::CreateStatus(_) => "create_status",
            Screen::CreateAssignees(_) => "create_assignees",
            Screen::CreatePriority { .. } => "create_priority",
            Screen::TaskCreated(_) => "task_created",
            Screen::TaskList => "task_list",
            Screen::TaskDetail(_) => "task_detail",
            Screen::EditTask(_) => "edit_task",
            Screen::StatusUpdate { .. } => "status_update",
            Screen::DeleteConfirmation { .. } => "delete_confirmation",
            Screen::TaskDeleted { .. } => "task_deleted",
            Screen::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: &str, name: &str) -> ListInfo {
        ListInfo { id: id.into(), name: name.into() }
    }

    fn folders() -> Vec<Folder> {
        vec![Folder { id: "f".into(), name: "Q3".into(), lists: vec![list("l2", "Roadmap")] }]
    }

    fn names(sel: &ListSelection) -> Vec<String> {
        sel.picker.visible_items().map(|l| l.name.clone()).collect()
    }

    #[test]
    fn test_list_merge_is_order_independent() {
        let mut a = ListSelection::default();
        a.set_folderless(vec![list("l1", "Inbox")]);
        assert!(a.is_loading());
        a.set_folders(&folders());

        let mut b = ListSelection::default();
        b.set_folders(&folders());
        b.set_folderless(vec![list("l1", "Inbox")]);

        assert!(!a.is_loading());
        assert_eq!(names(&a), vec!["Inbox", "Q3 / Roadmap"]);
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_progress_runs_four_steps_then_completes() {
        let mut progress = Progress::default();
        for _ in 0..Progress::STEPS {
            assert!(!progress.tick());
        }
        assert_eq!(progress.ratio(), 1.0);
        assert!(progress.tick());
    }

    #[test]
    fn test_credential_focus_cycles() {
        let mut form = CredentialForm::default();
        form.next();
        assert!(form.on_last_field());
        form.next();
        assert_eq!(form.focus, 0);
        form.prev();
        assert!(form.on_last_field());
    }
}
