//! Generic filterable list state shared by every selection screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::fields::Priority;
use crate::task::{ListInfo, Member, RemoteTask, Space, TaskStatus};
use crate::tui::input::InputField;

const DEFAULT_PAGE: usize = 10;

/// Anything that can be shown as a row in a [`Picker`].
pub trait PickerItem {
    fn title(&self) -> String;

    fn description(&self) -> String {
        String::new()
    }

    /// Text matched against the filter.
    fn filter_value(&self) -> String {
        self.title()
    }
}

/// Selectable list with a cursor and an optional text filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Picker<T> {
    items: Vec<T>,
    visible: Vec<usize>,
    cursor: usize,
    pub filter: InputField,
    filtering: bool,
    page: usize,
}

impl<T: PickerItem> Default for Picker<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: PickerItem> Picker<T> {
    /// Picker over `items` with no filter and the cursor on the first row.
    pub fn new(items: Vec<T>) -> Self {
        let mut picker = Self {
            items,
            visible: Vec::new(),
            cursor: 0,
            filter: InputField::new(),
            filtering: false,
            page: DEFAULT_PAGE,
        };
        picker.refilter();
        picker
    }

    /// Replace all items, keeping the filter text.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.cursor = 0;
        self.refilter();
    }

    /// All items, ignoring the filter.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Items passing the filter, in display order.
    pub fn visible_items(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().filter_map(|&i| self.items.get(i))
    }

    /// Number of items passing the filter.
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Cursor position within the visible items.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Item under the cursor, if any are visible.
    pub fn selected(&self) -> Option<&T> {
        self.visible.get(self.cursor).and_then(|&i| self.items.get(i))
    }

    /// Whether keys currently edit the filter text.
    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    /// Whether a non-empty filter narrows the items.
    pub fn filter_applied(&self) -> bool {
        !self.filter.is_empty()
    }

    /// Rows moved by `pgup`/`pgdn`. Never less than one.
    pub fn set_page_size(&mut self, rows: usize) {
        self.page = rows.max(1);
    }

    fn refilter(&mut self) {
        let needle = self.filter.value.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| needle.is_empty() || item.filter_value().to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        if self.cursor >= self.visible.len() {
            self.cursor = self.visible.len().saturating_sub(1);
        }
    }

    fn clear_filter(&mut self) {
        self.filter.clear();
        self.filtering = false;
        self.refilter();
    }

    fn move_by(&mut self, delta: isize) {
        let last = self.visible.len().saturating_sub(1) as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, last.max(0)) as usize;
    }

    /// Apply a navigation or filter key. Returns `false` for keys the picker
    /// leaves to the caller, such as `enter` outside filter mode.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if self.filtering {
            match key.code {
                KeyCode::Enter => self.filtering = false,
                KeyCode::Esc => self.clear_filter(),
                KeyCode::Up => self.move_by(-1),
                KeyCode::Down => self.move_by(1),
                _ => {
                    if !self.filter.handle_key(key) {
                        return false;
                    }
                    self.cursor = 0;
                    self.refilter();
                }
            }
            return true;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        let page = self.page as isize;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = 0,
            KeyCode::End | KeyCode::Char('G') => self.move_by(isize::MAX / 2),
            KeyCode::PageUp => self.move_by(-page),
            KeyCode::PageDown => self.move_by(page),
            KeyCode::Char('/') => self.filtering = true,
            KeyCode::Esc if self.filter_applied() => self.clear_filter(),
            _ => return false,
        }
        true
    }
}

impl PickerItem for Space {
    fn title(&self) -> String {
        self.name.clone()
    }
}

impl PickerItem for ListInfo {
    fn title(&self) -> String {
        self.name.clone()
    }
}

impl PickerItem for TaskStatus {
    fn title(&self) -> String {
        self.label.clone()
    }
}

impl PickerItem for Member {
    fn title(&self) -> String {
        self.username.clone()
    }

    fn description(&self) -> String {
        self.email.clone()
    }
}

impl PickerItem for Priority {
    fn title(&self) -> String {
        self.label().to_string()
    }
}

impl PickerItem for RemoteTask {
    fn title(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        self.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn spaces(names: &[&str]) -> Picker<Space> {
        Picker::new(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| Space { id: i.to_string(), name: n.to_string() })
                .collect(),
        )
    }

    #[test]
    fn test_navigation_clamps() {
        let mut picker = spaces(&["Eng", "Design", "Ops"]);
        picker.handle_key(&key(KeyCode::Up));
        assert_eq!(picker.cursor(), 0);
        picker.handle_key(&key(KeyCode::Char('G')));
        assert_eq!(picker.selected().map(|s| s.name.as_str()), Some("Ops"));
        picker.handle_key(&key(KeyCode::Char('j')));
        assert_eq!(picker.cursor(), 2);
        picker.handle_key(&key(KeyCode::Char('g')));
        assert_eq!(picker.cursor(), 0);
    }

    #[test]
    fn test_filter_narrows_and_escape_clears() {
        let mut picker = spaces(&["Eng", "Design", "Engagement"]);
        picker.handle_key(&key(KeyCode::Char('/')));
        assert!(picker.is_filtering());
        for c in "eng".chars() {
            picker.handle_key(&key(KeyCode::Char(c)));
        }
        assert_eq!(picker.visible_len(), 2);

        picker.handle_key(&key(KeyCode::Enter));
        assert!(!picker.is_filtering());
        assert!(picker.filter_applied());

        assert!(picker.handle_key(&key(KeyCode::Esc)));
        assert!(!picker.filter_applied());
        assert_eq!(picker.visible_len(), 3);
    }

    #[test]
    fn test_unhandled_keys_fall_through() {
        let mut picker = spaces(&["Eng"]);
        assert!(!picker.handle_key(&key(KeyCode::Enter)));
        assert!(!picker.handle_key(&key(KeyCode::Char('q'))));
        assert!(!picker.handle_key(&key(KeyCode::Esc)));
    }

    #[test]
    fn test_empty_picker_has_no_selection() {
        let mut picker: Picker<Space> = Picker::default();
        picker.handle_key(&key(KeyCode::Down));
        assert!(picker.selected().is_none());
    }
}
