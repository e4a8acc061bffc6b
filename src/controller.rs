//! Task list screen: turns user intents into store calls and reports each
//! outcome as a short notice.

use tracing::debug;

use crate::error::ClientError;
use crate::forms::TaskForm;
use crate::models::{Filter, Task, TaskStatus};
use crate::tasks::{TaskCollection, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(err: &ClientError, fallback: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: err.user_message(fallback),
        }
    }
}

pub struct TaskListController {
    store: TaskStore,
    notices: Vec<Notice>,
}

impl TaskListController {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            notices: Vec::new(),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn collection(&self) -> &TaskCollection {
        self.store.collection()
    }

    pub async fn init(&mut self) {
        if let Err(err) = self.store.load().await {
            self.notices.push(Notice::error(&err, "Failed to load tasks"));
        }
    }

    pub async fn submit_create(&mut self, form: &TaskForm) -> Option<Task> {
        let input = match form.to_create() {
            Ok(input) => input,
            Err(err) => return self.reject(err, "Invalid task"),
        };
        match self.store.create(&input).await {
            Ok(task) => {
                self.notices.push(Notice::info("Task created successfully!"));
                Some(task)
            }
            Err(err) => self.reject(err, "Failed to create task"),
        }
    }

    /// Completed tasks are read-only; only their status can change.
    pub async fn submit_edit(&mut self, id: &str, form: &TaskForm) -> Option<Task> {
        if !self.can_edit(id) {
            let err = ClientError::Validation("Completed tasks cannot be edited");
            return self.reject(err, "Invalid task");
        }
        let input = match form.to_update() {
            Ok(input) => input,
            Err(err) => return self.reject(err, "Invalid task"),
        };
        match self.store.update(id, &input).await {
            Ok(task) => {
                self.notices.push(Notice::info("Task updated successfully!"));
                Some(task)
            }
            Err(err) => self.reject(err, "Failed to update task"),
        }
    }

    /// Whether the edit action is available for `id`.
    pub fn can_edit(&self, id: &str) -> bool {
        self.collection()
            .get(id)
            .map_or(true, |task| task.status != TaskStatus::Completed)
    }

    /// Deletes only when the user confirmed the prompt.
    pub async fn delete(&mut self, id: &str, confirmed: bool) -> bool {
        if !confirmed {
            debug!(id, "Delete cancelled");
            return false;
        }
        match self.store.remove(id).await {
            Ok(()) => {
                self.notices.push(Notice::info("Task deleted successfully!"));
                true
            }
            Err(err) => {
                self.notices.push(Notice::error(&err, "Failed to delete task"));
                false
            }
        }
    }

    pub async fn toggle(&mut self, id: &str) -> Option<Task> {
        match self.store.toggle(id).await {
            Ok(task) => {
                let message = match task.status {
                    TaskStatus::Completed => "Task marked as completed!",
                    TaskStatus::Pending => "Task marked as pending!",
                };
                self.notices.push(Notice::info(message));
                Some(task)
            }
            Err(err) => self.reject(err, "Failed to update task status"),
        }
    }

    pub fn filter(&mut self, filter: Filter) {
        self.store.set_filter(filter);
    }

    /// Labels for the filter tabs, with the counts they cover.
    pub fn filter_labels(&self) -> [(Filter, String); 3] {
        let collection = self.collection();
        [
            (Filter::All, format!("All ({})", collection.len())),
            (
                Filter::Pending,
                format!("Pending ({})", collection.pending_count()),
            ),
            (
                Filter::Completed,
                format!("Completed ({})", collection.completed_count()),
            ),
        ]
    }

    /// Heading shown when the active view has no tasks.
    pub fn empty_message(&self) -> &'static str {
        match self.collection().filter() {
            Filter::All => "No tasks yet",
            Filter::Pending => "No pending tasks",
            Filter::Completed => "No completed tasks",
        }
    }

    pub fn empty_hint(&self) -> &'static str {
        match self.collection().filter() {
            Filter::All => "Start by creating your first task.",
            Filter::Pending => "All of your tasks are done!",
            Filter::Completed => "No tasks have been completed yet.",
        }
    }

    /// The empty state only offers a "create first task" action on the
    /// unfiltered view.
    pub fn offers_first_task(&self) -> bool {
        self.collection().filter() == Filter::All
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn reject<T>(&mut self, err: ClientError, fallback: &str) -> Option<T> {
        self.notices.push(Notice::error(&err, fallback));
        None
    }
}
