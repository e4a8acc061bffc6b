//! In-memory mirror of the server's task set.
//!
//! [`TaskCollection`] holds the tasks plus the values derived from them (the
//! filtered view and the per-status counts). Every mutator recomputes the
//! derived values before returning, so readers never see them disagree with
//! the collection. [`TaskStore`] drives the collection from gateway calls and
//! only touches it once the server has confirmed a change.

use tracing::{info, warn};

use crate::api::TaskGateway;
use crate::error::ClientError;
use crate::models::{CreateTask, Filter, Task, TaskStatus, UpdateTask};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Empty,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    filter: Filter,
    filtered: Vec<Task>,
    pending_count: usize,
    completed_count: usize,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filtered_tasks(&self) -> &[Task] {
        &self.filtered
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn pending_count(&self) -> usize {
        self.pending_count
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Full replace with a fresh server listing.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.recompute();
    }

    pub fn append(&mut self, task: Task) {
        self.tasks.push(task);
        self.recompute();
    }

    /// Swaps in `task` at the position of the record with the same id.
    /// Returns false, leaving the collection alone, if there is none.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter().position(|existing| existing.id == task.id) {
            Some(index) => {
                self.tasks[index] = task;
                self.recompute();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    /// Counts do not depend on the filter, so only the view is rebuilt.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.apply_filter();
    }

    fn recompute(&mut self) {
        self.pending_count = self
            .tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Pending)
            .count();
        self.completed_count = self.tasks.len() - self.pending_count;
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let filter = self.filter;
        self.filtered = self
            .tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
    }
}

pub struct TaskStore {
    gateway: TaskGateway,
    collection: TaskCollection,
    state: LoadState,
}

impl TaskStore {
    pub fn new(gateway: TaskGateway) -> Self {
        Self {
            gateway,
            collection: TaskCollection::new(),
            state: LoadState::Empty,
        }
    }

    pub fn collection(&self) -> &TaskCollection {
        &self.collection
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Fetches every task and replaces the mirror with the result. On failure
    /// the mirror and the load state stay as they were.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let previous = self.state;
        self.state = LoadState::Loading;
        match self.gateway.list_tasks(None).await {
            Ok(tasks) => {
                self.collection.replace_all(tasks);
                self.state = LoadState::Loaded;
                info!(
                    total = self.collection.len(),
                    pending = self.collection.pending_count(),
                    completed = self.collection.completed_count(),
                    "Loaded tasks"
                );
                Ok(())
            }
            Err(err) => {
                self.state = previous;
                warn!(error = %err, "Loading tasks failed");
                Err(err)
            }
        }
    }

    pub async fn create(&mut self, input: &CreateTask) -> Result<Task, ClientError> {
        let task = self.gateway.create_task(input).await?;
        self.collection.append(task.clone());
        Ok(task)
    }

    pub async fn update(&mut self, id: &str, input: &UpdateTask) -> Result<Task, ClientError> {
        let task = self.gateway.update_task(id, input).await?;
        self.merge(id, task.clone());
        Ok(task)
    }

    pub async fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<Task, ClientError> {
        let task = self.gateway.update_task_status(id, status).await?;
        self.merge(id, task.clone());
        Ok(task)
    }

    /// Flips the status of a task already in the mirror.
    pub async fn toggle(&mut self, id: &str) -> Result<Task, ClientError> {
        let next = self
            .collection
            .get(id)
            .map(|task| task.status.toggled())
            .ok_or_else(|| ClientError::NotFound(id.to_string()))?;
        self.set_status(id, next).await
    }

    /// Deletes on the server first; the record only leaves the mirror once
    /// that succeeded.
    pub async fn remove(&mut self, id: &str) -> Result<(), ClientError> {
        self.gateway.delete_task(id).await?;
        self.collection.remove(id);
        Ok(())
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.collection.set_filter(filter);
    }

    fn merge(&mut self, id: &str, task: Task) {
        if task.id != id {
            warn!(requested = id, returned = %task.id, "Dropping response for a different task id");
            return;
        }
        if !self.collection.replace(task) {
            warn!(id, "Dropping update for a task not in the collection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskPriority;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            description: "something to do".to_string(),
            status,
            priority: TaskPriority::Medium,
            created_at: "2024-01-01T00:00:00".to_string(),
            updated_at: "2024-01-01T00:00:00".to_string(),
        }
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn assert_counts_consistent(collection: &TaskCollection) {
        assert_eq!(
            collection.pending_count() + collection.completed_count(),
            collection.len()
        );
    }

    #[test]
    fn empty_collection() {
        let collection = TaskCollection::new();
        assert!(collection.is_empty());
        assert!(collection.filtered_tasks().is_empty());
        assert_eq!(collection.pending_count(), 0);
        assert_eq!(collection.completed_count(), 0);
    }

    #[test]
    fn replace_all_recomputes_counts_and_view() {
        let mut collection = TaskCollection::new();
        collection.replace_all(vec![
            task("1", TaskStatus::Pending),
            task("2", TaskStatus::Completed),
            task("3", TaskStatus::Pending),
        ]);
        assert_eq!(collection.pending_count(), 2);
        assert_eq!(collection.completed_count(), 1);
        assert_eq!(ids(collection.filtered_tasks()), ["1", "2", "3"]);
    }

    #[test]
    fn pending_filter_keeps_relative_order() {
        let mut collection = TaskCollection::new();
        collection.replace_all(vec![
            task("1", TaskStatus::Pending),
            task("2", TaskStatus::Completed),
            task("3", TaskStatus::Pending),
            task("4", TaskStatus::Completed),
            task("5", TaskStatus::Pending),
        ]);

        collection.set_filter(Filter::Pending);
        assert_eq!(ids(collection.filtered_tasks()), ["1", "3", "5"]);

        collection.set_filter(Filter::Completed);
        assert_eq!(ids(collection.filtered_tasks()), ["2", "4"]);

        collection.set_filter(Filter::All);
        assert_eq!(ids(collection.filtered_tasks()), ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn filter_follows_later_mutations() {
        let mut collection = TaskCollection::new();
        collection.set_filter(Filter::Completed);
        collection.append(task("1", TaskStatus::Pending));
        assert!(collection.filtered_tasks().is_empty());

        collection.replace(task("1", TaskStatus::Completed));
        assert_eq!(ids(collection.filtered_tasks()), ["1"]);
    }

    #[test]
    fn replace_keeps_position() {
        let mut collection = TaskCollection::new();
        collection.replace_all(vec![
            task("1", TaskStatus::Pending),
            task("2", TaskStatus::Completed),
        ]);

        assert!(collection.replace(task("1", TaskStatus::Completed)));
        assert_eq!(ids(collection.tasks()), ["1", "2"]);
        assert_eq!(collection.pending_count(), 0);
        assert_eq!(collection.completed_count(), 2);
    }

    #[test]
    fn replace_of_unknown_id_is_dropped() {
        let mut collection = TaskCollection::new();
        collection.append(task("1", TaskStatus::Pending));
        let before = collection.clone();

        assert!(!collection.replace(task("9", TaskStatus::Completed)));
        assert_eq!(collection, before);
    }

    #[test]
    fn remove_drops_record_and_recounts() {
        let mut collection = TaskCollection::new();
        collection.replace_all(vec![
            task("1", TaskStatus::Pending),
            task("2", TaskStatus::Completed),
        ]);

        assert!(collection.remove("2"));
        assert_eq!(ids(collection.tasks()), ["1"]);
        assert_eq!(collection.completed_count(), 0);
        assert!(!collection.remove("2"));
    }

    #[test]
    fn counts_stay_consistent_through_mutations() {
        let mut collection = TaskCollection::new();
        assert_counts_consistent(&collection);

        for i in 0..6 {
            let status = if i % 2 == 0 {
                TaskStatus::Pending
            } else {
                TaskStatus::Completed
            };
            collection.append(task(&i.to_string(), status));
            assert_counts_consistent(&collection);
        }

        collection.replace(task("0", TaskStatus::Completed));
        assert_counts_consistent(&collection);
        collection.replace(task("1", TaskStatus::Pending));
        assert_counts_consistent(&collection);
        collection.remove("3");
        assert_counts_consistent(&collection);
        collection.set_filter(Filter::Pending);
        assert_counts_consistent(&collection);
        assert_eq!(collection.pending_count(), collection.filtered_tasks().len());
    }
}
