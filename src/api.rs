use reqwest::Url;
use tracing::info;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{CreateTask, Task, TaskStatus, UpdateTask, UpdateTaskStatus};

/// One request per call against `/api/tasks`. No caching or retries;
/// failures come back to the caller as they are.
#[derive(Clone)]
pub struct TaskGateway {
    client: ApiClient,
}

impl TaskGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, ClientError> {
        let mut url = self.client.url("/api/tasks")?;
        if let Some(status) = status {
            url.query_pairs_mut().append_pair("status", status.as_str());
        }
        let tasks: Vec<Task> = self.client.send_json(self.client.get(url)).await?;
        info!(count = tasks.len(), status = ?status, "Listed tasks");
        Ok(tasks)
    }

    pub async fn create_task(&self, input: &CreateTask) -> Result<Task, ClientError> {
        let url = self.client.url("/api/tasks")?;
        let task: Task = self
            .client
            .send_json(self.client.post(url).json(input))
            .await?;
        info!(id = %task.id, title = %task.title, "Created task");
        Ok(task)
    }

    pub async fn update_task(&self, id: &str, input: &UpdateTask) -> Result<Task, ClientError> {
        let url = self.task_url(id, None)?;
        let task: Task = self
            .client
            .send_json(self.client.put(url).json(input))
            .await?;
        info!(id = %task.id, "Updated task");
        Ok(task)
    }

    pub async fn update_task_status(
        &self,
        id: &str,
        status: TaskStatus,
    ) -> Result<Task, ClientError> {
        let url = self.task_url(id, Some("status"))?;
        let task: Task = self
            .client
            .send_json(self.client.patch(url).json(&UpdateTaskStatus { status }))
            .await?;
        info!(id = %task.id, status = %task.status, "Updated task status");
        Ok(task)
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ClientError> {
        let url = self.task_url(id, None)?;
        self.client.send_empty(self.client.delete(url)).await?;
        info!(id, "Deleted task");
        Ok(())
    }

    fn task_url(&self, id: &str, tail: Option<&str>) -> Result<Url, ClientError> {
        let mut url = self.client.url("/api/tasks")?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::Network("base url cannot carry a path".to_string()))?;
            segments.push(id);
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }
}
