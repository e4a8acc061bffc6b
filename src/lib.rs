pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod forms;
pub mod models;
pub mod routes;
pub mod session;
pub mod storage;
pub mod tasks;

use api::TaskGateway;
use auth::AuthGateway;
use client::ApiClient;
use controller::TaskListController;
use error::ClientError;
use forms::LoginForm;
use models::UserIdentity;
use session::SessionStore;
use storage::Storage;
use tasks::TaskStore;

/// Everything a front end needs, wired around one shared session.
#[derive(Clone)]
pub struct App {
    pub session: SessionStore,
    pub auth: AuthGateway,
    pub tasks: TaskGateway,
}

pub fn create_app(api_url: &str, storage: Storage) -> App {
    let session = SessionStore::new(storage);
    session.initialize();

    let client = ApiClient::new(api_url, session.clone());
    tracing::info!(api_url, authenticated = session.is_authenticated(), "Client ready");

    App {
        auth: AuthGateway::new(client.clone()),
        tasks: TaskGateway::new(client),
        session,
    }
}

impl App {
    pub fn task_list(&self) -> TaskListController {
        TaskListController::new(TaskStore::new(self.tasks.clone()))
    }

    /// Validates `form` and logs in. Nothing is sent if validation fails.
    pub async fn sign_in(&self, form: &LoginForm) -> Result<UserIdentity, ClientError> {
        let credentials = form.validate()?;
        self.auth.login(&credentials).await
    }
}
