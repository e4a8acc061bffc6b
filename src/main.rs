use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use taskmaster::config::Config;
use taskmaster::controller::NoticeLevel;
use taskmaster::models::TaskStatus;
use taskmaster::routes::{self, Route};
use taskmaster::{create_app, storage};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let storage = match storage::open(&config.storage_path) {
        Ok(storage) => storage,
        Err(err) => {
            error!(path = ?config.storage_path, "opening storage: {err}");
            return ExitCode::FAILURE;
        }
    };

    let app = create_app(&config.api_url, storage);

    if routes::resolve(Route::Tasks.path(), &app.session) == Route::Login {
        let Some(form) = config.credentials.as_ref() else {
            warn!("not signed in; set TASKMASTER_EMAIL and TASKMASTER_PASSWORD");
            return ExitCode::FAILURE;
        };
        if let Err(err) = app.sign_in(form).await {
            error!("{}", err.user_message("Login failed. Check your credentials."));
            return ExitCode::FAILURE;
        }
    }

    if let Some(identity) = app.session.current_identity() {
        info!(name = %identity.name, "Signed in");
    }

    let mut list = app.task_list();
    list.init().await;
    list.filter(config.filter);

    for notice in list.drain_notices() {
        match notice.level {
            NoticeLevel::Info => info!("{}", notice.message),
            NoticeLevel::Error => error!("{}", notice.message),
        }
    }

    let labels: Vec<String> = list
        .filter_labels()
        .into_iter()
        .map(|(_, label)| label)
        .collect();
    println!("{}", labels.join("  "));

    let tasks = list.collection().filtered_tasks();
    if tasks.is_empty() {
        println!("{}", list.empty_message());
        println!("{}", list.empty_hint());
    }
    for task in tasks {
        let mark = match task.status {
            TaskStatus::Completed => "x",
            TaskStatus::Pending => " ",
        };
        println!(
            "[{mark}] {} ({}) - {}",
            task.title,
            task.priority.label(),
            task.description
        );
    }

    ExitCode::SUCCESS
}
