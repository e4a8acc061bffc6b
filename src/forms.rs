//! Input checks that run before anything is sent to the server.

use crate::error::ClientError;
use crate::models::{CreateTask, LoginRequest, RegisterRequest, Task, TaskPriority, UpdateTask};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ClientError> {
        let email = required(&self.email, "Email is required")?;
        check_email(email)?;
        if self.password.is_empty() {
            return Err(ClientError::Validation("Password is required"));
        }
        Ok(LoginRequest {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ClientError> {
        let name = required(&self.name, "Name is required")?;
        let email = required(&self.email, "Email is required")?;
        check_email(email)?;
        if self.password.is_empty() {
            return Err(ClientError::Validation("Password is required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::Validation(
                "Password must be at least 6 characters",
            ));
        }
        Ok(RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Fields of the create/edit task dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
}

impl TaskForm {
    /// Dialog prefilled for editing `task`.
    pub fn edit(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
        }
    }

    pub fn to_create(&self) -> Result<CreateTask, ClientError> {
        let (title, description) = self.check()?;
        Ok(CreateTask { title, description })
    }

    pub fn to_update(&self) -> Result<UpdateTask, ClientError> {
        let (title, description) = self.check()?;
        Ok(UpdateTask {
            title,
            description,
            priority: self.priority,
        })
    }

    fn check(&self) -> Result<(String, String), ClientError> {
        let title = required(&self.title, "Title is required")?;
        let description = required(&self.description, "Description is required")?;
        Ok((title.to_string(), description.to_string()))
    }
}

fn required<'a>(value: &'a str, message: &'static str) -> Result<&'a str, ClientError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ClientError::Validation(message))
    } else {
        Ok(value)
    }
}

fn check_email(email: &str) -> Result<(), ClientError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ClientError::Validation("Email is invalid"))
    }
}
