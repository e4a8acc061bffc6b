use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserIdentity};

/// Signs users in and out. A successful call has already committed the new
/// session by the time it returns.
#[derive(Clone)]
pub struct AuthGateway {
    client: ApiClient,
}

impl AuthGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<UserIdentity, ClientError> {
        let url = self.client.url("/api/auth/login")?;
        let result = self
            .client
            .send_json::<AuthResponse>(self.client.post(url).json(credentials))
            .await;
        match result {
            Ok(response) => self.establish(response),
            Err(err) => {
                warn!(email = %credentials.email, error = %err, "Login failed");
                Err(err)
            }
        }
    }

    pub async fn register(&self, profile: &RegisterRequest) -> Result<UserIdentity, ClientError> {
        let url = self.client.url("/api/auth/register")?;
        let result = self
            .client
            .send_json::<AuthResponse>(self.client.post(url).json(profile))
            .await;
        match result {
            Ok(response) => self.establish(response),
            Err(err) => {
                warn!(email = %profile.email, error = %err, "Registration failed");
                Err(err)
            }
        }
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.client.session().clear()?;
        info!("User logged out");
        Ok(())
    }

    fn establish(&self, response: AuthResponse) -> Result<UserIdentity, ClientError> {
        let identity = response.identity();
        self.client.session().commit(identity.clone(), &response.token)?;
        info!(user_id = identity.user_id, "User logged in");
        Ok(identity)
    }
}
