use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Tasks,
}

impl Route {
    /// Maps a path onto a route, ignoring any query or fragment. The root and
    /// anything unknown land on the task list.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim().trim_end_matches('/') {
            "/login" | "login" => Route::Login,
            "/register" | "register" => Route::Register,
            _ => Route::Tasks,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Tasks => "/tasks",
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Tasks)
    }
}

/// Where a navigation to `path` actually ends up for the current session.
pub fn resolve(path: &str, session: &SessionStore) -> Route {
    let route = Route::from_path(path);
    let authenticated = session.is_authenticated();
    if route.is_protected() && !authenticated {
        return Route::Login;
    }
    if !route.is_protected() && authenticated {
        return Route::Tasks;
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserIdentity;
    use crate::storage;

    fn session(authenticated: bool) -> SessionStore {
        let session = SessionStore::new(storage::open_in_memory().unwrap());
        if authenticated {
            session
                .commit(
                    UserIdentity {
                        user_id: 1,
                        name: "Ana".to_string(),
                        email: "ana@example.com".to_string(),
                        user_created_at: "2024-01-01T00:00:00".to_string(),
                    },
                    "tok",
                )
                .unwrap();
        }
        session
    }

    #[test]
    fn paths_map_to_routes() {
        assert_eq!(Route::from_path("/login"), Route::Login);
        assert_eq!(Route::from_path("/register/"), Route::Register);
        assert_eq!(Route::from_path("/tasks"), Route::Tasks);
        assert_eq!(Route::from_path(""), Route::Tasks);
        assert_eq!(Route::from_path("/"), Route::Tasks);
        assert_eq!(Route::from_path("/nowhere"), Route::Tasks);
    }

    #[test]
    fn query_and_fragment_are_ignored() {
        assert_eq!(Route::from_path("/login?next=/tasks"), Route::Login);
        assert_eq!(Route::from_path("/register#top"), Route::Register);
        assert_eq!(Route::from_path("/login/?next=%2F"), Route::Login);
        assert_eq!(Route::from_path("/?filter=pending"), Route::Tasks);
        assert_eq!(resolve("/tasks?filter=done", &session(false)), Route::Login);
    }

    #[test]
    fn guests_are_sent_to_login() {
        let guest = session(false);
        assert_eq!(resolve("/tasks", &guest), Route::Login);
        assert_eq!(resolve("/", &guest), Route::Login);
        assert_eq!(resolve("/register", &guest), Route::Register);
        assert_eq!(resolve("/login", &guest), Route::Login);
    }

    #[test]
    fn signed_in_users_skip_auth_pages() {
        let user = session(true);
        assert_eq!(resolve("/tasks", &user), Route::Tasks);
        assert_eq!(resolve("/login", &user), Route::Tasks);
        assert_eq!(resolve("/register", &user), Route::Tasks);
    }

    #[test]
    fn guard_follows_logout() {
        let user = session(true);
        user.clear().unwrap();
        assert_eq!(resolve("/tasks", &user), Route::Login);
    }
}
