use serde_json::json;
use tracing::info;

use crate::error::AppResult;
use crate::gateway::ApiError;

use super::types::{LoginResponse, MeResponse, MenuResponse};
use super::AcademicApi;

impl AcademicApi {
    /// Exchange credentials for a token and populate the session. Surrounding whitespace
    /// in the credentials is ignored.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let body = json!({"username": username.trim(), "password": password.trim()});
        let resp: LoginResponse = self.gateway.post("/auth/login", &body).await?;
        self.sessions().set_session(&resp.access_token, resp.roles.iter().cloned(), Some(&resp.user))?;
        info!(target: "eduadmin::session", "login user={} roles={:?}", resp.user.username, resp.roles);
        Ok(resp)
    }

    /// Forget the local session. The API keeps no server-side session to revoke.
    pub fn logout(&self) -> AppResult<()> {
        self.sessions().clear_session()?;
        info!(target: "eduadmin::session", "logout");
        Ok(())
    }

    pub async fn me(&self) -> Result<MeResponse, ApiError> {
        self.gateway.get("/auth/me").await
    }

    /// Server-side menu for the caller's roles, informational only; navigation uses the
    /// static route table.
    pub async fn menus(&self) -> Result<MenuResponse, ApiError> {
        self.gateway.get("/api/menus").await
    }
}
