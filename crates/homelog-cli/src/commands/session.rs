use anyhow::Context;
use homelog_auth::session::{ActiveSession, SessionStatus};
use homelog_client::Credentials;
use jiff::Timestamp;
use serde::Serialize;

use super::{CommandContext, Outcome};

/// Printable view of the session.
#[derive(Debug, Serialize)]
struct SessionView {
    status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_secs: Option<u64>,
    superuser: bool,
    grants: usize,
}

impl SessionView {
    fn new(active: Option<&ActiveSession>) -> Self {
        let Some(active) = active else {
            return Self {
                status: SessionStatus::Anonymous,
                user_id: None,
                username: None,
                expires_at: None,
                remaining_secs: None,
                superuser: false,
                grants: 0,
            };
        };

        Self {
            status: SessionStatus::Authenticated,
            user_id: Some(active.user_id()),
            username: Some(active.claims.user.username.clone()),
            expires_at: Some(active.expires_at),
            remaining_secs: active
                .claims
                .remaining_lifetime_at(Timestamp::now())
                .map(|remaining| remaining.as_secs()),
            superuser: active.is_superuser(),
            grants: active.claims.permissions.len(),
        }
    }

    fn text(&self) -> String {
        let (Some(user_id), Some(expires_at)) = (self.user_id, self.expires_at) else {
            return "not signed in".to_owned();
        };

        let username = self.username.as_deref().unwrap_or_default();
        let superuser = if self.superuser { " (superuser)" } else { "" };
        format!(
            "signed in as {username} (user {user_id}){superuser}\nexpires at {expires_at} ({}s left)\n{} grant(s) in permission token",
            self.remaining_secs.unwrap_or_default(),
            self.grants,
        )
    }
}

impl CommandContext {
    pub(super) async fn login(&self, username: &str, password: &str) -> anyhow::Result<Outcome> {
        let credentials = Credentials::new(username, password);
        let tokens = tokio::select! {
            () = self.cancel.cancelled() => anyhow::bail!("login cancelled"),
            tokens = self.client.login(&credentials) => tokens.context("login failed")?,
        };

        let active = self
            .session
            .login(tokens.token, tokens.permission_token)
            .context("backend issued an unusable permission token")?;
        self.client
            .set_bearer_token(Some(active.identity_token.clone()));

        self.emit(&SessionView::new(Some(&active)), SessionView::text)?;
        Ok(Outcome::Success)
    }

    pub(super) fn logout(&self) -> anyhow::Result<Outcome> {
        let was_signed_in = self.session.current().is_some();
        self.session.logout().context("failed to clear session")?;
        self.client.set_bearer_token(None);

        let view = SessionView::new(None);
        self.emit(&view, |_| {
            if was_signed_in {
                "signed out".to_owned()
            } else {
                "not signed in".to_owned()
            }
        })?;
        Ok(Outcome::Success)
    }

    pub(super) fn status(&self) -> anyhow::Result<Outcome> {
        let current = self.session.current();
        self.emit(&SessionView::new(current.as_ref()), SessionView::text)?;
        Ok(Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_view() {
        let view = SessionView::new(None);
        assert_eq!(view.text(), "not signed in");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "anonymous");
        assert!(json.get("user_id").is_none());
    }
}
