use std::fmt::Write;

use anyhow::{Context, bail};
use homelog_auth::grant::{PermissionGrant, PermissionStore, PrincipalQuery};
use homelog_auth::level::{AccessLevel, AccessLevelCatalog};
use serde::Serialize;

use super::{CommandContext, Outcome};

/// Printable result of a `check`.
#[derive(Debug, Serialize)]
struct CheckView<'a> {
    functionality: Option<&'a str>,
    object: Option<&'a str>,
    level: &'a str,
    granted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    grant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl CheckView<'_> {
    fn text(&self) -> String {
        let scope = format!(
            "{}/{}",
            self.functionality.unwrap_or("-"),
            self.object.unwrap_or("-")
        );
        match (&self.reason, self.grant_id) {
            (None, Some(grant_id)) => format!("granted: {} on {scope} (grant {grant_id})", self.level),
            (Some(reason), _) => format!("denied: {} on {scope}: {reason}", self.level),
            (None, None) => format!("granted: {} on {scope}", self.level),
        }
    }
}

fn grants_text(grants: &[PermissionGrant]) -> String {
    if grants.is_empty() {
        return "no grants".to_owned();
    }

    let mut text = String::new();
    for grant in grants {
        let level = grant
            .access_level
            .as_ref()
            .map_or("<none>", |level| level.name.as_str());
        let _ = writeln!(
            text,
            "{:>6}  {:<24} {:<24} {}",
            grant.id,
            grant.functionality.as_deref().unwrap_or("-"),
            grant.object.as_deref().unwrap_or("-"),
            level,
        );
    }
    text.trim_end().to_owned()
}

fn levels_text(levels: &[AccessLevel]) -> String {
    if levels.is_empty() {
        return "no access levels".to_owned();
    }

    levels
        .iter()
        .map(|level| {
            let rank = level
                .rank
                .map_or_else(|| "-".to_owned(), |rank| rank.to_string());
            format!("{:>6}  {}", rank, level.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl CommandContext {
    pub(super) async fn permissions(
        &self,
        user_id: Option<i64>,
        role_id: Option<i64>,
    ) -> anyhow::Result<Outcome> {
        let query = match (user_id, role_id) {
            (None, None) => match self.session.current() {
                Some(active) => PrincipalQuery::user(active.user_id()),
                None => bail!("not signed in; pass --user-id or --role-id"),
            },
            (user_id, role_id) => PrincipalQuery { user_id, role_id },
        };

        let store = tokio::select! {
            () = self.cancel.cancelled() => bail!("cancelled"),
            store = PermissionStore::load(&self.client, query) => {
                store.context("failed to load permissions")?
            }
        };

        self.emit(&store.grants(), |grants| grants_text(grants))?;
        Ok(Outcome::Success)
    }

    pub(super) async fn access_levels(&self) -> anyhow::Result<Outcome> {
        let catalog = tokio::select! {
            () = self.cancel.cancelled() => bail!("cancelled"),
            catalog = AccessLevelCatalog::load(&self.client) => {
                catalog.context("failed to load access levels")?
            }
        };

        let levels: Vec<AccessLevel> = catalog.iter().cloned().collect();
        self.emit(&levels, |levels| levels_text(levels))?;
        Ok(Outcome::Success)
    }

    pub(super) async fn check(
        &self,
        functionality: Option<&str>,
        object: Option<&str>,
        level: &str,
        refresh: bool,
    ) -> anyhow::Result<Outcome> {
        let Some(active) = self.session.current() else {
            bail!("not signed in");
        };

        let loaded = self
            .access
            .refresh_catalog(&self.client, &self.cancel)
            .await
            .context("failed to load access levels")?;
        if refresh {
            let query = PrincipalQuery::user(active.user_id());
            self.access
                .refresh_permissions(&self.client, query, &self.cancel)
                .await
                .context("failed to load permissions")?;
        }
        if !loaded || self.cancel.is_cancelled() {
            bail!("cancelled");
        }

        let decision = self.access.decide(functionality, object, level);
        let view = CheckView {
            functionality,
            object,
            level,
            granted: decision.is_granted(),
            grant_id: decision.grant_id,
            reason: decision.reason.map(|reason| reason.into_owned()),
        };
        self.emit(&view, CheckView::text)?;

        Ok(if view.granted {
            Outcome::Success
        } else {
            Outcome::Denied
        })
    }
}

#[cfg(test)]
mod tests {
    use homelog_auth::grant::Principal;

    use super::*;

    #[test]
    fn test_grants_text() {
        let grants = vec![
            PermissionGrant::new(1, Principal::User(42))
                .with_functionality("house")
                .with_object("houseHouse")
                .with_access_level(AccessLevel::new("WRITE", 20)),
            PermissionGrant::new(2, Principal::User(42)),
        ];
        let text = grants_text(&grants);
        assert!(text.contains("houseHouse"));
        assert!(text.contains("WRITE"));
        assert!(text.contains("<none>"));
        assert_eq!(grants_text(&[]), "no grants");
    }

    #[test]
    fn test_levels_text() {
        let levels = vec![
            AccessLevel::new("READ", 10),
            AccessLevel {
                id: None,
                name: "AUDIT".into(),
                rank: None,
            },
        ];
        let text = levels_text(&levels);
        assert!(text.contains("10  READ"));
        assert!(text.contains("-  AUDIT"));
    }

    #[test]
    fn test_check_view_text() {
        let view = CheckView {
            functionality: Some("house"),
            object: None,
            level: "DELETE",
            granted: false,
            grant_id: None,
            reason: Some("no grant covers DELETE on house/-".into()),
        };
        assert!(view.text().starts_with("denied: DELETE on house/-"));
    }
}
