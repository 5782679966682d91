//! Subcommands and their shared context.

mod access;
mod session;

use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use homelog_auth::AccessControl;
use homelog_auth::session::AuthSession;
use homelog_client::ApiClient;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_COMMAND;
use crate::config::Cli;

/// Available subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and persist the session
    Login {
        /// Account name
        username: String,
        /// Account password
        #[arg(long, env = "HOMELOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session and remove the persisted tokens
    Logout,
    /// Show the current session
    Status,
    /// List the permission grants of a user or role
    Permissions {
        /// User to list (defaults to the signed-in user)
        #[arg(long, conflicts_with = "role_id")]
        user_id: Option<i64>,
        /// Role to list
        #[arg(long)]
        role_id: Option<i64>,
    },
    /// List the access level catalog
    AccessLevels,
    /// Decide whether the signed-in user holds a level on a scope
    Check {
        /// Functionality name; omit for the functionality-less scope
        #[arg(long)]
        functionality: Option<String>,
        /// Object name; omit for the object-less scope
        #[arg(long)]
        object: Option<String>,
        /// Access level name, e.g. READ, WRITE or DELETE
        #[arg(long)]
        level: String,
        /// Reload the grants from the backend instead of the permission token
        #[arg(long)]
        refresh: bool,
    },
}

impl Command {
    /// Returns the subcommand name as typed on the command line.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Status => "status",
            Self::Permissions { .. } => "permissions",
            Self::AccessLevels => "access-levels",
            Self::Check { .. } => "check",
        }
    }
}

/// Result of a successful command run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// A `check` was answered with "denied".
    Denied,
}

/// Everything a command needs: the backend client and the session.
pub struct CommandContext {
    client: ApiClient,
    session: AuthSession,
    access: AccessControl,
    cancel: CancellationToken,
    json: bool,
}

impl CommandContext {
    /// Builds the client and session and cancels loads on Ctrl-C.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let client = ApiClient::new(cli.api.clone()).context("failed to create API client")?;
        let access = AccessControl::new();
        let session = AuthSession::from_config(&cli.session, access.clone())
            .context("failed to create session")?;

        let cancel = CancellationToken::new();
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        Ok(Self {
            client,
            session,
            access,
            cancel,
            json: cli.json,
        })
    }

    /// Runs `command`.
    pub async fn execute(&self, command: &Command) -> anyhow::Result<Outcome> {
        tracing::debug!(
            target: TRACING_TARGET_COMMAND,
            command = command.name(),
            "executing command"
        );

        if !matches!(command, Command::Login { .. }) {
            self.restore()?;
        }

        match command {
            Command::Login { username, password } => self.login(username, password).await,
            Command::Logout => self.logout(),
            Command::Status => self.status(),
            Command::Permissions { user_id, role_id } => self.permissions(*user_id, *role_id).await,
            Command::AccessLevels => self.access_levels().await,
            Command::Check {
                functionality,
                object,
                level,
                refresh,
            } => {
                self.check(functionality.as_deref(), object.as_deref(), level, *refresh)
                    .await
            }
        }
    }

    /// Re-establishes a persisted session and authenticates the client with it.
    fn restore(&self) -> anyhow::Result<()> {
        let restored = self
            .session
            .restore()
            .context("failed to restore session")?;
        self.client
            .set_bearer_token(restored.map(|active| active.identity_token));
        Ok(())
    }

    /// Prints `value` as JSON or, in text mode, with `text`.
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
        if self.json {
            let json = serde_json::to_string_pretty(value).context("failed to encode output")?;
            println!("{json}");
        } else {
            println!("{}", text(value));
        }
        Ok(())
    }
}
