//! CLI commands

use anyhow::{Context, Result, bail};
use checker_core::{ClientConfig, Role, User};
use checker_frontend_common::auth::with_auth_error_handling;
use checker_frontend_common::{AuthContext, AuthError, FileStore, GuardOutcome, MemoryRouter};
use checker_http::types::{LoginForm, RegisterForm};
use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "CHECKER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account; does not log in
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// student or teacher
        #[arg(long, default_value = "student")]
        role: Role,

        #[arg(long, env = "CHECKER_PASSWORD", hide_env_values = true)]
        password: String,

        /// Registration number (students)
        #[arg(long)]
        regdno: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami {
        /// Print the user as JSON
        #[arg(long)]
        json: bool,
    },

    /// Exchange the stored refresh token for a new access token
    Refresh,

    /// Check whether a route would be reachable with the stored session
    Open {
        /// Route path, e.g. /dashboard
        path: String,
    },
}

impl Commands {
    pub async fn execute(self, client_config: ClientConfig, data_dir: PathBuf) -> Result<()> {
        let store = FileStore::open(config::session_file(&data_dir));
        let ctx = AuthContext::builder()
            .config(client_config)
            .store(Arc::new(store))
            .router(Arc::new(MemoryRouter::default()))
            .build()
            .context("Failed to create API client (is api_base_url set?)")?;

        match self {
            Self::Login { username, password } => login(&ctx, username, password).await,
            Self::Register {
                username,
                email,
                first_name,
                last_name,
                role,
                password,
                regdno,
            } => {
                let form = register_form(
                    username, email, first_name, last_name, role, password, regdno,
                )?;
                ctx.auth().register(&form).await?;
                println!("Registered {}; log in to continue", form.username);
                Ok(())
            }
            Self::Logout => {
                ctx.logout().await;
                println!("Logged out");
                Ok(())
            }
            Self::Whoami { json } => whoami(&ctx, json).await,
            Self::Refresh => {
                with_auth_error_handling(ctx.interceptor(), ctx.auth().refresh()).await?;
                println!("Access token refreshed");
                Ok(())
            }
            Self::Open { path } => match ctx.navigate(&path).await? {
                GuardOutcome::Allow(target) => {
                    println!("{target}: allowed");
                    Ok(())
                }
                GuardOutcome::Redirect(target) => {
                    bail!("{path}: no session, redirected to {target}")
                }
            },
        }
    }
}

async fn login(ctx: &AuthContext, username: String, password: String) -> Result<()> {
    let form = LoginForm::new(username, password);
    ctx.auth().login(&form).await?;

    match ctx.user() {
        Some(user) => println!("Logged in as {} ({})", user.display_name(), user.role),
        None => println!("Logged in as {}", form.username),
    }
    Ok(())
}

fn register_form(
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    role: Role,
    password: String,
    regdno: Option<String>,
) -> Result<RegisterForm> {
    if role == Role::Student && regdno.is_none() {
        bail!("Students must provide --regdno");
    }
    Ok(RegisterForm {
        username,
        email,
        first_name,
        last_name,
        role: role.as_str().to_string(),
        password2: password.clone(),
        password,
        regdno,
    })
}

/// Load the current user, refreshing once if the access token is missing or rejected
async fn lookup_user(ctx: &AuthContext) -> Result<(), AuthError> {
    if !ctx.state().has_access_token() {
        info!("No access token stored, refreshing");
        ctx.auth().refresh().await?;
    }

    match ctx.auth().fetch_current_user().await {
        Err(AuthError::FetchUser {
            status: Some(401 | 403),
            ..
        }) => {
            info!("Access token rejected, refreshing");
            ctx.auth().refresh().await?;
            ctx.auth().fetch_current_user().await
        }
        other => other,
    }
}

/// Only a failure that survives the refresh reaches the error interceptor
async fn current_user(ctx: &AuthContext) -> Result<User> {
    with_auth_error_handling(ctx.interceptor(), lookup_user(ctx))
        .await
        .map_err(not_logged_in)?;

    ctx.user().context("Not logged in")
}

async fn whoami(ctx: &AuthContext, json: bool) -> Result<()> {
    let user = current_user(ctx).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!("{} <{}>", user.display_name(), user.username);
        println!("role: {}", user.role);
        if let Some(email) = &user.email {
            println!("email: {email}");
        }
        if let Some(regdno) = &user.registration_number {
            println!("registration number: {regdno}");
        }
    }
    Ok(())
}

fn not_logged_in(error: AuthError) -> anyhow::Error {
    match error {
        AuthError::NoRefreshToken => anyhow::anyhow!("Not logged in"),
        other => other.into(),
    }
}
