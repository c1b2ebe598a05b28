use clap::Subcommand;
use serde_json::json;

use crate::auth::{Credential, TokenStore};
use crate::cli::config::build_context;
use crate::cli::utils::{output_success, print_notifications, read_password, user_error};
use crate::cli::{OutputFormat, TerminalNavigator};
use crate::client::RegisterRequest;
use crate::navigation::Route;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and save the session token")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (reads COACH_PASSWORD or prompts if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the saved session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (reads COACH_PASSWORD or prompts if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Invitation code, checked by the server")]
        invitation_code: Option<String>,
    },
}

pub async fn handle(cmd: AuthCommands, api_url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = build_context(api_url)?;
    let auth = ctx.auth();

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = read_password(password)?;
            let session = auth.login(&email, &password).await.map_err(user_error)?;
            let expires = session.claims.expires_at().map(|t| t.to_rfc3339());
            output_success(
                &output_format,
                &format!("Logged in as {} ({})", session.email(), session.role()),
                Some(json!({ "email": session.email(), "role": session.role(), "expires_at": expires })),
            )?;
            if let OutputFormat::Text = output_format {
                println!("Next: {}", TerminalNavigator::hint(Route::home_for(session.role())));
            }
            Ok(())
        }
        AuthCommands::Logout => {
            auth.logout().await.map_err(user_error)?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let credential = ctx.store.credential();
            let (message, data) = match &credential {
                Credential::Valid { claims, .. } => (
                    format!("Logged in as {} ({})", claims.email, claims.role),
                    json!({
                        "authenticated": true,
                        "email": claims.email,
                        "role": claims.role,
                        "expires_at": claims.expires_at().map(|t| t.to_rfc3339()),
                    }),
                ),
                Credential::Expired { .. } => (
                    "Session expired; log in again".to_string(),
                    json!({ "authenticated": false, "expired": true }),
                ),
                Credential::Absent => (
                    "Not logged in".to_string(),
                    json!({ "authenticated": false, "expired": false }),
                ),
            };
            output_success(&output_format, &message, Some(data))
        }
        AuthCommands::Whoami => {
            let user = auth.whoami().await.map_err(user_error)?;
            output_success(
                &output_format,
                &format!("{} <{}> ({})", user.name, user.email, user.role),
                Some(json!({ "user": user })),
            )
        }
        AuthCommands::Register { name, email, password, invitation_code } => {
            let password = read_password(password)?;
            let request = RegisterRequest { name, email, password, invitation_code };
            let result = auth.register(&request).await;
            print_notifications(&ctx.notices.drain());
            let user = result.map_err(user_error)?;
            output_success(
                &output_format,
                &format!("Registered {}; log in to continue", user.email),
                Some(json!({ "user": user })),
            )
        }
    }
}
