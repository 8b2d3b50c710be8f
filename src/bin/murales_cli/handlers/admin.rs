#![deny(clippy::all, clippy::pedantic)]

use murales::application::auth::AuthService;
use murales::application::moderation::{ActionOutcome, ModerationController};
use murales::application::murals::FetchOutcome;
use murales::application::repos::{ModerationRepo, SessionStore};
use murales::domain::moderation::{ApproveOptions, RejectOptions};
use murales::infra::token::is_token_expired;
use murales_api_types::MuralStatus;

use crate::args::AdminCmd;
use crate::client::{CliError, Ctx};
use crate::print::{print_json, render_submissions};

pub async fn handle(ctx: &Ctx, cmd: AdminCmd) -> Result<(), CliError> {
    match cmd {
        AdminCmd::Login { email, password } => login(ctx, &email, password).await,
        AdminCmd::Logout => {
            auth(ctx).logout();
            println!("Logged out.");
            Ok(())
        }
        AdminCmd::Whoami => whoami(ctx),
        AdminCmd::Summary => {
            let summary = ctx.api.summary().await?;
            print_json(&summary)
        }
        AdminCmd::List { status, page } => list(ctx, status.into(), page).await,
        AdminCmd::Approve {
            id,
            send_email,
            message,
        } => {
            let options = ApproveOptions {
                send_email,
                message: message.unwrap_or_default(),
            };
            let outcome = moderation(ctx).approve(&id, &options).await;
            report(outcome)
        }
        AdminCmd::Reject {
            id,
            reason,
            send_email,
        } => {
            let options = RejectOptions { reason, send_email };
            let outcome = moderation(ctx).reject(&id, &options).await;
            report(outcome)
        }
    }
}

fn auth(ctx: &Ctx) -> AuthService {
    AuthService::new(ctx.api.clone(), ctx.session.clone())
}

fn moderation(ctx: &Ctx) -> ModerationController {
    ModerationController::new(ctx.api.clone())
}

async fn login(ctx: &Ctx, email: &str, password: Option<String>) -> Result<(), CliError> {
    let password = password.ok_or_else(|| {
        CliError::InvalidInput("password is required (set MURALES_ADMIN_PASSWORD)".into())
    })?;
    let auth = auth(ctx);
    if auth.login(email, &password).await {
        let state = auth.snapshot();
        if let Some(user) = state.user {
            println!("Logged in as {} ({})", user.email, user.role);
        }
        Ok(())
    } else {
        let message = auth.snapshot().error.unwrap_or_default();
        Err(CliError::Failed(message))
    }
}

fn whoami(ctx: &Ctx) -> Result<(), CliError> {
    let auth = auth(ctx);
    if !auth.check_auth() {
        return Err(CliError::Failed("Not logged in".into()));
    }
    let user = auth
        .current_user()
        .ok_or_else(|| CliError::Failed("Not logged in".into()))?;
    print_json(&user)?;
    if ctx.session.access_token().is_some_and(|t| is_token_expired(&t)) {
        println!("Access token expired; it is refreshed on the next request.");
    }
    Ok(())
}

async fn list(ctx: &Ctx, status: MuralStatus, page: u32) -> Result<(), CliError> {
    let controller = moderation(ctx);
    let (outcome, ()) = futures::join!(controller.open(status, page), controller.fetch_summary());
    let state = controller.snapshot();
    match outcome {
        FetchOutcome::Applied => {
            print!("{}", render_submissions(&state));
            Ok(())
        }
        FetchOutcome::Failed | FetchOutcome::Superseded => Err(CliError::Failed(
            state.error.unwrap_or_else(|| "Failed to load murals".into()),
        )),
    }
}

fn report(outcome: ActionOutcome) -> Result<(), CliError> {
    if outcome.success {
        println!("{}", outcome.message);
        Ok(())
    } else {
        Err(CliError::Failed(outcome.message))
    }
}
