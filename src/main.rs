//! flowshell demo - a small installer wizard
//!
//! Logs go to stderr; set `RUST_LOG=flowshell=debug` to follow the session.

use flowshell::{ExecError, ExitReason, SessionConfig, Wizard};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowshell=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = SessionConfig::from_env().with_greeting(["Gandalf the WIZARD shell", "version 1.0.0"]);
    tracing::info!(buffer_size = config.buffer_size, "Starting demo wizard");

    let wizard = Wizard::new(config).configure(|flow| {
        flow.ask("are you a human?", "human")
            .first_instruction("Would you like to install the programme?")
            .branch("next", |b| {
                b.ask("Are you sure you're not a robot?", "robot")
                    .if_user_inputs(["yes"])
                    .default("yes")
                    .then_quit("bye!")
                    .if_user_inputs(["no"])
                    .then_branch("why not?", |b| {
                        b.then_display(|answers| answers.value("human").unwrap_or_default().to_string())
                            .if_user_inputs(["don't know", "dk"])
                            .then_quit("sorry to hear that")
                            .if_user_inputs(["because", "b"])
                            .then_display(|answers| answers.value("robot").unwrap_or_default().to_string())
                            .then_quit("fair enough");
                    });
            })
            .if_user_inputs(["yes", "y", "YES", "ye", "Y", "YE"])
            .default("yes")
            .then_run(|ctx| async move {
                tokio::select! {
                    () = tokio::time::sleep(Duration::from_secs(2)) => Ok(()),
                    () = ctx.cancelled() => Err(ExecError::failed("no bueno")),
                }
            })
            .with_loading_message("loading func...")
            .with_timeout(3500)
            .then_display(|_| "Programme Installed".to_string())
            .ask_for_int("how many licences do you need?", "licences")
            .ask_for_float("how tall are you (cm)?", "height")
            .then_display(|answers| {
                format!(
                    "{} licences for someone {}cm tall",
                    answers.int_value("licences").unwrap_or_default(),
                    answers.float_value("height").unwrap_or_default()
                )
            })
            .then_quit("awesome")
            .if_user_inputs(["no", "NO", "n", "N"])
            .go_to("next", "ok, let's try something else");
    });

    let report = wizard.run_interactive().await?;
    if let ExitReason::Quit { message } = &report.reason {
        tracing::info!(%message, "Wizard finished");
    }
    Ok(())
}
