use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

mod adapter;
mod app;
mod cli;
mod config;
mod dictation;
mod errors;
mod log;
mod market;
mod model;
mod prompt;
mod provider;
mod repl;
mod schema;
mod session;
mod ux;
mod wire;

use app::App;
use dictation::{CommandDictation, DictationService, VoiceInput};
use repl::{Form, SessionEnd};

fn build_app(cfg: &config::Config) -> Result<App> {
    let provider = provider::make_provider(cfg)?;
    Ok(App::new(adapter::Adapter::new(provider, cfg.credentials())))
}

fn dictation_service(cfg: &config::Config) -> Option<Box<dyn DictationService>> {
    let command = cfg.dictation_command.as_deref()?;
    match CommandDictation::detect(command) {
        Some(svc) => Some(Box::new(svc)),
        None => {
            warn!("dictation command not found: {command}");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let cfg = config::Config::load(&args)?;
    log::init(cfg.debug);
    info!(model = %cfg.model, api_base = %cfg.api_base, "starting");

    if let Some(path) = &args.catalog_file {
        let catalog = fs_err::read_to_string(path).with_context(|| format!("reading catalog {path}"))?;
        let form = Form::from_args(&args)?;
        form.catalog().set(catalog);
        let mut app = build_app(&cfg)?;
        return repl::run_once(&mut app, &form, args.json).await;
    }

    ux::banner();
    let (cfg, args) = (&cfg, &args);
    supervise(move || async move {
        // Each pass is a fresh session: nothing from a failed view survives.
        let mut app = build_app(cfg)?;
        let mut form = Form::from_args(args)?;
        let mut voice = VoiceInput::new(dictation_service(cfg), form.catalog());
        let end = repl::run_interactive(&mut app, &mut form, &mut voice).await;
        voice.stop();
        end
    })
    .await
}

/// Run sessions until one ends with `Quit`. A reload or a panic starts the
/// next one from scratch; a returned error ends the program.
async fn supervise<F, Fut>(mut session: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<SessionEnd>>,
{
    loop {
        match AssertUnwindSafe(session()).catch_unwind().await {
            Ok(Ok(SessionEnd::Quit)) => return Ok(()),
            Ok(Ok(SessionEnd::Reload)) => warn!("reloading after a presentation failure"),
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                error!("session panicked; reloading");
                println!("\n{}", "Something went wrong. Starting a new session.".red().bold());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn supervisor_restarts_after_reload_and_panic() {
        let mut runs = 0;
        supervise(|| {
            runs += 1;
            let n = runs;
            async move {
                match n {
                    1 => panic!("report view blew up"),
                    2 => Ok(SessionEnd::Reload),
                    _ => Ok(SessionEnd::Quit),
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(runs, 3);
    }

    #[tokio::test]
    async fn supervisor_stops_on_error() {
        let mut runs = 0;
        let err = supervise(|| {
            runs += 1;
            async { Err(anyhow::anyhow!("config vanished")) }
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "config vanished");
        assert_eq!(runs, 1);
    }
}
