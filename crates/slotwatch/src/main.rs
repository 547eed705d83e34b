mod repl;

use anyhow::Context;
use clap::Parser;
use slotwatch_engine::config::{apply_env_overrides, ConfigLoader};
use slotwatch_engine::navigator::Navigator;
use slotwatch_engine::notify::{Notify, UnconfiguredNotifier, WebhookNotifier};
use slotwatch_engine::scheduler::{Scheduler, SchedulerCommand};
use slotwatch_h::cdp::CdpClient;
use slotwatch_h::session::HeadlessSession;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

#[derive(Parser)]
#[command(name = "slotwatch", version, about = "Reservation slot monitor")]
struct Args {
    /// Config file (defaults to ./slotwatch.yaml, then ~/.slotwatch/config.yaml)
    #[arg(long)]
    config: Option<String>,

    /// Run the browser without a window (the session must already be
    /// logged in from a previous visible run)
    #[arg(long)]
    headless: bool,

    /// Webhook URL override
    #[arg(long)]
    webhook_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for the job-control REPL.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(Path::new(path))
            .await
            .with_context(|| format!("failed to load config from {path}"))?,
        None => ConfigLoader::load_default().await?,
    };
    apply_env_overrides(&mut config);
    if let Some(url) = args.webhook_url {
        config.notify.webhook_url = Some(url);
    }

    let base_url =
        Url::parse(&config.site.reservation_url).context("invalid site.reservation_url")?;

    let client = CdpClient::launch(!args.headless)
        .await
        .map_err(|e| anyhow::anyhow!("failed to launch browser: {e}"))?;
    let mut session = HeadlessSession::new(client);
    session.open(&config.site.reservation_url).await?;

    println!(
        "Browser opened at {}. Complete the login there if prompted.",
        config.site.reservation_url
    );
    let login_wait = Duration::from_millis(config.waits.login_timeout_ms);
    if session
        .verify_login(&config.site.logged_in_marker, login_wait)
        .await?
    {
        tracing::info!("login marker found, session is ready");
    } else {
        tracing::warn!("login marker not found; checks will fail until the session is logged in");
    }

    let notifier: Box<dyn Notify> = match &config.notify.webhook_url {
        Some(url) => Box::new(WebhookNotifier::new(url.clone())),
        None => Box::new(UnconfiguredNotifier),
    };
    let navigator = Navigator::new(config.selectors.clone(), config.waits.clone());
    let poll = config.scheduler.poll_interval();
    let scheduler = Scheduler::new(Box::new(session), navigator, notifier, base_url, poll);

    let (commands, command_rx) = mpsc::channel(16);
    let scheduler_task = tokio::spawn(scheduler.run(poll, command_rx));

    repl::run(commands.clone()).await?;

    let _ = commands.send(SchedulerCommand::Shutdown).await;
    scheduler_task.await?;
    Ok(())
}
