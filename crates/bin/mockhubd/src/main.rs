use std::sync::Arc;

use anyhow::Context;
use mockhub_adapter_virtual::VirtualIntegration;
use mockhub_app::event_bus::InProcessEventBus;
use mockhub_domain::event::EventType;
use mockhubd::config::Config;
use mockhubd::session::{Response, Session};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = Config::path();
    let config = Config::load_from(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    init_tracing(&config.logging.filter);

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(config.events.capacity));
    let mut events = event_bus.subscribe();

    // Platform
    let integration = VirtualIntegration::new(config.virtual_config());
    let mut session = Session::new(Arc::clone(&event_bus), integration).with_config_path(&path);
    tracing::info!(
        entities = session.platform().entities().len(),
        "mockhubd ready, reading requests from stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        tokio::select! {
            biased;
            event = events.recv() => match event {
                Ok(event) if event.event_type == EventType::StateChanged => {
                    write_line(&mut stdout, &Response::event(event)).await?;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event output lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = session.handle_line(&line).await;
                write_line(&mut stdout, &response).await?;
            }
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn write_line(stdout: &mut tokio::io::Stdout, response: &Response) -> anyhow::Result<()> {
    let mut line = response.to_line();
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
