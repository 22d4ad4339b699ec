use anyhow::Context;
use arcade_node::{console, engine::Engine, Config, ValidatedConfig};
use clap::{Arg, Command};
use futures::future::try_join_all;
use tokio::{
    io::{AsyncWriteExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{error, info};

const RESPONSE_BACKLOG: usize = 256;

fn init_logging(config: &ValidatedConfig) {
    let builder = tracing_subscriber::fmt().with_max_level(config.log_level);
    // Logs go to stderr; stdout carries responses.
    if config.json_logs {
        builder.json().with_writer(std::io::stderr).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
}

async fn run(config: ValidatedConfig) -> anyhow::Result<()> {
    let engine = Engine::new(&config).context("could not open data directory")?;

    // Start background tasks
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tasks = engine.start(shutdown_rx);

    // Write responses as JSON lines
    let (responses_tx, mut responses_rx) = mpsc::channel::<console::Response>(RESPONSE_BACKLOG);
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = responses_rx.recv().await {
            let mut line = serde_json::to_string(&response)?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok::<_, anyhow::Error>(())
    });

    // Serve until input closes or we are interrupted
    let input = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = console::serve(engine.layer().clone(), engine.climb_tick(), input, responses_tx) => {
            result.context("failed to read requests")?;
            info!("input closed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
        }
    }

    // Stop background tasks
    let _ = shutdown_tx.send(true);
    if let Err(e) = try_join_all(tasks).await {
        error!(?e, "task failed");
    }
    writer.abort();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Parse arguments
    let matches = Command::new("arcade-node")
        .about("Runs the arcade economy and serves JSON-line requests on stdin.")
        .arg(Arg::new("config").long("config").required(true))
        .get_matches();

    // Load config
    let config_file = matches
        .get_one::<String>("config")
        .context("missing --config")?;
    let config_file = std::fs::read_to_string(config_file)
        .with_context(|| format!("could not read config file {config_file}"))?;
    let config: Config =
        serde_yaml::from_str(&config_file).context("could not parse config file")?;
    let config = config.validate()?;

    // Configure telemetry
    init_logging(&config);
    info!(directory = ?config.directory, "loaded config");

    // Start runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("could not start runtime")?;
    runtime.block_on(run(config))
}
