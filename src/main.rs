use anyhow::Context;
use clap::Parser;
use sixdegrees::http::{AppState, HttpServer};
use sixdegrees::{load_snapshot, Config, GraphHandle, GraphSnapshot, PathEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sixdegrees", version, about = "Six Degrees HTTP path service")]
struct Args {
    /// Configuration file (defaults to $SIXDEGREES_CONFIG, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Six Degrees v{}", sixdegrees::version());

    let config = Config::load(args.config.as_deref()).context("loading configuration")?;

    let processed = config.pipeline.processed_paths();
    let chunk_size = config.pipeline.chunk_size.max(1);

    let loader_paths = processed.clone();
    let loaded = tokio::task::spawn_blocking(move || load_snapshot(&loader_paths, chunk_size))
        .await
        .context("graph loader panicked")?;

    let snapshot = match loaded {
        Ok((snapshot, report)) => {
            info!(
                movies = report.movies,
                people = report.people,
                participations = report.participations,
                "Graph ready"
            );
            snapshot
        }
        Err(e) => {
            warn!(error = %e, "No graph loaded; starting empty (POST /api/reload once processed files exist)");
            GraphSnapshot::empty()
        }
    };

    let state = AppState {
        graph: Arc::new(GraphHandle::new(snapshot)),
        engine: Arc::new(PathEngine::new(config.query.clone())),
        processed,
        chunk_size,
    };

    HttpServer::new(config.server.clone(), state)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("HTTP server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_config_flag() {
        let args = Args::try_parse_from(["sixdegrees", "--config", "conf.yaml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("conf.yaml")));

        let args = Args::try_parse_from(["sixdegrees", "--config=other.yaml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("other.yaml")));

        let args = Args::try_parse_from(["sixdegrees"]).unwrap();
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_bad_arguments_are_rejected() {
        assert!(Args::try_parse_from(["sixdegrees", "--config"]).is_err());
        assert!(Args::try_parse_from(["sixdegrees", "--confg", "x.yaml"]).is_err());
        assert!(Args::try_parse_from(["sixdegrees", "stray"]).is_err());
    }
}
