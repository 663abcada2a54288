//! Serve command - run the game server until interrupted

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use halma_server::{run_server, ServerConfig};

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// Directory containing the browser client
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Events buffered per watcher before it is dropped
    #[arg(long, default_value = "64")]
    pub event_capacity: usize,

    /// Longest wait of an event poll, in milliseconds
    #[arg(long, default_value = "5000")]
    pub poll_timeout_ms: u64,
}

impl ServerArgs {
    /// Server configuration; `seed` fixes who moves first in every game
    fn config(&self, seed: Option<u64>) -> Result<ServerConfig> {
        check_static_dir(&self.static_dir)?;
        if self.event_capacity == 0 {
            anyhow::bail!("--event-capacity must be at least 1");
        }

        Ok(ServerConfig {
            port: self.port,
            static_dir: self.static_dir.to_string_lossy().into_owned(),
            seed,
            event_capacity: self.event_capacity,
            poll_timeout_ms: self.poll_timeout_ms,
        })
    }
}

pub fn run(args: ServerArgs, seed: Option<u64>) -> Result<()> {
    let config = args.config(seed)?;
    tracing::info!(
        "Serving on port {} ({} events per watcher)",
        config.port,
        config.event_capacity
    );

    tokio::runtime::Runtime::new()?.block_on(run_server(config))
}

/// A missing client directory only disables static files
fn check_static_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::warn!("No client at {}, serving the API only", path.display());
    } else if !path.is_dir() {
        anyhow::bail!("Static path is not a directory: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServerArgs {
        ServerArgs {
            port: 8000,
            static_dir: PathBuf::from("test_static"),
            event_capacity: 16,
            poll_timeout_ms: 100,
        }
    }

    #[test]
    fn test_config_from_args() {
        let config = args().config(Some(9)).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.static_dir, "test_static");
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.event_capacity, 16);
        assert_eq!(config.poll_timeout_ms, 100);
    }

    #[test]
    fn test_zero_event_capacity_rejected() {
        let args = ServerArgs {
            event_capacity: 0,
            ..args()
        };
        assert!(args.config(None).is_err());
    }

    #[test]
    fn test_missing_static_dir_allowed() {
        assert!(check_static_dir(Path::new("/nonexistent/path")).is_ok());
    }

    #[test]
    fn test_static_path_must_be_directory() {
        assert!(check_static_dir(Path::new("Cargo.toml")).is_err());
    }
}
