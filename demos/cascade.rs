use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use xdg_cascade::{Duration, Loader};

#[derive(Debug, Serialize, Deserialize)]
struct ServerConfig {
    listen: String,
    workers: u32,
    idle_timeout: Duration,
    database: Database,
}

#[derive(Debug, Serialize, Deserialize)]
struct Database {
    url: String,
    pool_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".into(),
            workers: 4,
            idle_timeout: std::time::Duration::from_secs(60).into(),
            database: Database {
                url: "sqlite://server.db".into(),
                pool_size: 8,
            },
        }
    }
}

fn main() -> Result<(), xdg_cascade::ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let loader = Loader::new();
    for dir in &loader.search_path() {
        println!("searching {}", dir.display());
    }

    let mut config = ServerConfig::default();
    let report = loader.load_report("server.toml", &mut config)?;
    for path in &report.loaded {
        println!("loaded {}", path.display());
    }

    println!("{config:#?}");
    Ok(())
}
