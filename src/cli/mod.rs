use clap::{Parser, ValueEnum};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "notebook-api")]
#[command(about = "Notebook API server - multi-user notebooks and notes over HTTP")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Address to bind (overrides BIND_ADDR)")]
    pub bind: Option<String>,

    #[arg(long, short, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, value_enum, default_value_t = StoreKind::Postgres, help = "Storage backend")]
    pub store: StoreKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// sqlx pool against DATABASE_URL
    Postgres,
    /// Process-local, lost on exit
    Memory,
}

impl Cli {
    /// Command-line flags win over environment values.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind_addr = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["notebook-api", "--bind", "127.0.0.1", "--port", "9000", "--store", "memory"]);
        let mut config = AppConfig::development();
        cli.apply(&mut config);

        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(cli.store, StoreKind::Memory);
    }

    #[test]
    fn defaults_to_postgres_and_keeps_config() {
        let cli = Cli::parse_from(["notebook-api"]);
        let mut config = AppConfig::development();
        cli.apply(&mut config);

        assert_eq!(cli.store, StoreKind::Postgres);
        assert_eq!(config.server.port, 8080);
    }
}
