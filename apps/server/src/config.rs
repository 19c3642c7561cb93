//! Runtime configuration, hydrated once from the environment at startup.
//! Handlers never call `std::env::var` directly; everything they need to
//! know about the process's environment is a field on [`Config`].

#[derive(Debug, Clone)]
pub struct Config {
    /// Path passed to `StoreClient::connect`; `:memory:` for tests.
    pub database_url: String,
    pub port: u16,
    pub worker_pool_size: usize,
    pub retention_window_hours: i64,
    /// Base URL of the optional local LLM explanation bridge. Its absence
    /// never blocks startup; `/health` just reports it unavailable.
    pub ollama_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| default_database_path());
        let port = std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8742);
        let worker_pool_size = std::env::var("WORKER_POOL_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(5);
        let retention_window_hours = std::env::var("RETENTION_WINDOW_HOURS").ok().and_then(|v| v.parse().ok()).unwrap_or(24);
        let ollama_url = std::env::var("OLLAMA_URL").ok();

        Self { database_url, port, worker_pool_size, retention_window_hours, ollama_url }
    }
}

fn default_database_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.netval/netval.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_documented_defaults() {
        std::env::remove_var("PORT");
        std::env::remove_var("WORKER_POOL_SIZE");
        std::env::remove_var("RETENTION_WINDOW_HOURS");
        let config = Config::from_env();
        assert_eq!(config.port, 8742);
        assert_eq!(config.worker_pool_size, 5);
        assert_eq!(config.retention_window_hours, 24);
    }
}
