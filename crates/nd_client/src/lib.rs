use std::sync::Arc;

use nd_core::{Error, NewsApi, Result};
use tracing::info;

pub mod backends;

pub use backends::*;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Build a backend by name: `http` or `memory`.
pub fn create_api(kind: &str, config: &ClientConfig) -> Result<Arc<dyn NewsApi>> {
    let api: Arc<dyn NewsApi> = match kind {
        "http" => Arc::new(HttpNewsApi::new(config)?),
        "memory" => Arc::new(MemoryNewsApi::new()),
        other => {
            return Err(Error::External(anyhow::anyhow!(
                "Unknown API backend: {}. Available backends: http, memory",
                other
            )))
        }
    };
    info!("🔌 News API backend ready (using {})", api.name());
    Ok(api)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_api, ClientConfig};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_api_by_name() {
        let config = ClientConfig::default();
        assert_eq!(create_api("http", &config).unwrap().name(), "http");
        assert_eq!(create_api("memory", &config).unwrap().name(), "memory");
        let err = create_api("qdrant", &config).err().unwrap();
        assert!(err.to_string().contains("Unknown API backend"));
    }
}
