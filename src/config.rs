use reqwest::Url;
use std::time::Duration;

/// Deployment environment, selects the log level and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Local,
    Dev,
    Prod,
}

impl std::str::FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(AppEnv::Local),
            "dev" => Ok(AppEnv::Dev),
            "prod" => Ok(AppEnv::Prod),
            other => anyhow::bail!("APP_ENV must be one of local, dev, prod (got '{}')", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub env: AppEnv,
    pub enrichment_api_url: String,
    pub store_timeout_ms: u64,
    pub enrichment_timeout_ms: u64,
    /// Upper bound on concurrently running units of work within one batch.
    pub batch_concurrency: usize,
    pub max_batch_size: usize,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            host: std::env::var("HOST")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            env: std::env::var("APP_ENV")
                .unwrap_or_else(|_| "local".to_string())
                .parse()?,
            enrichment_api_url: std::env::var("ENRICHMENT_API_URL")
                .map_err(|_| anyhow::anyhow!("ENRICHMENT_API_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("ENRICHMENT_API_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("ENRICHMENT_API_URL must start with http:// or https://");
                    }
                    Ok(url)
                })?,
            store_timeout_ms: positive_var("STORE_TIMEOUT_MS", 2000)?,
            enrichment_timeout_ms: positive_var("ENRICHMENT_TIMEOUT_MS", 2000)?,
            batch_concurrency: positive_var("BATCH_CONCURRENCY", 16)?,
            max_batch_size: positive_var("MAX_BATCH_SIZE", 1000)?,
            db_max_connections: positive_var("DB_MAX_CONNECTIONS", 10)?,
        };

        tracing::debug!("Database URL: {}", redacted_db_url(&config.database_url));
        tracing::debug!("Enrichment API URL: {}", config.enrichment_api_url);
        tracing::debug!(
            "Batch concurrency: {}, max batch size: {}",
            config.batch_concurrency,
            config.max_batch_size
        );

        Ok(config)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_millis(self.enrichment_timeout_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Scheme, host, port and database of a connection URL. Credentials and
/// query parameters are left out.
fn redacted_db_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return "<unparseable>".to_string();
    };
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
    format!(
        "{}://{}{}{}",
        parsed.scheme(),
        parsed.host_str().unwrap_or_default(),
        port,
        parsed.path()
    )
}

/// Reads a strictly positive numeric variable, falling back to `default` when unset.
fn positive_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Ok(raw) = std::env::var(name) else {
        return Ok(default);
    };
    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a positive number (got '{}')", name, raw))?;
    if value <= T::default() {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(value)
}
