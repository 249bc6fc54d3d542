use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of the `accessToken` cookie and JWT. Default: 15 minutes.
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_secs: i64,
    /// Lifetime of the `refreshToken` cookie and JWT. Default: 7 days.
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_secs: i64,
    /// Mark auth cookies `Secure`. Enable behind HTTPS.
    #[serde(default)]
    pub cookie_secure: bool,
}

fn default_access_token_ttl() -> i64 {
    15 * 60
}
fn default_refresh_token_ttl() -> i64 {
    7 * 24 * 60 * 60
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for uploaded documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Upper bound for any single uploaded file (documents, annexes, banners).
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_data_dir() -> String {
    "./data".into()
}
fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// Thresholds for the attendance compliance summary.
#[derive(Debug, Deserialize, Clone)]
pub struct AttendanceConfig {
    /// How far back the summary looks, in days. Unset counts every absence.
    #[serde(default)]
    pub summary_window_days: Option<i64>,
    /// Largest gap between two absences that still counts as consecutive.
    #[serde(default = "default_consecutive_gap_days")]
    pub consecutive_gap_days: i64,
    /// A streak of this many consecutive absences breaks compliance.
    #[serde(default = "default_consecutive_limit")]
    pub consecutive_limit: u64,
    /// This many unjustified absences break compliance.
    #[serde(default = "default_unjustified_limit")]
    pub unjustified_limit: u64,
}

fn default_consecutive_gap_days() -> i64 {
    14
}
fn default_consecutive_limit() -> u64 {
    3
}
fn default_unjustified_limit() -> u64 {
    6
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            summary_window_days: None,
            consecutive_gap_days: default_consecutive_gap_days(),
            consecutive_limit: default_consecutive_limit(),
            unjustified_limit: default_unjustified_limit(),
        }
    }
}

/// Optional administrator account created on startup.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub attendance: AttendanceConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., VILAAGRO__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("VILAAGRO")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
