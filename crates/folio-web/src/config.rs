use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

use crate::limiter::LimitClass;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub tls: TlsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
}

/// The single admin account allowed to log in.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_id")]
    pub id: String,
    #[serde(default = "default_admin_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Argon2 PHC string, produced by the `hash_password` binary.
    #[serde(default)]
    pub password_hash: String,
}

/// One fixed-window budget: `max_requests` per `window_secs`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LimitPolicy {
    pub max_requests: u32,
    pub window_secs: u64,
    #[serde(default)]
    pub message: Option<String>,
}

impl LimitPolicy {
    fn new(max_requests: u32, window_secs: u64, message: &str) -> Self {
        Self {
            max_requests,
            window_secs,
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_login_policy")]
    pub login: LimitPolicy,
    #[serde(default = "default_contact_policy")]
    pub contact: LimitPolicy,
    #[serde(default = "default_upload_policy")]
    pub upload: LimitPolicy,
    #[serde(default = "default_api_policy")]
    pub api: LimitPolicy,
    #[serde(default = "default_public_read_policy")]
    pub public_read: LimitPolicy,
    /// Seconds between sweeps of expired windows.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl RateLimitConfig {
    pub fn policy(&self, class: LimitClass) -> &LimitPolicy {
        match class {
            LimitClass::Login => &self.login,
            LimitClass::Contact => &self.contact,
            LimitClass::Upload => &self.upload,
            LimitClass::Api => &self.api,
            LimitClass::PublicRead => &self.public_read,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// JSON snapshot file. Content lives only in memory when unset.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub resend_api_key: Option<String>,
    /// Inbox that receives contact-form messages.
    #[serde(default)]
    pub contact_to: String,
    #[serde(default = "default_contact_from")]
    pub contact_from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub cloudinary_cloud_name: Option<String>,
    #[serde(default)]
    pub cloudinary_api_key: Option<String>,
    #[serde(default)]
    pub cloudinary_api_secret: Option<String>,
    #[serde(default = "default_upload_folder")]
    pub default_folder: String,
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}
fn default_admin_id() -> String { "admin".to_string() }
fn default_admin_name() -> String { "Admin".to_string() }
fn default_contact_from() -> String { "Portfolio <onboarding@resend.dev>".to_string() }
fn default_upload_folder() -> String { "portfolio".to_string() }
fn default_max_upload_size_mb() -> usize { 5 }
fn default_sweep_interval_secs() -> u64 { 300 }

fn default_login_policy() -> LimitPolicy {
    LimitPolicy::new(5, 300, "Too many login attempts. Please try again in 5 minutes.")
}
fn default_contact_policy() -> LimitPolicy {
    LimitPolicy::new(3, 3600, "Too many messages sent. Please try again in an hour.")
}
fn default_upload_policy() -> LimitPolicy {
    LimitPolicy::new(10, 3600, "Upload limit reached. Please try again later.")
}
fn default_api_policy() -> LimitPolicy {
    LimitPolicy {
        max_requests: 100,
        window_secs: 60,
        message: None,
    }
}
fn default_public_read_policy() -> LimitPolicy {
    LimitPolicy {
        max_requests: 200,
        window_secs: 60,
        message: None,
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            id: default_admin_id(),
            name: default_admin_name(),
            email: String::new(),
            password_hash: String::new(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login: default_login_policy(),
            contact: default_contact_policy(),
            upload: default_upload_policy(),
            api: default_api_policy(),
            public_read: default_public_read_policy(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            contact_to: String::new(),
            contact_from: default_contact_from(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            default_folder: default_upload_folder(),
            max_upload_size_mb: default_max_upload_size_mb(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            auth: AuthConfig::default(),
            admin: AdminConfig::default(),
            rate_limit: RateLimitConfig::default(),
            storage: StorageConfig::default(),
            mail: MailConfig::default(),
            media: MediaConfig::default(),
            cors: CorsConfig::default(),
            tls: TlsConfig::default(),
        }
    }
}

const WEAK_SECRETS: &[&str] = &[
    "change-me-to-a-random-secret",
    "your-secret-key",
    "secret",
    "password",
    "jwt-secret",
];

impl ServerConfig {
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.cert_path.is_some() && self.tls.key_path.is_some()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.media.max_upload_size_mb * 1024 * 1024
    }

    /// Reads `FOLIO_CONFIG` (if set), applies `FOLIO_*` overrides and validates.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var("FOLIO_CONFIG").map(PathBuf::from) {
            Ok(path) => {
                let contents = std::fs::read_to_string(&path)?;
                Self::from_toml_str(&contents)?
            }
            Err(_) => ServerConfig::default(),
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> anyhow::Result<()> {
        let var = |name: &str| std::env::var(name).ok();

        if let Some(addr) = var("FOLIO_BIND_ADDR") {
            self.bind_addr = addr.parse()?;
        }
        if let Some(secret) = var("FOLIO_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(email) = var("FOLIO_ADMIN_EMAIL") {
            self.admin.email = email;
        }
        if let Some(name) = var("FOLIO_ADMIN_NAME") {
            self.admin.name = name;
        }
        if let Some(hash) = var("FOLIO_ADMIN_PASSWORD_HASH") {
            self.admin.password_hash = hash;
        }
        if let Some(path) = var("FOLIO_DATA_FILE") {
            self.storage.data_file = Some(PathBuf::from(path));
        }
        if let Some(key) = var("FOLIO_RESEND_API_KEY") {
            self.mail.resend_api_key = Some(key);
        }
        if let Some(to) = var("FOLIO_CONTACT_TO") {
            self.mail.contact_to = to;
        }
        if let Some(from) = var("FOLIO_CONTACT_FROM") {
            self.mail.contact_from = from;
        }
        if let Some(name) = var("FOLIO_CLOUDINARY_CLOUD_NAME") {
            self.media.cloudinary_cloud_name = Some(name);
        }
        if let Some(key) = var("FOLIO_CLOUDINARY_API_KEY") {
            self.media.cloudinary_api_key = Some(key);
        }
        if let Some(secret) = var("FOLIO_CLOUDINARY_API_SECRET") {
            self.media.cloudinary_api_secret = Some(secret);
        }
        if let Some(origins) = var("FOLIO_CORS_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(cert) = var("FOLIO_TLS_CERT") {
            self.tls.cert_path = Some(cert);
        }
        if let Some(key) = var("FOLIO_TLS_KEY") {
            self.tls.key_path = Some(key);
        }
        Ok(())
    }

    /// Refuses to start without a usable signing secret and admin account.
    pub fn validate(&self) -> anyhow::Result<()> {
        let secret = self.auth.jwt_secret.as_str();
        if secret.is_empty() {
            anyhow::bail!("No JWT secret configured. Set FOLIO_JWT_SECRET.");
        }
        if WEAK_SECRETS.contains(&secret) {
            anyhow::bail!(
                "JWT secret matches a known weak/placeholder value. \
                 Set a strong random secret via FOLIO_JWT_SECRET."
            );
        }
        if secret.len() < 32 {
            tracing::warn!(
                "JWT secret is shorter than 32 characters. \
                 Consider using a stronger secret via FOLIO_JWT_SECRET."
            );
        }

        if self.admin.email.trim().is_empty() {
            anyhow::bail!("No admin email configured. Set FOLIO_ADMIN_EMAIL.");
        }
        if self.admin.password_hash.is_empty() {
            anyhow::bail!(
                "No admin password hash configured. \
                 Generate one with `hash_password` and set FOLIO_ADMIN_PASSWORD_HASH."
            );
        }
        if let Err(e) = argon2::PasswordHash::new(&self.admin.password_hash) {
            anyhow::bail!(
                "Admin password hash is not a valid PHC string ({e}). \
                 Regenerate it with `hash_password`."
            );
        }

        for class in LimitClass::ALL {
            let policy = self.rate_limit.policy(class);
            if policy.max_requests == 0 || policy.window_secs == 0 {
                anyhow::bail!("rate_limit.{} needs a non-zero budget and window", class.name());
            }
        }
        if self.rate_limit.sweep_interval_secs == 0 {
            anyhow::bail!("rate_limit.sweep_interval_secs must be positive");
        }

        if self.mail.resend_api_key.is_some() && self.mail.contact_to.is_empty() {
            anyhow::bail!("FOLIO_CONTACT_TO is required when mail delivery is enabled");
        }
        Ok(())
    }
}
