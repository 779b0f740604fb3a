use serde::Deserialize;

/// Main configuration structure for Alertmap
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default, rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Post URL to start from when the store holds no resume anchor
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Place qualifier appended to location phrases before geocoding
    /// (e.g. "University District, Seattle")
    #[serde(rename = "place-context")]
    pub place_context: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Inference API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Base URL of the generative inference API
    #[serde(default = "default_enrichment_endpoint")]
    pub endpoint: String,

    /// Model identifier used for both prompts
    #[serde(default = "default_model")]
    pub model: String,

    /// Category taxonomy the model chooses from
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_enrichment_endpoint(),
            model: default_model(),
            categories: default_categories(),
        }
    }
}

fn default_enrichment_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_categories() -> Vec<String> {
    [
        "crime",
        "weather",
        "environment",
        "health & wellness",
        "infrastructure",
        "facility",
        "academic",
        "administrative",
        "general",
        "traffic",
        "IT",
        "Hazardous Material",
        "fire",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Geocoding API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim-compatible geocoding service
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocoder_endpoint(),
        }
    }
}

fn default_geocoder_endpoint() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

/// Inference call quota per fixed window
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum inference calls per window
    #[serde(default = "default_quota")]
    pub quota: u32,

    /// Window length in seconds
    #[serde(rename = "window-secs", default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            quota: default_quota(),
            window_secs: default_window_secs(),
        }
    }
}

// Two inference calls per post, seven posts per minute. The upstream quota is
// 15 requests per minute, so 14 leaves one in reserve.
fn default_quota() -> u32 {
    14
}

fn default_window_secs() -> u64 {
    60
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Notification side-channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Whether to send a confirmation email per newly stored post
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the mail API
    #[serde(default = "default_notify_endpoint")]
    pub endpoint: String,

    /// Sender address
    #[serde(default)]
    pub from: String,

    /// Recipient addresses
    #[serde(default)]
    pub to: Vec<String>,

    /// Subject line for confirmation emails
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_notify_endpoint(),
            from: String::new(),
            to: Vec::new(),
            subject: default_subject(),
        }
    }
}

fn default_notify_endpoint() -> String {
    "https://api.resend.com".to_string()
}

fn default_subject() -> String {
    "U-District alerts map, new post confirmation".to_string()
}
