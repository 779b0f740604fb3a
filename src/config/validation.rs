use crate::config::types::{
    Config, EnrichmentConfig, GeocoderConfig, NotifyConfig, RateLimitConfig, SiteConfig,
    StorageConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_enrichment_config(&config.enrichment)?;
    validate_geocoder_config(&config.geocoder)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_storage_config(&config.storage)?;
    validate_notify_config(&config.notify)?;
    Ok(())
}

/// Validates target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.seed_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed_url: {}", e)))?;

    if url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "seed_url '{}' must use HTTPS scheme",
            config.seed_url
        )));
    }

    if config.place_context.trim().is_empty() {
        return Err(ConfigError::Validation(
            "place_context cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    // Validate contact email (basic validation)
    validate_email(&config.contact_email, "contact_email")?;

    Ok(())
}

/// Validates inference API configuration
fn validate_enrichment_config(config: &EnrichmentConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid enrichment endpoint: {}", e)))?;

    if config.model.is_empty() {
        return Err(ConfigError::Validation(
            "enrichment model cannot be empty".to_string(),
        ));
    }

    if config.categories.is_empty() {
        return Err(ConfigError::Validation(
            "enrichment categories cannot be empty".to_string(),
        ));
    }

    for category in &config.categories {
        if category.trim().is_empty() {
            return Err(ConfigError::Validation(
                "enrichment categories cannot contain blank entries".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates geocoder configuration
fn validate_geocoder_config(config: &GeocoderConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid geocoder endpoint: {}", e)))?;
    Ok(())
}

/// Validates rate limit configuration
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.quota < 1 {
        return Err(ConfigError::Validation(format!(
            "rate limit quota must be >= 1, got {}",
            config.quota
        )));
    }

    if config.window_secs < 1 || config.window_secs > 3600 {
        return Err(ConfigError::Validation(format!(
            "rate limit window must be between 1 and 3600 seconds, got {}",
            config.window_secs
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates notification configuration
///
/// Sender, recipients, and subject are only required when notification is
/// enabled; a disabled section may be left at its defaults.
fn validate_notify_config(config: &NotifyConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid notify endpoint: {}", e)))?;

    if config.from.trim().is_empty() {
        return Err(ConfigError::Validation(
            "notify.from cannot be empty when notification is enabled".to_string(),
        ));
    }

    if config.to.is_empty() {
        return Err(ConfigError::Validation(
            "notify.to must list at least one recipient when notification is enabled".to_string(),
        ));
    }

    for recipient in &config.to {
        validate_email(recipient, "notify.to")?;
    }

    if config.subject.trim().is_empty() {
        return Err(ConfigError::Validation(
            "notify.subject cannot be empty when notification is enabled".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str, field: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} cannot be empty",
            field
        )));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format in {}: '{}'",
            field, email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format in {}: '{}'",
            field, email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain in {}: '{}'",
            field, email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{SiteConfig, StorageConfig, UserAgentConfig};

    fn create_valid_config() -> Config {
        Config {
            site: SiteConfig {
                seed_url: "https://alerts.example.edu/?p=100".to_string(),
                place_context: "University District, Seattle".to_string(),
            },
            user_agent: UserAgentConfig {
                crawler_name: "alertmap".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.edu/about".to_string(),
                contact_email: "ops@example.edu".to_string(),
            },
            enrichment: EnrichmentConfig::default(),
            geocoder: GeocoderConfig::default(),
            rate_limit: RateLimitConfig::default(),
            storage: StorageConfig {
                database_path: "./alertmap.db".to_string(),
            },
            notify: NotifyConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let config = create_valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_http_seed_url_rejected() {
        let mut config = create_valid_config();
        config.site.seed_url = "http://alerts.example.edu/?p=100".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_place_context_rejected() {
        let mut config = create_valid_config();
        config.site.place_context = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_quota_rejected() {
        let mut config = create_valid_config();
        config.rate_limit.quota = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_oversized_window_rejected() {
        let mut config = create_valid_config();
        config.rate_limit.window_secs = 7200;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_categories_rejected() {
        let mut config = create_valid_config();
        config.enrichment.categories = vec![];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_disabled_notify_skips_checks() {
        let mut config = create_valid_config();
        config.notify.enabled = false;
        config.notify.from = String::new();
        config.notify.to = vec![];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_enabled_notify_requires_recipients() {
        let mut config = create_valid_config();
        config.notify.enabled = true;
        config.notify.from = "Alerts <alerts@example.edu>".to_string();
        config.notify.to = vec![];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_enabled_notify_with_recipients_passes() {
        let mut config = create_valid_config();
        config.notify.enabled = true;
        config.notify.from = "alerts@example.edu".to_string();
        config.notify.to = vec!["oncall@example.edu".to_string()];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com", "test").is_ok());
        assert!(validate_email("admin@sub.example.com", "test").is_ok());

        assert!(validate_email("", "test").is_err());
        assert!(validate_email("invalid", "test").is_err());
        assert!(validate_email("@example.com", "test").is_err());
        assert!(validate_email("user@", "test").is_err());
        assert!(validate_email("user@domain", "test").is_err());
    }
}
