use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_days: i64,
    pub ml_service_url: String,
    pub ml_timeout_secs: u64,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_expiry_days: check_jwt_expiry_days(parse_env("JWT_EXPIRY_DAYS", 7)?)?,
            ml_service_url: std::env::var("ML_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            ml_timeout_secs: parse_env("ML_TIMEOUT_SECS", 60)?,
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            port: parse_env("PORT", 5001)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// Diagnostic error detail is only returned to clients outside production.
    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

const MAX_JWT_EXPIRY_DAYS: i64 = 3650;

/// Token lifetime in days, bounded so the expiry stays representable.
fn check_jwt_expiry_days(days: i64) -> Result<i64> {
    if (1..=MAX_JWT_EXPIRY_DAYS).contains(&days) {
        Ok(days)
    } else {
        anyhow::bail!("JWT_EXPIRY_DAYS must be between 1 and {MAX_JWT_EXPIRY_DAYS}, got {days}")
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/prepdesk_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_days: 7,
            ml_service_url: "http://localhost:8000".to_string(),
            ml_timeout_secs: 5,
            cors_origin: "http://localhost:5173".to_string(),
            max_upload_bytes: 1024 * 1024,
            port: 0,
            rust_log: "info".to_string(),
            app_env: "test".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_detection_is_case_insensitive() {
        let mut config = Config::for_tests();
        assert!(!config.is_production());
        config.app_env = "Production".to_string();
        assert!(config.is_production());
    }

    #[test]
    fn test_jwt_expiry_days_must_be_in_range() {
        assert_eq!(check_jwt_expiry_days(7).unwrap(), 7);
        assert_eq!(check_jwt_expiry_days(3650).unwrap(), 3650);
        for days in [0, -1, 3651, i64::MAX, i64::MIN] {
            let err = check_jwt_expiry_days(days).unwrap_err();
            assert!(err.to_string().contains("JWT_EXPIRY_DAYS"), "{err}");
        }
    }
}
