//! Application configuration loaded from environment variables.

use std::str::FromStr;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset means in-memory storage
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `RESTOCK_ON_CUSTOMER_CANCEL`: restock when a customer cancels (default: `false`)
/// - `PRODUCTS_PER_PAGE`: default catalog page size (default: `12`)
/// - `STOREFRONT_ADMIN_TOKEN` / `STOREFRONT_ADMIN_EMAIL`: bootstrap admin credentials
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub restock_on_customer_cancel: bool,
    pub products_per_page: u32,
    pub admin_token: Option<String>,
    pub admin_email: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),
            restock_on_customer_cancel: non_empty("RESTOCK_ON_CUSTOMER_CANCEL")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.restock_on_customer_cancel),
            products_per_page: parsed("PRODUCTS_PER_PAGE").unwrap_or(defaults.products_per_page),
            admin_token: non_empty("STOREFRONT_ADMIN_TOKEN"),
            admin_email: non_empty("STOREFRONT_ADMIN_EMAIL").unwrap_or(defaults.admin_email),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 5,
            restock_on_customer_cancel: false,
            products_per_page: 12,
            admin_token: None,
            admin_email: "admin@storefront.local".to_string(),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    non_empty(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 7] = [
        "PORT",
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "RESTOCK_ON_CUSTOMER_CANCEL",
        "PRODUCTS_PER_PAGE",
        "STOREFRONT_ADMIN_TOKEN",
        "STOREFRONT_ADMIN_EMAIL",
    ];

    fn clear_env() {
        for key in KEYS {
            // SAFETY: tests touching the environment are serialized.
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert!(!config.restock_on_customer_cancel);
        assert_eq!(config.products_per_page, 12);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        clear_env();
        // SAFETY: serialized with every other environment test.
        unsafe {
            std::env::set_var("PORT", "8081");
            std::env::set_var("DATABASE_URL", "postgres://localhost/shop");
            std::env::set_var("RESTOCK_ON_CUSTOMER_CANCEL", "TRUE");
            std::env::set_var("PRODUCTS_PER_PAGE", "24");
            std::env::set_var("STOREFRONT_ADMIN_TOKEN", "secret");
        }

        let config = Config::from_env();
        assert_eq!(config.port, 8081);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/shop"));
        assert!(config.restock_on_customer_cancel);
        assert_eq!(config.products_per_page, 24);
        assert_eq!(config.admin_token.as_deref(), Some("secret"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_garbage() {
        clear_env();
        // SAFETY: serialized with every other environment test.
        unsafe {
            std::env::set_var("PORT", "not-a-port");
            std::env::set_var("DATABASE_URL", "   ");
        }

        let config = Config::from_env();
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());

        clear_env();
    }
}
