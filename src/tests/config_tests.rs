#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig};
    use std::env;
    use std::fs;
    use std::sync::Mutex;

    // load() reads process-wide environment; serialise the tests that touch it
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_temp_config(content: &str) -> tempfile::NamedTempFile {
        let temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        fs::write(temp_file.path(), content).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.database.url, "sqlite://data/panelview.db");
        assert_eq!(config.upstream.base_url, "http://127.0.0.1:8080");
        assert!(config.upstream.api_token.is_none());
        assert_eq!(config.upstream.timeout_ms, 10000);
        assert_eq!(config.listing.page_size, crate::listing::FILES_PER_PAGE);
        assert!(config.listing.case_sensitive);
        assert_eq!(config.cache.capacity, 256);
        assert_eq!(config.cache.sessions, 1024);
        assert!(config::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config::validate(&config).unwrap_err().to_string().contains("invalid server.port"));

        let mut config = AppConfig::default();
        config.upstream.base_url = "  ".to_string();
        assert!(config::validate(&config).unwrap_err().to_string().contains("upstream.base_url must not be empty"));

        let mut config = AppConfig::default();
        config.upstream.base_url = "ftp://panel".to_string();
        assert!(config::validate(&config).unwrap_err().to_string().contains("http:// or https://"));

        let mut config = AppConfig::default();
        config.upstream.timeout_ms = 0;
        assert!(config::validate(&config).unwrap_err().to_string().contains("upstream.timeout_ms must be > 0"));

        let mut config = AppConfig::default();
        config.listing.page_size = 0;
        assert!(config::validate(&config).unwrap_err().to_string().contains("listing.page_size"));
        config.listing.page_size = 10_001;
        assert!(config::validate(&config).is_err());

        let mut config = AppConfig::default();
        config.cache.capacity = 0;
        assert!(config::validate(&config).unwrap_err().to_string().contains("cache.capacity must be > 0"));
        config.cache.capacity = 16;
        config.cache.sessions = 0;
        assert!(config::validate(&config).unwrap_err().to_string().contains("cache.sessions must be > 0"));
    }

    #[test]
    fn test_load_with_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(config::load().is_ok());

        env::set_var("PANELVIEW__SERVER__PORT", "0");
        let result = config::load();
        env::remove_var("PANELVIEW__SERVER__PORT");
        assert!(result.unwrap_err().to_string().contains("invalid server.port"));

        env::set_var("PANELVIEW__LISTING__PAGE_SIZE", "50");
        env::set_var("PANELVIEW__LISTING__CASE_SENSITIVE", "false");
        let result = config::load();
        env::remove_var("PANELVIEW__LISTING__PAGE_SIZE");
        env::remove_var("PANELVIEW__LISTING__CASE_SENSITIVE");
        let config = result.unwrap();
        assert_eq!(config.listing.page_size, 50);
        assert!(!config.listing.case_sensitive);
    }

    #[test]
    fn test_config_from_file_and_priority() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp_file = write_temp_config(
            r#"
[server]
port = 7000

[upstream]
base_url = "https://panel.example.com"
api_token = "ptlc_abc"

[cache]
capacity = 16
"#,
        );

        env::set_var("PANELVIEW_CONFIG", temp_file.path().to_str().unwrap());
        let from_file = config::load();
        env::set_var("PANELVIEW__SERVER__PORT", "8888");
        let with_env = config::load();
        env::remove_var("PANELVIEW__SERVER__PORT");
        env::remove_var("PANELVIEW_CONFIG");

        let from_file = from_file.unwrap();
        assert_eq!(from_file.server.port, 7000);
        assert_eq!(from_file.upstream.base_url, "https://panel.example.com");
        assert_eq!(from_file.upstream.api_token.as_deref(), Some("ptlc_abc"));
        assert_eq!(from_file.cache.capacity, 16);
        // Untouched sections keep their defaults
        assert_eq!(from_file.listing.page_size, 250);

        // Environment variables override the file
        assert_eq!(with_env.unwrap().server.port, 8888);
    }

    #[test]
    fn test_ensure_sqlite_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("subdir/test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        assert!(!db_path.parent().unwrap().exists());
        config::ensure_sqlite_parent_dir(&db_url).unwrap();
        assert!(db_path.parent().unwrap().exists());
    }

    #[test]
    fn test_ensure_sqlite_parent_dir_non_sqlite() {
        assert!(config::ensure_sqlite_parent_dir("postgres://localhost/db").is_ok());
    }
}
