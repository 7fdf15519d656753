use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // HTTP server
    pub listen_addr: String,
    pub request_timeout_secs: u64,

    // Storage backends
    pub db_path: String,
    pub credentials_path: String,

    // Geocoding
    pub geocoder_url: String,
    pub country: String,
    pub geocoder_timeout_secs: u64,
    pub geocoder_throttle_ms: u64,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            request_timeout_secs: 30,
            db_path: "estufa.db".to_string(),
            credentials_path: "document_store_credentials.json".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            country: "Portugal".to_string(),
            geocoder_timeout_secs: 10,
            geocoder_throttle_ms: 1000,
            debug: false,
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let listen_addr = std::env::var("PRODUTORES_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:5000".to_string());

    let request_timeout_secs = std::env::var("PRODUTORES_REQUEST_TIMEOUT_SECS")
        .unwrap_or_else(|_| "30".to_string())
        .parse()
        .unwrap_or(30);

    let db_path = std::env::var("PRODUTORES_DB_PATH")
        .unwrap_or_else(|_| "estufa.db".to_string());

    let credentials_path = std::env::var("PRODUTORES_CREDENTIALS_PATH")
        .unwrap_or_else(|_| "document_store_credentials.json".to_string());

    let geocoder_url = std::env::var("PRODUTORES_GEOCODER_URL")
        .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());

    let country = std::env::var("PRODUTORES_COUNTRY")
        .unwrap_or_else(|_| "Portugal".to_string());

    let geocoder_timeout_secs = std::env::var("PRODUTORES_GEOCODER_TIMEOUT_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(10);

    let geocoder_throttle_ms = std::env::var("PRODUTORES_GEOCODER_THROTTLE_MS")
        .unwrap_or_else(|_| "1000".to_string())
        .parse()
        .unwrap_or(1000);

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        listen_addr,
        request_timeout_secs,
        db_path,
        credentials_path,
        geocoder_url,
        country,
        geocoder_timeout_secs,
        geocoder_throttle_ms,
        debug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
        assert_eq!(cfg.db_path, "estufa.db");
        assert_eq!(cfg.country, "Portugal");
        assert_eq!(cfg.geocoder_timeout_secs, 10);
        assert_eq!(cfg.geocoder_throttle_ms, 1000);
        assert!(!cfg.debug);
    }

    #[test]
    fn test_load_config_defaults() {
        std::env::remove_var("PRODUTORES_LISTEN_ADDR");
        std::env::remove_var("PRODUTORES_DB_PATH");

        let cfg = load_config().unwrap();
        assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
        assert_eq!(cfg.db_path, "estufa.db");
        assert_eq!(cfg.credentials_path, "document_store_credentials.json");
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_config_with_custom_listen_addr() {
        std::env::set_var("PRODUTORES_LISTEN_ADDR", "127.0.0.1:9000");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
        std::env::remove_var("PRODUTORES_LISTEN_ADDR");
    }

    #[test]
    fn test_load_config_with_custom_geocoder() {
        std::env::set_var("PRODUTORES_GEOCODER_URL", "http://localhost:8089");
        std::env::set_var("PRODUTORES_COUNTRY", "España");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.geocoder_url, "http://localhost:8089");
        assert_eq!(cfg.country, "España");
        std::env::remove_var("PRODUTORES_GEOCODER_URL");
        std::env::remove_var("PRODUTORES_COUNTRY");
    }

    #[test]
    fn test_load_config_with_credentials_path() {
        std::env::set_var("PRODUTORES_CREDENTIALS_PATH", "/etc/produtores/creds.json");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.credentials_path, "/etc/produtores/creds.json");
        std::env::remove_var("PRODUTORES_CREDENTIALS_PATH");
    }

    #[test]
    fn test_load_config_with_throttle() {
        std::env::set_var("PRODUTORES_GEOCODER_THROTTLE_MS", "0");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.geocoder_throttle_ms, 0);
        std::env::remove_var("PRODUTORES_GEOCODER_THROTTLE_MS");
    }

    #[test]
    fn test_load_config_parse_error_uses_default() {
        std::env::set_var("PRODUTORES_GEOCODER_TIMEOUT_SECS", "not_a_number");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.geocoder_timeout_secs, 10);
        std::env::remove_var("PRODUTORES_GEOCODER_TIMEOUT_SECS");
    }

    #[test]
    fn test_load_config_with_debug() {
        std::env::set_var("DEBUG", "1");
        let cfg = load_config().unwrap();
        assert!(cfg.debug);
        std::env::remove_var("DEBUG");
    }

    #[test]
    fn test_config_clone() {
        let cfg = Config::default();
        let cloned = cfg.clone();
        assert_eq!(cfg.listen_addr, cloned.listen_addr);
        assert_eq!(cfg.credentials_path, cloned.credentials_path);
    }
}
