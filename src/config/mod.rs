// Configuration module entry point
// Loads responder settings from file, environment and defaults

mod types;

pub use types::{
    Config, ErrorsConfig, FilesConfig, HttpConfig, LoggingConfig, DEFAULT_CHUNK_SIZE,
    DEFAULT_ERROR_MESSAGE,
};

use crate::error::Result;

/// Environment variable prefix, e.g. `MARSHAL_FILES__SERVE_RANGES=false`
pub const ENV_PREFIX: &str = "MARSHAL";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error; defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("files.serve_ranges", true)?
            .set_default("files.chunk_size", DEFAULT_CHUNK_SIZE as u64)?
            .set_default("errors.debug", false)?
            .set_default("errors.message", DEFAULT_ERROR_MESSAGE)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse an inline TOML document, missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.logging.access_log);
        assert!(cfg.files.serve_ranges);
        assert_eq!(cfg.files.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(!cfg.errors.debug);
        assert_eq!(cfg.errors.message, "An error occurred");
        assert_eq!(cfg.http.server_name, None);
    }

    #[test]
    fn test_from_toml_partial() {
        let cfg = Config::from_toml_str(
            r#"
            [files]
            serve_ranges = false

            [errors]
            debug = true

            [http]
            server_name = "marshal/0.3"
            "#,
        )
        .unwrap();
        assert!(!cfg.files.serve_ranges);
        assert_eq!(cfg.files.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(cfg.errors.debug);
        assert_eq!(cfg.errors.message, DEFAULT_ERROR_MESSAGE);
        assert_eq!(cfg.http.server_name.as_deref(), Some("marshal/0.3"));
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = Config::from_toml_str("[files]\nserve_ranges = \"sometimes\"").unwrap_err();
        assert!(matches!(err, crate::Error::Toml(_)));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("http-marshal-no-such-config");
        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.errors.message, DEFAULT_ERROR_MESSAGE);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_load_from_environment() {
        let path = std::env::temp_dir().join("http-marshal-env-only-config");
        std::env::set_var("MARSHAL_HTTP__SERVER_NAME", "marshal-env");
        let cfg = Config::load_from(path.to_str().unwrap());
        std::env::remove_var("MARSHAL_HTTP__SERVER_NAME");
        assert_eq!(cfg.unwrap().http.server_name.as_deref(), Some("marshal-env"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "http-marshal-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[errors]\nmessage = \"Oops\"\n").unwrap();
        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.errors.message, "Oops");
        assert!(cfg.files.serve_ranges);
    }
}
