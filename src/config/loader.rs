//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseTarget, PharmacyConfig};
use super::secret::secret_string;
use crate::domain::errors::PharmacyError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PharmacyConfig
/// 4. Applies environment variable overrides (PHARMACY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the file cannot be read, a referenced
/// environment variable is unset, parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use pharmacy::config::loader::load_config;
///
/// let config = load_config("pharmacy.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PharmacyConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PharmacyError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PharmacyError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying the same steps as [`load_config`]
///
/// # Errors
///
/// Returns a `Configuration` error on substitution, parse or validation failure.
pub fn parse_config(contents: &str) -> Result<PharmacyConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PharmacyConfig = toml::from_str(&contents)
        .map_err(|e| PharmacyError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PharmacyError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PharmacyError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        // Placeholders inside comments are left alone
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PharmacyError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        PharmacyError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using PHARMACY_* prefix
///
/// Environment variables follow the pattern: PHARMACY_<SECTION>_<KEY>
/// For example: PHARMACY_SERVER_PORT, PHARMACY_AUTH_JWT_SECRET
fn apply_env_overrides(config: &mut PharmacyConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PHARMACY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Server overrides
    if let Ok(val) = std::env::var("PHARMACY_SERVER_HOST") {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("PHARMACY_SERVER_PORT") {
        config.server.port = parse_override("PHARMACY_SERVER_PORT", &val)?;
    }
    if let Ok(val) = std::env::var("PHARMACY_SERVER_CORS_ALLOWED_ORIGINS") {
        config.server.cors_allowed_origins = val
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
    }

    // Auth overrides
    if let Ok(val) = std::env::var("PHARMACY_AUTH_JWT_SECRET") {
        config.auth.jwt_secret = secret_string(val);
    }
    if let Ok(val) = std::env::var("PHARMACY_AUTH_ACCESS_TOKEN_EXPIRE_MINUTES") {
        config.auth.access_token_expire_minutes =
            parse_override("PHARMACY_AUTH_ACCESS_TOKEN_EXPIRE_MINUTES", &val)?;
    }

    if let Ok(val) = std::env::var("PHARMACY_DATABASE_TARGET") {
        config.database_target = match val.as_str() {
            "postgresql" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            other => {
                return Err(PharmacyError::Configuration(format!(
                    "Invalid PHARMACY_DATABASE_TARGET '{other}'. Must be postgresql or memory"
                )))
            }
        };
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg_config) = config.postgresql {
        if let Ok(val) = std::env::var("PHARMACY_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Ok(val) = std::env::var("PHARMACY_POSTGRESQL_MAX_CONNECTIONS") {
            pg_config.max_connections =
                parse_override("PHARMACY_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
        if let Ok(val) = std::env::var("PHARMACY_POSTGRESQL_SSL_MODE") {
            pg_config.ssl_mode = val;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PHARMACY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PHARMACY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("PHARMACY_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MEMORY_CONFIG: &str = r#"
database_target = "memory"

[auth]
jwt_secret = "0123456789abcdef0123456789abcdef"
"#;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("PHARMACY_TEST_SUBST_VAR", "test_value");
        let input = "jwt_secret = \"${PHARMACY_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "jwt_secret = \"test_value\"\n");
        std::env::remove_var("PHARMACY_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("PHARMACY_TEST_MISSING_VAR");
        let input = "jwt_secret = \"${PHARMACY_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("PHARMACY_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("PHARMACY_TEST_COMMENTED_VAR");
        let input = "# jwt_secret = \"${PHARMACY_TEST_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MEMORY_CONFIG.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.database_target, DatabaseTarget::Memory);
        assert_eq!(config.auth.access_token_expire_minutes, 30);
        assert_eq!(config.server.port, 8000);
        assert!(config
            .auth
            .jwt_secret
            .expose_secret()
            .starts_with("0123"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = parse_config("database_target = \"memory\"\n[auth]\njwt_secret = \"short\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("Configuration validation failed"));
    }
}
