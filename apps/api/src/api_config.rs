use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tessera_core::AppError;
use tracing_subscriber::EnvFilter;

/// What the binary does after loading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    Bootstrap,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub bootstrap_on_start: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_source(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    fn from_source(
        command: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let command = match command {
            None | Some("serve") => ApiCommand::Serve,
            Some("migrate") => ApiCommand::Migrate,
            Some("bootstrap") => ApiCommand::Bootstrap,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "unknown command '{other}', expected 'serve', 'migrate' or 'bootstrap'"
                )));
            }
        };

        let database_url = lookup("DATABASE_URL").filter(|value| !value.trim().is_empty());
        if command != ApiCommand::Serve && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required for the migrate and bootstrap commands".to_owned(),
            ));
        }

        Ok(Self {
            command,
            database_url,
            database_max_connections: parsed_env(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_owned()),
            api_host: lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned()),
            api_port: parsed_env(&lookup, "API_PORT", 3001)?,
            bootstrap_on_start: parsed_bool_env(&lookup, "RBAC_BOOTSTRAP_ON_START", true)?,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parsed_env<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}"))),
        None => Ok(default),
    }
}

fn parsed_bool_env(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: bool,
) -> Result<bool, AppError> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "invalid {name} '{value}': expected true or false"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tessera_core::AppError;

    use super::{ApiCommand, ApiConfig};

    fn config(command: Option<&str>, values: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_source(command, |name| values.get(name).cloned())
    }

    #[test]
    fn defaults_serve_from_memory() {
        let config = config(None, &[]).unwrap_or_else(|_| unreachable!());

        assert_eq!(config.command, ApiCommand::Serve);
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.api_port, 3001);
        assert!(config.bootstrap_on_start);
        assert_eq!(
            config
                .socket_address()
                .map(|address| address.to_string())
                .ok(),
            Some("127.0.0.1:3001".to_owned())
        );
    }

    #[test]
    fn migrate_requires_database_url() {
        assert!(matches!(
            config(Some("migrate"), &[]),
            Err(AppError::Validation(_))
        ));
        let database_url = [("DATABASE_URL", "postgres://localhost/rbac")];
        assert!(config(Some("bootstrap"), &database_url).is_ok());
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let port = config(None, &[("API_PORT", "eighty")]);
        assert!(matches!(
            port,
            Err(AppError::Validation(message)) if message.contains("API_PORT")
        ));

        let bootstrap = config(None, &[("RBAC_BOOTSTRAP_ON_START", "maybe")]);
        assert!(matches!(
            bootstrap,
            Err(AppError::Validation(message)) if message.contains("RBAC_BOOTSTRAP_ON_START")
        ));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(matches!(
            config(Some("seed"), &[]),
            Err(AppError::Validation(_))
        ));
    }
}
