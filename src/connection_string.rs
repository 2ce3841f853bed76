use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::BridgeError;

/// The deployment environments a connection string can be looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Environment {
    /// Developer workstation (localdb or similar)
    Local,
    /// Shared development server
    Dev,
    /// QA / staging server
    Qa,
    /// Production server
    Prod,
}

impl Environment {
    /// All environments, in promotion order.
    pub const ALL: [Environment; 4] = [
        Environment::Local,
        Environment::Dev,
        Environment::Qa,
        Environment::Prod,
    ];

    /// Lowercase name used in config lookups and environment variables.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Qa => "qa",
            Environment::Prod => "prod",
        }
    }

    /// Name of the process environment variable that overrides this entry.
    #[must_use]
    pub fn env_var(self) -> &'static str {
        match self {
            Environment::Local => "MSSQL_BRIDGE_LOCAL",
            Environment::Dev => "MSSQL_BRIDGE_DEV",
            Environment::Qa => "MSSQL_BRIDGE_QA",
            Environment::Prod => "MSSQL_BRIDGE_PROD",
        }
    }

    /// Whether handles against this environment default to read-only.
    ///
    /// Only production does; everywhere else is writable by default.
    #[must_use]
    pub fn read_only_by_default(self) -> bool {
        matches!(self, Environment::Prod)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" => Ok(Environment::Dev),
            "qa" => Ok(Environment::Qa),
            "prod" => Ok(Environment::Prod),
            other => Err(BridgeError::ConfigError(format!(
                "unknown environment '{other}' (expected local, dev, qa, or prod)"
            ))),
        }
    }
}

/// Table of per-environment connection strings.
///
/// Entries are ADO.NET-style strings, the format `tiberius::Config::from_ado_string`
/// consumes. The defaults are placeholders shaped like real deployments; override
/// them with the builder setters or via process environment variables:
/// ```rust
/// use mssql_bridge::prelude::*;
///
/// let strings = ConnectionStrings::default()
///     .with_dev("Server=tcp:devbox,1433;Database=AppDev;User Id=svc;Password=secret;TrustServerCertificate=true");
/// assert!(strings.get(Environment::Dev).contains("AppDev"));
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionStrings {
    local: String,
    dev: String,
    qa: String,
    prod: String,
}

impl Default for ConnectionStrings {
    fn default() -> Self {
        Self {
            local: r"Server=(localdb)\MSSQLLocalDB;Database=BridgeLocal;User Id=app;Password=changeme;TrustServerCertificate=true".to_string(),
            dev: "Server=tcp:dev-sql.internal,1433;Database=AppDev;User Id=app;Password=changeme;TrustServerCertificate=true".to_string(),
            qa: "Server=tcp:qa-sql.internal,1433;Database=AppQa;User Id=app;Password=changeme;TrustServerCertificate=true".to_string(),
            prod: "Server=tcp:prod-sql.internal,1433;Database=AppProd;User Id=app;Password=changeme;TrustServerCertificate=true".to_string(),
        }
    }
}

impl ConnectionStrings {
    /// Defaults overlaid with any `MSSQL_BRIDGE_{LOCAL,DEV,QA,PROD}` process
    /// environment variables, so deployments never hard-code credentials.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut strings = Self::default();
        for env in Environment::ALL {
            if let Some(value) = lookup(env.env_var())
                && !value.is_empty()
            {
                strings.set(env, value);
            }
        }
        strings
    }

    /// Look up the connection string for an environment.
    #[must_use]
    pub fn get(&self, env: Environment) -> &str {
        match env {
            Environment::Local => &self.local,
            Environment::Dev => &self.dev,
            Environment::Qa => &self.qa,
            Environment::Prod => &self.prod,
        }
    }

    /// Replace the entry for an environment.
    pub fn set(&mut self, env: Environment, connection_string: impl Into<String>) {
        let value = connection_string.into();
        match env {
            Environment::Local => self.local = value,
            Environment::Dev => self.dev = value,
            Environment::Qa => self.qa = value,
            Environment::Prod => self.prod = value,
        }
    }

    #[must_use]
    pub fn with_local(mut self, connection_string: impl Into<String>) -> Self {
        self.set(Environment::Local, connection_string);
        self
    }

    #[must_use]
    pub fn with_dev(mut self, connection_string: impl Into<String>) -> Self {
        self.set(Environment::Dev, connection_string);
        self
    }

    #[must_use]
    pub fn with_qa(mut self, connection_string: impl Into<String>) -> Self {
        self.set(Environment::Qa, connection_string);
        self
    }

    #[must_use]
    pub fn with_prod(mut self, connection_string: impl Into<String>) -> Self {
        self.set(Environment::Prod, connection_string);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_round_trips_through_str() {
        for env in Environment::ALL {
            assert_eq!(env.as_str().parse::<Environment>().unwrap(), env);
        }
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn prod_defaults_to_read_only() {
        assert!(Environment::Prod.read_only_by_default());
        assert!(!Environment::Dev.read_only_by_default());
    }

    #[test]
    fn builder_setters_replace_entries() {
        let strings = ConnectionStrings::default()
            .with_qa("Server=tcp:qa2,1433;Database=Other;TrustServerCertificate=true");
        assert!(strings.get(Environment::Qa).contains("Other"));
        // untouched entries keep their defaults
        assert!(strings.get(Environment::Local).contains("localdb"));
    }

    #[test]
    fn env_overlay_wins_over_default() {
        let strings = ConnectionStrings::from_lookup(|name| {
            (name == "MSSQL_BRIDGE_QA")
                .then(|| "Server=tcp:qa-override,1433;Database=FromEnv".to_string())
        });
        assert!(strings.get(Environment::Qa).contains("FromEnv"));
        assert!(strings.get(Environment::Prod).contains("prod-sql"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let strings =
            ConnectionStrings::from_lookup(|name| (name == "MSSQL_BRIDGE_DEV").then(String::new));
        assert!(strings.get(Environment::Dev).contains("dev-sql"));
    }
}
