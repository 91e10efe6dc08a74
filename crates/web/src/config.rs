use std::{env, error::Error, fmt, net::SocketAddr};

use database::{queries::is_valid_table_name, DatabaseConnectionInfo};
use feed::FeedConfig;
use reduction::Tolerance;
use utility::env::{parse_or, var_or, EnvError};

#[derive(Debug)]
pub enum ConfigError {
    /// A value is set but cannot be parsed.
    Invalid(EnvError),
    /// Values parse but are not usable; one message per problem.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Invalid(why) => write!(f, "{}", why),
            Self::Validation(problems) => {
                write!(f, "invalid configuration: {}", problems.join("; "))
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(why) => Some(why),
            Self::Validation(_) => None,
        }
    }
}

impl From<EnvError> for ConfigError {
    fn from(why: EnvError) -> Self {
        Self::Invalid(why)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub feed: FeedConfig,
    pub redis_url: String,
    pub database: DatabaseConnectionInfo,
    pub trips_table: String,
    pub tolerance: Tolerance,
    pub web_address: SocketAddr,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    /// Reads every setting through `lookup`, using defaults for unset keys,
    /// and validates the result. An out of range `ROUTE_TOLERANCE` already
    /// fails to parse.
    pub fn from_lookup<L>(lookup: &L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let config = Self {
            feed: FeedConfig::from_lookup(lookup)?,
            redis_url: var_or(lookup, "REDIS_URL", "redis://127.0.0.1:6379"),
            database: DatabaseConnectionInfo::from_lookup(lookup)?,
            trips_table: var_or(lookup, "DATABASE_TRIPS_TABLE", "trips"),
            tolerance: parse_or(lookup, "ROUTE_TOLERANCE", Tolerance::DEFAULT)?,
            web_address: parse_or(lookup, "WEB_ADDRESS", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            log_level: var_or(lookup, "LOG_LEVEL", "info"),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = vec![];
        let mut require = |ok: bool, problem: &str| {
            if !ok {
                problems.push(problem.to_string());
            }
        };

        require(!self.feed.broker.trim().is_empty(), "MQTT broker must not be empty");
        require(self.feed.port != 0, "MQTT port must not be 0");
        require(!self.feed.client_id.trim().is_empty(), "MQTT client id must not be empty");
        require(!self.feed.topic.trim().is_empty(), "MQTT topic must not be empty");
        require(self.feed.quality_of_service().is_some(), "MQTT QoS must be 0, 1 or 2");
        require(!self.redis_url.trim().is_empty(), "Redis URL must not be empty");
        require(self.database.port != 0, "database port must not be 0");
        require(!self.database.database.trim().is_empty(), "database name must not be empty");
        require(
            is_valid_table_name(&self.trips_table),
            "trips table must be a plain SQL identifier",
        );
        require(!self.log_level.trim().is_empty(), "log level must not be empty");

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }
}
