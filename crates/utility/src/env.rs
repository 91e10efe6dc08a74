use std::{error::Error, fmt, str::FromStr};

/// A value from the environment that could not be parsed into the expected type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "environment variable {}={:?} is invalid: {}",
            self.key, self.value, self.reason
        )
    }
}

impl Error for EnvError {}

/// Looks up a string value, falling back to `default` when unset.
pub fn var_or<L>(lookup: &L, key: &str, default: &str) -> String
where
    L: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Looks up and parses a value, falling back to `default` when unset.
/// A value that is set but does not parse is an error.
pub fn parse_or<L, T>(lookup: &L, key: &str, default: T) -> Result<T, EnvError>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|why: T::Err| EnvError {
            key: key.to_string(),
            value,
            reason: why.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_values_use_defaults() {
        let env = lookup(&[]);
        assert_eq!(var_or(&env, "MQTT_BROKER", "localhost"), "localhost");
        assert_eq!(parse_or(&env, "MQTT_PORT", 1883u16), Ok(1883));
    }

    #[test]
    fn present_values_are_parsed() {
        let env = lookup(&[("MQTT_PORT", " 1884 "), ("ROUTE_TOLERANCE", "0.5")]);
        assert_eq!(parse_or(&env, "MQTT_PORT", 1883u16), Ok(1884));
        assert_eq!(parse_or(&env, "ROUTE_TOLERANCE", 0.0001f64), Ok(0.5));
    }

    #[test]
    fn unparsable_values_are_errors() {
        let env = lookup(&[("MQTT_PORT", "eighteen")]);
        let error = parse_or(&env, "MQTT_PORT", 1883u16).unwrap_err();
        assert_eq!(error.key, "MQTT_PORT");
        assert_eq!(error.value, "eighteen");
    }
}
