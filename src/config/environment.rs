use serde::{Deserialize, Serialize};
use std::fmt;

/// Hosting platform the process runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Railway,
    Docker,
    Local,
}

impl Platform {
    pub fn detect(env: &dyn Fn(&str) -> Option<String>, dockerenv_present: bool) -> Self {
        let railway_domain = env("RAILWAY_PRIVATE_DOMAIN")
            .map(|d| d.contains("railway.internal"))
            .unwrap_or(false);

        if env("RAILWAY_ENVIRONMENT").is_some()
            || env("RAILWAY_PROJECT_ID").is_some()
            || railway_domain
        {
            return Platform::Railway;
        }

        if dockerenv_present || env("DOCKER_CONTAINER").is_some() {
            return Platform::Docker;
        }

        Platform::Local
    }

    pub fn from_system(env: &dyn Fn(&str) -> Option<String>) -> Self {
        Self::detect(env, std::path::Path::new("/.dockerenv").exists())
    }

    pub fn is_hosted(&self) -> bool {
        !matches!(self, Platform::Local)
    }

    /// 託管平台需綁定所有介面，本機只開放 loopback
    pub fn default_host(&self) -> &'static str {
        if self.is_hosted() {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Railway => "railway",
            Platform::Docker => "docker",
            Platform::Local => "local",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Production,
    Development,
}

impl RunMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Some(RunMode::Production),
            "development" | "dev" | "local" | "test" => Some(RunMode::Development),
            _ => None,
        }
    }

    /// `APP_ENV` wins over `FLASK_ENV`; unknown values are ignored.
    pub fn from_env(env: &dyn Fn(&str) -> Option<String>) -> Option<Self> {
        ["APP_ENV", "FLASK_ENV"]
            .into_iter()
            .filter_map(|key| env(key))
            .find_map(|value| RunMode::parse(&value))
    }

    pub fn json_logs(&self) -> bool {
        matches!(self, RunMode::Production)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Production => f.write_str("production"),
            RunMode::Development => f.write_str("development"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_detect_railway() {
        let env = env_of(&[("RAILWAY_ENVIRONMENT", "production")]);
        assert_eq!(Platform::detect(&env, false), Platform::Railway);

        let env = env_of(&[("RAILWAY_PRIVATE_DOMAIN", "api.railway.internal")]);
        assert_eq!(Platform::detect(&env, false), Platform::Railway);
        assert_eq!(Platform::Railway.default_host(), "0.0.0.0");
    }

    #[test]
    fn test_detect_docker_and_local() {
        let env = env_of(&[]);
        assert_eq!(Platform::detect(&env, true), Platform::Docker);
        assert_eq!(Platform::detect(&env, false), Platform::Local);
        assert_eq!(Platform::Local.default_host(), "127.0.0.1");
    }

    #[test]
    fn test_run_mode_precedence() {
        let env = env_of(&[("APP_ENV", "development"), ("FLASK_ENV", "production")]);
        assert_eq!(RunMode::from_env(&env), Some(RunMode::Development));

        let env = env_of(&[("FLASK_ENV", "production")]);
        assert_eq!(RunMode::from_env(&env), Some(RunMode::Production));

        let env = env_of(&[("APP_ENV", "staging"), ("FLASK_ENV", "prod")]);
        assert_eq!(RunMode::from_env(&env), Some(RunMode::Production));

        assert_eq!(RunMode::from_env(&env_of(&[])), None);
    }
}
