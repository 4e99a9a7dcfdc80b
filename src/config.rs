use std::{path::Path, str::FromStr, time::Duration};

use crate::{error::ConfigError, policy::PolicyTable};

#[derive(Debug, Clone)]
pub struct Config {
    pub canvas_base_url: String,
    pub canvas_token: String,
    pub port: u16,
    pub lms_timeout: Duration,
    pub root_account_id: String,
    pub policy: PolicyTable,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let canvas_base_url = required("CANVAS_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let canvas_token = required("CANVAS_API_TOKEN")?;
        let port = parsed(&lookup, "PORT")?.unwrap_or(8082);
        let timeout_secs: u64 = parsed(&lookup, "LMS_TIMEOUT_SECS")?.unwrap_or(30);
        let root_account_id = lookup("CANVAS_ROOT_ACCOUNT_ID").unwrap_or_else(|| "1".into());

        let mut policy = match lookup("POLICY_FILE") {
            Some(path) => PolicyTable::from_json_file(Path::new(&path))?,
            None => PolicyTable::builtin(),
        };
        if let Some(term) = parsed(&lookup, "DEFAULT_TERM_ID")? {
            policy.defaults.default_term_id = term;
        }
        if let Some(flag) = lookup("FEATURE_FLAG").filter(|v| !v.is_empty()) {
            policy.feature_flag = flag;
        }

        Ok(Self {
            canvas_base_url,
            canvas_token,
            port,
            lms_timeout: Duration::from_secs(timeout_secs),
            root_account_id,
            policy,
        })
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let cfg = Config::from_lookup(env(&[
            ("CANVAS_BASE_URL", "https://byui.instructure.com/"),
            ("CANVAS_API_TOKEN", "secret"),
        ]))
        .unwrap();
        assert_eq!(cfg.canvas_base_url, "https://byui.instructure.com");
        assert_eq!(cfg.port, 8082);
        assert_eq!(cfg.lms_timeout, Duration::from_secs(30));
        assert_eq!(cfg.root_account_id, "1");
        assert_eq!(cfg.policy, PolicyTable::builtin());
    }

    #[test]
    fn missing_token_is_reported_by_name() {
        let err = Config::from_lookup(env(&[("CANVAS_BASE_URL", "https://x")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CANVAS_API_TOKEN")));
    }

    #[test]
    fn term_and_flag_overrides_reach_the_policy() {
        let cfg = Config::from_lookup(env(&[
            ("CANVAS_BASE_URL", "https://x"),
            ("CANVAS_API_TOKEN", "t"),
            ("DEFAULT_TERM_ID", "12"),
            ("FEATURE_FLAG", "new_sis_integrations"),
        ]))
        .unwrap();
        assert_eq!(cfg.policy.defaults.default_term_id, 12);
        assert_eq!(cfg.policy.feature_flag, "new_sis_integrations");
    }

    #[test]
    fn unparsable_port_is_rejected() {
        let err = Config::from_lookup(env(&[
            ("CANVAS_BASE_URL", "https://x"),
            ("CANVAS_API_TOKEN", "t"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn missing_policy_file_is_a_read_error() {
        let err = Config::from_lookup(env(&[
            ("CANVAS_BASE_URL", "https://x"),
            ("CANVAS_API_TOKEN", "t"),
            ("POLICY_FILE", "/nonexistent/policy.json"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::PolicyRead { .. }));
    }
}
