//! Environment and config directory resolution.
//!
//! Precedence per field: `--env`/`--config` flag, then the `ENV` /
//! `CONFIG_PATH` environment variable, then the caller's default. Empty values
//! count as absent. Unknown environment names are accepted as-is.

use std::path::PathBuf;

use clap::Args;

/// Environment variable consulted for the environment name.
pub const ENV_VAR: &str = "ENV";

/// Environment variable consulted for the config directory.
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";

/// Command-line flags that select the environment and config directory.
#[derive(Debug, Clone, Default, Args)]
pub struct EnvArgs {
    /// Environment to run the service in (e.g. development, production)
    #[arg(long = "env", value_name = "NAME")]
    pub env: Option<String>,

    /// Directory holding base.toml and the per-environment overlays
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Result of resolution. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    pub environment: String,
    pub config_dir: PathBuf,
}

impl ResolvedEnvironment {
    /// Resolve against the real process environment.
    pub fn resolve(args: &EnvArgs, default_config_dir: &str, default_env: &str) -> Self {
        Self::resolve_with(args, |key| std::env::var(key).ok(), default_config_dir, default_env)
    }

    /// Resolve with an injectable variable lookup.
    pub fn resolve_with<F>(
        args: &EnvArgs,
        lookup: F,
        default_config_dir: &str,
        default_env: &str,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_dir = args
            .config
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| non_empty(lookup(CONFIG_PATH_VAR)).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(default_config_dir));

        let environment = non_empty(args.env.clone())
            .or_else(|| non_empty(lookup(ENV_VAR)))
            .unwrap_or_else(|| default_env.to_string());

        Self {
            environment,
            config_dir,
        }
    }

    /// True for the `production` environment, compared case-insensitively.
    pub fn is_production(&self) -> bool {
        is_production(&self.environment)
    }
}

/// Case-insensitive check for the production environment name.
pub fn is_production(environment: &str) -> bool {
    environment.eq_ignore_ascii_case("production")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn flag_beats_env_var() {
        let args = EnvArgs {
            env: Some("staging".into()),
            config: Some("/flag/config".into()),
        };
        let resolved = ResolvedEnvironment::resolve_with(
            &args,
            vars(&[(ENV_VAR, "production"), (CONFIG_PATH_VAR, "/env/config")]),
            "config",
            "development",
        );
        assert_eq!(resolved.environment, "staging");
        assert_eq!(resolved.config_dir, PathBuf::from("/flag/config"));
    }

    #[test]
    fn env_var_beats_default() {
        let resolved = ResolvedEnvironment::resolve_with(
            &EnvArgs::default(),
            vars(&[(ENV_VAR, "production"), (CONFIG_PATH_VAR, "/env/config")]),
            "config",
            "development",
        );
        assert_eq!(resolved.environment, "production");
        assert_eq!(resolved.config_dir, PathBuf::from("/env/config"));
        assert!(resolved.is_production());
    }

    #[test]
    fn defaults_apply_when_nothing_set() {
        let resolved =
            ResolvedEnvironment::resolve_with(&EnvArgs::default(), vars(&[]), "config", "development");
        assert_eq!(resolved.environment, "development");
        assert_eq!(resolved.config_dir, PathBuf::from("config"));
    }

    #[test]
    fn empty_values_count_as_absent() {
        let args = EnvArgs {
            env: Some(String::new()),
            config: Some(PathBuf::new()),
        };
        let resolved = ResolvedEnvironment::resolve_with(
            &args,
            vars(&[(ENV_VAR, ""), (CONFIG_PATH_VAR, "/env/config")]),
            "config",
            "development",
        );
        assert_eq!(resolved.environment, "development");
        assert_eq!(resolved.config_dir, PathBuf::from("/env/config"));
    }

    #[test]
    fn unknown_environment_is_accepted() {
        let args = EnvArgs {
            env: Some("qa-7".into()),
            config: None,
        };
        let resolved = ResolvedEnvironment::resolve_with(&args, vars(&[]), "config", "development");
        assert_eq!(resolved.environment, "qa-7");
        assert!(!resolved.is_production());
    }

    #[test]
    fn production_match_is_case_insensitive() {
        assert!(is_production("PRODUCTION"));
        assert!(!is_production("prod"));
    }
}
