use anyhow::{Context, Result};
use clap::Parser;
use std::{env, path::PathBuf};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub repository_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub images_dir: PathBuf,
    pub public_url: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Tenant-scoped launch resource server")]
pub struct Args {
    /// Host to bind to (overrides LAUNCH_RESOURCES_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides LAUNCH_RESOURCES_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Root of the tenant repository (overrides LAUNCH_RESOURCES_REPOSITORY_DIR)
    #[arg(long)]
    pub repository_dir: Option<PathBuf>,

    /// Directory holding launch jars (overrides LAUNCH_RESOURCES_ARTIFACTS_DIR)
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Directory holding launcher images (overrides LAUNCH_RESOURCES_IMAGES_DIR)
    #[arg(long)]
    pub images_dir: Option<PathBuf>,

    /// Externally visible base URL written into conf.xml (overrides LAUNCH_RESOURCES_PUBLIC_URL)
    #[arg(long)]
    pub public_url: Option<String>,
}

const DEFAULT_PORT: u16 = 3000;

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();
        Self::merge(args, |key| env::var(key))
    }

    /// Merge parsed CLI args over values read through `lookup`, falling back
    /// to defaults for anything unset.
    pub fn merge<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let var = |key: &str, default: &str| -> Result<String> {
            match lookup(key) {
                Ok(value) => Ok(value),
                Err(env::VarError::NotPresent) => Ok(default.to_string()),
                Err(err) => Err(err).with_context(|| format!("reading {}", key)),
            }
        };

        let env_port = match lookup("LAUNCH_RESOURCES_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing LAUNCH_RESOURCES_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => DEFAULT_PORT,
            Err(err) => return Err(err).context("reading LAUNCH_RESOURCES_PORT"),
        };

        let host = match args.host {
            Some(host) => host,
            None => var("LAUNCH_RESOURCES_HOST", "0.0.0.0")?,
        };
        let repository_dir = match args.repository_dir {
            Some(dir) => dir,
            None => var("LAUNCH_RESOURCES_REPOSITORY_DIR", "./data/repository")?.into(),
        };
        let artifacts_dir = match args.artifacts_dir {
            Some(dir) => dir,
            None => var("LAUNCH_RESOURCES_ARTIFACTS_DIR", "./data/artifacts")?.into(),
        };
        let images_dir = match args.images_dir {
            Some(dir) => dir,
            None => var("LAUNCH_RESOURCES_IMAGES_DIR", "./resources")?.into(),
        };
        let public_url = match args.public_url {
            Some(url) => url,
            None => var("LAUNCH_RESOURCES_PUBLIC_URL", "http://localhost:3000")?,
        };

        Ok(Self {
            host,
            port: args.port.unwrap_or(env_port),
            repository_dir,
            artifacts_dir,
            images_dir,
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(
        vars: HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Result<String, env::VarError> {
        move |key: &str| {
            vars.get(key)
                .map(|v| v.to_string())
                .ok_or(env::VarError::NotPresent)
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = AppConfig::merge(Args::default(), lookup_from(HashMap::new())).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
        assert_eq!(cfg.repository_dir, PathBuf::from("./data/repository"));
        assert_eq!(cfg.artifacts_dir, PathBuf::from("./data/artifacts"));
        assert_eq!(cfg.images_dir, PathBuf::from("./resources"));
        assert_eq!(cfg.public_url, "http://localhost:3000");
    }

    #[test]
    fn cli_args_override_environment() {
        let vars = HashMap::from([
            ("LAUNCH_RESOURCES_HOST", "10.0.0.1"),
            ("LAUNCH_RESOURCES_PORT", "8081"),
            ("LAUNCH_RESOURCES_PUBLIC_URL", "https://dc.example.com/"),
        ]);
        let args = Args {
            port: Some(9000),
            ..Args::default()
        };

        let cfg = AppConfig::merge(args, lookup_from(vars)).unwrap();
        assert_eq!(cfg.host, "10.0.0.1");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.public_url, "https://dc.example.com");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let vars = HashMap::from([("LAUNCH_RESOURCES_PORT", "eighty")]);
        let err = AppConfig::merge(Args::default(), lookup_from(vars)).unwrap_err();
        assert!(err.to_string().contains("LAUNCH_RESOURCES_PORT"));
    }
}
