//! Process configuration, read once at startup from the environment.
//!
//! | Env Var                    | Required | Default                  |
//! |----------------------------|----------|--------------------------|
//! | `MONGO_DB_URI`             | **yes**  | --                       |
//! | `MONGO_DB_NAME`            | no       | `ai_study_planner`       |
//! | `JWT_SECRET`               | **yes**  | --                       |
//! | `JWT_ISSUER`               | no       | `study-planner`          |
//! | `JWT_AUDIENCE`             | no       | `study-planner-clients`  |
//! | `GRPC_LISTEN_ADDR`         | no       | `0.0.0.0:8000`           |
//! | `PASSWORD_HASH_ITERATIONS` | no       | `100000`                 |
//! | `PASSWORD_MAX_LENGTH`      | no       | `128`                    |
//! | `PLAN_API_BASE_URL`        | no       | `https://api.openai.com` |
//! | `PLAN_API_KEY`             | **yes**  | --                       |
//! | `PLAN_API_MODEL`           | no       | `gpt-4o-mini`            |
//! | `PLAN_API_TIMEOUT_SECS`    | no       | `60`                     |

use anyhow::{bail, Context};
use std::fmt::Display;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongo_uri: String,
    pub mongo_db_name: String,
    pub jwt: JwtSettings,
    pub listen_addr: SocketAddr,
    pub password: PasswordSettings,
    pub plan_api: PlanApiSettings,
}

#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

// Keep the secret out of debug output.
impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PasswordSettings {
    pub hash_iterations: NonZeroU32,
    pub max_length: usize,
}

#[derive(Clone)]
pub struct PlanApiSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for PlanApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanApiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let secret = vars.required("JWT_SECRET")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let hash_iterations: u32 = vars.parsed("PASSWORD_HASH_ITERATIONS", 100_000)?;
        let hash_iterations = NonZeroU32::new(hash_iterations)
            .context("PASSWORD_HASH_ITERATIONS must be greater than zero")?;

        Ok(Self {
            mongo_uri: vars.required("MONGO_DB_URI")?,
            mongo_db_name: vars.optional("MONGO_DB_NAME", "ai_study_planner"),
            jwt: JwtSettings {
                secret,
                issuer: vars.optional("JWT_ISSUER", "study-planner"),
                audience: vars.optional("JWT_AUDIENCE", "study-planner-clients"),
            },
            listen_addr: vars.parsed("GRPC_LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8000)))?,
            password: PasswordSettings {
                hash_iterations,
                max_length: vars.parsed("PASSWORD_MAX_LENGTH", 128)?,
            },
            plan_api: PlanApiSettings {
                base_url: vars
                    .optional("PLAN_API_BASE_URL", "https://api.openai.com")
                    .trim_end_matches('/')
                    .to_string(),
                api_key: vars.required("PLAN_API_KEY")?,
                model: vars.optional("PLAN_API_MODEL", "gpt-4o-mini"),
                timeout_secs: vars.parsed("PLAN_API_TIMEOUT_SECS", 60)?,
            },
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, name: &str) -> anyhow::Result<String> {
        (self.0)(name).with_context(|| format!("{} must be set in the environment", name))
    }

    fn optional(&self, name: &str, default: &str) -> String {
        (self.0)(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match (self.0)(name) {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("{} is invalid ({}): {}", name, raw, e)),
            None => Ok(default),
        }
    }
}
