use std::env;

/// Deployment environment. Drives the inference-endpoint default and the
/// model catalog: development runs a single small local model, production
/// runs the multi-instance pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(&env::var("APP_ENV").unwrap_or_default())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// Comma-separated Ollama base URLs, e.g. "http://10.0.0.1:11434,http://10.0.0.2:11434".
    pub ollama_endpoints: String,
    pub environment: Environment,
    pub cors_origin: String,
    pub prompt_config_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL is required"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET is required"),
            ollama_endpoints: env::var("OLLAMA_ENDPOINTS").unwrap_or_default(),
            environment: Environment::from_env(),
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".into()),
            prompt_config_path: env::var("PROMPT_CONFIG_PATH")
                .unwrap_or_else(|_| "config/prompts.json".into()),
        }
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origin
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
