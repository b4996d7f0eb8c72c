use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub id_token_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let id_token_expiration = env::var("ID_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "24h".into())
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            id_token_expiration_secs: id_token_expiration * 3600,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            production: env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
        })
    }

    pub fn id_token_expiration(&self) -> Duration {
        Duration::from_secs(self.id_token_expiration_secs)
    }
}
