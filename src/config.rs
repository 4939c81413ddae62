use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub smtp: SmtpConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let smtp = SmtpConfig {
            host: std::env::var("SMTP_HOST")?,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(587),
            username: std::env::var("SMTP_USER").ok(),
            password: std::env::var("SMTP_PASS").ok(),
            from: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| "no-reply@otpgate.local".into()),
        };
        Ok(Self { database_url, smtp })
    }
}
