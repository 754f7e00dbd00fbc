use std::env;
use std::path::PathBuf;

/// Runtime configuration, read from the environment with workable
/// defaults for local use
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_file: PathBuf,
    pub mail_api_url: String,
    pub mail_api_token: Option<String>,
    pub mail_from: String,
    pub notify_recipient: String,
    pub timezone: String,
    pub proposal_cron: String,
    pub final_plan_cron: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            data_file: PathBuf::from("data/calendar.json"),
            mail_api_url: "https://api.mailchannels.net/tx/v1/send".to_string(),
            mail_api_token: None,
            mail_from: "rota@localhost".to_string(),
            notify_recipient: "rota@localhost".to_string(),
            timezone: "Europe/London".to_string(),
            proposal_cron: "0 9 * * Sat".to_string(),
            final_plan_cron: "0 12 * * Sun".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            data_file: env::var("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            mail_api_url: env::var("MAIL_API_URL").unwrap_or(defaults.mail_api_url),
            mail_api_token: env::var("MAIL_API_TOKEN").ok(),
            mail_from: env::var("MAIL_FROM").unwrap_or(defaults.mail_from),
            notify_recipient: env::var("NOTIFY_RECIPIENT").unwrap_or(defaults.notify_recipient),
            timezone: env::var("ROTA_TIMEZONE").unwrap_or(defaults.timezone),
            proposal_cron: env::var("PROPOSAL_CRON").unwrap_or(defaults.proposal_cron),
            final_plan_cron: env::var("FINAL_PLAN_CRON").unwrap_or(defaults.final_plan_cron),
        }
    }
}
