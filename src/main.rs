mod calendar;
mod config;
mod digest;
mod error;
mod mailer;
mod scheduler;
mod store;
mod web;

use std::sync::Arc;

use config::AppConfig;
use mailer::{HttpMailer, Mailer};
use scheduler::NotificationScheduler;
use store::CalendarStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut config = AppConfig::from_env();

    // Optional port override: `weekly-rota <port>`
    let args: Vec<String> = std::env::args().collect();
    if let Some(port) = args.get(1).and_then(|p| p.parse::<u16>().ok()) {
        config.port = port;
    }

    let store = Arc::new(CalendarStore::open(&config.data_file));
    let mailer: Arc<dyn Mailer> = Arc::new(HttpMailer::new(
        config.mail_api_url.clone(),
        config.mail_api_token.clone(),
        config.mail_from.clone(),
    ));

    let scheduler = NotificationScheduler::new(store.clone(), mailer.clone(), &config)?;
    tokio::spawn(async move { scheduler.run().await });

    log::info!("weekly rota server running on port {}", config.port);
    log::info!("schedule file: {}", store.path().display());
    log::info!(
        "scheduled emails: proposal '{}', final plan '{}' ({})",
        config.proposal_cron,
        config.final_plan_cron,
        config.timezone
    );

    web::start_server(&config, store, mailer).await?;
    Ok(())
}
