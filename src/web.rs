use std::sync::Arc;

use actix_files::Files;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::Deserialize;

use crate::calendar::ScheduleState;
use crate::config::AppConfig;
use crate::mailer::{EmailMessage, Mailer};
use crate::store::CalendarStore;

/// Shared server state: the store, the mail collaborator and the
/// fallback recipient for ad-hoc sends
pub struct AppState {
    pub store: Arc<CalendarStore>,
    pub mailer: Arc<dyn Mailer>,
    pub default_recipient: String,
}

#[derive(Deserialize)]
pub struct SendEmailRequest {
    to: Option<String>,
    subject: String,
    html: String,
    text: Option<String>,
}

// Full-state fetch; an empty store reads as the canonical empty document
async fn get_calendar(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.store.snapshot()))
}

// Whole-document replace: no merging, the submitted state wins in full.
// The success flag reports the durable write, with 200 either way.
async fn save_calendar(
    body: web::Json<ScheduleState>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let saved = state.store.replace(body.into_inner());
    if saved {
        log::info!("calendar data saved");
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": saved })))
}

// One ad-hoc email through the mail collaborator
async fn send_email(
    req: web::Json<SendEmailRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let message = EmailMessage {
        to: req.to.unwrap_or_else(|| state.default_recipient.clone()),
        subject: req.subject,
        html: req.html,
        text: req.text,
    };

    match state.mailer.send(&message).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Email sent successfully"
        }))),
        Err(e) => {
            log::error!("ad-hoc email to {} failed: {}", message.to, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e.to_string()
            })))
        }
    }
}

async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/calendar", web::get().to(get_calendar))
        .route("/api/calendar", web::post().to(save_calendar))
        .route("/api/send-email", web::post().to(send_email))
        .route("/api/health", web::get().to(health));
}

/// Rejects a malformed state/email body with a JSON error and leaves the
/// store untouched (the extractor fails before any handler runs)
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": message
            })),
        )
        .into()
    })
}

pub async fn start_server(
    config: &AppConfig,
    store: Arc<CalendarStore>,
    mailer: Arc<dyn Mailer>,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        store,
        mailer,
        default_recipient: config.notify_recipient.clone(),
    });
    let port = config.port;

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(json_config())
            .wrap(middleware::Logger::default())
            .configure(api_routes)
            .service(Files::new("/", "public").index_file("index.html"))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::week::week_key;
    use crate::calendar::{Day, TimeBand, WeekGrid, DAYS, TIME_BANDS};
    use crate::mailer::test_support::RecordingMailer;
    use actix_web::{body::MessageBody, dev::ServiceResponse, test};
    use tempfile::TempDir;

    fn app_state(dir: &TempDir, mailer: Arc<RecordingMailer>) -> web::Data<AppState> {
        web::Data::new(AppState {
            store: Arc::new(CalendarStore::open(dir.path().join("calendar.json"))),
            mailer,
            default_recipient: "home@example.com".to_string(),
        })
    }

    async fn json_body(res: ServiceResponse<impl MessageBody>) -> serde_json::Value {
        let bytes = test::read_body(res).await;
        serde_json::from_slice(&bytes).unwrap()
    }

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .app_data(json_config())
                    .configure(api_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn fresh_store_returns_the_empty_document() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir, Arc::default());
        let app = init_app!(state);

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/calendar").to_request())
                .await;
        assert!(res.status().is_success());
        let body = json_body(res).await;
        assert_eq!(body["currentWeekIndex"], 0);
        assert_eq!(body["weeks"], serde_json::json!({}));
        assert_eq!(body["customPeople"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn saved_state_round_trips_through_the_api() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir, Arc::default());
        let app = init_app!(state);

        let mut grid = WeekGrid::empty();
        grid.append(Day::Wed, TimeBand::Afternoon, "Lisa");
        let mut submitted = ScheduleState::default();
        submitted.current_week_index = 2;
        submitted.weeks.insert(week_key(2), grid);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/calendar")
                .set_json(&submitted)
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());
        assert_eq!(json_body(res).await["success"], true);

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/calendar").to_request())
                .await;
        let fetched: ScheduleState = serde_json::from_value(json_body(res).await).unwrap();
        assert_eq!(fetched, submitted);

        let week = fetched.week_or_empty(&week_key(2));
        assert_eq!(week.get(Day::Wed, TimeBand::Afternoon), ["Lisa"]);
        for day in DAYS {
            for band in TIME_BANDS {
                if day != Day::Wed || band != TimeBand::Afternoon {
                    assert!(week.get(day, band).is_empty());
                }
            }
        }
    }

    #[actix_web::test]
    async fn malformed_body_leaves_prior_state_untouched() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir, Arc::default());
        let app = init_app!(state);

        let mut submitted = ScheduleState::default();
        submitted.custom_people.push("Auntie Jo".to_string());
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/calendar")
                .set_json(&submitted)
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/calendar")
                .insert_header(("content-type", "application/json"))
                .set_payload("this is not json")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), 400);
        assert_eq!(json_body(res).await["success"], false);

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/calendar").to_request())
                .await;
        let fetched: ScheduleState = serde_json::from_value(json_body(res).await).unwrap();
        assert_eq!(fetched, submitted);
    }

    #[actix_web::test]
    async fn unrecognized_day_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir, Arc::default());
        let app = init_app!(state);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/calendar")
                .insert_header(("content-type", "application/json"))
                .set_payload(r#"{"weeks":{"week_2025-01-13":{"Funday":{"morning":[]}}}}"#)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), 400);
    }

    #[actix_web::test]
    async fn ad_hoc_email_uses_the_default_recipient() {
        let dir = TempDir::new().unwrap();
        let mailer = Arc::new(RecordingMailer::default());
        let state = app_state(&dir, mailer.clone());
        let app = init_app!(state);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/send-email")
                .set_json(serde_json::json!({
                    "subject": "This week's rota",
                    "html": "<p>rota</p>"
                }))
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());
        assert_eq!(json_body(res).await["success"], true);

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "home@example.com");
        assert_eq!(sent[0].subject, "This week's rota");
    }

    #[actix_web::test]
    async fn failed_email_dispatch_returns_500() {
        let dir = TempDir::new().unwrap();
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let state = app_state(&dir, mailer);
        let app = init_app!(state);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/send-email")
                .set_json(serde_json::json!({
                    "to": "someone@example.com",
                    "subject": "This week's rota",
                    "html": "<p>rota</p>"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), 500);
        let body = json_body(res).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("provider down"));
    }

    #[actix_web::test]
    async fn health_reports_ok_with_timestamp() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir, Arc::default());
        let app = init_app!(state);

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request())
                .await;
        assert!(res.status().is_success());
        let body = json_body(res).await;
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].as_str().is_some());
    }
}
