//! An in-process stand-in for the portal backend.
//!
//! It serves the notification, user and billing endpoints the client
//! consumes, keeps its data in memory, and records every request so tests
//! can assert on what went over the wire.

pub mod billing;
pub mod notifications;
pub mod store;

use actix_cors::Cors;
use actix_web::dev::{Server, Service};
use actix_web::http::header;
use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer, ResponseError, body::BoxBody,
    web,
};
use payloads::UserClaims;
use std::net::TcpListener;

pub use store::{BackendState, BillingAccount, RecordedRequest};

pub struct Config {
    /// set to "0.0.0.0" for public access, "127.0.0.1" for local dev
    pub ip: String,
    /// set to 0 to get an os-assigned port
    pub port: u16,
    /// List of allowed CORS origins. Use "*" to allow any origin (development only)
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        use std::env::var;

        let allowed_origins = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Config {
            ip: var("IP_ADDRESS").unwrap_or_else(|_| "127.0.0.1".into()),
            port: var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(0),
            allowed_origins,
        }
    }
}

/// Build the server, but not await it.
///
/// Returns the port that the server has bound to by modifying the config.
pub fn build(
    config: &mut Config,
    state: web::Data<BackendState>,
) -> std::io::Result<Server> {
    let allowed_origins = config.allowed_origins.clone();

    // OS assigns the port if binding to 0
    let listener = TcpListener::bind(format!("{}:{}", config.ip, config.port))?;
    config.port = listener.local_addr()?.port();
    let server = HttpServer::new(move || {
        let cors = if allowed_origins.contains(&"*".to_string()) {
            Cors::permissive()
        } else {
            let mut cors = Cors::default()
                .allow_any_method()
                .allow_any_header();
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            cors
        };

        let recorder = state.clone();
        App::new()
            .wrap_fn(move |req, srv| {
                recorder.record(
                    req.method().as_str(),
                    req.path(),
                    req.headers().contains_key(header::AUTHORIZATION),
                );
                srv.call(req)
            })
            .wrap(cors)
            .app_data(state.clone())
            .service(notifications::list_notifications)
            .service(notifications::list_employee_notifications)
            .service(notifications::mark_read)
            .service(billing::current_user)
            .service(billing::quotas)
            .service(billing::create_subscription)
            .service(billing::update_subscription)
            .service(billing::cancel_subscription)
            .service(billing::billing_portal)
    })
    .listen(listener)?
    .run();
    Ok(server)
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Authentication failed")]
    Unauthorized,
    #[error("Not allowed for this role")]
    Forbidden,
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
    /// A failure a test asked for.
    #[error("Something went wrong")]
    Injected,
}

impl ResponseError for BackendError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        match self {
            Self::Unauthorized => {
                HttpResponse::Unauthorized().body(self.to_string())
            }
            Self::Forbidden => HttpResponse::Forbidden().body(self.to_string()),
            Self::BadRequest(_) => {
                HttpResponse::BadRequest().body(self.to_string())
            }
            Self::NotFound => HttpResponse::NotFound().body(self.to_string()),
            Self::Injected => {
                HttpResponse::InternalServerError().body(self.to_string())
            }
        }
    }
}

/// Resolve the bearer token of a request to the user it was issued for.
fn authenticate(
    req: &HttpRequest,
    state: &BackendState,
) -> Result<UserClaims, BackendError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(BackendError::Unauthorized)?;
    let user = state
        .lock()
        .sessions
        .get(token)
        .cloned()
        .ok_or(BackendError::Unauthorized)?;
    tracing::Span::current()
        .record("user_id", tracing::field::display(&user.id));
    Ok(user)
}
