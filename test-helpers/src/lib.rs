pub mod backend;
pub mod mock;
pub mod telemetry;

use actix_web::web;
use backend::{BackendState, BillingAccount, Config, RecordedRequest};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jiff::Timestamp;
use payloads::{
    APIClient, Notification, NotificationId, Permission, RoleId,
    SubscriptionStatus, UserClaims, responses::UsageCounter,
};
use reqwest::StatusCode;
use tracing_log::LogTracer;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

pub struct TestBackend {
    #[allow(unused)]
    pub port: u16,
    pub client: APIClient,
    pub state: web::Data<BackendState>,
}

impl TestBackend {
    /// Issue a token for `claims`, accepted by the backend until revoked.
    pub fn issue_token(&self, claims: &UserClaims) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(claims).expect("claims serialize to json"),
        );
        let signature = URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes());
        let token = format!("{header}.{payload}.{signature}");
        self.state
            .lock()
            .sessions
            .insert(token.clone(), claims.clone());
        token
    }

    /// Issue a token and make the test client send it.
    pub fn sign_in(&mut self, claims: &UserClaims) -> String {
        let token = self.issue_token(claims);
        self.client.token = Some(token.clone());
        token
    }

    pub fn revoke(&self, token: &str) {
        self.state.lock().sessions.remove(token);
    }

    pub fn set_hr_notifications(&self, notifications: Vec<Notification>) {
        self.state.lock().hr_notifications = notifications;
    }

    pub fn set_employee_notifications(
        &self,
        employee_id: &str,
        notifications: Vec<Notification>,
    ) {
        self.state
            .lock()
            .employee_notifications
            .insert(employee_id.to_string(), notifications);
    }

    /// Answer the HR feed with a bare array rather than a wrapped object.
    pub fn serve_bare_hr_list(&self, bare: bool) {
        self.state.lock().bare_hr_list = bare;
    }

    /// Make every mark-as-read request for `id` fail with a 500.
    pub fn fail_reads_of(&self, id: &str) {
        self.state.lock().failing_reads.insert(id.into());
    }

    /// A notification as currently stored by the backend.
    pub fn notification(&self, id: &str) -> Option<Notification> {
        let id = NotificationId::from(id);
        self.state
            .lock()
            .all_notifications_mut()
            .find(|n| n.id == id)
            .map(|n| n.clone())
    }

    pub fn set_account(&self, user_id: &str, account: BillingAccount) {
        self.state
            .lock()
            .accounts
            .insert(user_id.to_string(), account);
    }

    pub fn set_subscription_status(
        &self,
        user_id: &str,
        status: Option<SubscriptionStatus>,
    ) {
        self.state
            .lock()
            .accounts
            .entry(user_id.to_string())
            .or_default()
            .status = status;
    }

    pub fn account(&self, user_id: &str) -> Option<BillingAccount> {
        self.state.lock().accounts.get(user_id).cloned()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Recorded requests as "METHOD /path" lines.
    pub fn request_lines(&self) -> Vec<String> {
        self.requests().iter().map(RecordedRequest::line).collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }
}

/// Start the fake backend described by `config` on the current runtime.
pub fn start_backend(mut config: Config) -> std::io::Result<TestBackend> {
    let state = web::Data::new(BackendState::default());
    let server = backend::build(&mut config, state.clone())?;
    tokio::spawn(server);

    Ok(TestBackend {
        port: config.port,
        client: APIClient::new(format!("http://127.0.0.1:{}", config.port)),
        state,
    })
}

/// Launch the fake backend on `port` (0 for an os-assigned one).
pub async fn spawn_backend_on_port(port: u16) -> TestBackend {
    let subscriber = telemetry::get_subscriber("error".into());
    let _ = LogTracer::init();
    let _ = subscriber.try_init();

    start_backend(Config {
        ip: "127.0.0.1".into(),
        port,
        allowed_origins: vec!["*".to_string()],
    })
    .unwrap()
}

/// Launch the fake backend on a random port.
pub async fn spawn_backend() -> TestBackend {
    spawn_backend_on_port(0).await
}

pub fn claims(id: &str, role: RoleId) -> UserClaims {
    UserClaims {
        id: id.to_string(),
        role_id: role,
        first_name: "Test".into(),
        last_name: format!("User {id}"),
        email: Some(format!("{id}@example.test")),
        read_permissions: vec![Permission {
            name: "notifications".into(),
            allowed: true,
        }],
        write_permissions: vec![],
        exp: None,
    }
}

pub fn hr_claims() -> UserClaims {
    claims("hr-1", RoleId::HR)
}

pub fn employee_claims(id: &str) -> UserClaims {
    claims(id, RoleId::EMPLOYEE)
}

pub fn notification(id: &str, message: &str, read: bool) -> Notification {
    Notification {
        id: id.into(),
        message: message.to_string(),
        title: None,
        read,
        created_at: Timestamp::from_second(1_735_722_000).unwrap(),
    }
}

pub fn counter(name: &str, used: i64, limit: Option<i64>) -> UsageCounter {
    UsageCounter {
        name: name.to_string(),
        used: used.into(),
        limit: limit.map(Into::into),
    }
}

/// Assert that the result of an API action results in a specific status code.
pub fn assert_status_code<T>(
    result: Result<T, payloads::ClientError>,
    expected: StatusCode,
) {
    match result {
        Err(payloads::ClientError::APIError(code, _)) => {
            assert_eq!(code, expected)
        }
        _ => panic!("Expected APIError"),
    };
}
