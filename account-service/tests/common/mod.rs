use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::account::errors::AccountError;
use account_service::domain::account::models::Account;
use account_service::domain::account::models::AccountId;
use account_service::domain::account::models::Username;
use account_service::domain::account::models::VerificationToken;
use account_service::domain::account::ports::AccountServicePort;
use account_service::domain::account::ports::CredentialStore;
use account_service::domain::account::ports::VerificationTokenStore;
use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::notifier::run_verification_worker;
use account_service::outbound::notifier::ChannelNotifier;
use account_service::outbound::notifier::VerificationMailer;
use async_trait::async_trait;
use auth::Authenticator;
use axum::body::Body;
use axum::http::header;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use chrono::Duration;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &[u8] = b"integration-test-secret-key-material";
pub const PUBLIC_URL: &str = "http://localhost:8080";

/// Store kept in process memory, honoring the same uniqueness and versioning
/// rules as the real one.
pub struct InMemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
    tokens: Mutex<HashMap<Uuid, VerificationToken>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn account_id_of(&self, username: &str) -> Option<Uuid> {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|account| account.username.as_str() == username)
            .map(|account| account.id.0)
    }

    pub fn is_enabled(&self, username: &str) -> bool {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|account| account.username.as_str() == username)
            .map(|account| account.enabled)
            .unwrap_or(false)
    }

    pub fn set_locked(&self, username: &str) {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .values_mut()
            .find(|account| account.username.as_str() == username)
            .expect("no such account");
        account.locked = true;
    }

    pub fn token_value_for(&self, account_id: Uuid) -> Option<Uuid> {
        self.tokens
            .lock()
            .unwrap()
            .get(&account_id)
            .map(|token| token.value)
    }

    pub fn expire_token_for(&self, account_id: Uuid) {
        let mut tokens = self.tokens.lock().unwrap();
        let token = tokens.get_mut(&account_id).expect("no token to expire");
        token.expires_at = Utc::now() - Duration::hours(1);
    }
}

#[async_trait]
impl CredentialStore for InMemoryAccountStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|account| account.username == *username)
            .cloned())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.lock().unwrap().get(&id.0).cloned())
    }

    async fn save(&self, mut account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts
            .values()
            .any(|other| other.id != account.id && other.username == account.username)
        {
            return Err(AccountError::UserExists(account.username.to_string()));
        }
        if let Some(existing) = accounts.get(&account.id.0) {
            if existing.version != account.version {
                return Err(AccountError::Conflict(account.id.to_string()));
            }
        }
        account.version += 1;
        accounts.insert(account.id.0, account.clone());
        Ok(account)
    }

    async fn enable(&self, mut account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        let mut tokens = self.tokens.lock().unwrap();
        if let Some(existing) = accounts.get(&account.id.0) {
            if existing.version != account.version {
                return Err(AccountError::Conflict(account.id.to_string()));
            }
        }
        account.enabled = true;
        account.version += 1;
        accounts.insert(account.id.0, account.clone());
        tokens.remove(&account.id.0);
        Ok(account)
    }
}

#[async_trait]
impl VerificationTokenStore for InMemoryAccountStore {
    async fn find_by_value(
        &self,
        value: Uuid,
    ) -> Result<Option<VerificationToken>, AccountError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .values()
            .find(|token| token.value == value)
            .cloned())
    }

    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<VerificationToken>, AccountError> {
        Ok(self.tokens.lock().unwrap().get(&account_id.0).cloned())
    }

    async fn upsert(
        &self,
        token: VerificationToken,
    ) -> Result<VerificationToken, AccountError> {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.account_id.0, token.clone());
        Ok(token)
    }

    async fn delete_for_account(&self, account_id: &AccountId) -> Result<(), AccountError> {
        self.tokens.lock().unwrap().remove(&account_id.0);
        Ok(())
    }
}

#[derive(Debug)]
pub struct SentMail {
    pub to: String,
    pub username: String,
    pub link: String,
}

impl SentMail {
    pub fn token_value(&self) -> Uuid {
        let raw = self
            .link
            .split("token=")
            .nth(1)
            .expect("link carries no token");
        Uuid::parse_str(raw).expect("token value is not a UUID")
    }
}

struct RecordingMailer {
    sender: mpsc::UnboundedSender<SentMail>,
}

#[async_trait]
impl VerificationMailer for RecordingMailer {
    async fn send_verification(
        &self,
        to: &str,
        username: &str,
        link: &str,
    ) -> Result<(), anyhow::Error> {
        let _ = self.sender.send(SentMail {
            to: to.to_string(),
            username: username.to_string(),
            link: link.to_string(),
        });
        Ok(())
    }
}

/// A fully wired application over in-memory infrastructure, with the
/// verification worker running and its outgoing mail captured.
pub struct TestApp {
    router: Router,
    pub store: Arc<InMemoryAccountStore>,
    mails: tokio::sync::Mutex<mpsc::UnboundedReceiver<SentMail>>,
}

pub fn spawn_app() -> TestApp {
    let store = Arc::new(InMemoryAccountStore::new());
    let authenticator = Arc::new(Authenticator::new(JWT_SECRET));
    let (notifier, receiver) = ChannelNotifier::new();

    let account_service: Arc<dyn AccountServicePort> = Arc::new(AccountService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(notifier),
        Arc::clone(&authenticator),
        Duration::days(1),
        Duration::days(10),
    ));

    let (mail_sender, mail_receiver) = mpsc::unbounded_channel();
    let mailer: Arc<dyn VerificationMailer> = Arc::new(RecordingMailer {
        sender: mail_sender,
    });
    tokio::spawn(run_verification_worker(
        receiver,
        Arc::clone(&account_service),
        mailer,
    ));

    let router = create_router(account_service, authenticator, PUBLIC_URL.to_string());

    TestApp {
        router,
        store,
        mails: tokio::sync::Mutex::new(mail_receiver),
    }
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(path, &body.to_string()).await
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, path_and_query: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(path_and_query)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn get_with_bearer(&self, path: &str, token: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Wait for the next captured verification mail.
    pub async fn next_mail(&self) -> SentMail {
        let mut receiver = self.mails.lock().await;
        tokio::time::timeout(std::time::Duration::from_secs(5), receiver.recv())
            .await
            .expect("timed out waiting for a verification mail")
            .expect("mail channel closed")
    }
}

pub fn sign_up_body(username: &str) -> Value {
    serde_json::json!({
        "username": username,
        "password": "Abcd1234",
        "email": format!("{username}@example.com"),
        "firstName": "Alice",
        "lastName": "Smith",
        "birthDate": "1990-01-01",
        "gender": "FEMALE"
    })
}

pub fn sign_in_body(username: &str, password: &str) -> Value {
    serde_json::json!({ "username": username, "password": password })
}

/// Register an account and redeem its verification token.
pub async fn register_and_verify(app: &TestApp, username: &str) {
    let (status, _) = app.post_json("/sign_up", sign_up_body(username)).await;
    assert_eq!(status, StatusCode::CREATED);

    let mail = app.next_mail().await;
    let (status, _) = app
        .get(&format!("/email_verification?token={}", mail.token_value()))
        .await;
    assert_eq!(status, StatusCode::OK);
}
