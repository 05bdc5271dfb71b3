use super::app::AppData;
use super::fingerprint::{DeviceFingerprint, Environment};
use super::user::UserData;
use crate::errors::KeyAuthError;
#[cfg(not(windows))]
use colorful::{Color, Colorful};
use serde_json::Value;

/// The KeyAuth API endpoint used unless `ClientOptions::endpoint` says otherwise.
pub const DEFAULT_ENDPOINT: &str = "https://keyauth.win/api/1.3/";

/// Form body of one API call.
type Params = Vec<(&'static str, String)>;

/// KeyAuth Client. Used to interact with the KeyAuth API.
///
/// One client holds one session. Call `init()` first; every other call
/// fails with `KeyAuthError::NotInitialized` until it succeeds.
#[derive(Debug)]
pub struct Client {
    identity: AppIdentity,
    endpoint: String,
    debug: bool,
    environment: Option<Environment>,
    fingerprint: Option<DeviceFingerprint>,
    http: reqwest::Client,
    session: Session,
    user_data: UserData,
    app_data: AppData,
}

/// The application as registered on the KeyAuth dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    /// Name of the application.
    pub name: String,
    /// Owner ID of the seller account. Found under Account Settings.
    pub owner_id: String,
    /// Version string the server checks against the dashboard's version.
    pub version: String,
}

/// KeyAuth Client options. Pass this into the `new()` function of the KeyAuth Client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Name of the application on the KeyAuth dashboard.
    pub name: String,
    /// Owner ID of the seller account.
    pub owner_id: String,
    /// Version of this build. Must match the dashboard's version.
    pub version: String,
    /// API URL. Defaults to `DEFAULT_ENDPOINT`.
    pub endpoint: String,
    /// Environment used for the device fingerprint. Detected on first use when `None`.
    pub environment: Option<Environment>,
    /// Whether the client should print debug statements.
    pub debug: bool,
}

impl ClientOptions {
    pub fn new(name: &str, owner_id: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            version: version.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            environment: None,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Session {
    Uninitialized,
    Initialized { session_id: String },
}

/// The four ways of authenticating a user. Each variant carries exactly the
/// fields its request type needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Login {
        username: String,
        password: String,
        /// Current 2FA code, if the user has 2FA enabled.
        code: Option<String>,
    },
    Register {
        username: String,
        password: String,
        license_key: String,
    },
    /// Log in with a license key only.
    License { license_key: String },
    /// Extend an existing user with a new license key.
    Upgrade {
        username: String,
        license_key: String,
    },
}

impl AuthRequest {
    /// The request `type` sent to the API.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthRequest::Login { .. } => "login",
            AuthRequest::Register { .. } => "register",
            AuthRequest::License { .. } => "license",
            AuthRequest::Upgrade { .. } => "upgrade",
        }
    }

    fn into_params(self) -> Params {
        match self {
            AuthRequest::Login {
                username,
                password,
                code,
            } => {
                let mut params = vec![("username", username), ("pass", password)];
                if let Some(code) = code {
                    params.push(("code", code));
                }
                params
            }
            AuthRequest::Register {
                username,
                password,
                license_key,
            } => vec![
                ("username", username),
                ("pass", password),
                ("key", license_key),
            ],
            AuthRequest::License { license_key } => vec![("key", license_key)],
            AuthRequest::Upgrade {
                username,
                license_key,
            } => vec![("username", username), ("key", license_key)],
        }
    }
}

impl Client {
    /// Creates a new KeyAuth client. No request is made until `init()`.
    pub fn new(options: ClientOptions) -> Result<Self, KeyAuthError> {
        let http = reqwest::Client::builder()
            .build()
            .or(Err(KeyAuthError::RequestFailed))?;

        Ok(Self {
            identity: AppIdentity {
                name: options.name,
                owner_id: options.owner_id,
                version: options.version,
            },
            endpoint: options.endpoint,
            debug: options.debug,
            environment: options.environment,
            fingerprint: None,
            http,
            session: Session::Uninitialized,
            user_data: UserData::default(),
            app_data: AppData::default(),
        })
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.session, Session::Initialized { .. })
    }

    /// The session ID handed out by `init()`.
    pub fn session_id(&self) -> Option<&str> {
        match &self.session {
            Session::Initialized { session_id } => Some(session_id),
            Session::Uninitialized => None,
        }
    }

    /// User data from the last successful auth call.
    pub fn user_data(&self) -> &UserData {
        &self.user_data
    }

    /// App data from the last successful `fetch_stats()`.
    pub fn app_data(&self) -> &AppData {
        &self.app_data
    }

    /// Starts a session. Does nothing if the client is already initialized.
    pub async fn init(&mut self) -> Result<(), KeyAuthError> {
        if self.is_initialized() {
            return Ok(());
        }

        self.log("[INIT] Initializing...");

        let params = vec![
            ("type", "init".to_string()),
            ("name", self.identity.name.clone()),
            ("ownerid", self.identity.owner_id.clone()),
            ("version", self.identity.version.clone()),
        ];

        let data = self.api_call(params).await?;
        ensure_success(&data)?;

        let session_id = data
            .get("sessionid")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or(KeyAuthError::FailedToDecode)?;

        self.session = Session::Initialized {
            session_id: session_id.to_string(),
        };

        self.log("[INIT] Session started.");

        Ok(())
    }

    /// Logs in, registers, activates or upgrades a user.
    /// On success the user data is replaced and the raw response is returned.
    pub async fn authenticate(&mut self, request: AuthRequest) -> Result<Value, KeyAuthError> {
        let mut params = self.session_params(request.kind())?;
        params.push(("hwid", self.fingerprint()?.to_string()));
        params.extend(request.into_params());

        self.log("[AUTH] Authenticating...");

        let data = self.api_call(params).await?;
        ensure_success(&data)?;

        let info = data.get("info").ok_or(KeyAuthError::FailedToDecode)?;
        self.user_data = UserData::from_info(info)?;

        self.log(&format!("[AUTH] Welcome, {}.", self.user_data.username));

        Ok(data)
    }

    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
        code: Option<&str>,
    ) -> Result<Value, KeyAuthError> {
        self.authenticate(AuthRequest::Login {
            username: username.to_string(),
            password: password.to_string(),
            code: code.map(str::to_string),
        })
        .await
    }

    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        license_key: &str,
    ) -> Result<Value, KeyAuthError> {
        self.authenticate(AuthRequest::Register {
            username: username.to_string(),
            password: password.to_string(),
            license_key: license_key.to_string(),
        })
        .await
    }

    pub async fn license(&mut self, license_key: &str) -> Result<Value, KeyAuthError> {
        self.authenticate(AuthRequest::License {
            license_key: license_key.to_string(),
        })
        .await
    }

    pub async fn upgrade(
        &mut self,
        username: &str,
        license_key: &str,
    ) -> Result<Value, KeyAuthError> {
        self.authenticate(AuthRequest::Upgrade {
            username: username.to_string(),
            license_key: license_key.to_string(),
        })
        .await
    }

    /// Refreshes the app data.
    ///
    /// A `success: false` answer is ignored and leaves the previous app data in
    /// place; only local and transport errors are returned.
    pub async fn fetch_stats(&mut self) -> Result<(), KeyAuthError> {
        let params = self.session_params("fetchStats")?;

        self.log("[STATS] Fetching application stats...");

        let data = self.api_call(params).await?;
        if !is_success(&data) {
            return Ok(());
        }

        let appinfo = data.get("appinfo").ok_or(KeyAuthError::FailedToDecode)?;
        self.app_data = AppData::from_appinfo(appinfo)?;

        Ok(())
    }

    /// Enables 2FA for the logged in user.
    /// Without a code the server answers with the secret to set up an authenticator.
    pub async fn enable_2fa(&mut self, code: Option<&str>) -> Result<Value, KeyAuthError> {
        let mut params = self.session_params("2faenable")?;
        if let Some(code) = code {
            params.push(("code", code.to_string()));
        }

        self.log("[2FA] Enabling two-factor authentication...");

        let data = self.api_call(params).await?;
        ensure_success(&data)?;

        Ok(data)
    }

    /// Disables 2FA for the logged in user.
    pub async fn disable_2fa(&mut self, code: &str) -> Result<Value, KeyAuthError> {
        let mut params = self.session_params("2fadisable")?;
        params.push(("code", code.to_string()));

        self.log("[2FA] Disabling two-factor authentication...");

        let data = self.api_call(params).await?;
        ensure_success(&data)?;

        Ok(data)
    }

    /// Ends the session on the server. The client keeps its local session
    /// state and records.
    pub async fn logout(&mut self) -> Result<(), KeyAuthError> {
        let params = self.session_params("logout")?;

        self.log("[AUTH] Logging out...");

        let data = self.api_call(params).await?;
        ensure_success(&data)
    }

    /// The fingerprint sent as `hwid`. Computed once per client.
    pub fn fingerprint(&mut self) -> Result<&DeviceFingerprint, KeyAuthError> {
        let fingerprint = match self.fingerprint.take() {
            Some(fingerprint) => fingerprint,
            None => {
                let environment = match &self.environment {
                    Some(environment) => environment.clone(),
                    None => Environment::detect()?,
                };
                let fingerprint = DeviceFingerprint::from_environment(&environment);
                self.environment = Some(environment);
                fingerprint
            }
        };

        let fingerprint: &DeviceFingerprint = self.fingerprint.insert(fingerprint);
        Ok(fingerprint)
    }

    /// Base params for every call made within a session.
    fn session_params(&self, kind: &'static str) -> Result<Params, KeyAuthError> {
        let session_id = self.session_id().ok_or(KeyAuthError::NotInitialized)?;

        Ok(vec![
            ("type", kind.to_string()),
            ("name", self.identity.name.clone()),
            ("ownerid", self.identity.owner_id.clone()),
            ("sessionid", session_id.to_string()),
        ])
    }

    /// POST a form to the KeyAuth API and parse the JSON answer.
    async fn api_call(&self, params: Params) -> Result<Value, KeyAuthError> {
        let response = self
            .http
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .or(Err(KeyAuthError::RequestFailed))?;

        if !response.status().is_success() {
            return Err(KeyAuthError::Http(response.status().as_u16()));
        }

        let data = response
            .json::<Value>()
            .await
            .or(Err(KeyAuthError::FailedToDecode))?;

        if !data.is_object() {
            return Err(KeyAuthError::FailedToDecode);
        }

        Ok(data)
    }

    fn log(&self, line: &str) {
        if !self.debug {
            return;
        }

        #[cfg(windows)]
        println!("{}", line);

        #[cfg(not(windows))]
        println!(
            "{}",
            line.gradient_with_color(Color::Cyan, Color::SpringGreen4)
        );
    }
}

fn is_success(data: &Value) -> bool {
    data.get("success").and_then(|v| v.as_bool()).unwrap_or(false)
}

/// Turns a `success: false` answer into `KeyAuthError::Service`.
fn ensure_success(data: &Value) -> Result<(), KeyAuthError> {
    if is_success(data) {
        return Ok(());
    }

    let message = data
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown error.");

    Err(KeyAuthError::Service(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn options_default_to_public_endpoint() {
        let options = ClientOptions::new("app", "owner", "1.0");
        assert_eq!(options.endpoint, DEFAULT_ENDPOINT);
        assert!(options.environment.is_none());
        assert!(!options.debug);
    }

    #[test]
    fn new_client_is_uninitialized() {
        let client = Client::new(ClientOptions::new("app", "owner", "1.0")).unwrap();
        assert!(!client.is_initialized());
        assert_eq!(client.session_id(), None);
        assert_eq!(client.user_data(), &UserData::default());
        assert_eq!(client.app_data(), &AppData::default());
        assert_eq!(client.identity().owner_id, "owner");
    }

    #[test]
    fn fingerprint_is_computed_once_from_injected_environment() {
        let environment = Environment {
            agent: "agent".into(),
            platform: "linux-x86_64".into(),
        };
        let mut client = Client::new(ClientOptions {
            environment: Some(environment.clone()),
            ..ClientOptions::new("app", "owner", "1.0")
        })
        .unwrap();

        let first = client.fingerprint().unwrap().clone();
        let second = client.fingerprint().unwrap().clone();

        assert_eq!(first, DeviceFingerprint::from_environment(&environment));
        assert_eq!(first, second);
    }

    #[test]
    fn session_params_require_init() {
        let client = Client::new(ClientOptions::new("app", "owner", "1.0")).unwrap();
        assert_eq!(
            client.session_params("fetchStats"),
            Err(KeyAuthError::NotInitialized)
        );
    }

    #[test]
    fn login_params_skip_missing_code() {
        let request = AuthRequest::Login {
            username: "alice".into(),
            password: "hunter2".into(),
            code: None,
        };
        assert_eq!(request.kind(), "login");
        assert_eq!(
            request.into_params(),
            vec![("username", "alice".to_string()), ("pass", "hunter2".to_string())]
        );
    }

    #[test]
    fn register_and_upgrade_params() {
        let register = AuthRequest::Register {
            username: "bob".into(),
            password: "pw".into(),
            license_key: "KEY-1".into(),
        };
        assert_eq!(
            register.into_params(),
            vec![
                ("username", "bob".to_string()),
                ("pass", "pw".to_string()),
                ("key", "KEY-1".to_string()),
            ]
        );

        let upgrade = AuthRequest::Upgrade {
            username: "bob".into(),
            license_key: "KEY-2".into(),
        };
        assert_eq!(upgrade.kind(), "upgrade");
        assert_eq!(
            upgrade.into_params(),
            vec![("username", "bob".to_string()), ("key", "KEY-2".to_string())]
        );
    }

    #[test]
    fn failure_message_is_passed_through() {
        let data = json!({ "success": false, "message": "Invalid username" });
        assert_eq!(
            ensure_success(&data),
            Err(KeyAuthError::Service("Invalid username".into()))
        );
        assert_eq!(ensure_success(&json!({ "success": true })), Ok(()));
        assert!(!is_success(&json!({ "success": "true" })));
    }
}
