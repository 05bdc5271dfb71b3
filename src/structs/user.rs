use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::KeyAuthError;

/// Shown in place of the HWID when the server does not report one.
pub const HWID_UNAVAILABLE: &str = "N/A";

/// User data, refreshed after every successful login, register, license or upgrade call.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub username: String,
    /// IP address the server saw the request come from.
    pub ip: String,
    /// HWID bound to the user on the server, or `"N/A"`.
    pub hwid: String,
    /// Timestamp of when the user was created.
    pub created_at: u64,
    /// Timestamp of the user's last login.
    pub last_login: u64,
    /// Expiry of the primary (first) subscription, or 0 if the user has none.
    pub expires_at: u64,
    /// Subscriptions in the order the server returned them.
    pub subscriptions: Vec<Subscription>,
}

/// Subscription object which is used within the `UserData` object.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Name of the subscription level, e.g. `"default"`.
    #[serde(rename = "subscription", default, deserialize_with = "super::lenient_string")]
    pub name: String,
    /// Timestamp of when the subscription expires.
    #[serde(default, deserialize_with = "super::lenient_u64")]
    pub expiry: u64,
}

/// `info` object as sent by the KeyAuth API.
#[derive(Deserialize)]
struct UserInfo {
    #[serde(default, deserialize_with = "super::lenient_string")]
    username: String,
    #[serde(default, deserialize_with = "super::lenient_string")]
    ip: String,
    #[serde(default)]
    hwid: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_u64")]
    createdate: u64,
    #[serde(default, deserialize_with = "super::lenient_u64")]
    lastlogin: u64,
    #[serde(default)]
    subscriptions: Option<Vec<Subscription>>,
}

impl UserData {
    /// Builds the user record from the `info` object of an auth response.
    pub fn from_info(info: &Value) -> Result<Self, KeyAuthError> {
        let info = UserInfo::deserialize(info).or(Err(KeyAuthError::FailedToDecode))?;
        let subscriptions = info.subscriptions.unwrap_or_default();

        Ok(Self {
            username: info.username,
            ip: info.ip,
            hwid: info.hwid.unwrap_or_else(|| HWID_UNAVAILABLE.to_string()),
            created_at: info.createdate,
            last_login: info.lastlogin,
            expires_at: subscriptions.first().map(|s| s.expiry).unwrap_or(0),
            subscriptions,
        })
    }

    /// The subscription the server lists first, if any.
    pub fn primary_subscription(&self) -> Option<&Subscription> {
        self.subscriptions.first()
    }
}
