use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::KeyAuthError;

/// Application data returned by `fetch_stats()`.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(rename = "numUsers", default, deserialize_with = "super::lenient_u64")]
    pub num_users: u64,
    #[serde(rename = "numKeys", default, deserialize_with = "super::lenient_u64")]
    pub num_keys: u64,
    /// Version of the application configured on the dashboard.
    #[serde(rename = "version", default, deserialize_with = "super::lenient_string")]
    pub app_version: String,
    /// Link to the customer panel, if the seller has one.
    #[serde(rename = "customerPanelLink", default, deserialize_with = "super::lenient_string")]
    pub customer_panel_link: String,
    #[serde(rename = "numOnlineUsers", default, deserialize_with = "super::lenient_u64")]
    pub num_online_users: u64,
}

impl AppData {
    /// Builds the app record from the `appinfo` object of a fetchStats response.
    pub fn from_appinfo(appinfo: &Value) -> Result<Self, KeyAuthError> {
        AppData::deserialize(appinfo).or(Err(KeyAuthError::FailedToDecode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn normalizes_appinfo() {
        let appinfo = json!({
            "numUsers": "12",
            "numOnlineUsers": 3,
            "numKeys": "40",
            "version": "1.0",
            "customerPanelLink": "https://keyauth.cc/panel/owner/app/"
        });

        assert_eq!(
            AppData::from_appinfo(&appinfo).unwrap(),
            AppData {
                num_users: 12,
                num_keys: 40,
                app_version: "1.0".into(),
                customer_panel_link: "https://keyauth.cc/panel/owner/app/".into(),
                num_online_users: 3,
            }
        );
    }

    #[test]
    fn partial_appinfo_fills_defaults() {
        let app = AppData::from_appinfo(&json!({ "version": "2.1" })).unwrap();
        assert_eq!(app.app_version, "2.1");
        assert_eq!(app.num_users, 0);
        assert!(app.customer_panel_link.is_empty());
    }

    #[test]
    fn missing_appinfo_is_a_decode_error() {
        assert_eq!(
            AppData::from_appinfo(&Value::Null),
            Err(KeyAuthError::FailedToDecode)
        );
    }
}
