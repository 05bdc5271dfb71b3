use thiserror::Error;

/// KeyAuth Errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyAuthError {
    /// An operation that needs a session was called before `init()` succeeded.
    /// No request is sent in this case.
    #[error("KeyAuth not initialised")]
    NotInitialized,

    /// The KeyAuth API answered with `success: false`.
    /// Holds the server's message as-is.
    #[error("{0}")]
    Service(String),

    /// Failed to get the machine's hardware ID.
    #[error("Failed to get HWID.")]
    FailedToGetHwid,

    /// Failed to send a request to the KeyAuth API.
    #[error("Failed to send a request to the KeyAuth API.")]
    RequestFailed,

    /// The KeyAuth API returned a non-success status code.
    #[error("HTTP {0}")]
    Http(u16),

    /// Failed to decode KeyAuth API response.
    #[error("Failed to decode KeyAuth API response.")]
    FailedToDecode,
}

impl KeyAuthError {
    /// Returns true if the HTTP exchange itself failed, as opposed to the
    /// server rejecting the request or a local precondition failing.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            KeyAuthError::RequestFailed | KeyAuthError::Http(_) | KeyAuthError::FailedToDecode
        )
    }
}

pub type Result<T> = std::result::Result<T, KeyAuthError>;

#[cfg(test)]
mod tests {
    use super::KeyAuthError;

    #[test]
    fn service_error_displays_server_message_verbatim() {
        let err = KeyAuthError::Service("bad creds".to_string());
        assert_eq!(err.to_string(), "bad creds");
    }

    #[test]
    fn transport_family() {
        assert!(KeyAuthError::Http(500).is_transport());
        assert!(KeyAuthError::RequestFailed.is_transport());
        assert!(KeyAuthError::FailedToDecode.is_transport());
        assert!(!KeyAuthError::NotInitialized.is_transport());
        assert!(!KeyAuthError::Service("nope".into()).is_transport());
        assert!(!KeyAuthError::FailedToGetHwid.is_transport());
    }

    #[test]
    fn http_error_mentions_status() {
        assert_eq!(KeyAuthError::Http(503).to_string(), "HTTP 503");
    }
}
