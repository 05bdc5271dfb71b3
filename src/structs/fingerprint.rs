//! Device fingerprint sent as `hwid` with every auth request.
//!
//! The fingerprint only ties a user to a machine on the server side. It is
//! not a secret and travels in the clear.

use std::env;
use std::fmt;

use hardware_id::get_id;
use sha2::{Digest, Sha256};

use crate::errors::KeyAuthError;

/// The identifying attributes of the environment the client runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Stable identifier of the machine (or of the caller's runtime).
    pub agent: String,
    /// Operating system and CPU architecture, e.g. `linux-x86_64`.
    pub platform: String,
}

impl Environment {
    /// Reads the machine's hardware ID and the compile-time platform.
    pub fn detect() -> Result<Self, KeyAuthError> {
        let agent = get_id().or(Err(KeyAuthError::FailedToGetHwid))?;

        Ok(Self {
            agent,
            platform: format!("{}-{}", env::consts::OS, env::consts::ARCH),
        })
    }
}

/// Lowercase hex SHA-256 of `"{agent}|{platform}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceFingerprint(String);

impl DeviceFingerprint {
    pub fn from_environment(environment: &Environment) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(environment.agent.as_bytes());
        hasher.update(b"|");
        hasher.update(environment.platform.as_bytes());

        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(agent: &str, platform: &str) -> Environment {
        Environment {
            agent: agent.to_string(),
            platform: platform.to_string(),
        }
    }

    #[test]
    fn hashes_agent_and_platform() {
        let fp = DeviceFingerprint::from_environment(&env("Mozilla/5.0", "Win32"));
        assert_eq!(
            fp.as_str(),
            "6b7d948ba070966508eddf522417004353bb409ba4ed6d7120ba55dcb7ec5c96"
        );
        assert_eq!(fp.to_string(), fp.as_str());
    }

    #[test]
    fn stable_for_same_environment() {
        let a = DeviceFingerprint::from_environment(&env("machine-1", "linux-x86_64"));
        let b = DeviceFingerprint::from_environment(&env("machine-1", "linux-x86_64"));
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn differs_across_environments() {
        let a = DeviceFingerprint::from_environment(&env("machine-1", "linux-x86_64"));
        let b = DeviceFingerprint::from_environment(&env("machine-2", "linux-x86_64"));
        let c = DeviceFingerprint::from_environment(&env("machine-1", "windows-x86_64"));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
