//! Rust client for the KeyAuth licensing API.
//!
//! ```no_run
//! use keyauth_client::{Client, ClientOptions};
//!
//! # async fn run() -> Result<(), keyauth_client::KeyAuthError> {
//! let mut client = Client::new(ClientOptions::new("MyApp", "OwnerId", "1.0"))?;
//! client.init().await?;
//! client.login("alice", "hunter2", None).await?;
//! println!("Welcome, {}", client.user_data().username);
//! # Ok(())
//! # }
//! ```

mod errors;
mod structs;

pub use errors::{KeyAuthError, Result};
pub use structs::app::AppData;
pub use structs::client::{AppIdentity, AuthRequest, Client, ClientOptions, DEFAULT_ENDPOINT};
pub use structs::fingerprint::{DeviceFingerprint, Environment};
pub use structs::user::{Subscription, UserData, HWID_UNAVAILABLE};
