use crate::identity::clerk;
use serde::Deserialize;
use std::{
    fmt::{Debug, Formatter},
    net::IpAddr,
};

fn default_database_max_connections() -> u32 {
    5
}

fn default_identity_api_url() -> String {
    clerk::DEFAULT_API_URL.to_owned()
}

/// Server configuration, read from the environment.
#[derive(Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Env {
    pub server_address: IpAddr,
    pub server_port: u16,
    pub database_url: String,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,
    /// Distinguishes post ids generated by concurrently running servers.
    #[serde(default)]
    pub worker_id: u16,
    #[serde(default = "default_identity_api_url")]
    pub identity_api_url: String,
    pub identity_secret_key: String,
    /// PEM encoded RSA public key that session tokens are signed with.
    pub session_public_key: String,
    pub session_issuer: Option<String>,
}

impl Debug for Env {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("server_address", &self.server_address)
            .field("server_port", &self.server_port)
            .field("database_url", &"[redacted]")
            .field("database_max_connections", &self.database_max_connections)
            .field("worker_id", &self.worker_id)
            .field("identity_api_url", &self.identity_api_url)
            .field("identity_secret_key", &"[redacted]")
            .field("session_public_key", &self.session_public_key)
            .field("session_issuer", &self.session_issuer)
            .finish()
    }
}
