use std::env;
use std::net::SocketAddr;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_WALLET_PASS_DIR: &str = "./wallet_passes";
const DEFAULT_OUTBOX_POLL_SECS: u64 = 5;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEFAULT_RESET_CODE_TTL_MINUTES: i64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub wallet_pass_dir: String,
    pub outbox_poll_interval_secs: u64,
    pub session_ttl_hours: i64,
    pub reset_code_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/dutydinar".to_string()),
            bind_addr: env::var("BIND_ADDR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.parse().expect("default addr parses")),
            wallet_pass_dir: env::var("WALLET_PASS_DIR")
                .unwrap_or_else(|_| DEFAULT_WALLET_PASS_DIR.to_string()),
            outbox_poll_interval_secs: env::var("OUTBOX_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_OUTBOX_POLL_SECS),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            reset_code_ttl_minutes: env::var("RESET_CODE_TTL_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RESET_CODE_TTL_MINUTES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_addr_parses() {
        let addr: SocketAddr = DEFAULT_BIND_ADDR.parse().unwrap();
        assert_eq!(addr.port(), 3001);
    }
}
