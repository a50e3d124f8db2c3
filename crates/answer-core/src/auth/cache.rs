use std::time::{SystemTime, UNIX_EPOCH};

/// Tokens are treated as expired this many seconds before their real expiry.
const REFRESH_MARGIN_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: u64,
}

impl CachedToken {
    pub fn new(token: impl Into<String>, expires_in: u64) -> Self {
        Self {
            token: token.into(),
            expires_at: now_secs() + expires_in,
        }
    }

    /// True while more than five minutes of validity remain.
    pub fn is_valid(&self) -> bool {
        self.expires_at > now_secs() + REFRESH_MARGIN_SECS
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.expires_at as i64 - now_secs() as i64
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
