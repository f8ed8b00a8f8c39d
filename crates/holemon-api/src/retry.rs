//! Retry-on-unauthorized policy.
//!
//! Pure decision logic: given the 1-based attempt number and the status of
//! that attempt, say what the caller does next. What "re-authenticate"
//! means is left to the caller.

/// Attempts per logical call, counting the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// What to do after one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 200: decode the body.
    Accept,
    /// 401/403 with attempts left: drop the session, log in again, retry.
    Reauthenticate,
    /// 401/403 on the last allowed attempt.
    Exhausted { attempts: u32 },
    /// Any other status. Not retried.
    Reject { code: u16 },
}

/// Retry on 401/403 up to `max_attempts` total attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRetryPolicy {
    max_attempts: u32,
}

impl Default for AuthRetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl AuthRetryPolicy {
    /// `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn decide(&self, attempt: u32, status: u16) -> Decision {
        match status {
            200 => Decision::Accept,
            s if is_auth_failure(s) && attempt < self.max_attempts => Decision::Reauthenticate,
            s if is_auth_failure(s) => Decision::Exhausted { attempts: attempt },
            code => Decision::Reject { code },
        }
    }
}

/// 401 Unauthorized or 403 Forbidden: the session id was not accepted.
pub fn is_auth_failure(status: u16) -> bool {
    matches!(status, 401 | 403)
}
