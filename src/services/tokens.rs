//! Credential minting
//!
//! Check-in codes are short and typed by staff; invite tokens are long bearer
//! credentials for invitation links. The two are generated independently.

use std::future::Future;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use tracing::warn;
use crate::config::TokenConfig;
use crate::utils::errors::{GuestListError, Result};
use crate::utils::helpers::generate_random_string;

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Prefixed uppercase code, e.g. `GL-7KQ2M9XD`
    pub fn check_in_token(&self) -> String {
        let mut rng = rand::thread_rng();
        let body = generate_random_string(
            &mut rng,
            self.config.check_in_alphabet.as_bytes(),
            self.config.check_in_length,
        );
        format!("{}{}", self.config.check_in_prefix, body)
    }

    /// High-entropy alphanumeric token from the OS generator
    pub fn invite_token(&self) -> String {
        OsRng
            .sample_iter(&Alphanumeric)
            .take(self.config.invite_token_length)
            .map(char::from)
            .collect()
    }

    /// Run `attempt` until it stops failing with `DuplicateToken`, up to the
    /// configured number of attempts. Any other error is returned immediately.
    pub async fn retry_on_collision<T, F, Fut>(&self, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.config.max_issue_attempts.max(1);
        for n in 1..=attempts {
            match attempt().await {
                Err(GuestListError::DuplicateToken { constraint }) => {
                    warn!(attempt = n, constraint = %constraint, "Token collision, regenerating");
                }
                other => return other,
            }
        }
        Err(GuestListError::TokenIssuance { attempts })
    }
}
