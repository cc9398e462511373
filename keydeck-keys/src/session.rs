//! Session gating against the key store
//!
//! A session credential is just a key string that once matched a row.
//! `SessionValidator` is the single check every gate checkpoint uses: key
//! entry, the protected view's mount-check and request interception.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::store::KeyStoreBackend;
use keydeck_types::{KeyId, Notification};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cookie holding the validated key
pub const SESSION_COOKIE: &str = "validApiKey";

/// Lifetime of an issued credential
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Pause between a successful validation and navigating to the protected view
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1000);

pub mod messages {
    pub const VALID: &str = "Valid API key, /protected can be accessed";
    pub const INVALID: &str = "Invalid API key";
}

/// Why a credential was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No credential was presented
    Missing,
    /// No row has this key
    NotFound,
    /// Several rows share this key
    Ambiguous(usize),
    /// The lookup itself failed
    StoreError(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Missing => write!(f, "no credential"),
            Rejection::NotFound => write!(f, "no matching key"),
            Rejection::Ambiguous(n) => write!(f, "{} rows share the key", n),
            Rejection::StoreError(e) => write!(f, "lookup failed: {}", e),
        }
    }
}

/// Outcome of checking a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    Valid(KeyId),
    Rejected(Rejection),
}

impl SessionCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, SessionCheck::Valid(_))
    }

    /// A presented credential that failed must be cleared; an absent one
    /// has nothing to clear.
    pub fn clears_credential(&self) -> bool {
        matches!(self, SessionCheck::Rejected(r) if *r != Rejection::Missing)
    }
}

/// Checks credentials directly against the key store
#[derive(Clone)]
pub struct SessionValidator {
    store: Arc<dyn KeyStoreBackend>,
}

impl SessionValidator {
    pub fn new(store: Arc<dyn KeyStoreBackend>) -> Self {
        Self { store }
    }

    /// Valid only when exactly one row has `credential` as its key
    pub async fn check(&self, credential: Option<&str>) -> SessionCheck {
        let Some(candidate) = credential.filter(|c| !c.trim().is_empty()) else {
            return SessionCheck::Rejected(Rejection::Missing);
        };

        let check = match self.store.find_by_key(candidate).await {
            Ok(rows) => match rows.as_slice() {
                [record] => SessionCheck::Valid(record.id),
                [] => SessionCheck::Rejected(Rejection::NotFound),
                rows => SessionCheck::Rejected(Rejection::Ambiguous(rows.len())),
            },
            Err(e) => SessionCheck::Rejected(Rejection::StoreError(e.to_string())),
        };

        match &check {
            SessionCheck::Valid(id) => debug!(key_id = %id, "Credential accepted"),
            SessionCheck::Rejected(reason) => debug!(%reason, "Credential rejected"),
        }
        check
    }
}

/// Key-entry state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Idle,
    Validating,
    Valid,
    Invalid,
}

/// What to do with the client's session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialAction {
    Keep,
    Set(String),
    Clear,
}

/// Navigation the client performs after a delay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelayedRedirect {
    pub path: String,
    #[serde(rename = "after_ms", serialize_with = "serialize_millis")]
    pub after: Duration,
}

fn serialize_millis<S: serde::Serializer>(after: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(after.as_millis() as u64)
}

/// Result of one key submission
#[derive(Debug, Clone)]
pub struct Issuance {
    /// Terminal state reached by this submission
    pub outcome: EntryState,
    pub credential: CredentialAction,
    pub notification: Option<Notification>,
    pub redirect: Option<DelayedRedirect>,
}

/// Validates submitted keys and decides how to issue the session credential
pub struct KeyEntry {
    validator: SessionValidator,
    protected_path: String,
    state: EntryState,
}

impl KeyEntry {
    pub fn new(validator: SessionValidator, protected_path: impl Into<String>) -> Self {
        Self {
            validator,
            protected_path: protected_path.into(),
            state: EntryState::Idle,
        }
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    /// Submit a candidate key
    ///
    /// A blank candidate never leaves `Idle`. An invalid one clears any
    /// credential and returns the machine to `Idle`.
    pub async fn submit(&mut self, candidate: &str) -> Issuance {
        if candidate.trim().is_empty() {
            return Issuance {
                outcome: EntryState::Idle,
                credential: CredentialAction::Keep,
                notification: None,
                redirect: None,
            };
        }

        self.state = EntryState::Validating;

        match self.validator.check(Some(candidate)).await {
            SessionCheck::Valid(id) => {
                info!(key_id = %id, "Session credential issued");
                self.state = EntryState::Valid;
                Issuance {
                    outcome: EntryState::Valid,
                    credential: CredentialAction::Set(candidate.to_string()),
                    notification: Some(Notification::success(messages::VALID)),
                    redirect: Some(DelayedRedirect {
                        path: self.protected_path.clone(),
                        after: REDIRECT_DELAY,
                    }),
                }
            }
            SessionCheck::Rejected(reason) => {
                warn!(%reason, "Key entry rejected");
                self.state = EntryState::Idle;
                Issuance {
                    outcome: EntryState::Invalid,
                    credential: CredentialAction::Clear,
                    notification: Some(Notification::error(messages::INVALID)),
                    redirect: None,
                }
            }
        }
    }
}
