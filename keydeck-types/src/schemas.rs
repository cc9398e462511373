//! Record schemas for the `api_keys` table
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


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{KeydeckError, Result};

/// Identifier assigned by the key store
pub type KeyId = Uuid;

/// Usage counter every new key starts with
pub const INITIAL_USAGE: &str = "0";

// ============================================================================
// Key Type
// ============================================================================

/// Environment an API key is issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    #[default]
    Dev,
    Prod,
    Test,
}

impl KeyType {
    pub const ALL: [KeyType; 3] = [KeyType::Dev, KeyType::Prod, KeyType::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Dev => "dev",
            KeyType::Prod => "prod",
            KeyType::Test => "test",
        }
    }

    /// Human label shown in the creation form
    pub fn label(&self) -> &'static str {
        match self {
            KeyType::Dev => "Development",
            KeyType::Prod => "Production",
            KeyType::Test => "Testing",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = KeydeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" => Ok(KeyType::Dev),
            "prod" => Ok(KeyType::Prod),
            "test" => Ok(KeyType::Test),
            other => Err(KeydeckError::InvalidKeyType(other.to_string())),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// A row of the `api_keys` table, exactly as the store returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub id: KeyId,
    pub name: String,
    pub key: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub usage: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new key; `id` and `created_at` are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApiKey {
    pub name: String,
    pub key: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub usage: String,
}

impl NewApiKey {
    /// Build an insert payload. Name and key must be non-blank.
    pub fn new(name: impl Into<String>, key: impl Into<String>, key_type: KeyType) -> Result<Self> {
        let name = name.into();
        let key = key.into();
        if name.trim().is_empty() {
            return Err(KeydeckError::MissingField("name".to_string()));
        }
        if key.trim().is_empty() {
            return Err(KeydeckError::MissingField("key".to_string()));
        }

        Ok(Self {
            name,
            key,
            key_type,
            usage: INITIAL_USAGE.to_string(),
        })
    }
}

/// Update payload: only name and key are editable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeyChanges {
    pub name: String,
    pub key: String,
}

impl ApiKeyChanges {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Both fields must be non-blank before the update is sent
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_type_parse() {
        for key_type in KeyType::ALL {
            assert_eq!(key_type.as_str().parse::<KeyType>().unwrap(), key_type);
        }
        assert!("staging".parse::<KeyType>().is_err());
    }

    #[test]
    fn test_record_uses_store_column_names() {
        let json = serde_json::json!({
            "id": "6f1c1f9e-3c0a-4e7e-9d55-0f8f6f0b5a11",
            "name": "Test",
            "key": "tvly-prod-abc123",
            "type": "prod",
            "usage": "0",
            "created_at": "2025-01-15T10:30:00.123456+00:00"
        });

        let record: ApiKeyRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.key_type, KeyType::Prod);
        assert_eq!(record.usage, "0");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["type"], "prod");
    }

    #[test]
    fn test_new_api_key_requires_fields() {
        assert!(NewApiKey::new("", "tvly-dev-x", KeyType::Dev).is_err());
        assert!(NewApiKey::new("Test", "   ", KeyType::Dev).is_err());

        let new_key = NewApiKey::new("Test", "tvly-dev-x", KeyType::Dev).unwrap();
        assert_eq!(new_key.usage, INITIAL_USAGE);
    }

    #[test]
    fn test_changes_completeness() {
        assert!(ApiKeyChanges::new("a", "b").is_complete());
        assert!(!ApiKeyChanges::new(" ", "b").is_complete());
        assert!(!ApiKeyChanges::new("a", "").is_complete());
    }
}
