//! API key secret generation
//!
//! Secrets look like `<prefix>-<type>-<token>`, e.g. `tvly-prod-k3j9x0a1b2c3d`.
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


use keydeck_types::KeyType;
use rand::Rng;

/// Prefix used when none is configured
pub const DEFAULT_KEY_PREFIX: &str = "tvly";

/// Length of the random token part
pub const TOKEN_LENGTH: usize = 13;

const TOKEN_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Builds secrets for new keys
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    prefix: String,
}

impl KeyGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a fresh secret for the given key type
    ///
    /// Uniqueness is not guaranteed here; the lifecycle manager checks the
    /// store before inserting.
    pub fn generate(&self, key_type: KeyType) -> String {
        format!("{}-{}-{}", self.prefix, key_type, random_token(TOKEN_LENGTH))
    }

    /// Whether `secret` has the `<prefix>-<type>-<token>` shape
    pub fn matches(&self, secret: &str) -> bool {
        let Some(rest) = secret
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
        else {
            return false;
        };

        let Some((key_type, token)) = rest.split_once('-') else {
            return false;
        };

        key_type.parse::<KeyType>().is_ok()
            && token.len() == TOKEN_LENGTH
            && token.bytes().all(|b| TOKEN_CHARSET.contains(&b))
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

/// Lowercase base-36 token drawn from the thread-local CSPRNG
fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_shape() {
        let generator = KeyGenerator::default();

        for key_type in KeyType::ALL {
            let secret = generator.generate(key_type);
            assert!(secret.starts_with(&format!("tvly-{}-", key_type)));
            assert!(generator.matches(&secret), "unexpected shape: {}", secret);
        }
    }

    #[test]
    fn test_custom_prefix() {
        let generator = KeyGenerator::new("acme");
        let secret = generator.generate(KeyType::Test);

        assert!(secret.starts_with("acme-test-"));
        assert!(!KeyGenerator::default().matches(&secret));
    }

    #[test]
    fn test_matches_rejects_foreign_shapes() {
        let generator = KeyGenerator::default();

        assert!(!generator.matches("tvly-staging-abcdefghijklm"));
        assert!(!generator.matches("tvly-dev-short"));
        assert!(!generator.matches("tvly-dev-ABCDEFGHIJKLM"));
        assert!(!generator.matches("tvlydev-abcdefghijklm"));
    }

    #[test]
    fn test_tokens_differ() {
        let generator = KeyGenerator::default();
        assert_ne!(generator.generate(KeyType::Dev), generator.generate(KeyType::Dev));
    }
}
