//! API key management for Keydeck
//!
//! Key store backends, the dashboard's key lifecycle, secret visibility and
//! the session gate that admits clients holding a valid key.
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


pub mod error;
pub mod generator;
pub mod lifecycle;
pub mod memory_store;
pub mod postgres_store;
pub mod rest_store;
pub mod service_integration;
pub mod session;
pub mod store;
pub mod visibility;

pub use error::{KeyError, KeyResult};
pub use generator::KeyGenerator;
pub use lifecycle::{
    Clipboard, CreateOutcome, DeleteOutcome, EditSession, KeyLifecycleManager, KeyRow,
    LoadError, UpdateOutcome,
};
pub use memory_store::MemoryKeyStore;
pub use session::{
    CredentialAction, DelayedRedirect, EntryState, Issuance, KeyEntry, SessionCheck,
    SessionValidator,
};
pub use store::KeyStoreBackend;
pub use visibility::KeyVisibility;
pub use service_integration::*;
