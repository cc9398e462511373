//! Keydeck HTTP server
//!
//! Serves the API key dashboard, the key-entry view and the protected view.
//! Every request under the protected prefix passes through the session gate
//! before routing.
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


pub mod gate;
pub mod handlers;
pub mod health;
pub mod router;
pub mod server;
pub mod state;

pub use router::build_router;
pub use server::KeydeckServer;
pub use state::AppState;
