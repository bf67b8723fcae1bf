//! # State Module
//!
//! State the commands run against. Each command takes only the pieces it
//! needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │   DbState    │  │  AppConfig   │  │StocktakeState│  │  Session   │  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │ Shared-      │  │  thresholds  │  │ Arc<Mutex<   │  │ user id    │  │
//! │  │ Database     │  │  retries     │  │  StocktakeLog│  │ name, role │  │
//! │  │ (open once)  │  │  store path  │  │ >>           │  │            │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: pool is thread-safe, open guarded by OnceCell              │
//! │  • AppConfig: read-only after boot                                     │
//! │  • StocktakeState: Mutex for exclusive access                          │
//! │  • Session: owned by the UI, passed by reference                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod session;
mod stocktake;

pub use config::{AppConfig, ConfigError, ConfigResult};
pub use db::DbState;
pub use session::Session;
pub use stocktake::StocktakeState;
