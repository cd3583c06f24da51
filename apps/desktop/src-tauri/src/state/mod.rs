//! # State Module
//!
//! Manages application state for the desktop app.
//!
//! Each concern gets its own state type, so every command declares
//! exactly what it needs and independent states never block each other.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Tauri Runtime                              │   │
//! │  │  app.manage(db_state);       app.manage(session_state);         │   │
//! │  │  app.manage(cart_state);     app.manage(module_registry);       │   │
//! │  │  app.manage(config_state);   app.manage(cep_client);            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │       ┌──────────────┬───────┴──────┬──────────────────┐               │
//! │       ▼              ▼              ▼                  ▼                │
//! │  ┌──────────┐  ┌────────────┐  ┌──────────────┐  ┌──────────────┐      │
//! │  │ DbState  │  │ CartState  │  │ SessionState │  │ ConfigState  │      │
//! │  │ SQLite   │  │ venda +    │  │ Arc<Mutex<   │  │ AVELAR_* env │      │
//! │  │ pool     │  │ orcamento  │  │  Option<..>>>│  │ read-only    │      │
//! │  └──────────┘  └────────────┘  └──────────────┘  └──────────────┘      │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • CartState, SessionState: Arc<Mutex<T>>, poison recovered           │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;
mod session;

pub use cart::{Cart, CartItem, CartKind, CartState, CartView};
pub use config::{ConfigState, DEFAULT_CEP_BASE_URL};
pub use db::DbState;
pub use session::SessionState;
