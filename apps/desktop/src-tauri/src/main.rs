//! # Óticas Avelar Desktop Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Tauri WebView                                               │
//! │  index.html + partials ── invoke('load_module', ...) ──┐     │
//! └────────────────────────────────────────────────────────┼─────┘
//!                                                          ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  avelar_desktop_lib                                          │
//! │  ipc.rs ──► commands/ ──► avelar-db ──► avelar.db (SQLite)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Setup lives in `lib.rs`.

// Prevents an additional console window on Windows in release
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

fn main() {
    avelar_desktop_lib::run();
}
