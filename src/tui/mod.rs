//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a banking-themed interface for:
//! - Dashboard with history summary and rule policy
//! - Loan application entry
//! - Rule-engine verdict display
//! - Assessment analytics

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::CreditTheme;
