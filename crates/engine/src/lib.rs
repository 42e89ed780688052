//! HabitQuest Engine library.
//!
//! This crate contains all server-side code for the HabitQuest backend.
//!
//! ## Structure
//!
//! - `use_cases/` - Workflow orchestration (completion, unlocks, ledger, payments)
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
