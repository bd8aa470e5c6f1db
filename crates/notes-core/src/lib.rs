//! Notes Core - domain models, configuration and storage
//!
//! This crate holds everything the HTTP layer builds on:
//! - Configuration loading (environment and TOML files)
//! - User and note models
//! - Owner-scoped SQLite storage behind narrow capability traits
//!
//! Author: hephaex@gmail.com

pub mod config;
pub mod models;
pub mod storage;

pub use models::{Note, User};
pub use storage::{
    HealthProbe, NoteCreator, NoteDeleter, NoteProvider, NoteUpdater, NotesProvider, SqliteStore, Storage,
    StorageError, UserCreator, UserProvider,
};
