//! Shield Server - billboard / plaque registry
//!
//! An admin creates records (street, client, amount, optional photo), marks
//! them paid and deletes them. Every record gets a QR code pointing at a
//! read-only public page.
//!
//! # Module layout
//!
//! ```text
//! shield-server/src/
//! ├── core/        # config, state, server
//! ├── db/          # SQLite pool, migrations, repository
//! ├── storage/     # photo storage backends (local / hosted)
//! ├── qr/          # QR image generation
//! ├── auth/        # sessions, admin credential, login throttling
//! ├── api/         # HTTP handlers
//! ├── views/       # HTML pages
//! ├── routes/      # router assembly and middleware stack
//! ├── middleware/  # request logging
//! └── utils/       # logger, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod middleware;
pub mod qr;
pub mod routes;
pub mod storage;
pub mod utils;
pub mod views;

pub use core::{Config, Server, ServerState};
pub use routes::build_app;
pub use utils::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;
