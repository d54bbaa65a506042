//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external
//! dependencies.

mod session;
mod user;
pub mod result;

pub use session::Session;
pub use user::{
    default_name, demo_directory, validate_password, Directory, Role, User, UserChanges,
    MIN_PASSWORD_LEN,
};
