pub mod client;

pub use client::{AuthorizationClient, AuthorizationError};
