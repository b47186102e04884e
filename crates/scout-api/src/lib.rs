//! Scout API - credentialed profile APIs.
//!
//! The scrape protocol tries these before falling back to page extraction.
//! A platform only has a client when its access token is configured.
//!
//! # Example
//!
//! ```rust,ignore
//! use scout_api::clients_from_credentials;
//! use scout_core::Credentials;
//!
//! let clients = clients_from_credentials(&Credentials::from_env(), None)?;
//! for client in &clients {
//!     println!("API available for {}", client.platform());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;
pub mod instagram;
pub mod linkedin;

pub use client::{clients_from_credentials, ApiProfile, ProfileApi};
pub use error::{ApiError, Result};
pub use instagram::InstagramGraphClient;
pub use linkedin::LinkedInClient;
