//! Scout Budget - request budgets shared by discovery and scraping.
//!
//! Every outbound page or network action is throttled through a
//! [`RateBudget`], a token bucket for one `(platform, method)` pair. The
//! [`BudgetRegistry`] owns one bucket per key and creates it lazily from
//! built-in defaults or configured overrides.
//!
//! # Example
//!
//! ```rust
//! use scout_budget::{BudgetRegistry, Method};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = BudgetRegistry::with_defaults();
//! registry.wait_for("instagram", Method::Api, 1).await;
//! assert!(registry.get("instagram", Method::Api).available().await < 200.0);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod bucket;
pub mod registry;

pub use bucket::RateBudget;
pub use registry::{BudgetKey, BudgetRegistry, BudgetSpec, Method};
