//! # unigig-core
//!
//! Shared domain types for the unigig marketplace:
//! - user roles and gig lifecycle states
//! - activity-log action names
//! - the registration password policy
//! - field-level validation errors returned by the API

pub mod policy;
pub mod types;
pub mod validation;

pub use policy::PasswordPolicy;
pub use types::{actions, GigStatus, Role};
pub use validation::FieldError;
