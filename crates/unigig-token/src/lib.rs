//! # unigig-token
//!
//! Signed credential handling for the unigig API.
//!
//! Tokens are self-contained HS256 JWTs embedding `{userId, role, iat, exp}`.
//! Nothing is persisted server-side: validity is determined solely by the
//! signature and the expiry timestamp at verification time, and there is no
//! revocation list.

pub mod claims;
pub mod error;
pub mod token;

pub use claims::Claims;
pub use error::TokenError;
pub use token::{TokenIssuer, TokenVerifier, DEFAULT_TTL_HOURS};
