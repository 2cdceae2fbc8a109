//! Registration, login, and the pieces behind them: password hashing and the
//! external identity provider.

pub mod handlers;
pub mod password;
pub mod provider;
