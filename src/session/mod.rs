//! Session credential management

pub mod state;

pub use state::{AuthStatus, IssuedTokens, SessionState, TokenPair};
