//! Local persistence for the visit history and the access token
//!
//! Both stores are blocking; callers on the dispatcher side must hop onto
//! the blocking pool before touching them.

pub mod history;
pub mod token;

pub use history::HistoryStore;
pub use token::TokenStore;
