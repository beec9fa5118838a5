//! View-models exposing broadcast state cells per screen
//!
//! Each view-model holds its collaborators behind `Arc`, a dispatcher handle
//! for serialized delivery, and a fixed set of named [`StateCell`]s the
//! screen subscribes to. Operations follow one pattern: prime the relevant
//! cells synchronously, run one external call on the worker pool, deliver
//! the outcome through the dispatcher under a cancel guard, and finish by
//! lowering the loading flag. Recoverable errors become display messages
//! here and never propagate further.
//!
//! [`StateCell`]: crate::app::cell::StateCell

pub mod home;
pub mod repo;
pub mod search;
pub mod signin;

pub use home::HomeViewModel;
pub use repo::RepositoryViewModel;
pub use search::SearchViewModel;
pub use signin::SignInViewModel;

#[cfg(test)]
mod tests;
