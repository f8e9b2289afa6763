//! Session-scoped authorization: rights, sessions and request filters.

pub mod filter;
pub mod rights;
pub mod session;
pub mod store;

pub use self::{
    filter::Forbidden,
    rights::{Right, RightsSet},
    session::{Session, Token},
    store::{SessionStore, UnknownSession},
};
