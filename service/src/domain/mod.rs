//! Domain model definitions.
//!
//! Every entity here is populated from a plain descriptor through
//! validating setters: a successfully constructed entity always holds
//! validated data, and a rejected write never partially mutates it.

pub mod article;
pub mod channel;
pub mod meeting;
pub mod user;

pub use self::{
    article::Article,
    channel::{Channel, Message as ChannelMessage},
    meeting::Meeting,
    user::User,
};
