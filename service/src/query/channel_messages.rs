//! [`Query`] collection related to multiple [`ChannelMessage`]s.
//!
//! [`ChannelMessage`]: crate::domain::ChannelMessage

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of [`ChannelMessage`]s of a single [`Channel`].
///
/// [`Channel`]: crate::domain::Channel
/// [`ChannelMessage`]: crate::domain::ChannelMessage
pub type List = DatabaseQuery<
    By<
        read::channel_message::list::Page,
        read::channel_message::list::Selector,
    >,
>;
