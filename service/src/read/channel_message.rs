//! [`ChannelMessage`] read model definition.
//!
//! [`ChannelMessage`]: crate::domain::ChannelMessage

pub mod list {
    //! [`ChannelMessage`]s list definitions.
    //!
    //! [`ChannelMessage`]: crate::domain::ChannelMessage

    use common::pagination;

    use crate::domain::{channel, ChannelMessage};

    /// A [`Page`] of [`ChannelMessage`]s.
    ///
    /// [`Page`]: pagination::Page
    pub type Page = pagination::Page<ChannelMessage>;

    /// [`Page`] selector.
    pub type Selector = pagination::Selector<Filter>;

    /// Filter for a [`Selector`].
    #[derive(Clone, Debug)]
    pub struct Filter {
        /// ID of the [`Channel`] to list the messages of.
        ///
        /// [`Channel`]: crate::domain::Channel
        pub channel: channel::Id,
    }
}
