//! [`Channel`] read model definition.
//!
//! [`Channel`]: crate::domain::Channel

pub mod list {
    //! [`Channel`]s list definitions.
    //!
    //! [`Channel`]: crate::domain::Channel

    use common::{pagination, DateTime};

    use crate::domain::{user, Channel};

    /// A [`Page`] of [`Channel`]s.
    ///
    /// [`Page`]: pagination::Page
    pub type Page = pagination::Page<Channel>;

    /// [`Page`] selector.
    pub type Selector = pagination::Selector<Filter>;

    /// Filter for a [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// ID of the owning user to narrow to.
        pub owner: Option<user::Id>,

        /// Restricts the list to channels the user owns or is a member of.
        ///
        /// Applied for sessions lacking the unrestricted listing right.
        pub member: Option<user::Id>,

        /// Lower creation date bound.
        pub from: Option<DateTime>,

        /// Upper creation date bound.
        pub to: Option<DateTime>,

        /// Title term to search for (case-insensitive substring).
        pub title: Option<String>,

        /// Tag term to search for (case-insensitive substring).
        pub tag: Option<String>,
    }
}
