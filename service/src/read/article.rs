//! [`Article`] read model definition.
//!
//! [`Article`]: crate::domain::Article

pub mod list {
    //! [`Article`]s list definitions.
    //!
    //! [`Article`]: crate::domain::Article

    use common::{pagination, DateTime};

    use crate::domain::{user, Article};

    /// A [`Page`] of [`Article`]s.
    ///
    /// [`Page`]: pagination::Page
    pub type Page = pagination::Page<Article>;

    /// [`Page`] selector.
    pub type Selector = pagination::Selector<Filter>;

    /// Filter for a [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// ID of the authoring user to narrow to.
        pub author: Option<user::Id>,

        /// Lower publication date bound.
        pub from: Option<DateTime>,

        /// Upper publication date bound.
        pub to: Option<DateTime>,

        /// Title term to search for (case-insensitive substring).
        pub title: Option<String>,

        /// Tag term to search for (case-insensitive substring).
        pub tag: Option<String>,
    }
}
