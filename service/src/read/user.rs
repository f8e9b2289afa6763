//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

pub mod list {
    //! [`User`]s list definitions.
    //!
    //! [`User`]: crate::domain::User

    use common::pagination;

    use crate::domain::User;

    /// A [`Page`] of [`User`]s.
    ///
    /// [`Page`]: pagination::Page
    pub type Page = pagination::Page<User>;

    /// [`Page`] selector.
    pub type Selector = pagination::Selector<Filter>;

    /// Filter for a [`Selector`].
    ///
    /// Name terms narrow the list with case-insensitive substring matching.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// First name term to search for.
        pub first_name: Option<String>,

        /// Last name term to search for.
        pub last_name: Option<String>,
    }
}
