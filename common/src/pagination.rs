//! Abstractions for offset pagination.

use derive_more::{Display, Error};

/// Default size of a [`Page`].
pub const DEFAULT_SIZE: usize = 20;

/// Maximum allowed size of a [`Page`].
pub const MAX_SIZE: usize = 100;

/// Pagination arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Zero-based number of the requested [`Page`].
    page: usize,

    /// Size of the requested [`Page`].
    size: usize,
}

impl Arguments {
    /// Creates new [`Arguments`], falling back to [`DEFAULT_SIZE`] when no
    /// `size` is provided.
    ///
    /// # Errors
    ///
    /// Errors if the provided `size` is zero or exceeds [`MAX_SIZE`].
    pub fn new(
        page: Option<usize>,
        size: Option<usize>,
    ) -> Result<Self, InvalidArguments> {
        let size = size.unwrap_or(DEFAULT_SIZE);
        if size == 0 || size > MAX_SIZE {
            return Err(InvalidArguments::Size(size));
        }

        Ok(Self {
            page: page.unwrap_or_default(),
            size,
        })
    }

    /// Returns the zero-based page number of these [`Arguments`].
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the page size of these [`Arguments`].
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of items to skip before the requested [`Page`]
    /// starts.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    /// Cuts the requested [`Page`] out of the provided items.
    pub fn paginate<I>(
        &self,
        items: impl IntoIterator<Item = I>,
    ) -> Page<I> {
        Page {
            items: items
                .into_iter()
                .skip(self.offset())
                .take(self.size)
                .collect(),
            arguments: *self,
        }
    }
}

/// Error of validating [`Arguments`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum InvalidArguments {
    /// Requested size is out of bounds.
    #[display("page size `{_0}` is out of bounds")]
    Size(#[error(not(source))] usize),
}

/// Single page of items.
#[derive(Clone, Debug)]
pub struct Page<I> {
    /// Items on this [`Page`].
    pub items: Vec<I>,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

impl<I> Page<I> {
    /// Maps the items of this [`Page`] with the provided function.
    pub fn map<T>(self, f: impl FnMut(I) -> T) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            arguments: self.arguments,
        }
    }
}

/// Selector of a [`Page`] narrowed by a filter.
#[derive(Clone, Copy, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

#[cfg(test)]
mod spec {
    use super::{Arguments, DEFAULT_SIZE};

    #[test]
    fn defaults() {
        let args = Arguments::new(None, None).unwrap();
        assert_eq!(args.page(), 0);
        assert_eq!(args.size(), DEFAULT_SIZE);
        assert_eq!(args.offset(), 0);
    }

    #[test]
    fn rejects_out_of_bounds_size() {
        assert!(Arguments::new(None, Some(0)).is_err());
        assert!(Arguments::new(None, Some(101)).is_err());
        assert!(Arguments::new(None, Some(100)).is_ok());
    }

    #[test]
    fn paginates() {
        let args = Arguments::new(Some(1), Some(3)).unwrap();
        let page = args.paginate(0..10);
        assert_eq!(page.items, vec![3, 4, 5]);

        let args = Arguments::new(Some(4), Some(3)).unwrap();
        assert!(args.paginate(0..10).items.is_empty());
    }
}
