//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker type describing the last access to an entity.
#[derive(Clone, Copy, Debug)]
pub struct LastAccess;

/// Marker type describing an entity planning.
#[derive(Clone, Copy, Debug)]
pub struct Planning;
