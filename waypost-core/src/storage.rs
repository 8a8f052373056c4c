//! Strong and weak retention of referenced nodes.

use crate::node::NodeId;
use std::fmt;
use std::sync::{Arc, Weak};

/// How a dispatcher holds on to a node it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageOption {
    /// Keep the node alive.
    #[default]
    Strong,
    /// Observe the node without extending its lifetime.
    Weak,
}

impl StorageOption {
    /// Store `object` according to this option.
    pub fn store<T: ?Sized>(self, object: &Arc<T>) -> ObjectStorage<T> {
        match self {
            Self::Strong => ObjectStorage::Strong(Arc::clone(object)),
            Self::Weak => ObjectStorage::Weak(Arc::downgrade(object)),
        }
    }
}

/// A stored reference to an object, held strongly or weakly.
///
/// Resolve with [`ObjectStorage::get`] right before each use; a weakly held
/// object reads as absent once its other owners are gone.
pub enum ObjectStorage<T: ?Sized> {
    /// Shared ownership.
    Strong(Arc<T>),
    /// Non-owning observation.
    Weak(Weak<T>),
}

impl<T: ?Sized> ObjectStorage<T> {
    /// The object, if it is still alive.
    pub fn get(&self) -> Option<Arc<T>> {
        match self {
            Self::Strong(object) => Some(Arc::clone(object)),
            Self::Weak(object) => object.upgrade(),
        }
    }

    /// Whether the object is still alive.
    pub fn is_live(&self) -> bool {
        match self {
            Self::Strong(_) => true,
            Self::Weak(object) => object.strong_count() > 0,
        }
    }

    /// The option this storage was created with.
    pub fn option(&self) -> StorageOption {
        match self {
            Self::Strong(_) => StorageOption::Strong,
            Self::Weak(_) => StorageOption::Weak,
        }
    }

    /// Identity of the stored object. Valid even after a weak object died,
    /// since the allocation outlives every `Weak` pointing at it.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Strong(object) => NodeId::from_ptr(Arc::as_ptr(object)),
            Self::Weak(object) => NodeId::from_ptr(object.as_ptr()),
        }
    }

    /// Whether this storage refers to the object identified by `id`.
    pub fn points_to(&self, id: NodeId) -> bool {
        self.id() == id
    }
}

impl<T: ?Sized> Clone for ObjectStorage<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Strong(object) => Self::Strong(Arc::clone(object)),
            Self::Weak(object) => Self::Weak(Weak::clone(object)),
        }
    }
}

impl<T: ?Sized> fmt::Debug for ObjectStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("option", &self.option())
            .field("id", &self.id())
            .field("live", &self.is_live())
            .finish()
    }
}
