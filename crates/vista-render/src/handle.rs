//! Opaque handles to device-owned resources.
//!
//! Handles are plain `Copy` ids. A device never hands out the same id twice,
//! so a stale handle can be detected (and ignored) instead of aliasing a newer
//! resource.

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u64);

        impl $name {
            /// Raw id, for logging.
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

resource_handle!(
    /// Vertex/index buffers uploaded from a [`Geometry`](crate::Geometry).
    GeometryHandle
);
resource_handle!(
    /// A sampled texture: uploaded data or the color output of a render target.
    TextureHandle
);
resource_handle!(
    /// An offscreen color + depth target.
    RenderTargetHandle
);
resource_handle!(
    /// A shading program shared by any number of meshes.
    ProgramHandle
);
resource_handle!(
    /// A mesh entry inside a [`Scene`](crate::Scene).
    MeshId
);

/// Monotonic id source shared by all handle kinds of one owner.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn next(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_never_reused() {
        let mut ids = IdAllocator::default();
        let a = ids.next();
        let b = ids.next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_handle_display_names_kind() {
        assert_eq!(GeometryHandle(7).to_string(), "GeometryHandle#7");
        assert_eq!(TextureHandle(3).raw(), 3);
    }
}
