//! Renderer seam for the world layer.
//!
//! Terrain, sky and camera code never touch the GPU directly. They build CPU
//! [`Geometry`], place [`Mesh`]es in a [`Scene`], and ask a [`RenderDevice`]
//! to own the matching GPU resources. Two devices are provided: the
//! bookkeeping-only [`HeadlessDevice`] and the `wgpu`-backed [`WgpuDevice`].

pub mod camera;
pub mod device;
pub mod error;
pub mod frustum;
pub mod geometry;
pub mod gpu;
pub mod handle;
pub mod headless;
pub mod program;
pub mod scene;
pub mod target;
pub mod texture;

pub use camera::{Camera, CameraUniform, face_towards_rotation, look_at_rotation};
pub use device::{RenderDevice, ResourceStats};
pub use error::RenderError;
pub use frustum::{Aabb, Frustum};
pub use geometry::{AttributeKind, Geometry};
pub use gpu::WgpuDevice;
pub use handle::{GeometryHandle, MeshId, ProgramHandle, RenderTargetHandle, TextureHandle};
pub use headless::{DrawRecord, HeadlessDevice, PassRecord};
pub use program::{FaceSide, ProgramDescriptor};
pub use scene::{Mesh, Scene, Transform};
pub use target::{RenderTarget, RenderTargetDescriptor, scaled_extent};
pub use texture::{DataTextureDescriptor, TEXEL_COMPONENTS, TextureFilter, TextureWrap};
