//! Offscreen low-resolution sky pass and the main-scene elements built on it.

use glam::Vec3;
use vista_render::{
    Camera, RenderDevice, RenderTarget, RenderTargetDescriptor, RenderTargetHandle, Scene,
    TextureHandle, scaled_extent,
};

use crate::background::SkyBackground;
use crate::dome::SkyDome;
use crate::error::SkyError;
use crate::parameters::{SkyParameters, SkyShading};
use crate::sun_disc::SunDisc;

#[derive(Clone, Debug, PartialEq)]
pub struct SkyCompositorConfig {
    /// Offscreen target size as a fraction of the viewport.
    pub resolution_ratio: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Distance of the sun disc from the player.
    pub sun_distance: f32,
}

impl Default for SkyCompositorConfig {
    fn default() -> Self {
        Self {
            resolution_ratio: 0.1,
            width_segments: 128,
            height_segments: 64,
            sun_distance: 1000.0,
        }
    }
}

/// Per-frame inputs from the day/sun simulation and the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyFrame {
    /// Cyclic day progress in `[0, 1)`.
    pub day_progress: f32,
    /// Unit direction toward the sun.
    pub sun_position: Vec3,
    pub player_position: Vec3,
}

/// Renders a private sky scene into a small offscreen target every frame.
///
/// The target's colour texture is shown by a background quad in the main
/// scene and is also meant as the fog input of the terrain program. The sun
/// disc lives in the main scene at world scale.
pub struct SkyCompositor {
    scene: Scene,
    camera: Camera,
    target: RenderTarget,
    resolution_ratio: f32,
    shading: SkyShading,
    dome: SkyDome,
    sun_disc: SunDisc,
    background: SkyBackground,
}

impl SkyCompositor {
    pub fn new(
        device: &mut dyn RenderDevice,
        main_scene: &mut Scene,
        main_camera: &Camera,
        viewport: (u32, u32),
        config: &SkyCompositorConfig,
        parameters: &SkyParameters,
    ) -> Result<Self, SkyError> {
        let ratio = config.resolution_ratio;
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(SkyError::ResolutionRatio(ratio));
        }
        let shading = SkyShading::from_parameters(parameters)?;

        let (width, height) = scaled_extent(viewport.0, viewport.1, ratio);
        let target =
            device.create_render_target(&RenderTargetDescriptor::new("sky", width, height));

        let camera = Camera {
            position: Vec3::ZERO,
            ..main_camera.clone()
        };
        let mut scene = Scene::new();
        let dome = SkyDome::new(
            device,
            &mut scene,
            config.width_segments,
            config.height_segments,
        )?;
        let sun_disc = SunDisc::new(device, main_scene, config.sun_distance)?;
        let background = SkyBackground::new(device, main_scene, target.texture)?;

        tracing::info!(
            "Sky compositor ready: {width}x{height} target ({ratio}x of {}x{})",
            viewport.0,
            viewport.1
        );
        Ok(Self {
            scene,
            camera,
            target,
            resolution_ratio: ratio,
            shading,
            dome,
            sun_disc,
            background,
        })
    }

    /// Colour output of the sky pass. Stable across resizes.
    pub fn texture(&self) -> TextureHandle {
        self.target.texture
    }

    pub fn target(&self) -> RenderTargetHandle {
        self.target.handle
    }

    pub fn resolution_ratio(&self) -> f32 {
        self.resolution_ratio
    }

    /// The camera of the private pass. Always at the origin.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn dome(&self) -> &SkyDome {
        &self.dome
    }

    pub fn sun_disc(&self) -> &SunDisc {
        &self.sun_disc
    }

    pub fn background(&self) -> &SkyBackground {
        &self.background
    }

    pub fn shading(&self) -> &SkyShading {
        &self.shading
    }

    /// Tunable dome parameters; written on the next [`update`](Self::update).
    pub fn shading_mut(&mut self) -> &mut SkyShading {
        &mut self.shading
    }

    pub fn update(
        &mut self,
        device: &mut dyn RenderDevice,
        main_scene: &mut Scene,
        main_camera: &Camera,
        frame: &SkyFrame,
    ) {
        let uniforms = self.shading.to_uniforms(frame.day_progress, frame.sun_position);
        self.dome.write_uniforms(device, &uniforms);

        self.sun_disc
            .update(main_scene, frame.player_position, frame.sun_position);

        // Orientation only: the dome is rendered as if infinitely far away.
        self.camera.rotation = main_camera.rotation;

        device.render(&self.scene, &self.camera, self.target.handle);
    }

    /// Track a new viewport size. Zero-area sizes are passed through.
    pub fn resize(&mut self, device: &mut dyn RenderDevice, width: u32, height: u32) {
        let (target_width, target_height) = scaled_extent(width, height, self.resolution_ratio);
        device.resize_render_target(self.target.handle, target_width, target_height);
        self.camera.set_aspect_ratio(width, height);
        tracing::debug!("Sky target resized to {target_width}x{target_height}");
    }

    /// Regenerate the dome at a new resolution.
    pub fn rebuild_sphere(
        &mut self,
        device: &mut dyn RenderDevice,
        width_segments: u32,
        height_segments: u32,
    ) -> Result<(), SkyError> {
        self.dome
            .rebuild(device, &mut self.scene, width_segments, height_segments)
    }

    /// Free everything, including the main-scene sun disc and background.
    pub fn dispose(&mut self, device: &mut dyn RenderDevice, main_scene: &mut Scene) {
        self.dome.dispose(device, &mut self.scene);
        self.sun_disc.dispose(device, main_scene);
        self.background.dispose(device, main_scene);
    }
}
