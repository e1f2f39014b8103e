//! Per-frame orchestration of terrain, sky and the orbit camera.

use glam::Vec3;
use vista_config::{CameraConfig, Config, SkyConfig};
use vista_player::{OrbitCamera, OrbitCameraConfig, PointerSnapshot};
use vista_render::{
    Camera, RenderDevice, RenderTarget, RenderTargetDescriptor, RenderTargetHandle, Scene,
};
use vista_sky::{SkyCompositor, SkyCompositorConfig, SkyFrame, SkyParameters};
use vista_terrain::{
    TerrainChunkSet, TerrainEventReceiver, TerrainGradient, TerrainSetConfig, TopologyQuery,
};

use crate::error::AppError;

/// Everything the frame pipeline reads from the outside world.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInputs {
    pub player_position: Vec3,
    pub pointer: PointerSnapshot,
    /// Cyclic day progress in `[0, 1)`.
    pub day_progress: f32,
    /// Unit direction toward the sun.
    pub sun_direction: Vec3,
}

/// What happened during one [`WorldRenderer::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub terrain_events: usize,
}

pub fn sky_parameters(config: &SkyConfig) -> SkyParameters {
    SkyParameters {
        color_day_low: config.color_day_low.clone(),
        color_day_high: config.color_day_high.clone(),
        color_night_low: config.color_night_low.clone(),
        color_night_high: config.color_night_high.clone(),
        color_sun: config.color_sun.clone(),
        color_dawn: config.color_dawn.clone(),
        atmosphere_elevation: config.atmosphere_elevation,
        atmosphere_power: config.atmosphere_power,
        dawn_angle_amplitude: config.dawn_angle_amplitude,
        dawn_elevation_amplitude: config.dawn_elevation_amplitude,
        sun_amplitude: config.sun_amplitude,
        sun_multiplier: config.sun_multiplier,
    }
}

pub fn orbit_camera_config(config: &CameraConfig) -> OrbitCameraConfig {
    OrbitCameraConfig {
        distance: config.distance,
        phi: config.phi,
        theta: config.theta,
        above_offset: config.above_offset,
        phi_min: config.phi_min,
        phi_max: config.phi_max,
        sensitivity: config.sensitivity,
        ground_clearance: config.ground_clearance,
    }
}

/// Owns the main scene and camera and runs the frame in a fixed order:
/// terrain events, orbit camera, terrain uniforms, sky pass, main pass.
pub struct WorldRenderer {
    scene: Scene,
    camera: Camera,
    frame_target: RenderTarget,
    viewport: (u32, u32),
    sky: SkyCompositor,
    terrain: TerrainChunkSet,
    orbit: OrbitCamera,
    frame: u64,
}

impl WorldRenderer {
    pub fn new(
        device: &mut dyn RenderDevice,
        config: &Config,
        terrain_events: TerrainEventReceiver,
    ) -> Result<Self, AppError> {
        let viewport = (config.window.width, config.window.height);
        let render = &config.render;

        let mut camera = Camera::perspective(
            render.fov_y_degrees.to_radians(),
            1.0,
            render.near,
            render.far,
        );
        camera.set_aspect_ratio(viewport.0, viewport.1);

        let frame_target = device.create_render_target(&RenderTargetDescriptor::new(
            "frame",
            viewport.0,
            viewport.1,
        ));

        let mut scene = Scene::new();
        let sky = SkyCompositor::new(
            device,
            &mut scene,
            &camera,
            viewport,
            &SkyCompositorConfig {
                resolution_ratio: render.sky_resolution_ratio,
                width_segments: render.sky_width_segments,
                height_segments: render.sky_height_segments,
                sun_distance: render.sun_distance,
            },
            &sky_parameters(&config.sky),
        )?;
        let terrain = TerrainChunkSet::new(
            device,
            terrain_events,
            &TerrainSetConfig {
                segments: render.terrain_segments,
                grass_distance: render.grass_distance,
                wireframe: render.wireframe,
                gradient: TerrainGradient::default(),
            },
            sky.texture(),
        )?;

        let mut orbit = OrbitCamera::new(orbit_camera_config(&config.camera));
        orbit.activate();

        tracing::info!("World renderer ready at {}x{}", viewport.0, viewport.1);
        Ok(Self {
            scene,
            camera,
            frame_target,
            viewport,
            sky,
            terrain,
            orbit,
            frame: 0,
        })
    }

    /// Run one frame. Chunk creation and disposal happen here, before any
    /// draw of this frame.
    pub fn tick<Q: TopologyQuery + ?Sized>(
        &mut self,
        device: &mut dyn RenderDevice,
        inputs: &FrameInputs,
        topology: &Q,
    ) -> FrameReport {
        let terrain_events = self.terrain.drain_events(device, &mut self.scene);

        self.orbit
            .update(&inputs.pointer, inputs.player_position, topology);
        self.orbit.pose().apply_to(&mut self.camera);

        self.terrain
            .update(device, inputs.player_position, inputs.sun_direction);

        self.sky.update(
            device,
            &mut self.scene,
            &self.camera,
            &SkyFrame {
                day_progress: inputs.day_progress,
                sun_position: inputs.sun_direction,
                player_position: inputs.player_position,
            },
        );

        device.render(&self.scene, &self.camera, self.frame_target.handle);

        self.frame += 1;
        FrameReport {
            frame: self.frame,
            terrain_events,
        }
    }

    /// Track a new viewport size: main camera aspect, frame target and sky
    /// target.
    pub fn resize(&mut self, device: &mut dyn RenderDevice, width: u32, height: u32) {
        self.viewport = (width, height);
        self.camera.set_aspect_ratio(width, height);
        device.resize_render_target(self.frame_target.handle, width, height);
        self.sky.resize(device, width, height);
        tracing::debug!("Viewport resized to {width}x{height}");
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn frame_target(&self) -> RenderTargetHandle {
        self.frame_target.handle
    }

    pub fn terrain(&self) -> &TerrainChunkSet {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut TerrainChunkSet {
        &mut self.terrain
    }

    pub fn sky(&self) -> &SkyCompositor {
        &self.sky
    }

    pub fn sky_mut(&mut self) -> &mut SkyCompositor {
        &mut self.sky
    }

    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitCamera {
        &mut self.orbit
    }

    /// Release every resource this renderer created.
    pub fn dispose(&mut self, device: &mut dyn RenderDevice) {
        self.terrain.dispose(device, &mut self.scene);
        self.sky.dispose(device, &mut self.scene);
    }
}
