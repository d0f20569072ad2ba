//! Pulsefield - a grid of points that pulse sound and light
//!
//! Each point repeats a short clip on its own cycle and flashes when it
//! fires. Move the pointer over the ground to move where you listen from;
//! click or press Space to start.

use clap::Parser;
use glam::Vec2;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use pulsefield::audio::{self, AudioSystem, ClipReadiness};
use pulsefield::camera::CameraSystem;
use pulsefield::cli::Args;
use pulsefield::grid;
use pulsefield::params::{CameraParams, RenderConfig, SpatialParams};
use pulsefield::rendering::{
    helper_line_vertices, CubeNode, Instance, LineVertex, RenderSystem, Uniforms,
};
use pulsefield::scene::{AudioPlayer, NullAudioPlayer};
use pulsefield::simulation::Simulation;
use pulsefield::stats::FrameStats;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    camera: CameraSystem,
    render_config: RenderConfig,
    helper_lines: Vec<LineVertex>,

    // Scene nodes, one per point plus the listener marker
    point_nodes: Vec<CubeNode>,
    marker: CubeNode,

    // Simulation and audio
    simulation: Simulation,
    audio: Box<dyn AudioPlayer>,
    clip_readiness: ClipReadiness,

    // Time tracking
    start_time: Instant,
    stats: FrameStats,
}

impl App {
    fn new(args: &Args) -> Result<Self, Box<dyn std::error::Error>> {
        let grid_params = args.grid_params()?;
        let simulation = Simulation::new(&grid_params, &args.simulation_params())?;

        // Clip loads in the background; the first frames run without it
        let clip_readiness = audio::spawn_load(&args.clip);

        let audio: Box<dyn AudioPlayer> = match AudioSystem::new(SpatialParams::default()) {
            Ok(system) => Box::new(system),
            Err(e) => {
                log::warn!("Audio output unavailable ({}), running silent", e);
                Box::new(NullAudioPlayer)
            }
        };

        let render_config = RenderConfig::default();
        let point_nodes = simulation
            .points()
            .iter()
            .map(|p| CubeNode::point(p.position(), grid_params.point_size_m, &render_config))
            .collect();
        let marker = CubeNode::marker(simulation.listening_point(), &render_config);
        let helper_lines =
            helper_line_vertices(&grid::helper_lines(&grid_params), &render_config);
        let camera = CameraSystem::new(
            CameraParams::default(),
            render_config.window_width,
            render_config.window_height,
        );

        log::info!(
            "{} points on a {}m grid",
            simulation.points().len(),
            grid_params.extent_m
        );

        let mut app = Self {
            window: None,
            render_system: None,
            camera,
            render_config,
            helper_lines,
            point_nodes,
            marker,
            simulation,
            audio,
            clip_readiness,
            start_time: Instant::now(),
            stats: FrameStats::new(),
        };

        // Sync audio listener and marker with the initial listening point
        let origin = app.simulation.listening_point();
        app.simulation
            .set_listening_point(origin, &mut *app.audio, &mut app.marker);

        Ok(app)
    }

    /// Start gesture; only honored once the clip load has resolved
    fn request_start(&mut self) {
        if self.simulation.is_running() {
            return;
        }
        if !self.clip_readiness.is_resolved() {
            log::info!("Audio still loading, start ignored");
            return;
        }
        self.simulation.start();
    }

    fn move_listener(&mut self, cursor: Vec2) {
        let Some(ref render_system) = self.render_system else {
            return;
        };
        if let Some(hit) = self.camera.pick_ground(cursor, render_system.size()) {
            self.simulation
                .set_listening_point(hit, &mut *self.audio, &mut self.marker);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.update_size(width, height);
        if let Some(ref mut render_system) = self.render_system {
            render_system.resize(width, height);
        }
    }

    fn poll_clip(&mut self) {
        match self.clip_readiness.poll() {
            Some(Ok(clip)) => {
                self.simulation.set_clip(clip);
                log::info!("Audio ready: click or press Space to start");
            }
            Some(Err(e)) => {
                log::warn!("Pulses will stay silent: {}", e);
                log::info!("Click or press Space to start");
            }
            None => {}
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Pulsefield")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        // One instance per point plus the marker
        let capacity = self.point_nodes.len() + 1;
        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            capacity,
            &self.helper_lines,
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                log::error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = render_system.size();
        self.camera.update_size(width, height);

        self.window = Some(window);
        self.render_system = Some(render_system);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::Space => self.request_start(),
                _ => {}
            },
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.request_start(),
            WindowEvent::CursorMoved { position, .. } => {
                self.move_listener(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

impl App {
    /// Advance the simulation and render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_clip();

        let now_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        self.simulation
            .frame(now_ms, &mut *self.audio, &mut self.point_nodes);

        let Some(ref mut render_system) = self.render_system else {
            return;
        };

        render_system.update_uniforms(&Uniforms {
            view_proj: self.camera.view_proj().to_cols_array_2d(),
        });

        let instances: Vec<Instance> = self
            .point_nodes
            .iter()
            .map(|node| node.instance)
            .chain(std::iter::once(self.marker.instance))
            .collect();
        render_system.update_instances(&instances);

        match render_system.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = render_system.size();
                render_system.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        self.stats.record_frame(Instant::now());
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(args)?;
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Pulsefield - spatialized pulse grid");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
