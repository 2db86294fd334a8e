/// Terminal host for the paint3d software renderer
use crossterm::{
    cursor,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self},
};
use log::{debug, info, warn};
use paint3d_core::{Camera, Mesh, RenderMode, Renderer, Surface};
use std::io::{self, stdout, Stdout};
use std::time::{Duration, Instant};

pub mod assets;
pub mod config;
pub mod input;
pub mod renderer;

pub use assets::AssetList;
pub use config::{Config, ConfigError};
pub use input::{Command, Controls};
pub use renderer::TerminalSurface;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    assets: AssetList,
    mesh: Mesh,
    target_fps: u32,
    mode: RenderMode,
    camera: Camera,
    renderer: Renderer,
    surface: TerminalSurface<Stdout>,
    controls: Controls,
    running: bool,
    last_update: Instant,
    fps_window: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// `assets` must already have loaded `mesh` (see [`AssetList::load_first`])
    pub fn new(config: &Config, assets: AssetList, mesh: Mesh) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        let surface = TerminalSurface::new(stdout(), columns, rows);
        let camera = config.camera(surface.width(), surface.height());
        let renderer = Renderer::new(config.render_settings());
        let controls = Controls::new(
            config.input.rotation_rate,
            Duration::from_millis(config.input.hold_ms),
        );
        let now = Instant::now();

        info!("terminal {}x{} cells, starting in {} mode", columns, rows, config.render.mode);

        Ok(Self {
            assets,
            mesh,
            target_fps: config.render.target_fps,
            mode: config.render.mode,
            camera,
            renderer,
            surface,
            controls,
            running: true,
            last_update: now,
            fps_window: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.surface.writer(), terminal::EnterAlternateScreen, cursor::Hide)?;
        // Release events where the terminal supports them; others rely on the
        // hold timeout
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                self.surface.writer(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let result = self.main_loop();

        // Cleanup
        if enhanced {
            execute!(self.surface.writer(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        execute!(self.surface.writer(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_secs(1) / self.target_fps.max(1);

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::ZERO)? {
                self.handle_event(event::read()?);
            }
            if !self.running {
                break;
            }

            // Update
            self.update(frame_start);

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            let window = now - self.fps_window;
            if window >= Duration::from_secs(1) {
                self.fps = self.frame_count as f32 / window.as_secs_f32();
                self.frame_count = 0;
                self.fps_window = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                match self.controls.handle(key, Instant::now(), &self.mesh.angular) {
                    Some(Command::Quit) => self.running = false,
                    Some(Command::NextMode) => {
                        self.mode = self.mode.next();
                        debug!("render mode {}", self.mode);
                    }
                    Some(Command::NextAsset) => self.next_asset(),
                    None => {}
                }
            }
            Event::Resize(columns, rows) => {
                self.surface.resize(columns, rows);
                self.camera.aspect = self.surface.width() as f32 / self.surface.height().max(1) as f32;
                debug!("resized to {}x{} cells", columns, rows);
            }
            _ => {}
        }
    }

    /// Switches to the next configured asset, keeping the current mesh if it
    /// fails to load
    fn next_asset(&mut self) {
        match self.assets.load_next() {
            Some(Ok(mesh)) => self.mesh = mesh,
            Some(Err(e)) => {
                let path = self.assets.path_of_last_attempt().map(|p| p.display().to_string());
                warn!("keeping current mesh, failed to load {}: {}", path.unwrap_or_default(), e);
            }
            None => {}
        }
    }

    fn update(&mut self, now: Instant) {
        self.controls.expire(now, &self.mesh.angular);
        let dt = (now - self.last_update).as_secs_f32();
        self.last_update = now;
        self.mesh.update(dt);
    }

    fn render(&mut self) -> io::Result<()> {
        self.surface.set_status(format!(
            "{} | {} | FPS: {:.1} | M=Mode N=Next WASD/Arrows=Rotate Q=Quit",
            self.assets.name(),
            self.mode,
            self.fps
        ));
        self.renderer
            .render_frame(&self.mesh, &self.camera, self.mode, &mut self.surface)?;
        Ok(())
    }
}
