// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use web_time::{Duration, Instant};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::monitor::MonitorHandle;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::WindowBuilder;

use super::color::Rgba;
use super::geometry::{Vertex, WindowPhysicalProperties};
use super::renderer::ShapeRenderer;
use super::stimuli::Drawable;
use crate::errors::PsyshapeError;
use crate::monitors::{MonitorProfile, MonitorProfiles};
use crate::options::{Units, WindowOptions};
use crate::timing::{duration_from_secs, FrameIntervalRecorder, DEFAULT_REFRESH_RATE_HZ, SPIN_PERIOD};

#[derive(Debug)]
pub struct GPUState {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// How a wait ended, and how long it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    /// The full duration elapsed.
    Completed(Duration),
    /// The window was closed or Escape was pressed before the duration
    /// elapsed.
    Aborted(Duration),
}

impl WaitResult {
    pub fn duration(&self) -> Duration {
        match self {
            WaitResult::Completed(d) | WaitResult::Aborted(d) => *d,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, WaitResult::Aborted(_))
    }
}

/// Pick the screen at `index`. Missing indices fall back to `primary`, then
/// to the first screen.
fn select_screen<M: Clone>(screens: &[M], index: usize, primary: Option<M>) -> Option<M> {
    screens.get(index).cloned().or_else(|| {
        log::warn!(
            "Screen {} not found ({} available), using the primary screen",
            index,
            screens.len()
        );
        primary.or_else(|| screens.first().cloned())
    })
}

/// Top-left corner of a `window` sized window centred on a screen whose
/// top-left corner is at `origin`.
fn centered_position(origin: (i32, i32), screen: (u32, u32), window: (u32, u32)) -> (i32, i32) {
    let center = |origin: i32, screen: u32, window: u32| {
        let x = origin as i64 + (screen as i64 - window as i64) / 2;
        x.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    };
    (
        center(origin.0, screen.0, window.0),
        center(origin.1, screen.1, window.1),
    )
}

/// A Window represents a window on the screen. Stimuli are drawn into its back
/// buffer with [`Window::draw`] and become visible with [`Window::flip`].
pub struct Window {
    /// the winit window
    winit_window: Arc<winit::window::Window>,
    /// the wgpu surface
    surface: wgpu::Surface<'static>,
    /// the wgpu surface configuration
    config: wgpu::SurfaceConfiguration,
    gpu_state: GPUState,
    renderer: ShapeRenderer,
    profile: MonitorProfile,
    physical_properties: WindowPhysicalProperties,
    units: Units,
    bg_color: Rgba,
    /// Vertices drawn since the last flip.
    back_buffer: Vec<Vertex>,
    frame_intervals: FrameIntervalRecorder,
    mouse_visible: bool,
    closed: bool,
    event_loop: EventLoop<()>,
}

impl Window {
    /// Open a window, looking up the monitor profile named in `options` in
    /// `profiles`.
    pub fn new(options: &WindowOptions, profiles: &MonitorProfiles) -> Result<Self, PsyshapeError> {
        Self::with_profile(options, profiles.resolve(&options.monitor))
    }

    /// Open a window calibrated with `profile`. Only one window can be open
    /// per process.
    pub fn with_profile(options: &WindowOptions, profile: MonitorProfile) -> Result<Self, PsyshapeError> {
        let event_loop = EventLoop::new()?;

        let monitors: Vec<MonitorHandle> = event_loop.available_monitors().collect();
        let monitor = select_screen(&monitors, options.screen, event_loop.primary_monitor());

        let (width, height) = options.size;
        let mut builder = WindowBuilder::new()
            .with_title(options.title.as_str())
            .with_inner_size(PhysicalSize::new(width.max(1), height.max(1)))
            .with_decorations(options.allow_gui)
            .with_resizable(options.allow_gui);

        if let Some(monitor) = &monitor {
            let origin = monitor.position();
            let screen = monitor.size();
            let (x, y) = centered_position(
                (origin.x, origin.y),
                (screen.width, screen.height),
                (width, height),
            );
            builder = builder.with_position(PhysicalPosition::new(x, y));
            log::debug!(
                "Opening window on {:?} ({}x{} px)",
                monitor.name(),
                screen.width,
                screen.height
            );
        }

        let winit_window = Arc::new(builder.build(&event_loop)?);
        winit_window.focus_window();

        let instance = wgpu::Instance::default();

        log::debug!("Creating wgpu surface...");
        let surface = instance.create_surface(winit_window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or(PsyshapeError::NoSuitableAdapterError)?;

        log::debug!("Selected graphics adapter: {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // Make sure we use the texture resolution limits from the adapter, so we can support images the size of the swapchain.
                required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
            },
            None,
        ))?;

        let capabilities = surface.get_capabilities(&adapter);
        log::debug!("Supported swapchain formats: {:?}", capabilities.formats);

        // non-sRGB target: colors are stored as given
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or(PsyshapeError::NoSuitableAdapterError)?;

        let present_mode = if options.vsync {
            wgpu::PresentMode::Fifo
        } else {
            [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
                .into_iter()
                .find(|m| capabilities.present_modes.contains(m))
                .unwrap_or(wgpu::PresentMode::Fifo)
        };

        let size = winit_window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            desired_maximum_frame_latency: 2,
            alpha_mode: capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };

        log::debug!("Surface configuration: {:?}", config);
        surface.configure(&device, &config);

        let renderer = ShapeRenderer::new(&device, format);

        let display_width_px = monitor.as_ref().map(|m| m.size().width).unwrap_or(config.width);
        let physical_properties = WindowPhysicalProperties {
            width_px: config.width,
            height_px: config.height,
            pixels_per_cm: profile.pixels_per_cm(display_width_px),
            viewing_distance_cm: profile.distance_cm,
        };
        log::debug!("Using monitor profile {:?}: {:?}", profile.name, physical_properties);

        let refresh_rate_hz = monitor
            .as_ref()
            .and_then(MonitorHandle::refresh_rate_millihertz)
            .map(|mhz| mhz as f64 / 1000.0)
            .unwrap_or(DEFAULT_REFRESH_RATE_HZ);
        let mut frame_intervals = FrameIntervalRecorder::new(refresh_rate_hz);
        frame_intervals.set_enabled(options.record_frame_intervals);

        Ok(Self {
            winit_window,
            surface,
            config,
            gpu_state: GPUState {
                instance,
                adapter,
                device,
                queue,
            },
            renderer,
            profile,
            physical_properties,
            units: options.units,
            bg_color: options.color,
            back_buffer: Vec::new(),
            frame_intervals,
            mouse_visible: true,
            closed: false,
            event_loop,
        })
    }

    /// Draw a stimulus into the back buffer. It becomes visible with the next
    /// call to [`Window::flip`].
    pub fn draw(&mut self, stimulus: &(impl Drawable + ?Sized)) {
        let vertices = stimulus.to_vertices(&self.physical_properties, self.units);
        log::trace!("Drawing {} vertices", vertices.len());
        self.back_buffer.extend(vertices);
    }

    /// Present the back buffer and start a new, empty one. Returns the time
    /// of the flip.
    pub fn flip(&mut self) -> Result<Instant, PsyshapeError> {
        self.pump_events(Some(Duration::ZERO));

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.gpu_state.device, &self.config);
                self.surface.get_current_texture()?
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring the next frame, skipping flip");
                self.back_buffer.clear();
                return Ok(Instant::now());
            }
            Err(e) => return Err(e.into()),
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(
            &self.gpu_state.device,
            &self.gpu_state.queue,
            &view,
            (self.config.width, self.config.height),
            self.bg_color,
            &self.back_buffer,
        );

        self.winit_window.pre_present_notify();
        frame.present();

        let now = Instant::now();
        self.frame_intervals.record(now);
        self.back_buffer.clear();
        Ok(now)
    }

    /// Block for `secs` seconds while keeping the window responsive. Returns
    /// early if the window is closed or Escape is pressed.
    pub fn wait(&mut self, secs: f64) -> Result<WaitResult, PsyshapeError> {
        let duration = duration_from_secs(secs)?;
        let start = Instant::now();
        let deadline = start
            .checked_add(duration)
            .ok_or(PsyshapeError::InvalidDuration(secs))?;

        loop {
            if self.closed {
                return Ok(WaitResult::Aborted(start.elapsed()));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining <= SPIN_PERIOD {
                break;
            }
            self.pump_events(Some(remaining - SPIN_PERIOD));
        }

        self.pump_events(Some(Duration::ZERO));
        if self.closed {
            return Ok(WaitResult::Aborted(start.elapsed()));
        }

        spin_sleep::SpinSleeper::new(SPIN_PERIOD.as_nanos() as u32)
            .sleep(deadline.saturating_duration_since(Instant::now()));

        Ok(WaitResult::Completed(start.elapsed()))
    }

    fn pump_events(&mut self, timeout: Option<Duration>) {
        let mut events = Vec::new();
        let status = self.event_loop.pump_events(timeout, |event, _| {
            if let Event::WindowEvent { event, .. } = event {
                events.push(event);
            }
        });

        if let PumpStatus::Exit(code) = status {
            log::debug!("Event loop exited with code {}", code);
            self.closed = true;
        }

        for event in events {
            self.handle_window_event(event);
        }
    }

    fn handle_window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested");
                self.closed = true;
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && event.logical_key == Key::Named(NamedKey::Escape) {
                    log::info!("Escape pressed, closing window");
                    self.closed = true;
                }
            }
            WindowEvent::Resized(size) => self.resize(size),
            _ => {}
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        log::debug!("Window resized to {}x{}", size.width, size.height);
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.gpu_state.device, &self.config);
        self.physical_properties.width_px = size.width;
        self.physical_properties.height_px = size.height;
    }

    /// Returns true once the window was closed or Escape was pressed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(self) {
        log::debug!("Closing window");
    }

    /// Returns the size of the window in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn set_units(&mut self, units: Units) {
        self.units = units;
    }

    pub fn monitor_profile(&self) -> &MonitorProfile {
        &self.profile
    }

    pub fn physical_properties(&self) -> WindowPhysicalProperties {
        self.physical_properties
    }

    /// Set the background color used from the next flip on.
    pub fn set_color(&mut self, color: Rgba) {
        self.bg_color = color;
    }

    pub fn color(&self) -> Rgba {
        self.bg_color
    }

    pub fn set_mouse_visible(&mut self, visible: bool) {
        self.winit_window.set_cursor_visible(visible);
        self.mouse_visible = visible;
    }

    pub fn mouse_visible(&self) -> bool {
        self.mouse_visible
    }

    pub fn gpu_state(&self) -> &GPUState {
        &self.gpu_state
    }

    pub fn set_record_frame_intervals(&mut self, record: bool) {
        self.frame_intervals.set_enabled(record);
    }

    pub fn frame_intervals(&self) -> &[Duration] {
        self.frame_intervals.intervals()
    }

    pub fn frame_interval_recorder(&self) -> &FrameIntervalRecorder {
        &self.frame_intervals
    }

    /// Number of recorded frame intervals that exceeded the refresh threshold.
    pub fn dropped_frames(&self) -> usize {
        self.frame_intervals.dropped_frames()
    }

    /// Save the recorded frame intervals as CSV.
    pub fn save_frame_intervals(&self, path: impl AsRef<Path>) -> Result<(), PsyshapeError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.frame_intervals.write_csv(file)?;
        log::info!(
            "Saved {} frame intervals to {}",
            self.frame_intervals.intervals().len(),
            path.display()
        );
        Ok(())
    }
}
