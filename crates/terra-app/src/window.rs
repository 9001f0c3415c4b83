//! Window creation and event handling via winit.
//!
//! The window is the mount target. [`ViewerApp`] mounts one renderer when the
//! event loop resumes, forwards size changes, draws on every redraw request and
//! disposes the renderer before the loop exits.

use std::sync::Arc;

use terra_config::Config;
use tracing::{error, info, instrument};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::backend::{BackendSettings, WgpuFactory, WindowContainer};
use crate::viewport::{RendererHandle, ViewportHost};

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
        .with_transparent(true)
}

/// Application state for the viewer window.
pub struct ViewerApp {
    window: Option<Arc<Window>>,
    host: ViewportHost<WgpuFactory>,
    handle: Option<RendererHandle>,
}

impl ViewerApp {
    pub fn new(config: Config) -> Self {
        let factory = WgpuFactory::new(BackendSettings::from_config(&config));
        Self {
            window: None,
            host: ViewportHost::new(factory, config),
            handle: None,
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(handle) = self.handle.take() {
            self.host.dispose(handle);
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(self.host.config());
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match self.host.mount(&WindowContainer::new(Arc::clone(&window))) {
            Ok(handle) => {
                self.handle = Some(handle);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!("Renderer initialization failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(handle) = self.handle else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                self.host.resize(handle, new_size.width, new_size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    if self.host.resize(handle, size.width, size.height) {
                        info!(
                            "Scale factor changed to {scale_factor:.2}, resized to {}x{}",
                            size.width, size.height
                        );
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.host.frame(handle);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(handle) = self.handle.take() {
            self.host.dispose(handle);
        }
    }
}

/// Creates an event loop and runs the viewer until the window closes.
#[instrument(skip(config))]
pub fn run_with_config(config: Config) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = ViewerApp::new(config);
    event_loop.run_app(&mut app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_attributes_from_config() {
        let mut config = Config::default();
        config.window.title = "Earth".to_string();
        config.window.width = 640;
        config.window.height = 480;
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Earth");
        assert_eq!(
            attrs.inner_size,
            Some(winit::dpi::Size::Logical(winit::dpi::LogicalSize::new(
                640.0, 480.0
            )))
        );
        assert!(attrs.transparent);
    }

    #[test]
    fn test_new_app_has_nothing_mounted() {
        let app = ViewerApp::new(Config::default());
        assert!(app.window.is_none());
        assert!(app.handle.is_none());
        assert_eq!(app.host.mounted_count(), 0);
    }
}
