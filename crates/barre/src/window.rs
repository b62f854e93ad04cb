//! The live window: winit event loop plus a software surface the
//! coordinator's frames are presented on.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context as _};
use barre_engine::EngineError;
use crossbeam_channel::{unbounded, Sender};
use tracing::{debug, error, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes};

use crate::coordinator::{Coordinator, Shared};
use crate::msg::{Modifiers, Msg};
use crate::reader;

/// Wake-ups delivered from the coordinator thread into the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    /// The shared frame holds a fresh paint.
    Repaint,
    /// The coordinator stopped on a fatal error.
    Shutdown,
}

pub struct LiveOptions {
    pub width: Option<u32>,
    pub height: u32,
    pub title: String,
    pub dock: bool,
}

/// Run the bar in a window until quit. Returns whether the quit key was
/// used, which maps to a failing exit status.
pub fn run(opts: LiveOptions) -> anyhow::Result<bool> {
    let event_loop = EventLoop::<UserEvent>::with_user_event()
        .build()
        .context("creating event loop")?;
    let proxy = event_loop.create_proxy();

    let width = opts.width.unwrap_or(800);
    let height = opts.height;
    let shared = Shared::new(width, height);
    let (tx, rx) = unbounded();

    // Never joined: it may sit in a blocking stdin read past shutdown.
    reader::spawn(Arc::clone(&shared), tx.clone()).context("spawning reader")?;

    let coordinator = {
        let shared = Arc::clone(&shared);
        let repaint = proxy.clone();
        let fail = proxy.clone();
        thread::Builder::new()
            .name("coordinator".to_string())
            .spawn(move || {
                let mut coordinator = Coordinator::new(
                    shared,
                    rx,
                    width,
                    height,
                    Box::new(move || {
                        let _ = repaint.send_event(UserEvent::Repaint);
                    }),
                );
                let result = coordinator.run();
                if result.is_err() {
                    let _ = fail.send_event(UserEvent::Shutdown);
                }
                result
            })
            .context("spawning coordinator")?
    };

    let mut app = App {
        shared,
        tx: tx.clone(),
        opts,
        window: None,
        _context: None,
        surface: None,
        cursor: (0.0, 0.0),
        modifiers: Modifiers::empty(),
        quit_key: false,
    };
    event_loop.run_app(&mut app).context("event loop")?;

    let _ = tx.send(Msg::Exit);
    let result: Result<(), EngineError> = coordinator
        .join()
        .map_err(|_| anyhow!("coordinator thread panicked"))?;
    result?;
    Ok(app.quit_key)
}

struct App {
    shared: Arc<Shared>,
    tx: Sender<Msg>,
    opts: LiveOptions,
    window: Option<Arc<Window>>,
    // The context owns the display connection; it must outlive the
    // surface.
    _context: Option<softbuffer::Context<Arc<Window>>>,
    surface: Option<softbuffer::Surface<Arc<Window>, Arc<Window>>>,
    cursor: (f32, f32),
    modifiers: Modifiers,
    quit_key: bool,
}

impl App {
    fn attributes(&self, event_loop: &ActiveEventLoop) -> WindowAttributes {
        // No explicit width means span the monitor, as a bar should.
        let width = self
            .opts
            .width
            .or_else(|| event_loop.primary_monitor().map(|m| m.size().width))
            .unwrap_or(800);
        let size = PhysicalSize::new(width, self.opts.height);
        #[allow(unused_mut)]
        let mut attrs = WindowAttributes::default()
            .with_title(self.opts.title.clone())
            .with_inner_size(size)
            .with_resizable(true);
        #[cfg(target_os = "linux")]
        if self.opts.dock {
            use winit::platform::x11::{WindowAttributesExtX11, WindowType};
            attrs = attrs.with_x11_window_type(vec![WindowType::Dock]);
        }
        attrs
    }

    fn present(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let frame = self.shared.frame.lock();
        let (w, h) = (frame.width(), frame.height());
        let (Some(nw), Some(nh)) = (NonZeroU32::new(w), NonZeroU32::new(h)) else {
            return;
        };
        if surface.resize(nw, nh).is_err() {
            warn!("surface resize failed");
            return;
        }
        match surface.buffer_mut() {
            Ok(mut buffer) => {
                if buffer.len() == frame.pixels().len() {
                    buffer.copy_from_slice(frame.pixels());
                }
                if let Err(err) = buffer.present() {
                    warn!("present failed: {err}");
                }
            }
            Err(err) => warn!("no surface buffer: {err}"),
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(self.attributes(event_loop)) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("creating window: {err}");
                event_loop.exit();
                return;
            }
        };
        let context = match softbuffer::Context::new(Arc::clone(&window)) {
            Ok(context) => context,
            Err(err) => {
                error!("creating surface context: {err}");
                event_loop.exit();
                return;
            }
        };
        match softbuffer::Surface::new(&context, Arc::clone(&window)) {
            Ok(surface) => {
                self.surface = Some(surface);
                self._context = Some(context);
            }
            Err(err) => {
                error!("creating surface: {err}");
                event_loop.exit();
                return;
            }
        }

        let size = window.inner_size();
        let _ = self.tx.send(Msg::Resized {
            width: size.width,
            height: size.height,
        });
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                let _ = self.tx.send(Msg::Exit);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                debug!(width = size.width, height = size.height, "resized");
                let _ = self.tx.send(Msg::Resized {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::RedrawRequested => {
                self.present();
                let _ = self.tx.send(Msg::Paint);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                let mut mods = Modifiers::empty();
                mods.set(Modifiers::SHIFT, state.shift_key());
                mods.set(Modifiers::CTRL, state.control_key());
                mods.set(Modifiers::ALT, state.alt_key());
                mods.set(Modifiers::SUPER, state.super_key());
                self.modifiers = mods;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => {
                let button = match button {
                    MouseButton::Left => 1,
                    MouseButton::Middle => 2,
                    MouseButton::Right => 3,
                    MouseButton::Back => 8,
                    MouseButton::Forward => 9,
                    MouseButton::Other(n) => n as u8,
                };
                let _ = self.tx.send(Msg::ButtonPress {
                    x: self.cursor.0,
                    y: self.cursor.1,
                    button,
                    modifiers: self.modifiers,
                });
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        logical_key,
                        ..
                    },
                ..
            } => {
                let quit = matches!(&logical_key, Key::Named(NamedKey::Escape))
                    || matches!(&logical_key, Key::Character(c) if c == "q");
                if quit {
                    self.quit_key = true;
                    let _ = self.tx.send(Msg::Exit);
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Repaint => self.present(),
            UserEvent::Shutdown => event_loop.exit(),
        }
    }
}
