//! The coordinator thread: drains the message channel, re-evaluates the
//! pending operations into fresh Action generations, renders them and
//! serves hit tests.

use std::sync::Arc;

use barre_engine::{evaluate, hit_test, paint, CosmicSizer, Frame};
use barre_engine::{Action, EngineError, ImageCache};
use barre_markup::{Color, Op};
use crossbeam_channel::{Receiver, TryRecvError};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error};

use crate::msg::{Modifiers, Msg};

/// State shared across the reader, coordinator and window threads. Each
/// buffer carries its own lock, scoped to its own critical sections.
pub struct Shared {
    /// Operations for the most recent input line, written by the reader.
    pub ops: Mutex<Vec<Op>>,
    /// The published Action generation, replaced atomically per
    /// evaluation pass.
    pub actions: RwLock<Vec<Action>>,
    /// Rendered pixels for the window thread to present.
    pub frame: Mutex<Frame>,
}

impl Shared {
    pub fn new(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self {
            ops: Mutex::new(Vec::new()),
            actions: RwLock::new(Vec::new()),
            frame: Mutex::new(Frame::new(width, height)),
        })
    }
}

type HitFn = Box<dyn FnMut(&str, u8, Modifiers) + Send>;

pub struct Coordinator {
    shared: Arc<Shared>,
    rx: Receiver<Msg>,
    width: f32,
    height: f32,
    background: Color,
    sizer: CosmicSizer,
    images: ImageCache,
    /// Set by `NewInput`/`Resized`; cleared when a fresh generation is
    /// published. Coalesces bursts into one evaluation.
    dirty: bool,
    evaluations: u64,
    /// Wakes the window thread after the shared frame was repainted.
    notify: Box<dyn Fn() + Send>,
    on_hit: HitFn,
}

impl Coordinator {
    pub fn new(
        shared: Arc<Shared>,
        rx: Receiver<Msg>,
        width: u32,
        height: u32,
        notify: Box<dyn Fn() + Send>,
    ) -> Self {
        Self {
            shared,
            rx,
            width: width as f32,
            height: height as f32,
            background: Color::BLACK,
            sizer: CosmicSizer::new(),
            images: ImageCache::new(),
            dirty: false,
            evaluations: 0,
            notify,
            on_hit: Box::new(|name, button, modifiers| {
                println!("{name} {button} {modifiers}");
            }),
        }
    }

    /// Replace the hit reporter (the default prints to stdout).
    pub fn with_on_hit(mut self, on_hit: HitFn) -> Self {
        self.on_hit = on_hit;
        self
    }

    /// Completed evaluation passes, for observing coalescing.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Dispatch messages until `Exit`, a fatal error, or channel
    /// disconnect.
    pub fn run(&mut self) -> Result<(), EngineError> {
        loop {
            let first = match self.rx.recv() {
                Ok(msg) => msg,
                Err(_) => return Ok(()),
            };
            let mut repaint = false;
            let mut msg = Some(first);
            // Drain whatever queued up behind the first message so a
            // burst of input lines costs one evaluation and one paint.
            loop {
                match msg {
                    Some(Msg::NewInput) => {
                        self.dirty = true;
                        repaint = true;
                    }
                    Some(Msg::Resized { width, height }) => {
                        self.width = width as f32;
                        self.height = height as f32;
                        self.dirty = true;
                        repaint = true;
                    }
                    Some(Msg::Paint) => repaint = true,
                    Some(Msg::ButtonPress {
                        x,
                        y,
                        button,
                        modifiers,
                    }) => {
                        self.ensure_current()?;
                        let actions = self.shared.actions.read();
                        for name in hit_test(&actions, x, y) {
                            debug!(name, button, "hit");
                            (self.on_hit)(name, button, modifiers);
                        }
                    }
                    Some(Msg::Exit) => return Ok(()),
                    Some(Msg::Fatal(err)) => {
                        error!("{err}");
                        return Err(err.into());
                    }
                    None => break,
                }
                msg = match self.rx.try_recv() {
                    Ok(next) => Some(next),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => None,
                };
            }
            if repaint {
                self.ensure_current()?;
                self.render();
                (self.notify)();
            }
        }
    }

    /// Publish a fresh generation if the pending operations or bar size
    /// changed since the last pass.
    fn ensure_current(&mut self) -> Result<(), EngineError> {
        if !self.dirty {
            return Ok(());
        }
        let ops = self.shared.ops.lock().clone();
        let actions = evaluate(
            &ops,
            self.width,
            self.height,
            &mut self.sizer,
            &mut self.images,
        )?;
        *self.shared.actions.write() = actions;
        self.evaluations += 1;
        self.dirty = false;
        debug!(generation = self.evaluations, "published");
        Ok(())
    }

    fn render(&mut self) {
        let actions = self.shared.actions.read();
        let mut frame = self.shared.frame.lock();
        let (w, h) = (self.width as u32, self.height as u32);
        if frame.width() != w || frame.height() != h {
            frame.resize(w, h);
        }
        paint(&mut frame, &actions, self.background, &mut self.sizer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barre_engine::{ActionKind, LineStyle, Outline, Rect};
    use barre_markup::tokenize;
    use crossbeam_channel::unbounded;

    fn coordinator(rx: Receiver<Msg>) -> Coordinator {
        let shared = Shared::new(100, 20);
        Coordinator::new(shared, rx, 100, 20, Box::new(|| {}))
    }

    #[test]
    fn test_input_burst_coalesces() {
        let (tx, rx) = unbounded();
        let mut coord = coordinator(rx);
        *coord.shared.ops.lock() = tokenize("^text{hi}").unwrap();
        for _ in 0..5 {
            tx.send(Msg::NewInput).unwrap();
        }
        tx.send(Msg::Paint).unwrap();
        drop(tx);
        coord.run().unwrap();
        assert_eq!(coord.evaluations(), 1);
    }

    #[test]
    fn test_exit_stops_dispatch() {
        let (tx, rx) = unbounded();
        let mut coord = coordinator(rx);
        tx.send(Msg::Exit).unwrap();
        tx.send(Msg::NewInput).unwrap();
        coord.run().unwrap();
        assert_eq!(coord.evaluations(), 0);
    }

    #[test]
    fn test_fatal_propagates() {
        let (tx, rx) = unbounded();
        let mut coord = coordinator(rx);
        tx.send(Msg::Fatal(barre_markup::MarkupError::MissingDelimiter {
            expected: '}',
        }))
        .unwrap();
        drop(tx);
        assert!(coord.run().is_err());
    }

    #[test]
    fn test_button_press_reports_hits() {
        let (tx, rx) = unbounded();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&hits);
        let mut coord = coordinator(rx).with_on_hit(Box::new(move |name, button, _| {
            sink.lock().push((name.to_string(), button));
        }));

        // A published generation with one clickable region, no pending
        // re-evaluation.
        *coord.shared.actions.write() = vec![Action {
            rect: Rect::new(10.0, 0.0, 20.0, 20.0),
            margin: Outline::default(),
            padding: Outline::default(),
            bg: Color::BLACK,
            name: Some("btn".to_string()),
            kind: ActionKind::Rule {
                color: Color::WHITE,
                style: LineStyle::default(),
            },
        }];

        tx.send(Msg::ButtonPress {
            x: 20.0,
            y: 10.0,
            button: 1,
            modifiers: Modifiers::empty(),
        })
        .unwrap();
        tx.send(Msg::ButtonPress {
            x: 90.0,
            y: 10.0,
            button: 1,
            modifiers: Modifiers::empty(),
        })
        .unwrap();
        drop(tx);
        coord.run().unwrap();

        assert_eq!(hits.lock().as_slice(), &[("btn".to_string(), 1)]);
    }

    #[test]
    fn test_resize_revaluates_for_paint() {
        let (tx, rx) = unbounded();
        let mut coord = coordinator(rx);
        *coord.shared.ops.lock() = tokenize("^grow{1}^rule{}").unwrap();
        tx.send(Msg::NewInput).unwrap();
        tx.send(Msg::Paint).unwrap();
        drop(tx);
        coord.run().unwrap();

        let width = coord.shared.actions.read()[0].rect.width;
        assert_eq!(width, 100.0);

        let (tx, rx) = unbounded();
        coord.rx = rx;
        tx.send(Msg::Resized {
            width: 300,
            height: 20,
        })
        .unwrap();
        tx.send(Msg::Paint).unwrap();
        drop(tx);
        coord.run().unwrap();

        let width = coord.shared.actions.read()[0].rect.width;
        assert_eq!(width, 300.0);
        assert_eq!(coord.evaluations(), 2);
    }
}
