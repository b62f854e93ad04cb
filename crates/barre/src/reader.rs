//! The input thread: reads markup lines from stdin, repopulates the
//! pending-operations buffer and notifies the coordinator.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use barre_markup::tokenize;
use crossbeam_channel::Sender;
use tracing::{debug, error};

use crate::coordinator::Shared;
use crate::msg::Msg;

/// Spawn the reader thread.
///
/// The thread exits on end of input or when the channel closes. On a
/// parse error it forwards `Msg::Fatal` and stops. The handle is never
/// joined at shutdown since the thread may be parked in a blocking read.
pub fn spawn(shared: Arc<Shared>, tx: Sender<Msg>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("reader".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        error!("stdin: {err}");
                        break;
                    }
                };
                match tokenize(&line) {
                    Ok(ops) => {
                        debug!(ops = ops.len(), "line");
                        *shared.ops.lock() = ops;
                        if tx.send(Msg::NewInput).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(Msg::Fatal(err));
                        break;
                    }
                }
            }
        })
}
