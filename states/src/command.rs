use std::any::Any;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use crate::{CommandSnapshot, TaskHandle, Updater};

pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A side effect that only runs when explicitly dispatched.
///
/// Network IO belongs here, never in a [`crate::Compute`], because computes
/// run implicitly whenever their deps change.
///
/// `run` is called on the context's thread and must not block; the returned
/// future is spawned as a task. `task` identifies this run (its generation
/// grows with every dispatch of the same command type) and carries the
/// cancellation token that is fired when a newer run of the same command is
/// flushed.
pub trait Command: Any + Debug {
    fn run(&self, snap: CommandSnapshot, updater: Updater, task: TaskHandle) -> CommandFuture;
}
