use std::any::{Any, TypeId, type_name};

use flume::Sender;
use log::warn;

pub(crate) type Update = (TypeId, Box<dyn Any + Send>);

/// Publishes replacement values for states and computes.
///
/// Values are queued in send order and applied by
/// [`crate::StateCtx::sync_computes`] on the thread that owns the context.
#[derive(Debug, Clone)]
pub struct Updater {
    send: Sender<Update>,
}

impl Updater {
    pub(crate) fn new(send: Sender<Update>) -> Self {
        Self { send }
    }

    pub fn set<T: Any + Send>(&self, value: T) {
        if self.send.send((TypeId::of::<T>(), Box::new(value))).is_err() {
            warn!("State context dropped, discarding update for {}", type_name::<T>());
        }
    }

    /// Sends `value` to the state or compute `T`, whose `assign_box` decides
    /// how to merge it. Used for partial updates.
    pub fn set_for<T: Any, V: Any + Send>(&self, value: V) {
        if self.send.send((TypeId::of::<T>(), Box::new(value))).is_err() {
            warn!("State context dropped, discarding update for {}", type_name::<T>());
        }
    }
}
