//! Task identity and cooperative cancellation for dispatched commands.
//!
//! Every flush of a command produces a [`TaskHandle`]. Its [`TaskId`] pairs
//! the command's `TypeId` with a generation counter that only grows, so a
//! result can be recognised as stale by comparing generations. Flushing the
//! same command again cancels the previous handle's token.

use std::any::TypeId;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    type_id: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(type_id: TypeId, generation: u64) -> Self {
        Self {
            type_id,
            generation,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Starts at 1 for the first dispatch of a command type.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A running command's identity plus its cancellation token.
///
/// Cancellation is cooperative: the task has to check
/// [`TaskHandle::is_cancelled`] or await `cancelled()` on the token,
/// typically inside `tokio::select!`.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}
