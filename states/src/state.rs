use std::any::{Any, type_name};
use std::fmt::Debug;

use log::warn;

/// A value owned by [`crate::StateCtx`] and mutated only through it.
///
/// Inputs and configuration are states. Commands never see a live state,
/// they read the clone returned by [`State::snapshot`].
pub trait State: Any + Debug {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Clone handed to commands. `None` keeps the state out of command snapshots.
    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    /// Replace `self` with a value published through an [`crate::Updater`].
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Default body for [`State::assign_box`].
pub fn state_assign_impl<T: State>(target: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *target = *value,
        Err(_) => warn!("Ignoring update with mismatched type for {}", type_name::<T>()),
    }
}
