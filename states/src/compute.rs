use std::any::{Any, TypeId, type_name};
use std::fmt::Debug;

use log::warn;

use crate::{Dep, Updater};

/// `(state ids, compute ids)` a compute reads.
pub type ComputeDeps = (Vec<TypeId>, Vec<TypeId>);

/// A value derived from other states and computes.
///
/// `compute` never mutates anything directly: it publishes the new value
/// through the [`Updater`] and [`crate::StateCtx::sync_computes`] applies it.
///
/// A compute with no deps and a no-op `compute` is a plain cache that only
/// commands write to.
pub trait Compute: Any + Debug {
    fn deps(&self) -> ComputeDeps;

    fn compute(&self, deps: Dep<'_>, updater: Updater);

    fn as_any(&self) -> &dyn Any;

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Default body for [`Compute::assign_box`].
pub fn assign_impl<T: Compute>(target: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *target = *value,
        Err(_) => warn!("Ignoring update with mismatched type for {}", type_name::<T>()),
    }
}
