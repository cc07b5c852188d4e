use std::any::{TypeId, type_name};
use std::collections::BTreeMap;

use crate::State;
use crate::ctx::ComputeEntry;

/// Read-only view of the registered values, handed to [`crate::Compute::compute`].
pub struct Dep<'a> {
    states: &'a BTreeMap<TypeId, Box<dyn State>>,
    computes: &'a BTreeMap<TypeId, ComputeEntry>,
}

impl<'a> Dep<'a> {
    pub(crate) fn new(
        states: &'a BTreeMap<TypeId, Box<dyn State>>,
        computes: &'a BTreeMap<TypeId, ComputeEntry>,
    ) -> Self {
        Self { states, computes }
    }

    /// # Panics
    /// Panics if `T` was never registered with `add_state`.
    pub fn get_state_ref<T: State>(&self) -> &'a T {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|state| state.as_any().downcast_ref::<T>())
            .unwrap_or_else(|| panic!("State {} is not registered", type_name::<T>()))
    }

    /// # Panics
    /// Panics if `T` was never registered with `record_compute`.
    pub fn get_compute_ref<T: 'static>(&self) -> &'a T {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value.as_any().downcast_ref::<T>())
            .unwrap_or_else(|| panic!("Compute {} is not registered", type_name::<T>()))
    }
}
