use std::any::Any;

use qrgen_states::{State, state_assign_impl};

use crate::qr_request::{DEFAULT_MARGIN, DEFAULT_SIZE, EccLevel};

/// Raw form values, exactly as typed.
///
/// Numeric fields stay text so the Request Builder owns coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrInput {
    pub text: String,
    pub size: String,
    pub margin: String,
    pub ecc: EccLevel,
}

impl Default for QrInput {
    fn default() -> Self {
        Self {
            text: String::new(),
            size: DEFAULT_SIZE.to_string(),
            margin: DEFAULT_MARGIN.to_string(),
            ecc: EccLevel::default(),
        }
    }
}

impl State for QrInput {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
