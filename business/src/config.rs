use qrgen_states::{State, state_assign_impl};
use std::any::Any;
use ustr::Ustr;

pub const DEFAULT_SERVICE_BASE_URL: &str = "https://api.qrserver.com";
const CREATE_QR_PATH: &str = "/v1/create-qr-code/";

/// Where QR images are requested from.
#[derive(Debug, Clone)]
pub struct QrServiceConfig {
    pub service_base_url: String,
}

impl QrServiceConfig {
    pub fn new(base_url: String) -> Self {
        Self {
            service_base_url: base_url,
        }
    }

    pub fn endpoint(&self) -> Ustr {
        let base = self.service_base_url.trim_end_matches('/');
        Ustr::from(&format!("{base}{CREATE_QR_PATH}"))
    }
}

impl Default for QrServiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_BASE_URL.to_owned())
    }
}

impl State for QrServiceConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send + 'static>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
