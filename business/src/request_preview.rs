use std::any::{Any, TypeId};

use log::debug;
use qrgen_states::{Compute, ComputeDeps, Dep, Updater, assign_impl};

use crate::config::QrServiceConfig;
use crate::qr_input::QrInput;
use crate::qr_request::build;

/// The URL Generate would request for the current form, `None` while the
/// text is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPreviewCompute {
    pub url: Option<String>,
}

impl Compute for RequestPreviewCompute {
    fn deps(&self) -> ComputeDeps {
        (
            vec![TypeId::of::<QrInput>(), TypeId::of::<QrServiceConfig>()],
            Vec::new(),
        )
    }

    fn compute(&self, deps: Dep<'_>, updater: Updater) {
        let config = deps.get_state_ref::<QrServiceConfig>();
        let input = deps.get_state_ref::<QrInput>();
        let url = match build(config.endpoint().as_str(), input) {
            Ok(descriptor) => Some(descriptor.as_str().to_owned()),
            Err(err) => {
                debug!("No request preview: {err}");
                None
            }
        };
        updater.set(Self { url });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}
