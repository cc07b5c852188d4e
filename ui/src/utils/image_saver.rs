//! Persisting the live QR image under its download name.
//!
//! Saving is behind the [`ImageSaver`] trait so tests can inject a recording
//! saver instead of a system dialog.
//!
//! # Platform Support
//!
//! - **Native**: a save dialog via `rfd`, pre-filled with the file name.
//! - **Web (WASM)**: a Blob object URL clicked through a temporary anchor
//!   with a `download` attribute, revoked right after.

use qrgen_business::ResourceHandle;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Where the file went, as shown in logs.
    Saved(String),
    /// The user dismissed the dialog.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("failed to write {path}: {message}")]
    Io { path: String, message: String },

    #[error("browser refused the download: {0}")]
    Browser(String),
}

pub trait ImageSaver {
    fn save(&self, file_name: &str, resource: &ResourceHandle) -> Result<SaveOutcome, SaveError>;
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct SystemImageSaver;

#[cfg(not(target_arch = "wasm32"))]
impl ImageSaver for SystemImageSaver {
    fn save(&self, file_name: &str, resource: &ResourceHandle) -> Result<SaveOutcome, SaveError> {
        use rfd::FileDialog;

        let Some(path) = FileDialog::new()
            .set_title("Save QR code")
            .set_file_name(file_name)
            .add_filter("PNG image", &["png"])
            .save_file()
        else {
            log::debug!("Save dialog dismissed");
            return Ok(SaveOutcome::Cancelled);
        };

        std::fs::write(&path, resource.bytes()).map_err(|e| SaveError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        log::info!("Saved {} to {:?}", resource.locator(), path);
        Ok(SaveOutcome::Saved(path.display().to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct SystemImageSaver;

#[cfg(target_arch = "wasm32")]
impl ImageSaver for SystemImageSaver {
    fn save(&self, file_name: &str, resource: &ResourceHandle) -> Result<SaveOutcome, SaveError> {
        use wasm_bindgen::JsCast as _;
        use web_sys::js_sys::{Array, Uint8Array};
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let browser = |e: wasm_bindgen::JsValue| SaveError::Browser(format!("{e:?}"));

        let parts = Array::of1(&Uint8Array::from(resource.bytes()));
        let options = BlobPropertyBag::new();
        options.set_type(resource.content_type());
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(browser)?;
        let object_url = Url::create_object_url_with_blob(&blob).map_err(browser)?;

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| SaveError::Browser("no document".to_owned()))?;
        let anchor = document
            .create_element("a")
            .map_err(browser)?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| SaveError::Browser("anchor is not an HtmlAnchorElement".to_owned()))?;
        anchor.set_href(&object_url);
        anchor.set_download(file_name);
        anchor.click();

        Url::revoke_object_url(&object_url).map_err(browser)?;
        log::info!("Downloaded {} as {file_name}", resource.locator());
        Ok(SaveOutcome::Saved(file_name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct RecordingSaver {
        saved: RefCell<Vec<(String, Vec<u8>)>>,
    }

    impl ImageSaver for RecordingSaver {
        fn save(&self, file_name: &str, resource: &ResourceHandle) -> Result<SaveOutcome, SaveError> {
            self.saved
                .borrow_mut()
                .push((file_name.to_owned(), resource.bytes().to_vec()));
            Ok(SaveOutcome::Saved(file_name.to_owned()))
        }
    }

    #[test]
    fn test_saver_receives_name_and_bytes() {
        let saver = RecordingSaver::default();
        let resource = ResourceHandle::new(vec![1, 2, 3], "image/png", "My Café URL!!");

        let outcome = saver
            .save(&resource.download_file_name(), &resource)
            .expect("recording never fails");

        assert_eq!(outcome, SaveOutcome::Saved("My_Caf__URL__.png".to_owned()));
        assert_eq!(
            saver.saved.borrow().as_slice(),
            &[("My_Caf__URL__.png".to_owned(), vec![1, 2, 3])]
        );
    }

    #[test]
    fn test_image_saver_trait_is_object_safe() {
        fn _accept_saver(_saver: &dyn ImageSaver) {}
        _accept_saver(&RecordingSaver::default());
    }
}
