#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use egui_kittest::Harness;
use qrgen_business::{QrInput, QrServiceConfig, ResourceHandle};
use qrgen_ui::QrApp;
use qrgen_ui::state::State;
use qrgen_ui::utils::image_saver::{ImageSaver, SaveError, SaveOutcome};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const QR_PATH: &str = "/v1/create-qr-code/";

/// Saves into memory; clones share the record.
#[derive(Clone, Default)]
pub struct RecordingSaver {
    pub saved: Rc<RefCell<Vec<(String, Vec<u8>)>>>,
}

impl ImageSaver for RecordingSaver {
    fn save(&self, file_name: &str, resource: &ResourceHandle) -> Result<SaveOutcome, SaveError> {
        self.saved
            .borrow_mut()
            .push((file_name.to_owned(), resource.bytes().to_vec()));
        Ok(SaveOutcome::Saved(format!("memory://{file_name}")))
    }
}

pub struct TestCtx<'a> {
    pub mock_server: MockServer,
    pub saver: RecordingSaver,
    harness: Harness<'a, QrApp>,
}

impl<'a> TestCtx<'a> {
    /// App against a mock service answering every request with `response`.
    pub async fn with_response(response: ResponseTemplate) -> Self {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QR_PATH))
            .respond_with(response)
            .mount(&mock_server)
            .await;
        Self::with_server(mock_server)
    }

    pub async fn new_app() -> Self {
        Self::with_response(png_response(64)).await
    }

    /// Mocks are mounted by the caller.
    pub fn with_server(mock_server: MockServer) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let saver = RecordingSaver::default();
        let state = State::new(
            QrServiceConfig::new(mock_server.uri()),
            Box::new(saver.clone()),
        );
        let app = QrApp::new(state);
        let harness = Harness::new_eframe(|_| app);

        Self {
            mock_server,
            saver,
            harness,
        }
    }

    pub fn harness_mut(&mut self) -> &mut Harness<'a, QrApp> {
        &mut self.harness
    }

    pub fn harness(&self) -> &Harness<'a, QrApp> {
        &self.harness
    }

    pub fn set_text(&mut self, text: &str) {
        self.harness
            .state_mut()
            .state
            .ctx
            .update::<QrInput>(|input| input.text = text.to_owned());
    }

    /// Steps frames, letting command tasks run in between, until `done`.
    pub async fn step_until(&mut self, what: &str, done: impl Fn(&QrApp) -> bool) {
        for _ in 0..150 {
            self.harness.step();
            if done(self.harness.state()) {
                // One more frame so the UI reflects what just landed.
                self.harness.step();
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Timed out waiting for {what}");
    }
}

pub fn png_bytes(side: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(side, side, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            image::Rgba([0, 0, 0, 255])
        } else {
            image::Rgba([255, 255, 255, 255])
        }
    });
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png fixture");
    out.into_inner()
}

pub fn png_response(side: u32) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(png_bytes(side), "image/png")
}
