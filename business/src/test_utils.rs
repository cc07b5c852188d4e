//! Mock QR service plus a wired-up `StateCtx` for command tests.
//!
//! ```ignore
//! let mut test_ctx = TestContext::new().await;
//! test_ctx.mock_png().await;
//! test_ctx.set_text("Hello");
//! test_ctx.generate_and_wait().await;
//! assert!(test_ctx.generated().ui_state().can_download);
//! ```

#![cfg(all(test, not(target_arch = "wasm32")))]

use std::time::Duration;

use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::{QrGenerateCompute, QrInput, QrServiceConfig, build_state_ctx, generate};
use qrgen_states::StateCtx;

pub const QR_PATH: &str = "/v1/create-qr-code/";

pub const TASK_TIMEOUT: Duration = Duration::from_secs(5);

/// First bytes of a PNG file; the business layer never decodes them.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

pub struct TestContext {
    pub mock_server: MockServer,
    pub ctx: StateCtx,
}

impl TestContext {
    pub async fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let mock_server = MockServer::start().await;
        let ctx = build_state_ctx(QrServiceConfig::new(mock_server.uri()));
        Self { mock_server, ctx }
    }

    pub fn set_text(&mut self, text: &str) {
        self.ctx
            .update::<QrInput>(|input| input.text = text.to_owned());
    }

    pub fn set_input(&mut self, input: QrInput) {
        self.ctx.update::<QrInput>(|current| *current = input);
    }

    pub fn generated(&self) -> &QrGenerateCompute {
        self.ctx.compute::<QrGenerateCompute>()
    }

    /// Presses Generate. Empty text flushes nothing.
    pub async fn generate_and_wait(&mut self) {
        let _ = generate(&mut self.ctx);
        self.wait_for_tasks(TASK_TIMEOUT).await;
    }

    pub async fn flush_and_wait(&mut self) {
        self.ctx.sync_computes();
        self.ctx.flush_commands();
        self.wait_for_tasks(TASK_TIMEOUT).await;
    }

    /// Await every task, syncing as each ends. Panics once `limit` passes,
    /// even while a task is stuck.
    pub async fn wait_for_tasks(&mut self, limit: Duration) {
        let ctx = &mut self.ctx;
        let drained = tokio::time::timeout(limit, async {
            while ctx.task_count() > 0 {
                if ctx.task_set_mut().join_next().await.is_some() {
                    ctx.sync_computes();
                }
            }
        })
        .await;

        assert!(
            drained.is_ok(),
            "Timed out waiting for pending tasks ({} still in JoinSet)",
            self.ctx.task_count()
        );
        self.ctx.sync_computes();
    }

    pub async fn shutdown(&mut self) {
        self.ctx.shutdown().await;
    }

    pub async fn mock_png(&self) {
        self.mock_response(ResponseTemplate::new(200).set_body_raw(PNG_BYTES, "image/png"))
            .await;
    }

    pub async fn mock_status(&self, status: u16) {
        self.mock_response(ResponseTemplate::new(status).set_body_string("boom"))
            .await;
    }

    pub async fn mock_html(&self) {
        self.mock_response(
            ResponseTemplate::new(200).set_body_raw("<html>rate limited</html>", "text/html"),
        )
        .await;
    }

    pub async fn mock_response(&self, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(QR_PATH))
            .respond_with(response)
            .mount(&self.mock_server)
            .await;
    }
}
