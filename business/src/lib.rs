//! QR generator business layer: request building, fetching, and the resource
//! slot the UI reflects.

mod config;
mod error;
mod file_name;
pub mod http;
mod qr_generate;
mod qr_input;
mod qr_request;
mod request_preview;
mod resource;

#[cfg(test)]
mod test_utils;

pub use config::{DEFAULT_SERVICE_BASE_URL, QrServiceConfig};
pub use error::{EMPTY_INPUT_MESSAGE, GENERATION_FAILED_MESSAGE, QrError, RENDER_FAILED_MESSAGE};
pub use file_name::{FALLBACK_STEM, MAX_STEM_CHARS, download_file_name, sanitize_file_stem};
pub use qr_generate::{
    GENERATING_MESSAGE, GenerateQrCommand, QrGenerateCompute, QrPhase, QrStatusNotice,
    READY_MESSAGE, ReleaseQrCommand, ReportRenderErrorCommand, Severity, StatusMessage, UiState,
    fetch_qr, generate,
};
pub use qr_input::QrInput;
pub use qr_request::{
    DEFAULT_MARGIN, DEFAULT_SIZE, EccLevel, GenerationRequest, MARGIN_RANGE, RequestDescriptor,
    SIZE_RANGE, build, coerce_bounded,
};
pub use request_preview::RequestPreviewCompute;
pub use resource::ResourceHandle;

use qrgen_states::StateCtx;

/// A context with every state, compute and command of the generator
/// registered, talking to `config`'s endpoint.
pub fn build_state_ctx(config: QrServiceConfig) -> StateCtx {
    let mut ctx = StateCtx::new();

    ctx.add_state(config);
    ctx.add_state(QrInput::default());

    ctx.record_compute(QrGenerateCompute::default());
    ctx.record_compute(RequestPreviewCompute::default());

    ctx.record_command(GenerateQrCommand);
    ctx.record_command(ReleaseQrCommand);
    ctx.record_command(ReportRenderErrorCommand::default());

    ctx
}
