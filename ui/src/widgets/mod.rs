mod actions;
mod qr_form;
mod qr_preview;
mod status_line;

pub use actions::{DOWNLOAD_LABEL, GENERATE_LABEL, OPEN_LABEL, action_bar};
pub use qr_form::{TEXT_HINT, qr_form, request_preview};
pub use qr_preview::{
    FULL_SIZE_TITLE, PREVIEW_ALT_TEXT, QrPreviewState, RenderFailure, full_size_window, qr_preview,
};
pub use status_line::status_line;
