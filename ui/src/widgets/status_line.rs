use egui::{RichText, Ui};
use qrgen_business::StatusMessage;

use crate::utils::colors::COLOR_RED;

/// Info in the default color, errors in red. Nothing before the first action.
pub fn status_line(status: Option<&StatusMessage>, ui: &mut Ui) {
    let Some(status) = status else {
        return;
    };

    let text = RichText::new(&status.text);
    if status.is_error() {
        ui.label(text.color(COLOR_RED));
    } else {
        ui.label(text);
    }
}
