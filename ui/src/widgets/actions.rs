use egui::Ui;
use qrgen_business::UiState;

use crate::state::QrAction;

pub const GENERATE_LABEL: &str = "Generate";
pub const DOWNLOAD_LABEL: &str = "Download";
pub const OPEN_LABEL: &str = "Open full size";

/// Generate is always available; Download and Open need a live resource.
pub fn action_bar(ui_state: &UiState, ui: &mut Ui) -> Option<QrAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        if ui
            .button(GENERATE_LABEL)
            .on_hover_text("Ctrl+Enter / Cmd+Enter")
            .clicked()
        {
            action = Some(QrAction::Generate);
        }

        if ui
            .add_enabled(ui_state.can_download, egui::Button::new(DOWNLOAD_LABEL))
            .clicked()
        {
            action = Some(QrAction::Download);
        }

        if ui
            .add_enabled(ui_state.can_open, egui::Button::new(OPEN_LABEL))
            .clicked()
        {
            action = Some(QrAction::Open);
        }

        if ui_state.is_generating {
            ui.spinner();
        }
    });

    action
}
