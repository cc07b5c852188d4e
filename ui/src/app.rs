use std::time::Duration;

use crate::state::{QrAction, State};
use crate::utils::colors::COLOR_RED;
use crate::widgets;

/// Repaint cadence while a request is in flight.
const IN_FLIGHT_REPAINT: Duration = Duration::from_millis(50);

pub struct QrApp {
    pub state: State,
}

impl QrApp {
    /// Called once before the first frame.
    pub fn new(state: State) -> Self {
        Self { state }
    }
}

impl eframe::App for QrApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Pick up finished commands
        self.state.ctx.sync_computes();
        self.state.sync_preview(ctx);

        // Consumed before the text field sees the Enter.
        let shortcut = ctx.input_mut(consume_generate_shortcut);
        let mut action = shortcut.then_some(QrAction::Generate);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("QR Code Generator");
            ui.add_space(8.0);

            widgets::qr_form(&mut self.state.ctx, ui);
            widgets::request_preview(&self.state.ctx, ui);
            ui.add_space(8.0);

            let ui_state = self.state.generated().ui_state();
            if let Some(clicked) = widgets::action_bar(&ui_state, ui) {
                action = Some(clicked);
            }
            widgets::status_line(ui_state.status.as_ref(), ui);
            if let Some(err) = &self.state.download_error {
                ui.colored_label(COLOR_RED, err);
            }

            ui.separator();
            egui::ScrollArea::both().show(ui, |ui| {
                widgets::qr_preview(&self.state.preview, ui);
                if let Some(resource) = &self.state.generated().resource {
                    ui.weak(format!(
                        "{} · fetched {}",
                        resource.download_file_name(),
                        resource.fetched_at().format("%H:%M:%S UTC")
                    ));
                }
            });
        });

        widgets::full_size_window(&mut self.state.preview, ctx);

        if let Some(action) = action {
            self.state.dispatch(action);
        }

        // Derived values for the next frame
        self.state.ctx.run_all_dirty();

        if self.state.ctx.task_count() > 0 {
            ctx.request_repaint_after(IN_FLIGHT_REPAINT);
        }
    }
}

/// Ctrl+Enter or Cmd+Enter on every platform.
///
/// `COMMAND` alone is Cmd on macOS, so Ctrl is checked separately.
fn consume_generate_shortcut(input: &mut egui::InputState) -> bool {
    input.consume_key(egui::Modifiers::COMMAND, egui::Key::Enter)
        || input.consume_key(egui::Modifiers::CTRL, egui::Key::Enter)
}

impl Drop for QrApp {
    fn drop(&mut self) {
        self.state.teardown();
    }
}
