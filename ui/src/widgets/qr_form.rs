use egui::{ComboBox, TextEdit, Ui};
use qrgen_business::{EccLevel, QrInput, RequestPreviewCompute};
use qrgen_states::StateCtx;

use crate::utils::colors::COLOR_MUTED;

pub const TEXT_HINT: &str = "Text or URL to encode";

/// Edits a copy of [`QrInput`] and writes it back only when it changed, so
/// dependents are not marked dirty every frame.
pub fn qr_form(ctx: &mut StateCtx, ui: &mut Ui) {
    let mut input = ctx.state::<QrInput>().clone();

    ui.label("Text or URL");
    ui.add(
        TextEdit::multiline(&mut input.text)
            .hint_text(TEXT_HINT)
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );

    egui::Grid::new("qr_options")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Size (px)");
            ui.add(TextEdit::singleline(&mut input.size).desired_width(80.0));
            ui.end_row();

            ui.label("Margin");
            ui.add(TextEdit::singleline(&mut input.margin).desired_width(80.0));
            ui.end_row();

            ui.label("Error correction");
            ComboBox::from_id_salt("qr_ecc")
                .selected_text(input.ecc.label())
                .show_ui(ui, |ui| {
                    for level in EccLevel::ALL {
                        ui.selectable_value(&mut input.ecc, level, level.label());
                    }
                });
            ui.end_row();
        });

    if &input != ctx.state::<QrInput>() {
        ctx.update::<QrInput>(|current| *current = input);
    }
}

/// The URL Generate would request, in small monospace.
pub fn request_preview(ctx: &StateCtx, ui: &mut Ui) {
    let Some(url) = ctx
        .cached::<RequestPreviewCompute>()
        .and_then(|preview| preview.url.as_deref())
    else {
        return;
    };

    ui.add(
        egui::Label::new(
            egui::RichText::new(url)
                .monospace()
                .small()
                .color(COLOR_MUTED),
        )
        .wrap(),
    );
}
