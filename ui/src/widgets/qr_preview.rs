//! Preview of the live QR image and its full-size window.
//!
//! The texture is keyed by the resource locator: a new locator means a new
//! upload, no resource means no texture. A payload that fails to decode is
//! remembered by locator so it is reported once, not every frame.

use egui::{Context, TextureHandle, TextureOptions, Ui, Window};
use qrgen_business::ResourceHandle;

use crate::utils::image_data::ImageData;

pub const PREVIEW_ALT_TEXT: &str = "Generated QR code";
pub const FULL_SIZE_TITLE: &str = "QR code (full size)";

/// A local decode failure for the resource named by `locator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub locator: String,
    pub message: String,
}

struct QrTexture {
    locator: String,
    texture: TextureHandle,
    size: [usize; 2],
}

#[derive(Default)]
pub struct QrPreviewState {
    current: Option<QrTexture>,
    failed_locator: Option<String>,
    full_size_open: bool,
}

impl std::fmt::Debug for QrPreviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrPreviewState")
            .field("locator", &self.locator())
            .field("size", &self.size())
            .field("failed_locator", &self.failed_locator)
            .field("full_size_open", &self.full_size_open)
            .finish()
    }
}

impl QrPreviewState {
    /// Make the texture follow `resource`.
    ///
    /// Returns the failure to report when a new resource does not decode.
    pub fn sync(&mut self, ctx: &Context, resource: Option<&ResourceHandle>) -> Option<RenderFailure> {
        let Some(resource) = resource else {
            self.clear();
            return None;
        };

        let locator = resource.locator();
        if self.locator() == Some(locator) || self.failed_locator.as_deref() == Some(locator) {
            return None;
        }

        self.full_size_open = false;
        match ImageData::decode(resource.bytes()) {
            Ok(image) => {
                let texture = ctx.load_texture(
                    format!("qr_preview_{locator}"),
                    image.to_color_image(),
                    TextureOptions::NEAREST,
                );
                log::debug!("Uploaded {locator} as {}x{}", image.width, image.height);
                self.current = Some(QrTexture {
                    locator: locator.to_owned(),
                    texture,
                    size: image.size(),
                });
                self.failed_locator = None;
                None
            }
            Err(err) => {
                log::warn!("Cannot render {locator}: {err}");
                self.current = None;
                self.failed_locator = Some(locator.to_owned());
                Some(RenderFailure {
                    locator: locator.to_owned(),
                    message: err.to_string(),
                })
            }
        }
    }

    pub fn locator(&self) -> Option<&str> {
        self.current.as_ref().map(|current| current.locator.as_str())
    }

    pub fn size(&self) -> Option<[usize; 2]> {
        self.current.as_ref().map(|current| current.size)
    }

    pub fn has_texture(&self) -> bool {
        self.current.is_some()
    }

    /// No-op without a texture.
    pub fn open_full_size(&mut self) {
        self.full_size_open = self.current.is_some();
    }

    pub fn close_full_size(&mut self) {
        self.full_size_open = false;
    }

    pub fn is_full_size_open(&self) -> bool {
        self.full_size_open
    }

    /// Drops the texture and closes the full-size window.
    pub fn clear(&mut self) {
        self.current = None;
        self.failed_locator = None;
        self.full_size_open = false;
    }
}

/// The image at its native size, shrunk only if the panel is smaller.
pub fn qr_preview(state: &QrPreviewState, ui: &mut Ui) {
    let Some(current) = &state.current else {
        return;
    };

    let [width, height] = current.size;
    let sized = egui::load::SizedTexture::new(current.texture.id(), [width as f32, height as f32]);
    ui.add(
        egui::Image::from_texture(sized)
            .shrink_to_fit()
            .alt_text(PREVIEW_ALT_TEXT),
    )
    .on_hover_text(format!("{width}×{height}"));
}

pub fn full_size_window(state: &mut QrPreviewState, ctx: &Context) {
    if !state.full_size_open {
        return;
    }
    let Some(current) = &state.current else {
        state.close_full_size();
        return;
    };

    let [width, height] = current.size;
    let texture_id = current.texture.id();
    let mut open = true;

    Window::new(FULL_SIZE_TITLE)
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_size([width as f32, height as f32])
        .scroll([true, true])
        .show(ctx, |ui| {
            ui.add(
                egui::Image::from_texture(egui::load::SizedTexture::new(
                    texture_id,
                    [width as f32, height as f32],
                ))
                .alt_text(PREVIEW_ALT_TEXT),
            );
        });

    if !open {
        state.close_full_size();
    }
}
