//! Shared color constants for the UI.

use egui::Color32;

/// Red color for error status lines.
pub const COLOR_RED: Color32 = Color32::from_rgb(220, 53, 69);

/// Muted gray for secondary text such as the request preview.
pub const COLOR_MUTED: Color32 = Color32::from_rgb(128, 128, 128);
