use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::filter::MarkerClass;

// ---------------------------------------------------------------------------
// Marker colours
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Hue for each marker class: red for failing, blue for passing scales,
/// green for passing weighbridges.
fn hue(class: MarkerClass) -> f32 {
    match class {
        MarkerClass::Fail => 0.0,
        MarkerClass::ScalePass => 215.0,
        MarkerClass::WeighbridgePass => 125.0,
    }
}

/// Fill colour of a marker.
pub fn marker_color(class: MarkerClass) -> Color32 {
    hsl_to_color32(hue(class), 0.75, 0.5)
}

/// Ring drawn around the selected marker.
pub fn highlight_color(class: MarkerClass) -> Color32 {
    hsl_to_color32(hue(class), 0.9, 0.25)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_classes_are_distinct() {
        let fail = marker_color(MarkerClass::Fail);
        let scale = marker_color(MarkerClass::ScalePass);
        let bridge = marker_color(MarkerClass::WeighbridgePass);
        assert_ne!(fail, scale);
        assert_ne!(fail, bridge);
        assert_ne!(scale, bridge);
    }

    #[test]
    fn fail_is_red_dominant() {
        let c = marker_color(MarkerClass::Fail);
        assert!(c.r() > c.g() && c.r() > c.b());
        let c = marker_color(MarkerClass::WeighbridgePass);
        assert!(c.g() > c.r() && c.g() > c.b());
    }

    #[test]
    fn highlight_is_darker() {
        let fill = marker_color(MarkerClass::ScalePass);
        let ring = highlight_color(MarkerClass::ScalePass);
        assert!(ring.b() < fill.b());
    }
}
