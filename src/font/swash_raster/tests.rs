use std::path::Path;

use super::SwashRasterizer;
use crate::font::{FontStyle, Rasterizer};

/// Common system font locations; tests that need a real face skip when
/// none is installed.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Geneva.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn system_font(size: f32) -> Option<SwashRasterizer> {
    SYSTEM_FONTS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .and_then(|p| SwashRasterizer::from_path(p, 0, size, FontStyle::Regular).ok())
}

#[test]
fn garbage_bytes_are_invalid() {
    let mut r = SwashRasterizer::from_bytes(vec![0u8; 64], 0, 16.0, FontStyle::Regular);
    assert!(!r.is_valid());
    assert!(r.rasterize('A').is_none());
    assert!(r.advance_x('A', Some('V')).abs() < f32::EPSILON);
    assert!(r.line_spacing().abs() < f32::EPSILON);
}

#[test]
fn empty_bytes_are_invalid() {
    let r = SwashRasterizer::from_bytes(Vec::new(), 0, 16.0, FontStyle::Bold);
    assert!(!r.is_valid());
    assert_eq!(r.style(), FontStyle::Bold);
}

#[test]
fn missing_file_is_io_error() {
    let res = SwashRasterizer::from_path(
        Path::new("/nonexistent/ori_atlas/font.ttf"),
        0,
        16.0,
        FontStyle::Regular,
    );
    assert!(res.is_err());
}

#[test]
fn system_font_rasterizes_ascii() {
    let Some(mut r) = system_font(24.0) else {
        return;
    };
    assert!(r.is_valid());
    assert!(r.ascender() > 0.0);
    assert!(r.line_spacing() >= r.ascender());

    let a = r.rasterize('A').expect("font maps 'A'");
    assert!(!a.is_empty());
    assert!(a.is_consistent());
    assert!(r.advance_x('A', None) > 0.0);
}

#[test]
fn system_font_space_is_empty_not_missing() {
    let Some(mut r) = system_font(24.0) else {
        return;
    };
    let space = r.rasterize(' ').expect("font maps space");
    assert!(space.is_empty());
}

#[test]
fn garbage_bytes_have_no_kern_table() {
    let r = SwashRasterizer::from_bytes(vec![0u8; 64], 0, 16.0, FontStyle::Regular);
    assert!(r.kern.is_none());
    assert!(r.kerning(36, 57).abs() < f32::EPSILON);
}

#[test]
fn system_font_kerns_av_pair() {
    let Some(r) = system_font(48.0) else {
        return;
    };
    // Faces without a legacy `kern` table use plain advances.
    if r.kern.is_none() {
        assert!((r.advance_x('A', Some('V')) - r.advance_x('A', None)).abs() < f32::EPSILON);
        return;
    }
    let plain = r.advance_x('A', None);
    let kerned = r.advance_x('A', Some('V'));
    assert!(kerned < plain, "A+V {kerned} should be tighter than A {plain}");
    // Repeated lookups read the same cached table.
    assert!((r.advance_x('A', Some('V')) - kerned).abs() < f32::EPSILON);
}
