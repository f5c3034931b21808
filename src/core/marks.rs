use bevy::prelude::*;

/// Palette of muted, distinct (r, g, b) triples for node and sphere marks.
/// Mark 0 means "unmarked".
const PALETTE: &[(f32, f32, f32)] = &[
    (0.85, 0.85, 0.85), // unmarked
    (0.25, 0.50, 0.90), // blue
    (0.20, 0.72, 0.42), // green
    (0.85, 0.35, 0.25), // red-orange
    (0.75, 0.50, 0.12), // amber
    (0.60, 0.22, 0.80), // purple
    (0.15, 0.68, 0.72), // teal
    (0.88, 0.68, 0.18), // gold
    (0.35, 0.35, 0.78), // indigo
];

/// Alpha used for sphere shells drawn with a mark color.
const MARK_ALPHA: f32 = 0.45;

/// The (r,g,b) palette entry for a mark; marks past the palette wrap around the marked entries.
pub fn mark_rgb(mark: u32) -> (f32, f32, f32) {
    if mark == 0 {
        return PALETTE[0];
    }
    let marked = PALETTE.len() - 1;
    PALETTE[1 + (mark as usize - 1) % marked]
}

pub fn mark_color(mark: u32) -> Color {
    let (r, g, b) = mark_rgb(mark);
    Color::srgba(r, g, b, MARK_ALPHA)
}
