use std::collections::HashMap;

use once_cell::sync::Lazy;

const FONT_HEIGHT: usize = 5;
const FONT_WIDTH: usize = 4;
const SHADOW_OFFSET: usize = 1;
const SPACING: usize = 2;
const FILL_CHAR: char = '█';
const SHADOW_CHAR: char = '░';

type Glyph = [&'static str; FONT_HEIGHT];

// Clock digits only; anything else renders as the blank glyph.
static GLYPHS: Lazy<HashMap<char, Glyph>> = Lazy::new(|| {
    HashMap::from([
        ('0', ["####", "#  #", "#  #", "#  #", "####"]),
        ('1', ["  # ", " ## ", "  # ", "  # ", " ###"]),
        ('2', ["####", "   #", "####", "#   ", "####"]),
        ('3', ["####", "   #", " ###", "   #", "####"]),
        ('4', ["#  #", "#  #", "####", "   #", "   #"]),
        ('5', ["####", "#   ", "####", "   #", "####"]),
        ('6', ["####", "#   ", "####", "#  #", "####"]),
        ('7', ["####", "   #", "  # ", " #  ", " #  "]),
        ('8', ["####", "#  #", "####", "#  #", "####"]),
        ('9', ["####", "#  #", "####", "   #", "####"]),
        (':', ["    ", " ## ", "    ", " ## ", "    "]),
        (' ', ["    ", "    ", "    ", "    ", "    "]),
    ])
});

/// Rows needed to render any text.
pub const HEIGHT: usize = FONT_HEIGHT + SHADOW_OFFSET;

/// Columns needed to render `text`.
pub fn width(text: &str) -> usize {
    let count = text.chars().count();
    if count == 0 {
        return 0;
    }
    let glyph_width = FONT_WIDTH * 2;
    count * glyph_width + (count - 1) * SPACING + SHADOW_OFFSET * 2
}

/// Render `text` as large block digits with a soft drop shadow.
pub fn render(text: &str) -> Vec<String> {
    let content: Vec<char> = text.chars().collect();
    if content.is_empty() {
        return vec![String::new(); HEIGHT];
    }

    let glyph_width = FONT_WIDTH * 2; // double width so cells look square
    let mut canvas = vec![vec![' '; width(text)]; HEIGHT];

    for (index, ch) in content.iter().enumerate() {
        let Some(glyph) = GLYPHS.get(ch).or_else(|| GLYPHS.get(&' ')) else {
            continue;
        };
        let x_offset = index * (glyph_width + SPACING);
        paint_glyph(&mut canvas, glyph, x_offset);
    }

    canvas
        .into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect()
}

fn paint_glyph(canvas: &mut [Vec<char>], glyph: &Glyph, x_offset: usize) {
    for (row_idx, row) in glyph.iter().enumerate() {
        for (col_idx, symbol) in row.chars().enumerate() {
            if symbol != '#' {
                continue;
            }
            let x = x_offset + col_idx * 2;
            for dx in 0..2 {
                place(
                    canvas,
                    row_idx + SHADOW_OFFSET,
                    x + dx + SHADOW_OFFSET * 2,
                    SHADOW_CHAR,
                );
                place(canvas, row_idx, x + dx, FILL_CHAR);
            }
        }
    }
}

fn place(canvas: &mut [Vec<char>], y: usize, x: usize, ch: char) {
    if y >= canvas.len() || x >= canvas[y].len() {
        return;
    }
    let cell = &mut canvas[y][x];
    if *cell == ' ' || (*cell == SHADOW_CHAR && ch == FILL_CHAR) {
        *cell = ch;
    }
}
