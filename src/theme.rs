//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.
//!
//! Tiles are coloured by rank (log2 of the value). A theme file may override any rank with
//! `theme[tile_<value>]`, e.g. `theme[tile_2048]="#B6D8F2"`.

use mergetui::grid::{MAX_RANK, Tile, rank};
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const RANKS: usize = MAX_RANK as usize;

/// Default tile colours, rank 1 (2) through rank 20 (1048576).
const CLASSIC_TILES: [u32; RANKS] = [
    0xC5_4B_6C, 0xA1_5D_98, 0x21_8B_82, 0xF7_CE_76, 0x7F_C7_FF, 0xDC_82_8F, 0x57_84_BA,
    0xE6_A5_7E, 0x76_CD_CD, 0xA2_A2_D0, 0xB6_D8_F2, 0x81_C7_84, 0xEE_BA_B2, 0xF9_96_8B,
    0xF7_CE_76, 0x7B_92_AA, 0xBE_B4_C5, 0x98_D4_BB, 0x98_D4_BB, 0x21_8B_82,
];

/// Saturated colours on dark bg; cycles every six ranks.
const HIGH_CONTRAST_CYCLE: [u32; 6] = [0xFF_00_00, 0xFF_FF_00, 0x00_FF_00, 0x00_FF_FF, 0x00_88_FF, 0xFF_00_FF];

/// Colorblind-friendly (Tol bright/vibrant); cycles every seven ranks.
const COLORBLIND_CYCLE: [u32; 7] = [
    0x00_77_BB, 0xEE_77_33, 0x00_99_88, 0xCC_33_11, 0xEE_33_77, 0xBB_BB_00, 0x33_BB_EE,
];

/// Tile palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile colours indexed by rank - 1.
    pub tiles: [Color; RANKS],
    /// Tiles beyond the table.
    pub tile_fallback: Color,
    /// Empty (or reserved) cell.
    pub empty: Color,
    /// Text drawn on tiles.
    pub tile_fg: Color,
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, stats).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Selection path and cursor.
    pub select: Color,
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Tile colours from the classic table on a One Dark frame.
    pub fn classic() -> Self {
        Self {
            tiles: CLASSIC_TILES.map(Color::from_u32),
            tile_fallback: Color::from_u32(0xC8_C8_C8),
            empty: Color::from_u32(0x3F_44_4F),
            tile_fg: Color::Black,
            bg: Color::from_u32(0x31_35_3F),
            div_line: Color::from_u32(0x3F_44_4F),
            main_fg: Color::from_u32(0xAB_B2_BF),
            title: Color::from_u32(0xE5_C0_7B),
            select: Color::from_u32(0xFF_FF_FF),
            inactive_fg: Color::from_u32(0x5C_63_70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to the classic theme if path is None or the file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::classic();
        t.apply_palette(palette);
        t
    }

    /// Override tile colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        let cycle: &[u32] = match palette {
            crate::Palette::Normal => return,
            crate::Palette::HighContrast => &HIGH_CONTRAST_CYCLE,
            crate::Palette::Colorblind => &COLORBLIND_CYCLE,
        };
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            *tile = Color::from_u32(cycle[i % cycle.len()]);
        }
        if palette == crate::Palette::HighContrast {
            self.select = Color::from_u32(0xFF_FF_FF);
            self.empty = Color::from_u32(0x1E_1E_1E);
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let base = Self::classic();
        let mut tiles = base.tiles;
        for (i, tile) in tiles.iter_mut().enumerate() {
            let key = format!("tile_{}", 1u64 << (i + 1));
            if let Some(c) = get(&key) {
                *tile = c;
            }
        }
        // Frame keys match btop themes such as onedark.theme.
        Self {
            tiles,
            tile_fallback: get("tile_other").unwrap_or(base.tile_fallback),
            empty: get("tile_empty")
                .or_else(|| get("meter_bg"))
                .unwrap_or(base.empty),
            tile_fg: get("tile_fg").unwrap_or(base.tile_fg),
            bg: get("main_bg").or_else(|| get("meter_bg")).unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            select: get("selected_fg")
                .or_else(|| get("hi_fg"))
                .unwrap_or(base.select),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
        }
    }

    /// Colour for a tile value; empty cells use `empty`.
    pub fn tile_color(&self, value: Tile) -> Color {
        match rank(value) {
            0 => self.empty,
            r => self
                .tiles
                .get(r as usize - 1)
                .copied()
                .unwrap_or(self.tile_fallback),
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let digit = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 if s.is_ascii() => (digit(0..2)?, digit(2..4)?, digit(4..6)?),
        3 if s.is_ascii() => (digit(0..1)? * 17, digit(1..2)? * 17, digit(2..3)? * 17),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_tile_override_from_file() {
        let map = parse_theme_file("theme[tile_8]=\"#010203\"\ntheme[title]='#FFFFFF'");
        let theme = Theme::from_map(&map);
        assert!(matches!(theme.tile_color(8), Color::Rgb(1, 2, 3)));
        assert!(matches!(theme.title, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_tile_colors_by_rank() {
        let theme = Theme::classic();
        assert!(matches!(theme.tile_color(2), Color::Rgb(0xC5, 0x4B, 0x6C)));
        assert!(matches!(theme.tile_color(1_048_576), Color::Rgb(0x21, 0x8B, 0x82)));
        assert_eq!(theme.tile_color(0), theme.empty);
        assert_eq!(theme.tile_color(1 << 21), theme.tile_fallback);
    }
}
