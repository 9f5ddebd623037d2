use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub chart_fill: String,
    pub line_color: String,
    pub title_color: String,
    pub house_number_color: String,
    pub sign_color: String,
    pub planet_color: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            chart_fill: "#FFF8E7".to_string(),
            line_color: "#7C2D12".to_string(),
            title_color: "#111827".to_string(),
            house_number_color: "#111827".to_string(),
            sign_color: "#B91C1C".to_string(),
            planet_color: "#111827".to_string(),
        }
    }

    /// Dark page with parchment chart faces, the look the report export uses.
    pub fn midnight() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            font_size: 13.0,
            background: "#0A0A0A".to_string(),
            chart_fill: "#F5E6C8".to_string(),
            line_color: "#D4AF37".to_string(),
            title_color: "#FFFFFF".to_string(),
            house_number_color: "#111827".to_string(),
            sign_color: "#B91C1C".to_string(),
            planet_color: "#111827".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" | "light" => Some(Self::classic()),
            "midnight" | "dark" => Some(Self::midnight()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Accepts `#rgb` and `#rrggbb` (with or without the leading `#`).
    pub fn parse_hex(input: &str) -> Option<Self> {
        let hex = input.trim().trim_start_matches('#');
        let expand = |c: u8| c * 17;
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Rgb(expand(r), expand(g), expand(b)))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Rgb(r, g, b))
            }
            _ => None,
        }
    }

    pub fn parse_or(input: &str, fallback: Rgb) -> Self {
        Self::parse_hex(input).unwrap_or(fallback)
    }

    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}
