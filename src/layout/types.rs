use crate::ir::ZodiacSign;

/// The two fixed diagram conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramStyle {
    /// Fixed-house-position: houses never move, signs rotate through them.
    NorthIndian,
    /// Fixed-sign-position: signs never move, houses rotate through them.
    SouthIndian,
}

impl DiagramStyle {
    pub fn title(self) -> &'static str {
        match self {
            DiagramStyle::NorthIndian => "North Indian Style",
            DiagramStyle::SouthIndian => "South Indian Style",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionKey {
    House(u32),
    Sign(ZodiacSign),
}

impl std::fmt::Display for RegionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionKey::House(number) => write!(f, "house-{number}"),
            RegionKey::Sign(sign) => write!(f, "sign-{}", sign.name().to_ascii_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionLayout {
    pub key: RegionKey,
    /// House number shown above the sign label (the region's own house for
    /// North Indian, the house whose cusp holds the sign for South Indian).
    pub heading: Option<String>,
    /// First three characters of the sign; empty when no cusp resolves.
    pub label: String,
    pub planets: Vec<String>,
    /// Slot in the 4x4 lattice both conventions are drawn on.
    pub row: usize,
    pub col: usize,
    pub outline: Vec<(f32, f32)>,
    pub anchor: (f32, f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramLayout {
    pub style: DiagramStyle,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub regions: Vec<RegionLayout>,
}

impl DiagramLayout {
    pub fn region(&self, key: RegionKey) -> Option<&RegionLayout> {
        self.regions.iter().find(|region| region.key == key)
    }

    pub fn planet_count(&self) -> usize {
        self.regions.iter().map(|region| region.planets.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub north: DiagramLayout,
    pub south: DiagramLayout,
    pub width: f32,
    pub height: f32,
}

impl ChartLayout {
    pub fn diagrams(&self) -> [&DiagramLayout; 2] {
        [&self.north, &self.south]
    }
}
