use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Natal,
    Horary,
}

impl ChartKind {
    /// Lowercase token used in export file names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Natal => "natal",
            Self::Horary => "horary",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Natal => "NATAL CHART",
            Self::Horary => "HORARY CHART",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        Self::Aries,
        Self::Taurus,
        Self::Gemini,
        Self::Cancer,
        Self::Leo,
        Self::Virgo,
        Self::Libra,
        Self::Scorpio,
        Self::Sagittarius,
        Self::Capricorn,
        Self::Aquarius,
        Self::Pisces,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
        }
    }

    /// Case-insensitive lookup; the ephemeris service is not consistent about casing.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|sign| sign.name().eq_ignore_ascii_case(name))
    }

    pub fn abbreviation(self) -> &'static str {
        &self.name()[..3]
    }
}

/// One planet (or the Ascendant) as returned by the ephemeris service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanetPlacement {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sign: String,
    pub sign_degree: Option<f64>,
    pub house: Option<u32>,
    #[serde(default)]
    pub retrograde: bool,
    pub longitude: Option<f64>,
    pub rasi_lord: Option<String>,
    pub nakshatra: Option<String>,
    pub nakshatra_lord: Option<String>,
}

impl PlanetPlacement {
    pub fn new(name: &str, sign: &str, house: u32) -> Self {
        Self {
            name: name.to_string(),
            sign: sign.to_string(),
            house: Some(house),
            ..Default::default()
        }
    }

    pub fn zodiac_sign(&self) -> Option<ZodiacSign> {
        ZodiacSign::from_name(&self.sign)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseCusp {
    pub house_number: Option<u32>,
    #[serde(default)]
    pub sign: String,
    pub cusp_degree: Option<f64>,
    pub lord: Option<String>,
    #[serde(default)]
    pub planets_on_cusp: Vec<String>,
}

impl HouseCusp {
    pub fn new(house_number: u32, sign: &str) -> Self {
        Self {
            house_number: Some(house_number),
            sign: sign.to_string(),
            ..Default::default()
        }
    }
}

/// Returns the first candidate key holding a usable value.
///
/// `null` and empty strings count as absent, matching how the service leaves
/// optional columns blank.
pub fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| match fields.get(*key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(value),
    })
}

/// Vimshottari period table. The service has shipped both a keyed object
/// (`planet -> period`) and a flat list of periods carrying their planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeriodTable {
    List(Vec<Map<String, Value>>),
    Keyed(Map<String, Value>),
}

#[derive(Debug, Clone, Copy)]
pub struct PeriodEntry<'a> {
    pub planet: &'a str,
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> PeriodEntry<'a> {
    pub fn field(&self, key: &str) -> Option<&'a Value> {
        self.fields.and_then(|fields| first_present(fields, &[key]))
    }

    pub fn first_present(&self, keys: &[&str]) -> Option<&'a Value> {
        self.fields.and_then(|fields| first_present(fields, keys))
    }
}

impl PeriodTable {
    pub fn entries(&self) -> Vec<PeriodEntry<'_>> {
        match self {
            PeriodTable::Keyed(map) => map
                .iter()
                .map(|(planet, value)| PeriodEntry {
                    planet: planet.as_str(),
                    fields: value.as_object(),
                })
                .collect(),
            PeriodTable::List(items) => items
                .iter()
                .map(|fields| PeriodEntry {
                    planet: fields
                        .get("planet")
                        .and_then(Value::as_str)
                        .unwrap_or_default(),
                    fields: Some(fields),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PeriodTable::Keyed(map) => map.is_empty(),
            PeriodTable::List(items) => items.is_empty(),
        }
    }
}

/// A planetary aspect row. Field names vary between service versions, so the
/// accessors try each known spelling in turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aspect(pub Map<String, Value>);

impl Aspect {
    pub fn first_planet(&self) -> Option<&Value> {
        first_present(&self.0, &["P1", "planet1", "from_planet"])
    }

    pub fn kind(&self) -> Option<&Value> {
        first_present(&self.0, &["AspectType", "aspect_type", "aspect"])
    }

    pub fn second_planet(&self) -> Option<&Value> {
        first_present(&self.0, &["P2", "planet2", "to_planet"])
    }

    pub fn orb(&self) -> Option<f64> {
        first_present(&self.0, &["AspectOrb", "orb"]).and_then(value_as_f64)
    }
}

/// KP significator mapping (planet -> houses, or house -> planets).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Significators(pub Map<String, Value>);

impl Significators {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Aggregate returned by the ephemeris service for one generated chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
    #[serde(rename = "planets_data")]
    pub planets: Option<Vec<PlanetPlacement>>,
    #[serde(rename = "houses_data")]
    pub houses: Option<Vec<HouseCusp>>,
    #[serde(rename = "vimshottari_dasa_table")]
    pub periods: Option<PeriodTable>,
    #[serde(rename = "planetary_aspects")]
    pub aspects: Option<Vec<Aspect>>,
    pub planet_significators: Option<Significators>,
    pub house_significators: Option<Significators>,
}

impl ChartResult {
    pub fn planets(&self) -> &[PlanetPlacement] {
        self.planets.as_deref().unwrap_or_default()
    }

    pub fn houses(&self) -> &[HouseCusp] {
        self.houses.as_deref().unwrap_or_default()
    }

    /// Key lookup; `houses_data` is usually sorted but nothing guarantees it.
    pub fn house(&self, number: u32) -> Option<&HouseCusp> {
        self.houses()
            .iter()
            .find(|house| house.house_number == Some(number))
    }
}

/// Parameters the chart was generated from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartInput {
    pub name: Option<String>,
    pub place_of_birth: Option<String>,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub utc: String,
    pub latitude: f64,
    pub longitude: f64,
    pub ayanamsa: Option<String>,
    pub house_system: Option<String>,
    pub horary_number: Option<u32>,
}

impl ChartInput {
    /// Subject name with surrounding whitespace removed; blank names count as absent.
    pub fn subject_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// One generated chart as held by the UI state: kind, originating input and the
/// service payload. Replaced wholesale on every generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    #[serde(rename = "type", default)]
    pub kind: ChartKind,
    #[serde(default)]
    pub input: Option<ChartInput>,
    #[serde(default)]
    pub data: ChartResult,
}
