use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest thickness, in meters, the layer form accepts.
pub const MIN_THICKNESS: f64 = 0.1;

/// Rock type of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lithology {
    Sandstone,
    Shale,
    Limestone,
    Conglomerate,
    Siltstone,
}

impl Lithology {
    pub const ALL: [Lithology; 5] = [
        Lithology::Sandstone,
        Lithology::Shale,
        Lithology::Limestone,
        Lithology::Conglomerate,
        Lithology::Siltstone,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Lithology::Sandstone => "Sandstone",
            Lithology::Shale => "Shale",
            Lithology::Limestone => "Limestone",
            Lithology::Conglomerate => "Conglomerate",
            Lithology::Siltstone => "Siltstone",
        }
    }

    /// Next entry of [`Lithology::ALL`], wrapping around. Used by the form selector.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Lithology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lithology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown lithology '{}'", wanted))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrainSize {
    Fine,
    Medium,
    Coarse,
}

impl GrainSize {
    pub const ALL: [GrainSize; 3] = [GrainSize::Fine, GrainSize::Medium, GrainSize::Coarse];

    pub fn name(self) -> &'static str {
        match self {
            GrainSize::Fine => "Fine",
            GrainSize::Medium => "Medium",
            GrainSize::Coarse => "Coarse",
        }
    }

    pub fn next(self) -> Self {
        match self {
            GrainSize::Fine => GrainSize::Medium,
            GrainSize::Medium => GrainSize::Coarse,
            GrainSize::Coarse => GrainSize::Fine,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            GrainSize::Fine => GrainSize::Coarse,
            GrainSize::Medium => GrainSize::Fine,
            GrainSize::Coarse => GrainSize::Medium,
        }
    }
}

impl fmt::Display for GrainSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GrainSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown grain size '{}'", wanted))
    }
}

/// Depositional setting, derived from lithology alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    Marine,
    #[serde(rename = "Fluvial/Deltaic")]
    FluvialDeltaic,
}

impl Environment {
    /// Shale and limestone are marine facies; every other lithology is fluvial/deltaic.
    pub fn for_lithology(lithology: Lithology) -> Self {
        match lithology {
            Lithology::Shale | Lithology::Limestone => Environment::Marine,
            _ => Environment::FluvialDeltaic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Environment::Marine => "Marine",
            Environment::FluvialDeltaic => "Fluvial/Deltaic",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 24-bit colour, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness in 0..=255, used to pick a readable label colour.
    pub fn luma(self) -> u8 {
        let y = 0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64;
        y.round().clamp(0.0, 255.0) as u8
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Accepts `#rrggbb`, `rrggbb` and the `#rgb` shorthand, in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("'{}' is not a hex colour", trimmed));
        }
        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|_| format!("'{}' is not a hex colour", trimmed))
        };
        match hex.len() {
            6 => Ok(Rgb::new(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            3 => {
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Ok(Rgb::new(r * 17, g * 17, b * 17))
            }
            _ => Err(format!("'{}' is not a hex colour", trimmed)),
        }
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The editable part of a layer. `environment` is never part of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerFields {
    pub lithology: Lithology,
    pub color: Rgb,
    pub grain_size: GrainSize,
    pub thickness: f64,
    pub fossils: String,
    pub notes: String,
}

/// One stratigraphic record.
///
/// A `Layer` can only be built from [`LayerFields`], so its environment always
/// matches its lithology.
///
/// # Examples
///
/// ```
/// use stratasim::domain::{Environment, GrainSize, Layer, LayerFields, Lithology, Rgb};
///
/// let layer = Layer::new(LayerFields {
///     lithology: Lithology::Limestone,
///     color: Rgb::new(200, 200, 180),
///     grain_size: GrainSize::Fine,
///     thickness: 1.5,
///     fossils: "Crinoids".to_string(),
///     notes: String::new(),
/// });
/// assert_eq!(layer.environment(), Environment::Marine);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    fields: LayerFields,
    environment: Environment,
}

impl Layer {
    pub fn new(fields: LayerFields) -> Self {
        let environment = Environment::for_lithology(fields.lithology);
        Self { fields, environment }
    }

    pub fn lithology(&self) -> Lithology {
        self.fields.lithology
    }

    pub fn color(&self) -> Rgb {
        self.fields.color
    }

    pub fn grain_size(&self) -> GrainSize {
        self.fields.grain_size
    }

    pub fn thickness(&self) -> f64 {
        self.fields.thickness
    }

    pub fn fossils(&self) -> &str {
        &self.fields.fossils
    }

    pub fn notes(&self) -> &str {
        &self.fields.notes
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn fields(&self) -> &LayerFields {
        &self.fields
    }
}

impl From<LayerFields> for Layer {
    fn from(fields: LayerFields) -> Self {
        Layer::new(fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards index 0.
    Up,
    Down,
}

/// A row handed over by the import adapter. Absent columns stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRecord {
    pub lithology: Option<Lithology>,
    pub color: Option<Rgb>,
    pub grain_size: Option<GrainSize>,
    pub thickness: Option<f64>,
    pub fossils: Option<String>,
    pub notes: Option<String>,
}

impl ImportRecord {
    /// Column names of the required fields this record lacks, in header order.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.lithology.is_none() {
            missing.push("Lithology");
        }
        if self.color.is_none() {
            missing.push("Color");
        }
        if self.grain_size.is_none() {
            missing.push("Grain Size");
        }
        if self.thickness.is_none() {
            missing.push("Thickness");
        }
        missing
    }

    /// Converts into layer fields, defaulting the optional text columns to "".
    pub fn into_fields(self) -> Option<LayerFields> {
        Some(LayerFields {
            lithology: self.lithology?,
            color: self.color?,
            grain_size: self.grain_size?,
            thickness: self.thickness?,
            fossils: self.fossils.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

impl From<&Layer> for ImportRecord {
    fn from(layer: &Layer) -> Self {
        Self {
            lithology: Some(layer.lithology()),
            color: Some(layer.color()),
            grain_size: Some(layer.grain_size()),
            thickness: Some(layer.thickness()),
            fossils: Some(layer.fossils().to_string()),
            notes: Some(layer.notes().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(lithology: Lithology) -> LayerFields {
        LayerFields {
            lithology,
            color: Rgb::new(10, 20, 30),
            grain_size: GrainSize::Medium,
            thickness: 1.0,
            fossils: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_environment_derivation() {
        for lithology in Lithology::ALL {
            let expected = match lithology {
                Lithology::Shale | Lithology::Limestone => Environment::Marine,
                _ => Environment::FluvialDeltaic,
            };
            assert_eq!(Layer::new(fields(lithology)).environment(), expected);
        }
    }

    #[test]
    fn test_lithology_parse_is_case_insensitive() {
        assert_eq!("shale".parse::<Lithology>(), Ok(Lithology::Shale));
        assert_eq!(" Conglomerate ".parse::<Lithology>(), Ok(Lithology::Conglomerate));
        assert!("Basalt".parse::<Lithology>().is_err());
    }

    #[test]
    fn test_lithology_cycling_wraps() {
        assert_eq!(Lithology::Siltstone.next(), Lithology::Sandstone);
        assert_eq!(Lithology::Sandstone.previous(), Lithology::Siltstone);
        assert_eq!(GrainSize::Coarse.next(), GrainSize::Fine);
        assert_eq!(GrainSize::Fine.previous(), GrainSize::Coarse);
    }

    #[test]
    fn test_rgb_parse_and_display() {
        assert_eq!("#FF8000".parse::<Rgb>(), Ok(Rgb::new(255, 128, 0)));
        assert_eq!("ff8000".parse::<Rgb>(), Ok(Rgb::new(255, 128, 0)));
        assert_eq!("#fff".parse::<Rgb>(), Ok(Rgb::WHITE));
        assert_eq!(Rgb::new(255, 128, 0).to_string(), "#ff8000");
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
        assert!("#ééé".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_luma() {
        assert_eq!(Rgb::BLACK.luma(), 0);
        assert_eq!(Rgb::WHITE.luma(), 255);
    }

    #[test]
    fn test_import_record_missing_columns() {
        let record = ImportRecord {
            lithology: Some(Lithology::Shale),
            color: None,
            grain_size: Some(GrainSize::Fine),
            thickness: None,
            fossils: None,
            notes: None,
        };
        assert_eq!(record.missing_columns(), vec!["Color", "Thickness"]);
        assert!(record.into_fields().is_none());
    }

    #[test]
    fn test_import_record_defaults_optional_text() {
        let record = ImportRecord {
            lithology: Some(Lithology::Shale),
            color: Some(Rgb::BLACK),
            grain_size: Some(GrainSize::Fine),
            thickness: Some(0.5),
            fossils: None,
            notes: None,
        };
        let fields = record.into_fields().unwrap();
        assert_eq!(fields.fossils, "");
        assert_eq!(fields.notes, "");
    }
}
