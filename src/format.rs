use std::fmt;
use std::str::FromStr;

/// Decimal-separator convention derived from a locale tag such as
/// `de_DE.UTF-8` or `en_US`. The choice is carried explicitly instead of
/// mutating process-wide locale state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalLocale {
    separator: char,
}

/// Languages that write decimals with a comma. Everything else gets a point.
const COMMA_LANGUAGES: [&str; 18] = [
    "de", "fr", "es", "it", "pt", "nl", "da", "sv", "nb", "nn", "fi", "pl", "cs", "sk", "hu",
    "ru", "tr", "el",
];

impl DecimalLocale {
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['_', '-', '.'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        let separator = if COMMA_LANGUAGES.contains(&language.as_str()) {
            ','
        } else {
            '.'
        };
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }
}

impl Default for DecimalLocale {
    fn default() -> Self {
        Self::from_tag("de_DE.UTF-8")
    }
}

/// How edge values are turned into label text.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSpec {
    /// Decimal places to round to. `None` leaves the value unrounded.
    pub decimals: Option<u32>,
    /// Unit suffix, e.g. `kW`. Empty means no suffix.
    pub unit: String,
    pub locale: DecimalLocale,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            decimals: Some(2),
            unit: String::new(),
            locale: DecimalLocale::default(),
        }
    }
}

/// Renders one edge value as label text.
///
/// Without decimals and unit the raw number is returned unchanged; without
/// decimals but with a unit the unrounded number gets the suffix. Otherwise
/// the value is rounded and written with the locale's decimal separator.
pub fn format_value(value: f64, spec: &FormatSpec) -> String {
    let Some(decimals) = spec.decimals else {
        if spec.unit.is_empty() {
            return format!("{value}");
        }
        return format!("{value} {}", spec.unit);
    };

    let places = decimals as usize;
    let mut text = format!("{value:.places$}");
    if spec.locale.separator() != '.' {
        text = text.replace('.', &spec.locale.separator().to_string());
    }
    if spec.unit.is_empty() {
        text
    } else {
        format!("{text} {}", spec.unit)
    }
}

impl FromStr for DecimalLocale {
    type Err = std::convert::Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(tag))
    }
}

impl fmt::Display for DecimalLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.separator)
    }
}
