//! Defines the `Condition` enum, mapping the forecast provider's categorical sky
//! condition strings to descriptive variants.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Represents the sky condition reported for one forecast hour.
///
/// The provider reports conditions as kebab-case strings (e.g. `"partly-cloudy"`).
/// Unrecognised strings deserialize to [`Condition::Other`] holding the raw value
/// instead of failing, so a new upstream category never aborts a run and still
/// shows up verbatim in the hourly artifact.
///
/// Only [`Condition::Clear`] and [`Condition::Cloudy`] count as non-precipitating
/// hours, see [`Condition::is_precipitation_free`].
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Condition {
    /// Sky is clear.
    Clear,
    /// Sky is partly cloudy.
    PartlyCloudy,
    /// Sky is cloudy.
    Cloudy,
    /// Sky is overcast.
    Overcast,
    /// Drizzle.
    Drizzle,
    /// Light rain.
    LightRain,
    /// Rain.
    Rain,
    /// Moderate rain.
    ModerateRain,
    /// Heavy rain.
    HeavyRain,
    /// Continuous heavy rain.
    ContinuousHeavyRain,
    /// Rain showers.
    Showers,
    /// Sleet.
    WetSnow,
    /// Light snowfall.
    LightSnow,
    /// Snowfall.
    Snow,
    /// Snow showers.
    SnowShowers,
    /// Hail.
    Hail,
    /// Thunderstorm.
    Thunderstorm,
    /// Thunderstorm with rain.
    ThunderstormWithRain,
    /// Thunderstorm with hail.
    ThunderstormWithHail,
    /// Any condition string the provider may add later, kept as sent.
    Other(String),
}

impl Condition {
    /// Maps a provider string to its variant. Never fails.
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "clear" => Condition::Clear,
            "partly-cloudy" => Condition::PartlyCloudy,
            "cloudy" => Condition::Cloudy,
            "overcast" => Condition::Overcast,
            "drizzle" => Condition::Drizzle,
            "light-rain" => Condition::LightRain,
            "rain" => Condition::Rain,
            "moderate-rain" => Condition::ModerateRain,
            "heavy-rain" => Condition::HeavyRain,
            "continuous-heavy-rain" => Condition::ContinuousHeavyRain,
            "showers" => Condition::Showers,
            "wet-snow" => Condition::WetSnow,
            "light-snow" => Condition::LightSnow,
            "snow" => Condition::Snow,
            "snow-showers" => Condition::SnowShowers,
            "hail" => Condition::Hail,
            "thunderstorm" => Condition::Thunderstorm,
            "thunderstorm-with-rain" => Condition::ThunderstormWithRain,
            "thunderstorm-with-hail" => Condition::ThunderstormWithHail,
            other => Condition::Other(other.to_string()),
        }
    }

    /// Returns the provider's string for this condition.
    pub fn as_str(&self) -> &str {
        match self {
            Condition::Clear => "clear",
            Condition::PartlyCloudy => "partly-cloudy",
            Condition::Cloudy => "cloudy",
            Condition::Overcast => "overcast",
            Condition::Drizzle => "drizzle",
            Condition::LightRain => "light-rain",
            Condition::Rain => "rain",
            Condition::ModerateRain => "moderate-rain",
            Condition::HeavyRain => "heavy-rain",
            Condition::ContinuousHeavyRain => "continuous-heavy-rain",
            Condition::Showers => "showers",
            Condition::WetSnow => "wet-snow",
            Condition::LightSnow => "light-snow",
            Condition::Snow => "snow",
            Condition::SnowShowers => "snow-showers",
            Condition::Hail => "hail",
            Condition::Thunderstorm => "thunderstorm",
            Condition::ThunderstormWithRain => "thunderstorm-with-rain",
            Condition::ThunderstormWithHail => "thunderstorm-with-hail",
            Condition::Other(raw) => raw,
        }
    }

    /// `true` only for `clear` and `cloudy`.
    ///
    /// `partly-cloudy` and `overcast` are dry as well, but they do not count:
    /// a "non-precipitating hour" is defined by these two exact values.
    ///
    /// ```rust
    /// use trip_forecast::Condition;
    ///
    /// assert!(Condition::Clear.is_precipitation_free());
    /// assert!(Condition::Cloudy.is_precipitation_free());
    /// assert!(!Condition::Overcast.is_precipitation_free());
    /// assert!(!Condition::Rain.is_precipitation_free());
    /// ```
    pub fn is_precipitation_free(&self) -> bool {
        matches!(self, Condition::Clear | Condition::Cloudy)
    }
}

impl From<&str> for Condition {
    fn from(raw: &str) -> Self {
        Condition::from_provider(raw)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Condition::from_provider(&raw))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
