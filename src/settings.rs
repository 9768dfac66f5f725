//! Flag value vocabularies and their gameplay lookups
//!
//! Every remote flag is a plain string. These enums give the recognised
//! names a type; anything unrecognised resolves to the category default.

use serde::{Deserialize, Serialize};

/// Difficulty tiers (`game-difficulty` flag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Gameplay parameters for one difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Base obstacle scroll speed (pixels per frame)
    pub obstacle_speed: f32,
    /// Minimum frames between obstacle spawns
    pub obstacle_frequency: u32,
    /// Jump strength handed to the player
    pub jump_height: f32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Parse a flag value, falling back to `medium`
    pub fn resolve(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::debug!("Unknown difficulty {:?}, using medium", s);
            Self::default()
        })
    }

    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                obstacle_speed: 3.0,
                obstacle_frequency: 120,
                jump_height: 100.0,
            },
            Difficulty::Medium => DifficultyProfile {
                obstacle_speed: 5.0,
                obstacle_frequency: 100,
                jump_height: 90.0,
            },
            Difficulty::Hard => DifficultyProfile {
                obstacle_speed: 7.0,
                obstacle_frequency: 80,
                jump_height: 80.0,
            },
        }
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Difficulty::Medium.profile()
    }
}

/// Dinosaur skins (`dino-color` flag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DinoColor {
    #[default]
    Green,
    Blue,
    Red,
    Purple,
    Orange,
    Pink,
}

impl DinoColor {
    pub const ALL: [DinoColor; 6] = [
        DinoColor::Green,
        DinoColor::Blue,
        DinoColor::Red,
        DinoColor::Purple,
        DinoColor::Orange,
        DinoColor::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DinoColor::Green => "green",
            DinoColor::Blue => "blue",
            DinoColor::Red => "red",
            DinoColor::Purple => "purple",
            DinoColor::Orange => "orange",
            DinoColor::Pink => "pink",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "green" => Some(DinoColor::Green),
            "blue" => Some(DinoColor::Blue),
            "red" => Some(DinoColor::Red),
            "purple" => Some(DinoColor::Purple),
            "orange" => Some(DinoColor::Orange),
            "pink" => Some(DinoColor::Pink),
            _ => None,
        }
    }

    /// Parse a flag value, falling back to green
    pub fn resolve(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::debug!("Unknown dino color {:?}, using green", s);
            Self::default()
        })
    }

    /// Main body color
    pub fn hex(&self) -> &'static str {
        match self {
            DinoColor::Green => "#2d7d32",
            DinoColor::Blue => "#1976d2",
            DinoColor::Red => "#d32f2f",
            DinoColor::Purple => "#7b1fa2",
            DinoColor::Orange => "#f57c00",
            DinoColor::Pink => "#c2185b",
        }
    }

    /// Back stripe and spikes
    pub fn darker(&self) -> &'static str {
        match self {
            DinoColor::Green => "#1b5e20",
            DinoColor::Blue => "#0d47a1",
            DinoColor::Red => "#b71c1c",
            DinoColor::Purple => "#4a148c",
            DinoColor::Orange => "#e65100",
            DinoColor::Pink => "#880e4f",
        }
    }

    /// Belly
    pub fn lighter(&self) -> &'static str {
        match self {
            DinoColor::Green => "#66bb6a",
            DinoColor::Blue => "#42a5f5",
            DinoColor::Red => "#ef5350",
            DinoColor::Purple => "#ab47bc",
            DinoColor::Orange => "#ffa726",
            DinoColor::Pink => "#ec407a",
        }
    }
}

/// Background themes (`weather-background` flag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Weather {
    pub const ALL: [Weather; 4] = [Weather::Spring, Weather::Summer, Weather::Autumn, Weather::Winter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Spring => "spring",
            Weather::Summer => "summer",
            Weather::Autumn => "autumn",
            Weather::Winter => "winter",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "spring" => Some(Weather::Spring),
            "summer" => Some(Weather::Summer),
            "autumn" => Some(Weather::Autumn),
            "winter" => Some(Weather::Winter),
            _ => None,
        }
    }

    /// Parse a flag value, falling back to spring
    pub fn resolve(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::debug!("Unknown weather {:?}, using spring", s);
            Self::default()
        })
    }

    /// Sky color behind the canvas
    pub fn background(&self) -> &'static str {
        match self {
            Weather::Spring => "#87ceeb",
            Weather::Summer => "#ffeb3b",
            Weather::Autumn => "#ff9800",
            Weather::Winter => "#e3f2fd",
        }
    }

    /// Theme class applied to the render surface
    pub fn css_class(&self) -> &'static str {
        match self {
            Weather::Spring => "weather-spring",
            Weather::Summer => "weather-summer",
            Weather::Autumn => "weather-autumn",
            Weather::Winter => "weather-winter",
        }
    }
}

/// Obstacle rendering (`obstacle-type` flag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleStyle {
    #[default]
    Logos,
    Classic,
}

impl ObstacleStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleStyle::Logos => "logos",
            ObstacleStyle::Classic => "classic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "logos" => Some(ObstacleStyle::Logos),
            "classic" => Some(ObstacleStyle::Classic),
            _ => None,
        }
    }

    pub fn resolve(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_medium_profile_parity() {
        let profile = Difficulty::Medium.profile();
        assert_eq!(profile.obstacle_speed, 5.0);
        assert_eq!(profile.obstacle_frequency, 100);
        assert_eq!(profile.jump_height, 90.0);
    }

    #[test]
    fn test_names_roundtrip() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        for c in DinoColor::ALL {
            assert_eq!(DinoColor::from_str(c.as_str()), Some(c));
        }
        for w in Weather::ALL {
            assert_eq!(Weather::from_str(w.as_str()), Some(w));
        }
    }

    #[test]
    fn test_names_match_exactly() {
        assert_eq!(DinoColor::resolve("BLUE"), DinoColor::Green);
        assert_eq!(DinoColor::resolve(" blue "), DinoColor::Green);
        assert_eq!(DinoColor::resolve("BLUE").hex(), "#2d7d32");
        assert_eq!(Difficulty::resolve("Hard").profile(), Difficulty::Medium.profile());
        assert_eq!(Difficulty::resolve(" easy").profile(), Difficulty::Medium.profile());
        assert_eq!(Weather::resolve("Winter"), Weather::Spring);
        assert_eq!(ObstacleStyle::resolve("CLASSIC"), ObstacleStyle::Logos);
        assert_eq!(ObstacleStyle::resolve("logo"), ObstacleStyle::Logos);
        assert_eq!(ObstacleStyle::resolve("classic"), ObstacleStyle::Classic);
    }

    proptest! {
        #[test]
        fn unknown_difficulty_is_medium(s in "\\PC*") {
            prop_assume!(!Difficulty::ALL.iter().any(|d| d.as_str() == s));
            prop_assert_eq!(Difficulty::resolve(&s).profile(), Difficulty::Medium.profile());
        }

        #[test]
        fn unknown_color_is_green(s in "\\PC*") {
            prop_assume!(!DinoColor::ALL.iter().any(|c| c.as_str() == s));
            prop_assert_eq!(DinoColor::resolve(&s).hex(), "#2d7d32");
        }

        #[test]
        fn case_or_padding_changes_are_unknown(i in 0usize..6, pad in "[ \\t]{0,2}") {
            let name = DinoColor::ALL[i].as_str();
            let shouted = format!("{}{}{}", pad, name.to_uppercase(), pad);
            prop_assert_eq!(DinoColor::resolve(&shouted), DinoColor::Green);
        }

        #[test]
        fn unknown_weather_is_spring(s in "[a-zA-Z ]{0,12}") {
            prop_assume!(!Weather::ALL.iter().any(|w| w.as_str() == s));
            prop_assert_eq!(Weather::resolve(&s), Weather::Spring);
        }
    }
}
