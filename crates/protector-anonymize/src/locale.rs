//! Locale data for synthetic names and addresses.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::AnonymizeError;

/// Supported synthesis locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// English (United States).
    #[default]
    #[serde(rename = "en_US")]
    EnUs,
    /// English (United Kingdom).
    #[serde(rename = "en_GB")]
    EnGb,
    /// German (Germany).
    #[serde(rename = "de_DE")]
    DeDe,
    /// French (France).
    #[serde(rename = "fr_FR")]
    FrFr,
}

impl Locale {
    /// All supported locales.
    pub const ALL: [Locale; 4] = [Self::EnUs, Self::EnGb, Self::DeDe, Self::FrFr];

    /// Returns the canonical locale code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::EnGb => "en_GB",
            Self::DeDe => "de_DE",
            Self::FrFr => "fr_FR",
        }
    }

    /// Picks a first name.
    pub fn first_name(&self, rng: &mut dyn RngCore) -> &'static str {
        pick(rng, self.data().first_names)
    }

    /// Picks a last name.
    pub fn last_name(&self, rng: &mut dyn RngCore) -> &'static str {
        pick(rng, self.data().last_names)
    }

    /// Generates a single-line postal address.
    pub fn address(&self, rng: &mut dyn RngCore) -> String {
        let data = self.data();
        let street = pick(rng, data.streets);
        let city = pick(rng, data.cities);
        let number = rng.gen_range(1..=9999);

        match self {
            Self::EnUs => {
                let suffix = pick(rng, &["Street", "Avenue", "Road", "Lane", "Drive", "Court"]);
                let state = pick(rng, US_STATES);
                let zip = rng.gen_range(10000..=99999);
                format!("{number} {street} {suffix}, {city}, {state} {zip}")
            }
            Self::EnGb => {
                let suffix = pick(rng, &["Road", "Street", "Lane", "Close", "Gardens"]);
                let postcode = uk_postcode(rng);
                format!("{number} {street} {suffix}, {city} {postcode}")
            }
            Self::DeDe => {
                let number = rng.gen_range(1..=199);
                let plz = rng.gen_range(1067..=99998);
                format!("{street} {number}, {plz:05} {city}")
            }
            Self::FrFr => {
                let number = rng.gen_range(1..=199);
                let cp = rng.gen_range(1000..=95999);
                format!("{number} {street}, {cp:05} {city}")
            }
        }
    }

    fn data(&self) -> &'static LocaleData {
        match self {
            Self::EnUs => &EN_US,
            Self::EnGb => &EN_GB,
            Self::DeDe => &DE_DE,
            Self::FrFr => &FR_FR,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = AnonymizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_lowercase();
        match normalized.as_str() {
            "en_us" | "en" => Ok(Self::EnUs),
            "en_gb" => Ok(Self::EnGb),
            "de_de" | "de" => Ok(Self::DeDe),
            "fr_fr" | "fr" => Ok(Self::FrFr),
            _ => Err(AnonymizeError::InvalidConfig(format!(
                "unsupported locale '{s}' (expected one of en_US, en_GB, de_DE, fr_FR)"
            ))),
        }
    }
}

struct LocaleData {
    first_names: &'static [&'static str],
    last_names: &'static [&'static str],
    streets: &'static [&'static str],
    cities: &'static [&'static str],
}

fn pick(rng: &mut dyn RngCore, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

fn uk_postcode(rng: &mut dyn RngCore) -> String {
    const AREAS: &[&str] = &["AB", "BS", "CF", "EH", "LS", "M", "NE", "SW", "W", "YO"];
    let letters = b"ABDEFGHJLNPQRSTUWXYZ";
    let area = pick(rng, AREAS);
    let district = rng.gen_range(1..=20);
    let sector = rng.gen_range(0..=9);
    let a = letters[rng.gen_range(0..letters.len())] as char;
    let b = letters[rng.gen_range(0..letters.len())] as char;
    format!("{area}{district} {sector}{a}{b}")
}

const US_STATES: &[&str] = &["CA", "NY", "TX", "WA", "IL", "OR", "CO", "MA", "GA", "OH"];

static EN_US: LocaleData = LocaleData {
    first_names: &[
        "James", "Mary", "Robert", "Patricia", "Michael", "Linda", "David", "Susan", "Daniel",
        "Karen", "Kevin", "Emily", "Brian", "Ashley", "Jason", "Megan",
    ],
    last_names: &[
        "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Martinez",
        "Wilson", "Anderson", "Taylor", "Moore", "Jackson",
    ],
    streets: &[
        "Maple", "Oak", "Cedar", "Pine", "Elm", "Washington", "Lake", "Hill", "Park", "Sunset",
    ],
    cities: &[
        "Springfield", "Riverside", "Franklin", "Greenville", "Fairview", "Madison", "Clinton",
        "Georgetown",
    ],
};

static EN_GB: LocaleData = LocaleData {
    first_names: &[
        "Oliver", "Amelia", "George", "Isla", "Harry", "Ava", "Jack", "Emily", "Charlie",
        "Sophie", "Thomas", "Grace",
    ],
    last_names: &[
        "Smith", "Jones", "Taylor", "Brown", "Williams", "Wilson", "Evans", "Thomas", "Roberts",
        "Walker", "Wright", "Hughes",
    ],
    streets: &[
        "Church", "Victoria", "Station", "Mill", "Queens", "Manor", "Kings", "Chapel", "Park",
    ],
    cities: &[
        "London", "Bristol", "Leeds", "York", "Norwich", "Cardiff", "Edinburgh", "Bath",
    ],
};

static DE_DE: LocaleData = LocaleData {
    first_names: &[
        "Lukas", "Anna", "Leon", "Lena", "Jonas", "Marie", "Felix", "Sophie", "Paul", "Laura",
        "Maximilian", "Hannah",
    ],
    last_names: &[
        "Müller", "Schmidt", "Schneider", "Fischer", "Weber", "Meyer", "Wagner", "Becker",
        "Schulz", "Hoffmann",
    ],
    streets: &[
        "Hauptstraße", "Schulstraße", "Gartenstraße", "Bahnhofstraße", "Lindenweg", "Bergstraße",
        "Kirchplatz", "Am Markt",
    ],
    cities: &[
        "Berlin", "Hamburg", "München", "Köln", "Leipzig", "Dresden", "Bremen", "Hannover",
    ],
};

static FR_FR: LocaleData = LocaleData {
    first_names: &[
        "Louis", "Camille", "Gabriel", "Léa", "Hugo", "Chloé", "Jules", "Manon", "Arthur",
        "Inès", "Lucas", "Julie",
    ],
    last_names: &[
        "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand", "Leroy",
        "Moreau",
    ],
    streets: &[
        "rue de la Paix", "avenue Victor Hugo", "rue des Lilas", "boulevard Voltaire",
        "rue du Moulin", "place de l'Église", "chemin des Vignes",
    ],
    cities: &[
        "Paris", "Lyon", "Marseille", "Toulouse", "Nantes", "Bordeaux", "Lille", "Rennes",
    ],
};
