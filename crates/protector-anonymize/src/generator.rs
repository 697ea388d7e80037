//! Format-preserving synthetic value generation.
//!
//! Every built-in category has a synthesis rule that mirrors the surface
//! format of the original value (separators, digit counts, letter case,
//! date layout). With consistency enabled, the generator memoizes by the
//! exact original string and seeds each draw from a BLAKE3 digest of that
//! string, so equal inputs map to equal outputs across generator instances
//! sharing a base seed.

use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::locale::Locale;
use protector_core::PiiCategory;

/// Upper bound on redraws when a synthesized value equals its original.
const MAX_ATTEMPTS: usize = 16;

/// Synthesizer for custom categories.
///
/// Implemented for any `Fn(&str, &mut dyn RngCore) -> String`, so closures can
/// be registered directly.
pub trait Synthesizer: Send + Sync {
    /// Produces a replacement for `original`, drawing randomness from `rng`.
    fn synthesize(&self, original: &str, rng: &mut dyn RngCore) -> String;
}

impl<F> Synthesizer for F
where
    F: Fn(&str, &mut dyn RngCore) -> String + Send + Sync,
{
    fn synthesize(&self, original: &str, rng: &mut dyn RngCore) -> String {
        self(original, rng)
    }
}

/// Produces synthetic replacements for detected PII values.
pub struct SubstitutionGenerator {
    locale: Locale,
    consistent: bool,
    base_seed: u64,
    rng: StdRng,
    cache: HashMap<String, String>,
    synthesizers: HashMap<String, Box<dyn Synthesizer>>,
}

impl SubstitutionGenerator {
    /// Creates a generator.
    ///
    /// `seed` is the base seed for consistent draws and seeds the generator's
    /// own RNG for non-consistent draws; without it the RNG is seeded from OS
    /// entropy and consistent draws use a base seed of zero.
    #[must_use]
    pub fn new(locale: Locale, consistent: bool, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            locale,
            consistent,
            base_seed: seed.unwrap_or(0),
            rng,
            cache: HashMap::new(),
            synthesizers: HashMap::new(),
        }
    }

    /// Registers a synthesizer for a custom category label.
    pub fn register_synthesizer(
        &mut self,
        label: impl Into<String>,
        synthesizer: impl Synthesizer + 'static,
    ) {
        self.synthesizers.insert(label.into(), Box::new(synthesizer));
    }

    /// Generates a replacement for `original`.
    pub fn generate(&mut self, category: &PiiCategory, original: &str) -> String {
        if self.consistent {
            if let Some(cached) = self.cache.get(original) {
                return cached.clone();
            }
        }

        let mut rng = if self.consistent {
            StdRng::seed_from_u64(value_seed(original) ^ self.base_seed)
        } else {
            StdRng::seed_from_u64(self.rng.next_u64())
        };

        let mut replacement = self.synthesize(category, original, &mut rng);
        let mut attempts = 1;
        while replacement == original && attempts < MAX_ATTEMPTS {
            replacement = self.synthesize(category, original, &mut rng);
            attempts += 1;
        }
        if replacement == original {
            replacement = redacted_marker(&mut rng);
        }

        if self.consistent {
            self.cache.insert(original.to_string(), replacement.clone());
        }
        replacement
    }

    /// Returns the cached replacement for `original`, if any.
    #[must_use]
    pub fn cached(&self, original: &str) -> Option<&str> {
        self.cache.get(original).map(String::as_str)
    }

    /// Returns the number of cached replacements.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached replacement.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn synthesize(&self, category: &PiiCategory, original: &str, rng: &mut StdRng) -> String {
        match category {
            PiiCategory::Email => self.synth_email(rng),
            PiiCategory::Phone => synth_phone(original, rng),
            PiiCategory::NationalId => synth_national_id(original, rng),
            PiiCategory::PaymentCard => synth_payment_card(original, rng),
            PiiCategory::IpAddress => synth_ip_address(original, rng),
            PiiCategory::Date => synth_date(original, rng),
            PiiCategory::PostalAddress => self.locale.address(rng),
            PiiCategory::Passport | PiiCategory::DriverLicense => redraw_alphanumeric(original, rng),
            PiiCategory::BankAccount => synth_bank_account(original, rng),
            PiiCategory::PersonName => self.synth_person_name(original, rng),
            PiiCategory::Custom(label) => match self.synthesizers.get(label) {
                Some(synthesizer) => synthesizer.synthesize(original, rng),
                None => redacted_marker(rng),
            },
        }
    }

    fn synth_email(&self, rng: &mut StdRng) -> String {
        let first = ascii_fold(self.locale.first_name(rng));
        let last = ascii_fold(self.locale.last_name(rng));
        let domain = ["example.com", "example.org", "example.net"][rng.gen_range(0..3)];

        match rng.gen_range(0..3) {
            0 => format!("{first}.{last}@{domain}"),
            1 => format!("{}{last}{}@{domain}", &first[..1], rng.gen_range(1..100)),
            _ => format!("{first}{}@{domain}", rng.gen_range(10..1000)),
        }
    }

    fn synth_person_name(&self, original: &str, rng: &mut StdRng) -> String {
        let first = self.locale.first_name(rng);
        if original.split_whitespace().count() <= 1 {
            first.to_string()
        } else {
            format!("{first} {}", self.locale.last_name(rng))
        }
    }
}

impl Default for SubstitutionGenerator {
    fn default() -> Self {
        Self::new(Locale::default(), true, None)
    }
}

impl fmt::Debug for SubstitutionGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubstitutionGenerator")
            .field("locale", &self.locale)
            .field("consistent", &self.consistent)
            .field("cached", &self.cache.len())
            .field("synthesizers", &self.synthesizers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Derives a per-value seed from the first 8 bytes of the BLAKE3 digest.
fn value_seed(original: &str) -> u64 {
    let hash = blake3::hash(original.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

fn redacted_marker(rng: &mut dyn RngCore) -> String {
    format!("[REDACTED-{:04}]", rng.gen_range(0..10_000))
}

fn random_digit(rng: &mut dyn RngCore, low: u8) -> char {
    char::from(b'0' + rng.gen_range(low..=9))
}

/// Writes `digits` into the digit positions of `original`, keeping every
/// other character.
fn format_like(original: &str, digits: &str) -> String {
    let mut replacement = digits.chars();
    original
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                replacement.next().unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

fn synth_phone(original: &str, rng: &mut dyn RngCore) -> String {
    let mut chars: Vec<char> = original.chars().collect();
    let digits: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_ascii_digit())
        .map(|(i, _)| i)
        .collect();

    let mut national_start = 0;
    let mut country_code = String::new();
    if let Some(plus) = chars.iter().position(|&c| c == '+') {
        let run = chars[plus + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        national_start = if run == digits.len() {
            // No separators: assume a 1-digit NANP or 2-digit code.
            if chars.get(plus + 1) == Some(&'1') {
                1
            } else {
                run.min(2)
            }
        } else {
            run.min(3)
        };
        country_code = chars[plus + 1..plus + 1 + national_start].iter().collect();
    } else if digits.first().map(|&i| chars[i]) == Some('0') {
        national_start = 1;
    }

    let national = &digits[national_start.min(digits.len())..];
    let nanp = national.len() == 10 && (country_code.is_empty() || country_code == "1");

    for (i, &pos) in national.iter().enumerate() {
        chars[pos] = if nanp && (i == 0 || i == 3) {
            random_digit(rng, 2)
        } else if i == 0 {
            random_digit(rng, 1)
        } else {
            random_digit(rng, 0)
        };
    }

    chars.into_iter().collect()
}

fn synth_national_id(original: &str, rng: &mut dyn RngCore) -> String {
    let count = original.chars().filter(char::is_ascii_digit).count();
    let digits = if count == 9 {
        let area = loop {
            let area = rng.gen_range(1..900);
            if area != 666 {
                break area;
            }
        };
        format!(
            "{area:03}{:02}{:04}",
            rng.gen_range(1..100),
            rng.gen_range(1..10_000)
        )
    } else {
        (0..count).map(|_| random_digit(rng, 0)).collect()
    };
    format_like(original, &digits)
}

/// Validates an SSN's area, group and serial numbers.
#[must_use]
pub fn is_valid_ssn(ssn: &str) -> bool {
    let digits: String = ssn.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 9 {
        return false;
    }
    let area: u32 = digits[..3].parse().unwrap_or(0);
    let group: u32 = digits[3..5].parse().unwrap_or(0);
    let serial: u32 = digits[5..].parse().unwrap_or(0);

    area != 0 && area != 666 && area < 900 && group != 0 && serial != 0
}

fn synth_payment_card(original: &str, rng: &mut dyn RngCore) -> String {
    let separator = original.chars().find(|c| *c == ' ' || *c == '-');

    let mut payload: Vec<u8> = Vec::with_capacity(16);
    match original.chars().find(char::is_ascii_digit) {
        Some('5') => {
            payload.push(5);
            payload.push(rng.gen_range(1..=5));
        }
        _ => payload.push(4),
    }
    while payload.len() < 15 {
        payload.push(rng.gen_range(0..=9));
    }
    payload.push(luhn_check_digit(&payload));

    let digits: String = payload.iter().map(|d| char::from(b'0' + d)).collect();
    match separator {
        Some(sep) => digits
            .as_bytes()
            .chunks(4)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(&sep.to_string()),
        None => digits,
    }
}

/// Computes the Luhn check digit for a payload of decimal digits.
fn luhn_check_digit(payload: &[u8]) -> u8 {
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            let d = u32::from(d);
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    ((10 - (sum % 10)) % 10) as u8
}

/// Validates a number using the Luhn algorithm, ignoring separators.
#[must_use]
pub fn is_luhn_valid(number: &str) -> bool {
    let digits: Vec<u32> = number.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

fn synth_ip_address(original: &str, rng: &mut dyn RngCore) -> String {
    if original.contains(':') {
        let padded = original
            .split(':')
            .all(|group| group.len() == 4);
        let upper = original.chars().any(|c| c.is_ascii_uppercase());
        (0..8)
            .map(|_| {
                let group: u16 = rng.gen();
                match (padded, upper) {
                    (true, true) => format!("{group:04X}"),
                    (true, false) => format!("{group:04x}"),
                    (false, true) => format!("{group:X}"),
                    (false, false) => format!("{group:x}"),
                }
            })
            .collect::<Vec<_>>()
            .join(":")
    } else {
        let first = loop {
            let octet = rng.gen_range(1..=223);
            if octet != 127 {
                break octet;
            }
        };
        format!(
            "{first}.{}.{}.{}",
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            rng.gen_range(1..=254)
        )
    }
}

fn random_date(rng: &mut dyn RngCore) -> NaiveDate {
    let year = rng.gen_range(1950..=2005);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

#[derive(Clone, Copy)]
enum DatePart {
    Year { width: usize },
    Month { padded: bool },
    Day { padded: bool },
}

impl DatePart {
    fn render(self, date: NaiveDate) -> String {
        match self {
            Self::Year { width: 2 } => format!("{:02}", date.year().rem_euclid(100)),
            Self::Year { .. } => date.year().to_string(),
            Self::Month { padded: true } => format!("{:02}", date.month()),
            Self::Month { padded: false } => date.month().to_string(),
            Self::Day { padded: true } => format!("{:02}", date.day()),
            Self::Day { padded: false } => date.day().to_string(),
        }
    }
}

fn synth_date(original: &str, rng: &mut dyn RngCore) -> String {
    let date = random_date(rng);
    let trimmed = original.trim();

    if trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
        let month_word = trimmed
            .split(|c: char| !c.is_alphabetic())
            .find(|w| !w.is_empty())
            .unwrap_or_default();
        let abbreviated = month_word.len() <= 3 || month_word.eq_ignore_ascii_case("sept");
        let month = date.format(if abbreviated { "%b" } else { "%B" });
        let comma = if trimmed.contains(',') { "," } else { "" };
        return format!("{month} {}{comma} {}", date.day(), date.year());
    }

    let Some(separator) = trimmed.chars().find(|c| !c.is_ascii_digit()) else {
        if trimmed.len() == 8 {
            return date.format("%Y%m%d").to_string();
        }
        return date.format("%Y-%m-%d").to_string();
    };

    let groups: Vec<&str> = trimmed.split(separator).collect();
    if groups.len() != 3 || groups.iter().any(|g| g.is_empty() || !g.chars().all(|c| c.is_ascii_digit())) {
        return date.format("%Y-%m-%d").to_string();
    }

    let padded = |g: &str| g.len() >= 2;
    let parts = if groups[0].len() == 4 {
        [
            DatePart::Year { width: 4 },
            DatePart::Month { padded: padded(groups[1]) },
            DatePart::Day { padded: padded(groups[2]) },
        ]
    } else {
        let year = DatePart::Year {
            width: if groups[2].len() == 2 { 2 } else { 4 },
        };
        let first: u32 = groups[0].parse().unwrap_or(0);
        if first <= 12 {
            [
                DatePart::Month { padded: padded(groups[0]) },
                DatePart::Day { padded: padded(groups[1]) },
                year,
            ]
        } else {
            [
                DatePart::Day { padded: padded(groups[0]) },
                DatePart::Month { padded: padded(groups[1]) },
                year,
            ]
        }
    };

    parts
        .iter()
        .map(|part| part.render(date))
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}

/// Redraws letters (keeping case) and digits (first digit non-zero),
/// keeping every other character.
fn redraw_alphanumeric(original: &str, rng: &mut dyn RngCore) -> String {
    let mut first_digit = true;
    original
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                let low = if first_digit { 1 } else { 0 };
                first_digit = false;
                random_digit(rng, low)
            } else if c.is_ascii_uppercase() {
                char::from(b'A' + rng.gen_range(0..26))
            } else if c.is_ascii_lowercase() {
                char::from(b'a' + rng.gen_range(0..26))
            } else {
                c
            }
        })
        .collect()
}

fn synth_bank_account(original: &str, rng: &mut dyn RngCore) -> String {
    let compact: String = original.chars().filter(char::is_ascii_alphanumeric).collect();
    let is_iban = compact.len() > 4
        && compact[..2].chars().all(|c| c.is_ascii_alphabetic())
        && compact[2..4].chars().all(|c| c.is_ascii_digit());

    if !is_iban {
        return redraw_alphanumeric(original, rng);
    }

    let country = compact[..2].to_ascii_uppercase();
    let bban: String = compact[4..]
        .chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                char::from(b'A' + rng.gen_range(0..26))
            } else {
                random_digit(rng, 0)
            }
        })
        .collect();
    let check = iban_check_digits(&country, &bban);
    let mut iban = format!("{country}{check:02}{bban}");
    if original.chars().any(|c| c.is_ascii_lowercase()) {
        iban = iban.to_ascii_lowercase();
    }

    // Re-insert the original's grouping characters.
    let mut generated = iban.chars();
    original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                generated.next().unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Computes IBAN check digits (ISO 13616, mod 97).
fn iban_check_digits(country: &str, bban: &str) -> u32 {
    let rearranged = bban.chars().chain(country.chars()).chain("00".chars());
    let remainder = rearranged.fold(0u32, |acc, c| match c.to_digit(36) {
        Some(v) if v >= 10 => (acc * 100 + v) % 97,
        Some(v) => (acc * 10 + v) % 97,
        None => acc,
    });
    98 - remainder
}

/// Validates IBAN check digits, ignoring spaces and case.
#[must_use]
pub fn is_valid_iban(iban: &str) -> bool {
    let compact: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    if compact.len() < 15 || !compact.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    let (head, bban) = compact.split_at(4);
    let Ok(check) = head[2..].parse::<u32>() else {
        return false;
    };
    iban_check_digits(&head[..2], bban) == check
}

fn ascii_fold(s: &str) -> String {
    let mut folded = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'ä' | 'à' | 'â' => folded.push('a'),
            'é' | 'è' | 'ê' | 'ë' => folded.push('e'),
            'ï' | 'î' => folded.push('i'),
            'ö' | 'ô' => folded.push('o'),
            'ü' | 'ù' | 'û' => folded.push('u'),
            'ç' => folded.push('c'),
            'ß' => folded.push_str("ss"),
            'É' => folded.push('e'),
            c if c.is_ascii_alphanumeric() => folded.push(c.to_ascii_lowercase()),
            _ => {}
        }
    }
    folded
}
