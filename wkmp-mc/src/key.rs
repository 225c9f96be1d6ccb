//! Musical keys and the harmonic (Camelot) wheel
//!
//! The 24 keys (12 pitch classes × major/minor) are placed on a 12-position
//! wheel ordered by fifths. Minor keys carry the `A` letter, major keys the
//! `B` letter, so A minor is `8A` and its relative major C is `8B`.
//!
//! **[MXC-KEY-010]** Key labels accepted:
//! - Standard notation: `C`, `Am`, `F#m`, `Bb`, `Ebm`, `C#`, `Db` (♯/♭ too)
//! - Long forms: `A minor`, `C major`, `F# min`, `Bb maj`
//! - Camelot codes: `8A`, `12B` (case-insensitive letter)
//!
//! **[MXC-KEY-020]** Harmonic distance counts wheel steps; changing mode
//! costs one step, so relative major/minor keys are one step apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    /// Camelot letter: `A` for minor, `B` for major
    pub fn camelot_letter(&self) -> char {
        match self {
            Mode::Minor => 'A',
            Mode::Major => 'B',
        }
    }
}

/// Error parsing a key label
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized key label: '{0}'")]
pub struct KeyParseError(pub String);

/// One of the 24 musical keys
///
/// Serialized as its standard label (`"Am"`, `"F#"`), parsed from any
/// [MXC-KEY-010] form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MusicalKey {
    /// Tonic pitch class, C = 0 … B = 11
    pitch_class: u8,
    mode: Mode,
}

/// Sharp-spelled pitch names indexed by pitch class
const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat spellings used for display where conventional (Bb, Eb, Ab, Db)
const DISPLAY_NAMES_MAJOR: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];
const DISPLAY_NAMES_MINOR: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B",
];

/// Number of positions on the wheel
pub const WHEEL_SIZE: u8 = 12;

impl MusicalKey {
    /// Create key from pitch class (taken modulo 12) and mode
    pub fn new(pitch_class: u8, mode: Mode) -> Self {
        Self {
            pitch_class: pitch_class % 12,
            mode,
        }
    }

    pub fn pitch_class(&self) -> u8 {
        self.pitch_class
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Create key from a Camelot position (1-12) and letter mode
    pub fn from_camelot(number: u8, mode: Mode) -> Option<Self> {
        if !(1..=WHEEL_SIZE).contains(&number) {
            return None;
        }
        // Inverse of camelot_number(): C major sits at 8B and each step
        // clockwise is a fifth (7 semitones, 7 is its own inverse mod 12)
        let major_pc = ((number as i32 - 8).rem_euclid(12) * 7).rem_euclid(12) as u8;
        let pitch_class = match mode {
            Mode::Major => major_pc,
            // Relative minor is 3 semitones below the relative major
            Mode::Minor => (major_pc + 9) % 12,
        };
        Some(Self::new(pitch_class, mode))
    }

    /// Camelot wheel number (1-12)
    pub fn camelot_number(&self) -> u8 {
        let major_pc = match self.mode {
            Mode::Major => self.pitch_class,
            Mode::Minor => (self.pitch_class + 3) % 12,
        };
        ((major_pc as u32 * 7 + 7) % 12) as u8 + 1
    }

    /// Camelot code such as `8A`
    pub fn camelot_code(&self) -> String {
        format!("{}{}", self.camelot_number(), self.mode.camelot_letter())
    }

    /// Fixed index 0-23 in wheel order (`1A, 1B, 2A, … 12B`)
    pub fn wheel_index(&self) -> u8 {
        let mode_offset = match self.mode {
            Mode::Minor => 0,
            Mode::Major => 1,
        };
        (self.camelot_number() - 1) * 2 + mode_offset
    }

    /// Deterministic scalar in [0,1] derived from the wheel index
    ///
    /// Identical keys always map to the same value; neighbours on the wheel
    /// map to nearby values.
    pub fn normalized(&self) -> f64 {
        self.wheel_index() as f64 / 23.0
    }

    /// Harmonic distance in wheel steps (0 = same key)
    ///
    /// Number distance is measured around the circle; a mode change adds
    /// one step.
    pub fn harmonic_distance(&self, other: &MusicalKey) -> u8 {
        let a = self.camelot_number() as i16;
        let b = other.camelot_number() as i16;
        let diff = (a - b).rem_euclid(WHEEL_SIZE as i16) as u8;
        let around = diff.min(WHEEL_SIZE - diff);
        let mode_change = u8::from(self.mode != other.mode);
        around + mode_change
    }

    /// Relative major/minor (same wheel number, other mode)
    pub fn relative(&self) -> MusicalKey {
        match self.mode {
            Mode::Major => MusicalKey::new(self.pitch_class + 9, Mode::Minor),
            Mode::Minor => MusicalKey::new(self.pitch_class + 3, Mode::Major),
        }
    }

    /// Standard label, e.g. `Am`, `Bb`, `F#m`
    pub fn label(&self) -> String {
        match self.mode {
            Mode::Major => DISPLAY_NAMES_MAJOR[self.pitch_class as usize].to_string(),
            Mode::Minor => format!("{}m", DISPLAY_NAMES_MINOR[self.pitch_class as usize]),
        }
    }

    /// All 24 keys in wheel order
    pub fn all() -> Vec<MusicalKey> {
        (1..=WHEEL_SIZE)
            .flat_map(|n| {
                [Mode::Minor, Mode::Major]
                    .into_iter()
                    .filter_map(move |m| MusicalKey::from_camelot(n, m))
            })
            .collect()
    }
}

/// Parse a pitch name like `C`, `F#`, `Bb`, `E♭` into a pitch class
fn parse_pitch(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let base = PITCH_NAMES
        .iter()
        .position(|p| p.len() == 1 && p.starts_with(letter))? as i32;

    let mut offset = 0i32;
    for c in chars {
        match c {
            '#' | '♯' => offset += 1,
            'b' | '♭' => offset -= 1,
            _ => return None,
        }
    }
    Some((base + offset).rem_euclid(12) as u8)
}

/// Parse a Camelot code like `8A` or `12b`
fn parse_camelot(label: &str) -> Option<MusicalKey> {
    let letter = label.chars().last()?;
    let mode = match letter.to_ascii_uppercase() {
        'A' => Mode::Minor,
        'B' => Mode::Major,
        _ => return None,
    };
    let number: u8 = label[..label.len() - 1].parse().ok()?;
    MusicalKey::from_camelot(number, mode)
}

impl FromStr for MusicalKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let err = || KeyParseError(s.to_string());
        if label.is_empty() {
            return Err(err());
        }

        if label.starts_with(|c: char| c.is_ascii_digit()) {
            return parse_camelot(label).ok_or_else(err);
        }

        // Split "A minor" / "Amin" / "Am" into tonic + mode suffix
        let tonic_len = label
            .char_indices()
            .skip(1)
            .find(|(_, c)| !matches!(c, '#' | '♯' | 'b' | '♭'))
            .map(|(i, _)| i)
            .unwrap_or(label.len());
        let (tonic, rest) = label.split_at(tonic_len);
        let mode = match rest.trim().to_ascii_lowercase().as_str() {
            "" | "maj" | "major" => Mode::Major,
            "m" | "min" | "minor" => Mode::Minor,
            _ => return Err(err()),
        };

        let pitch_class = parse_pitch(tonic).ok_or_else(err)?;
        Ok(MusicalKey::new(pitch_class, mode))
    }
}

impl TryFrom<String> for MusicalKey {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MusicalKey> for String {
    fn from(key: MusicalKey) -> Self {
        key.label()
    }
}

impl fmt::Display for MusicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
