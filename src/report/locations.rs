use once_cell::sync::Lazy;
use std::fmt;

/// Prefix prepended to every canonical image field identifier
pub const IMAGE_FIELD_PREFIX: &str = "image";

/// Map a human-readable location label to its canonical form field identifier.
///
/// Every character that is not an ASCII letter or digit is dropped and the
/// result is prefixed with [`IMAGE_FIELD_PREFIX`]. An empty label yields the
/// bare prefix.
pub fn normalize(label: &str) -> String {
    let stripped: String = label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    format!("{}{}", IMAGE_FIELD_PREFIX, stripped)
}

/// Locations a guard can report as having the lights switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightsOffLocation {
    BackOffice,
    SalesOffice,
    PipeStockYard,
}

impl LightsOffLocation {
    pub const ALL: [LightsOffLocation; 3] = [
        LightsOffLocation::BackOffice,
        LightsOffLocation::SalesOffice,
        LightsOffLocation::PipeStockYard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LightsOffLocation::BackOffice => "Back Office",
            LightsOffLocation::SalesOffice => "Sales Office",
            LightsOffLocation::PipeStockYard => "Pipe Stock Yard",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == label)
    }
}

/// Locations a guard can report as locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockedLocation {
    FrontOffice,
    BackOffice,
    Kitchen,
    MeetingRoom,
}

impl LockedLocation {
    pub const ALL: [LockedLocation; 4] = [
        LockedLocation::FrontOffice,
        LockedLocation::BackOffice,
        LockedLocation::Kitchen,
        LockedLocation::MeetingRoom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LockedLocation::FrontOffice => "Front Office",
            LockedLocation::BackOffice => "Back Office",
            LockedLocation::Kitchen => "Kitchen",
            LockedLocation::MeetingRoom => "Meeting Room",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == label)
    }
}

const ROUND_TOKENS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// Number of patrol rounds completed, restricted to 1..=9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundsCompleted(u8);

impl RoundsCompleted {
    /// Parse one of the tokens "1" through "9". Anything else (including
    /// "01" or " 3") is rejected.
    pub fn parse(token: &str) -> Option<Self> {
        ROUND_TOKENS
            .iter()
            .position(|t| *t == token)
            .map(|i| RoundsCompleted(i as u8 + 1))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_str(self) -> &'static str {
        ROUND_TOKENS[usize::from(self.0) - 1]
    }
}

/// The fixed, ordered set of locations a guard photographs on each round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLocation {
    FrontGeneratorRoom,
    OfficeReception,
    PipeStock,
    MillNo1,
    MillNo5Helper,
    MillNo7Helper,
    Slitting,
    SlittingPaperSide,
    PolishSection,
    Parking,
}

/// Canonical identifiers, computed once from the labels
static FIELD_IDS: Lazy<[String; ImageLocation::COUNT]> =
    Lazy::new(|| ImageLocation::ALL.map(|location| normalize(location.label())));

impl ImageLocation {
    pub const COUNT: usize = 10;

    pub const ALL: [ImageLocation; ImageLocation::COUNT] = [
        ImageLocation::FrontGeneratorRoom,
        ImageLocation::OfficeReception,
        ImageLocation::PipeStock,
        ImageLocation::MillNo1,
        ImageLocation::MillNo5Helper,
        ImageLocation::MillNo7Helper,
        ImageLocation::Slitting,
        ImageLocation::SlittingPaperSide,
        ImageLocation::PolishSection,
        ImageLocation::Parking,
    ];

    /// Position of this location in [`ImageLocation::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageLocation::FrontGeneratorRoom => "Front Generator Room",
            ImageLocation::OfficeReception => "Office Reception",
            ImageLocation::PipeStock => "Pipe Stock",
            ImageLocation::MillNo1 => "Mill No. 1",
            ImageLocation::MillNo5Helper => "Mill No. 5 Helper",
            ImageLocation::MillNo7Helper => "Mill No. 7 Helper",
            ImageLocation::Slitting => "Slitting",
            ImageLocation::SlittingPaperSide => "Slitting Paper Side",
            ImageLocation::PolishSection => "Polish Section",
            ImageLocation::Parking => "Parking",
        }
    }

    /// Canonical form field identifier, e.g. `imageMillNo1`
    pub fn field_id(self) -> &'static str {
        FIELD_IDS[self.index()].as_str()
    }

    pub fn from_field_id(field_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.field_id() == field_id)
    }
}

impl fmt::Display for ImageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
