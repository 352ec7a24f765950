use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static ATOMIC_NUMBERS: Map<&'static str, u8> = phf_map! {
    "H" => 1, "He" => 2,
    "Li" => 3, "Be" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8, "F" => 9, "Ne" => 10,
    "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P" => 15, "S" => 16, "Cl" => 17, "Ar" => 18,
    "K" => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22, "V" => 23, "Cr" => 24, "Mn" => 25, "Fe" => 26,
    "Co" => 27, "Ni" => 28, "Cu" => 29, "Zn" => 30, "Ga" => 31, "Ge" => 32, "As" => 33, "Se" => 34,
    "Br" => 35, "Kr" => 36,
};

// Symbol and single-bond covalent radius (Angstrom), indexed by atomic number - 1.
const ELEMENT_DATA: [(&str, f64); 36] = [
    ("H", 0.31),
    ("He", 0.28),
    ("Li", 1.28),
    ("Be", 0.96),
    ("B", 0.84),
    ("C", 0.76),
    ("N", 0.71),
    ("O", 0.66),
    ("F", 0.57),
    ("Ne", 0.58),
    ("Na", 1.66),
    ("Mg", 1.41),
    ("Al", 1.21),
    ("Si", 1.11),
    ("P", 1.07),
    ("S", 1.05),
    ("Cl", 1.02),
    ("Ar", 1.06),
    ("K", 2.03),
    ("Ca", 1.76),
    ("Sc", 1.70),
    ("Ti", 1.60),
    ("V", 1.53),
    ("Cr", 1.39),
    ("Mn", 1.39),
    ("Fe", 1.32),
    ("Co", 1.26),
    ("Ni", 1.24),
    ("Cu", 1.32),
    ("Zn", 1.22),
    ("Ga", 1.22),
    ("Ge", 1.20),
    ("As", 1.19),
    ("Se", 1.20),
    ("Br", 1.20),
    ("Kr", 1.16),
];

/// A chemical element, identified by its atomic number.
///
/// Only elements with tabulated data (hydrogen through krypton) can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Element {
    atomic_number: u8,
}

impl Element {
    /// Creates an element from its atomic number, if tabulated.
    pub fn from_atomic_number(atomic_number: u8) -> Option<Self> {
        if (1..=ELEMENT_DATA.len() as u8).contains(&atomic_number) {
            Some(Self { atomic_number })
        } else {
            None
        }
    }

    /// Looks up an element by symbol. Case-insensitive (`"cl"`, `"CL"` and `"Cl"` all match).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let mut chars = symbol.trim().chars();
        let first = chars.next()?;
        let normalized: String = std::iter::once(first.to_ascii_uppercase())
            .chain(chars.map(|c| c.to_ascii_lowercase()))
            .collect();
        ATOMIC_NUMBERS
            .get(normalized.as_str())
            .map(|&atomic_number| Self { atomic_number })
    }

    pub fn atomic_number(&self) -> u8 {
        self.atomic_number
    }

    pub fn symbol(&self) -> &'static str {
        ELEMENT_DATA[self.atomic_number as usize - 1].0
    }

    /// Single-bond covalent radius in Angstrom.
    pub fn covalent_radius(&self) -> f64 {
        ELEMENT_DATA[self.atomic_number as usize - 1].1
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s).ok_or_else(|| format!("unknown element symbol '{}'", s))
    }
}

impl TryFrom<u8> for Element {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_atomic_number(value).ok_or_else(|| format!("unsupported atomic number {}", value))
    }
}

impl From<Element> for u8 {
    fn from(element: Element) -> Self {
        element.atomic_number
    }
}
