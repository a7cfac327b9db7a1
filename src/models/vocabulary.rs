use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ORNAMENT_LIST: [&str; 13] = [
    "MIX ORNAMENT",
    "RING",
    "CHAIN",
    "BANGLE",
    "EARRING",
    "NECKLACE",
    "BRACELET",
    "PENDANT",
    "NOSE PIN",
    "MANGALSUTRA",
    "ANKLET",
    "COIN",
    "BAR",
];

/// Declared fineness codes offered for the purity column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purity {
    #[serde(rename = "23K958")]
    P23K958,
    #[serde(rename = "22K916")]
    P22K916,
    #[serde(rename = "20K833")]
    P20K833,
    #[serde(rename = "18K750")]
    P18K750,
    #[serde(rename = "14K585")]
    P14K585,
    #[serde(rename = "9K375")]
    P9K375,
}

impl Purity {
    pub const ALL: [Purity; 6] = [
        Purity::P23K958,
        Purity::P22K916,
        Purity::P20K833,
        Purity::P18K750,
        Purity::P14K585,
        Purity::P9K375,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Purity::P23K958 => "23K958",
            Purity::P22K916 => "22K916",
            Purity::P20K833 => "20K833",
            Purity::P18K750 => "18K750",
            Purity::P14K585 => "14K585",
            Purity::P9K375 => "9K375",
        }
    }

    pub fn codes() -> Vec<&'static str> {
        Purity::ALL.iter().map(|purity| purity.code()).collect()
    }
}

impl fmt::Display for Purity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Purity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Purity::ALL
            .iter()
            .copied()
            .find(|purity| purity.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown purity code: {}", wanted))
    }
}

/// Options containing `term`, ignoring case. An empty term keeps everything.
pub fn filter_options<'a>(options: &[&'a str], term: &str) -> Vec<&'a str> {
    let needle = term.trim().to_lowercase();
    options
        .iter()
        .copied()
        .filter(|option| option.to_lowercase().contains(&needle))
        .collect()
}
