use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Percent, Tonnes};

/// Display scale for emissions magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmissionsUnit {
    Tonnes,
    Kilotonnes,
    Megatonnes,
    Gigatonnes,
}

impl EmissionsUnit {
    pub fn divisor(self) -> Decimal {
        match self {
            EmissionsUnit::Tonnes => Decimal::ONE,
            EmissionsUnit::Kilotonnes => dec!(1_000),
            EmissionsUnit::Megatonnes => dec!(1_000_000),
            EmissionsUnit::Gigatonnes => dec!(1_000_000_000),
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            EmissionsUnit::Tonnes => "t",
            EmissionsUnit::Kilotonnes => "kt",
            EmissionsUnit::Megatonnes => "Mt",
            EmissionsUnit::Gigatonnes => "Gt",
        }
    }
}

/// Display locale. Swedish writes `1 234,5`, English `1,234.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Sv,
    En,
}

impl Locale {
    fn decimal_separator(self) -> char {
        match self {
            Locale::Sv => ',',
            Locale::En => '.',
        }
    }

    fn thousands_separator(self) -> char {
        match self {
            // Non-breaking space, per Swedish typographic convention
            Locale::Sv => '\u{00a0}',
            Locale::En => ',',
        }
    }
}

/// Smallest unit that keeps the magnitude below 1000 of that unit. Values of
/// a gigatonne or more stay in gigatonnes.
pub fn best_fit_unit(value: Tonnes) -> EmissionsUnit {
    let magnitude = value.abs();
    if magnitude < dec!(1_000) {
        EmissionsUnit::Tonnes
    } else if magnitude < dec!(1_000_000) {
        EmissionsUnit::Kilotonnes
    } else if magnitude < dec!(1_000_000_000) {
        EmissionsUnit::Megatonnes
    } else {
        EmissionsUnit::Gigatonnes
    }
}

/// Format a raw tonnes value in its best-fit unit, one decimal place.
pub fn format_tonnes(value: Tonnes, locale: Locale) -> String {
    format_scaled(value, best_fit_unit(value), locale)
}

/// Format a raw tonnes value in an explicit unit, one decimal place.
pub fn format_scaled(value: Tonnes, unit: EmissionsUnit, locale: Locale) -> String {
    let scaled = value / unit.divisor();
    format!("{} {}", format_number(scaled, 1, locale), unit.suffix())
}

/// Format percentage points, one decimal place.
pub fn format_percent(value: Percent, locale: Locale) -> String {
    format!("{}%", format_number(value, 1, locale))
}

/// Locale-aware fixed-point rendering with thousands separators.
pub fn format_number(value: Decimal, decimals: u32, locale: Locale) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.*}", decimals as usize, rounded);

    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(locale.thousands_separator());
        }
        grouped.push(*c);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}{}{f}", locale.decimal_separator()),
        None => format!("{sign}{grouped}"),
    }
}
