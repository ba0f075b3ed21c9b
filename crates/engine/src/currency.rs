use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code used by the catalog and all stored money values.
///
/// Convivio is effectively mono-currency today (default `EUR`), but the engine
/// models currency explicitly so catalog rows and invoices stay future-proof.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (see
/// [`Money`](crate::Money)). `minor_units()` returns how many decimal digits
/// separate major units (human input/output, e.g. `10.50 EUR`) from minor
/// units (stored integers, e.g. `1050`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Eur => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            other => Err(EngineError::CurrencyMismatch(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
