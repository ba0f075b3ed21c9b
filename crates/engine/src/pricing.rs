//! Guest-based quote calculation.
//!
//! A quote prices a prospective event: per-guest base prices for adults and
//! children, at most [`MAX_UPCHARGES`] per-guest surcharges for premium menu
//! options, and a gratuity percentage applied on the subtotal.
//!
//! All arithmetic is integer minor units; the gratuity is rounded to the
//! nearest cent, half away from zero.

use crate::{EngineError, Money, ResultEngine};

/// Business rule: a selection carries at most two premium upcharges.
///
/// The limit is validated *here*, inside the calculator, so the invariant
/// holds for every caller and not only for UI-level toggles.
pub const MAX_UPCHARGES: usize = 2;

/// Input for a quote calculation.
#[derive(Clone, Debug)]
pub struct QuoteInput {
    pub adult_count: u32,
    pub child_count: u32,
    /// Per-adult base price.
    pub adult_price: Money,
    /// Per-child base price.
    pub child_price: Money,
    /// Per-guest surcharges for the selected premium options (0..=2 entries).
    pub upcharges: Vec<Money>,
    /// Service charge in whole percent of the subtotal (0..=100).
    pub gratuity_percent: u8,
}

/// A computed quote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    pub subtotal: Money,
    pub gratuity: Money,
    pub total: Money,
}

impl Quote {
    pub const ZERO: Quote = Quote {
        subtotal: Money::ZERO,
        gratuity: Money::ZERO,
        total: Money::ZERO,
    };
}

fn overflow() -> EngineError {
    EngineError::InvalidAmount("amount too large".to_string())
}

/// Computes a quote from guest counts, base prices, upcharges and gratuity.
///
/// Validation:
/// - at most [`MAX_UPCHARGES`] upcharges;
/// - no negative price or upcharge;
/// - `gratuity_percent <= 100`.
///
/// Zero guests yield an all-zero quote.
pub fn compute_quote(input: &QuoteInput) -> ResultEngine<Quote> {
    if input.upcharges.len() > MAX_UPCHARGES {
        return Err(EngineError::InvalidAmount(format!(
            "at most {MAX_UPCHARGES} upcharges per selection"
        )));
    }
    if input.gratuity_percent > 100 {
        return Err(EngineError::InvalidAmount(
            "gratuity_percent must be between 0 and 100".to_string(),
        ));
    }
    if input.adult_price.is_negative() || input.child_price.is_negative() {
        return Err(EngineError::InvalidAmount(
            "base prices must not be negative".to_string(),
        ));
    }
    if input.upcharges.iter().any(|u| u.is_negative()) {
        return Err(EngineError::InvalidAmount(
            "upcharges must not be negative".to_string(),
        ));
    }

    let mut per_guest_upcharge = Money::ZERO;
    for upcharge in &input.upcharges {
        per_guest_upcharge = per_guest_upcharge
            .checked_add(*upcharge)
            .ok_or_else(overflow)?;
    }

    let adult_total = input
        .adult_price
        .checked_add(per_guest_upcharge)
        .and_then(|per_guest| per_guest.checked_mul(input.adult_count))
        .ok_or_else(overflow)?;
    let child_total = input
        .child_price
        .checked_add(per_guest_upcharge)
        .and_then(|per_guest| per_guest.checked_mul(input.child_count))
        .ok_or_else(overflow)?;

    let subtotal = adult_total.checked_add(child_total).ok_or_else(overflow)?;
    let gratuity = gratuity_amount(subtotal, input.gratuity_percent)?;
    let total = subtotal.checked_add(gratuity).ok_or_else(overflow)?;

    Ok(Quote {
        subtotal,
        gratuity,
        total,
    })
}

/// Gratuity on a subtotal, rounded to the nearest cent (half away from zero).
fn gratuity_amount(subtotal: Money, percent: u8) -> ResultEngine<Money> {
    let raw = subtotal
        .minor()
        .checked_mul(i64::from(percent))
        .ok_or_else(overflow)?;
    Ok(Money::new((raw + 50) / 100))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(adults: u32, children: u32, upcharges: Vec<i64>, gratuity: u8) -> QuoteInput {
        QuoteInput {
            adult_count: adults,
            child_count: children,
            adult_price: Money::new(60_00),
            child_price: Money::new(30_00),
            upcharges: upcharges.into_iter().map(Money::new).collect(),
            gratuity_percent: gratuity,
        }
    }

    #[test]
    fn zero_guests_zero_quote() {
        let quote = compute_quote(&input(0, 0, vec![7_00], 20)).unwrap();
        assert_eq!(quote, Quote::ZERO);
    }

    #[test]
    fn reference_scenario() {
        // 10 adults, 2 children, one 7.00 upcharge, 60.00/30.00 base, 20%.
        let quote = compute_quote(&input(10, 2, vec![7_00], 20)).unwrap();
        assert_eq!(quote.subtotal, Money::new(744_00));
        assert_eq!(quote.gratuity, Money::new(148_80));
        assert_eq!(quote.total, Money::new(892_80));
    }

    #[test]
    fn subtotal_is_linear_in_each_guest_count() {
        let base = compute_quote(&input(3, 5, vec![2_50], 0)).unwrap();
        let plus_adult = compute_quote(&input(4, 5, vec![2_50], 0)).unwrap();
        let plus_child = compute_quote(&input(3, 6, vec![2_50], 0)).unwrap();

        // One more adult adds exactly (adult_price + upcharge).
        assert_eq!(plus_adult.subtotal - base.subtotal, Money::new(62_50));
        // One more child adds exactly (child_price + upcharge).
        assert_eq!(plus_child.subtotal - base.subtotal, Money::new(32_50));
    }

    #[test]
    fn total_is_subtotal_plus_gratuity() {
        for percent in [0u8, 1, 18, 50, 100] {
            let quote = compute_quote(&input(7, 3, vec![5_00, 3_00], percent)).unwrap();
            assert_eq!(quote.total, quote.subtotal + quote.gratuity);
        }
    }

    #[test]
    fn third_upcharge_rejected() {
        let err = compute_quote(&input(1, 0, vec![100, 200, 300], 0)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("at most 2 upcharges per selection".to_string())
        );
    }

    #[test]
    fn gratuity_above_100_rejected() {
        assert!(compute_quote(&input(1, 0, vec![], 101)).is_err());
    }

    #[test]
    fn negative_amounts_rejected() {
        let mut bad = input(1, 0, vec![], 10);
        bad.adult_price = Money::new(-1);
        assert!(compute_quote(&bad).is_err());

        assert!(compute_quote(&input(1, 0, vec![-5], 10)).is_err());
    }

    #[test]
    fn gratuity_rounds_half_away_from_zero() {
        // 1.01 at 50% = 0.505 -> 0.51
        let quote = compute_quote(&QuoteInput {
            adult_count: 1,
            child_count: 0,
            adult_price: Money::new(101),
            child_price: Money::ZERO,
            upcharges: vec![],
            gratuity_percent: 50,
        })
        .unwrap();
        assert_eq!(quote.gratuity, Money::new(51));
    }
}
