//! Booking price calculation
//!
//! Computes the payable total for a booking (plan price + adjusted fees per
//! cycle, times the cycle count, minus an externally validated coupon) and
//! attributes a share of the total to each cycle.
//!
//! Per-cycle attribution policy: every cycle gets the total divided by the
//! cycle count, rounded *down* to whole cents; the final cycle absorbs the
//! remainder. The sum of the per-cycle amounts therefore always equals the
//! payment total exactly.

use lectio_core::{
    models::{Fee, FeeBillType, Plan},
    AppError, AppResult,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Money amounts are kept at two decimal places
const MONEY_SCALE: u32 = 2;

/// Result of a price calculation
#[derive(Debug, Clone, Serialize)]
pub struct PriceBreakdown {
    /// Undiscounted total (base cycle amount x cycle count)
    pub subtotal: Decimal,
    /// Final payable total
    pub total: Decimal,
    /// Discount applied (`subtotal - total`)
    pub discount: Decimal,
    /// Per-cycle shares; sums exactly to `total`
    pub cycle_amounts: Vec<Decimal>,
}

/// Amount a fee contributes to one billing cycle
///
/// A `monthly` fee scales with the number of calendar months in the cycle;
/// on non-month plans it degrades to a one-time charge.
pub fn fee_amount_per_cycle(fee: &Fee, plan: &Plan) -> Decimal {
    match fee.bill_type {
        FeeBillType::OneTime => fee.amount,
        FeeBillType::Monthly if plan.is_monthly() => fee.amount * Decimal::from(plan.duration),
        FeeBillType::Monthly => fee.amount,
    }
}

/// Split a total across cycles, final cycle absorbing the remainder
pub fn split_across_cycles(total: Decimal, cycle_count: i32) -> AppResult<Vec<Decimal>> {
    if cycle_count <= 0 {
        return Err(AppError::InvalidInput(format!(
            "Cycle count must be at least 1, got {}",
            cycle_count
        )));
    }

    let count = Decimal::from(cycle_count);
    let per_cycle = (total / count).round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero);

    let mut amounts = vec![per_cycle; cycle_count as usize];
    if let Some(last) = amounts.last_mut() {
        *last = total - per_cycle * (count - Decimal::ONE);
    }

    Ok(amounts)
}

/// Compute the price of a booking
///
/// `coupon_total`, when given, is the externally validated final amount and
/// replaces the subtotal; it may not exceed it.
pub fn quote(
    plan: &Plan,
    fees: &[Fee],
    cycle_count: i32,
    coupon_total: Option<Decimal>,
) -> AppResult<PriceBreakdown> {
    if cycle_count <= 0 {
        return Err(AppError::InvalidInput(format!(
            "Cycle count must be at least 1, got {}",
            cycle_count
        )));
    }

    let fees_per_cycle: Decimal = fees.iter().map(|f| fee_amount_per_cycle(f, plan)).sum();
    let base_cycle_amount = (plan.price + fees_per_cycle).round_dp(MONEY_SCALE);
    let subtotal = base_cycle_amount * Decimal::from(cycle_count);

    let total = match coupon_total {
        Some(discounted) => {
            if discounted > subtotal {
                return Err(AppError::InvalidInput(format!(
                    "Discounted total {} exceeds subtotal {}",
                    discounted, subtotal
                )));
            }
            if discounted < Decimal::ZERO {
                return Err(AppError::InvalidInput(
                    "Discounted total cannot be negative".to_string(),
                ));
            }
            discounted.round_dp(MONEY_SCALE)
        }
        None => subtotal,
    };

    Ok(PriceBreakdown {
        subtotal,
        discount: subtotal - total,
        cycle_amounts: split_across_cycles(total, cycle_count)?,
        total,
    })
}

/// Breakdown for a staff-entered amount
///
/// The amount is authoritative: no calculation, the supplied discount is
/// recorded as-is.
pub fn manual_breakdown(
    amount: Decimal,
    discount: Decimal,
    cycle_count: i32,
) -> AppResult<PriceBreakdown> {
    if amount < Decimal::ZERO || discount < Decimal::ZERO {
        return Err(AppError::InvalidInput(
            "Manual amount and discount cannot be negative".to_string(),
        ));
    }

    Ok(PriceBreakdown {
        subtotal: amount + discount,
        total: amount,
        discount,
        cycle_amounts: split_across_cycles(amount, cycle_count)?,
    })
}
