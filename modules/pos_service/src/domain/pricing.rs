//! Checkout arithmetic: line subtotals, promo discount, tax and change

use crate::contract::{PosError, Promo};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

/// Largest amount a money column holds (`DECIMAL(16, 2)`)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_874_919_423, 2_328_306, 0, false, 2);

/// Round to cents, midpoint away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn too_large(what: &str) -> PosError {
    PosError::validation(format!("{} exceeds the largest supported amount", what))
}

/// Reject negative amounts and amounts storage cannot hold
pub fn ensure_amount(what: &str, amount: Decimal) -> Result<Decimal, PosError> {
    if amount.is_sign_negative() {
        return Err(PosError::validation(format!("{} cannot be negative", what)));
    }
    if amount > MAX_AMOUNT {
        return Err(too_large(what));
    }
    Ok(amount)
}

/// `unit * quantity` rounded to cents, within [`MAX_AMOUNT`]
pub fn line_amount(what: &str, unit: Decimal, quantity: i64) -> Result<Decimal, PosError> {
    let amount = unit
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| too_large(what))?;
    ensure_amount(what, round_money(amount))
}

/// Sum of amounts, within [`MAX_AMOUNT`]
pub fn sum_amounts(
    what: &str,
    amounts: impl IntoIterator<Item = Decimal>,
) -> Result<Decimal, PosError> {
    let total = amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| too_large(what))?;
    ensure_amount(what, total)
}

/// `amount * percent / 100` rounded to cents
fn percent_of(what: &str, amount: Decimal, percent: Decimal) -> Result<Decimal, PosError> {
    let scaled = amount.checked_mul(percent).ok_or_else(|| too_large(what))?;
    Ok(round_money(scaled / Decimal::ONE_HUNDRED))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub promo_discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

pub fn price_line(
    product_id: Uuid,
    quantity: i64,
    unit_price: Decimal,
    discount: Decimal,
) -> Result<PricedLine, PosError> {
    if quantity <= 0 {
        return Err(PosError::validation(format!(
            "quantity for product {} must be positive",
            product_id
        )));
    }
    ensure_amount(&format!("unit price for product {}", product_id), unit_price)?;
    ensure_amount(&format!("discount for product {}", product_id), discount)?;

    let gross = line_amount(&format!("line amount for product {}", product_id), unit_price, quantity)?;
    if discount > gross {
        return Err(PosError::validation(format!(
            "discount {} exceeds line amount {} for product {}",
            discount, gross, product_id
        )));
    }

    Ok(PricedLine {
        product_id,
        quantity,
        unit_price,
        discount,
        subtotal: round_money(gross - discount),
    })
}

/// Discount granted by `promo` on `subtotal`, capped by `max_discount`
pub fn promo_discount(promo: &Promo, subtotal: Decimal) -> Result<Decimal, PosError> {
    let raw = percent_of("promo discount", subtotal, promo.percent_off)?;
    Ok(match promo.max_discount {
        Some(cap) => raw.min(cap),
        None => raw,
    })
}

pub fn sale_totals(
    lines: &[PricedLine],
    promo: Option<&Promo>,
    tax_rate_percent: Decimal,
) -> Result<SaleTotals, PosError> {
    let subtotal = sum_amounts("sale subtotal", lines.iter().map(|line| line.subtotal))?;
    let promo_discount = match promo {
        Some(promo) => promo_discount(promo, subtotal)?,
        None => Decimal::ZERO,
    };
    let taxable = subtotal - promo_discount;
    let tax = percent_of("tax", taxable, tax_rate_percent)?;

    Ok(SaleTotals {
        subtotal,
        promo_discount,
        tax,
        total: sum_amounts("sale total", [taxable, tax])?,
    })
}

/// Change to hand back, or the shortfall as an error
pub fn change_due(total: Decimal, paid: Decimal) -> Result<Decimal, PosError> {
    if paid < total {
        return Err(PosError::InsufficientPayment { total, paid });
    }
    Ok(paid - total)
}

/// Refund per unit of a sold line, net of its line discount
pub fn unit_refund(line_subtotal: Decimal, quantity: i64) -> Decimal {
    if quantity <= 0 {
        return Decimal::ZERO;
    }
    round_money(line_subtotal / Decimal::from(quantity))
}
