//! 金額與數量的進位規則

use rust_decimal::{Decimal, RoundingStrategy};

/// 金額小數位數
pub const MONEY_DP: u32 = 2;

/// 單位成本小數位數
pub const UNIT_COST_DP: u32 = 4;

/// 金額進位（2 位小數，四捨五入）
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// 單位成本進位（4 位小數，四捨五入）
pub fn round_unit_cost(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(UNIT_COST_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// 整數進位（四捨五入）
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// 乘積；溢位時回傳 None
pub fn checked_product(quantity: Decimal, price: Decimal) -> Option<Decimal> {
    quantity.checked_mul(price)
}

/// 明細小計 = round(數量 × 單價, 2)，溢位時取 Decimal 上下限
pub fn line_total(quantity: Decimal, price: Decimal) -> Decimal {
    round_money(quantity.saturating_mul(price))
}

/// 加總（溢位時取 Decimal 上下限）
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .fold(Decimal::ZERO, |total, value| total.saturating_add(value))
}

/// 金額加總後進位
pub fn sum_money<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    round_money(saturating_sum(values))
}
