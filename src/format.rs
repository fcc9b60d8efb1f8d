use crate::models::BreakEven;

/// Whole-rupee amount with en-IN digit grouping (`12,34,567`).
///
/// Negative amounts display as `0` and non-finite ones as `—`.
pub fn rupees(amount: f64) -> String {
    if !amount.is_finite() {
        return "—".into();
    }
    let whole = amount.max(0.0).trunc() as u64;
    group_en_in(whole)
}

fn group_en_in(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Lenient numeric parse for free-text fields: anything unusable is 0.
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Distance or rate as typed: integers without a decimal point.
pub fn plain_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Bounded rendering for file names and card text: at most two decimals,
/// exponent notation outside that range.
pub fn compact_number(value: f64) -> String {
    if !value.is_finite() {
        return "—".into();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if value.abs() >= 1e9 || (rounded == 0.0 && value != 0.0) {
        return format!("{value:e}");
    }
    plain_number(rounded)
}

pub fn break_even_message(break_even: BreakEven) -> String {
    match break_even {
        BreakEven::Months(m) => format!("You recover the extra EV price in {m} months."),
        BreakEven::Unreachable => "Not enough monthly savings at current inputs. \
             Try higher daily km or adjust tariff/petrol."
            .into(),
    }
}
