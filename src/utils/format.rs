//! Display formatting shared by the table and the stats cards.
//!
//! Amounts are shown the way an `en-IN` locale prints them: the last three integer
//! digits form one group and every group before that has two digits
//! (`12,34,567`), with at most three fraction digits.

pub const RUPEE: char = '₹';

/// Formats a number with Indian digit grouping, e.g. `1234567.5` becomes `12,34,567.5`.
#[must_use]
pub fn group_en_in(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let grouped = group_integer(integer);
    let is_zero = grouped == "0" && fraction.is_empty();
    let sign = if value.is_sign_negative() && !is_zero { "-" } else { "" };

    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

fn group_integer(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// `₹` followed by the grouped amount.
#[must_use]
pub fn rupees(amount: f64) -> String {
    format!("{RUPEE}{}", group_en_in(amount))
}

/// Growth rate card value: `+12.5%`, or `+0%` when the server reported none.
#[must_use]
pub fn growth_rate(rate: Option<f64>) -> String {
    let rate = rate.filter(|r| r.is_finite()).unwrap_or(0.0);
    format!("+{rate}%")
}

/// Rating badge, e.g. `⭐ 4.5/5.0`. Hidden for missing or zero ratings.
#[must_use]
pub fn rating(rating: Option<f64>) -> Option<String> {
    rating
        .filter(|r| r.is_finite() && *r > 0.0)
        .map(|r| format!("⭐ {r:.1}/5.0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_like_en_in() {
        assert_eq!(group_en_in(0.0), "0");
        assert_eq!(group_en_in(999.0), "999");
        assert_eq!(group_en_in(1000.0), "1,000");
        assert_eq!(group_en_in(100_000.0), "1,00,000");
        assert_eq!(group_en_in(1_234_567.0), "12,34,567");
        assert_eq!(group_en_in(123_456_789.0), "12,34,56,789");
    }

    #[test]
    fn keeps_up_to_three_fraction_digits() {
        assert_eq!(group_en_in(1_234_567.5), "12,34,567.5");
        assert_eq!(group_en_in(1_000.125), "1,000.125");
        assert_eq!(group_en_in(2.0004), "2");
        assert_eq!(group_en_in(-1_500.25), "-1,500.25");
        assert_eq!(group_en_in(-0.0001), "0");
    }

    #[test]
    fn card_helpers() {
        assert_eq!(rupees(900_000.0), "₹9,00,000");
        assert_eq!(growth_rate(None), "+0%");
        assert_eq!(growth_rate(Some(12.5)), "+12.5%");
        assert_eq!(growth_rate(Some(3.0)), "+3%");
        assert_eq!(rating(Some(4.5)).as_deref(), Some("⭐ 4.5/5.0"));
        assert_eq!(rating(Some(0.0)), None);
        assert_eq!(rating(None), None);
    }
}
