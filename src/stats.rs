//! Summary cards shown above the table.

use std::fmt::Write as _;

use crate::entities::StatsSummary;
use crate::utils::format;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

/// The four indicators, in display order. Formatting only; nothing is recomputed
/// except the department count, which is the size of the department set.
#[must_use]
pub fn cards(summary: &StatsSummary) -> [StatCard; 4] {
    [
        StatCard {
            title: "Total Employees",
            value: summary.total_employees.to_string(),
        },
        StatCard {
            title: "Average Salary",
            value: format::rupees(summary.average_salary),
        },
        StatCard {
            title: "Departments",
            value: summary.department_count().to_string(),
        },
        StatCard {
            title: "Growth Rate",
            value: format::growth_rate(summary.growth_rate),
        },
    ]
}

#[must_use]
pub fn render(summary: &StatsSummary) -> String {
    let mut out = String::new();
    for card in cards(summary) {
        let _ = writeln!(out, "{:<16} {}", card.title, card.value);
    }
    out
}
