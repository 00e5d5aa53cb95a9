//! Employee table view model.

use std::fmt::Write as _;

use crate::entities::{Employee, EmployeeId};
use crate::utils::format;

pub const EMPTY_MESSAGE: &str = "No employees found. Add your first employee to get started.";

pub const COLUMNS: [&str; 7] = ["ID", "Name", "Role", "Department", "Email", "Salary", "Actions"];

const UNASSIGNED: &str = "Unassigned";
const NO_EMAIL: &str = "N/A";

/// Display strings for one row. Rows are identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub id: EmployeeId,
    pub id_label: String,
    pub name: String,
    pub role: String,
    pub department: String,
    pub email: String,
    pub salary: String,
    pub rating: Option<String>,
}

impl From<&Employee> for EmployeeRow {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            id_label: format!("#{}", employee.id),
            name: employee.name.clone(),
            role: employee.role.clone(),
            department: employee
                .department
                .clone()
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            email: employee.email.clone().unwrap_or_else(|| NO_EMAIL.to_string()),
            salary: format::rupees(employee.salary),
            rating: format::rating(employee.performance_rating),
        }
    }
}

/// Per-row affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

/// What the caller should do after a row action was activated.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    Edit(Employee),
    Delete(EmployeeId),
}

/// Renders whatever employees it is given. The only state it keeps is which row the
/// pointer is over.
#[derive(Debug, Clone, Default)]
pub struct EmployeeTable {
    hovered: Option<EmployeeId>,
}

impl EmployeeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rows(employees: &[Employee]) -> Vec<EmployeeRow> {
        employees.iter().map(EmployeeRow::from).collect()
    }

    pub fn hover(&mut self, id: EmployeeId) {
        self.hovered = Some(id);
    }

    pub fn leave(&mut self) {
        self.hovered = None;
    }

    #[must_use]
    pub fn hovered(&self) -> Option<EmployeeId> {
        self.hovered
    }

    /// Activate an action on the row with `id`.
    ///
    /// Edit hands back the row's employee, delete its id. Returns `None` when no such
    /// row is shown.
    #[must_use]
    pub fn activate(employees: &[Employee], id: EmployeeId, action: RowAction) -> Option<TableAction> {
        let employee = employees.iter().find(|employee| employee.id == id)?;
        Some(match action {
            RowAction::Edit => TableAction::Edit(employee.clone()),
            RowAction::Delete => TableAction::Delete(employee.id),
        })
    }

    /// Plain-text rendering with aligned columns; the hovered row is marked with `>`.
    #[must_use]
    pub fn render(&self, employees: &[Employee]) -> String {
        let mut out = String::new();
        if employees.is_empty() {
            let _ = writeln!(out, "{}", COLUMNS.join("  "));
            let _ = writeln!(out, "{EMPTY_MESSAGE}");
            return out;
        }

        let cells: Vec<[String; 7]> = Self::rows(employees)
            .into_iter()
            .map(|row| {
                let salary = match &row.rating {
                    Some(rating) => format!("{} {rating}", row.salary),
                    None => row.salary,
                };
                [
                    row.id_label,
                    row.name,
                    row.role,
                    row.department,
                    row.email,
                    salary,
                    "[edit] [delete]".to_string(),
                ]
            })
            .collect();

        let mut widths = COLUMNS.map(|column| column.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header: [String; 7] = COLUMNS.map(ToString::to_string);
        write_row(&mut out, " ", &header, &widths);
        for (employee, row) in employees.iter().zip(&cells) {
            let marker = if self.hovered == Some(employee.id) { ">" } else { " " };
            write_row(&mut out, marker, row, &widths);
        }
        out
    }
}

fn write_row(out: &mut String, marker: &str, cells: &[String; 7], widths: &[usize; 7]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{marker} {}", line.join("  ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employees() -> Vec<Employee> {
        vec![
            Employee {
                id: 1,
                name: "Asha Rao".to_string(),
                role: "Manager".to_string(),
                salary: 1_500_000.0,
                email: None,
                department: Some("Ops".to_string()),
                performance_rating: Some(4.5),
                skills: None,
                created_at: None,
                updated_at: None,
            },
            Employee {
                id: 2,
                name: "Ravi Kumar".to_string(),
                role: "Designer".to_string(),
                salary: 850_000.0,
                email: Some("ravi@x.com".to_string()),
                department: None,
                performance_rating: None,
                skills: None,
                created_at: None,
                updated_at: None,
            },
        ]
    }

    #[test]
    fn rows_fill_in_placeholders() {
        let rows = EmployeeTable::rows(&employees());
        assert_eq!(rows[0].id_label, "#1");
        assert_eq!(rows[0].email, "N/A");
        assert_eq!(rows[0].salary, "₹15,00,000");
        assert_eq!(rows[0].rating.as_deref(), Some("⭐ 4.5/5.0"));
        assert_eq!(rows[1].department, "Unassigned");
        assert_eq!(rows[1].rating, None);
    }

    #[test]
    fn empty_table_shows_message() {
        let text = EmployeeTable::new().render(&[]);
        assert!(text.contains(EMPTY_MESSAGE));
    }

    #[test]
    fn actions_hand_back_the_row() {
        let employees = employees();
        assert_eq!(
            EmployeeTable::activate(&employees, 2, RowAction::Edit),
            Some(TableAction::Edit(employees[1].clone()))
        );
        assert_eq!(
            EmployeeTable::activate(&employees, 1, RowAction::Delete),
            Some(TableAction::Delete(1))
        );
        assert_eq!(EmployeeTable::activate(&employees, 9, RowAction::Delete), None);
    }

    #[test]
    fn hovered_row_is_marked() {
        let mut table = EmployeeTable::new();
        table.hover(2);
        let text = table.render(&employees());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with("ID"));
        assert!(lines[1].starts_with("  #1"));
        assert!(lines[2].starts_with("> #2"));

        table.leave();
        assert_eq!(table.hovered(), None);
        assert!(!table.render(&employees()).contains('>'));
    }
}
