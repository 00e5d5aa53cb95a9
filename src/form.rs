//! The add/edit employee form.
//!
//! The form is a small state machine, `Closed -> Editing(New | Existing) -> Closed`.
//! It only captures input. On submit it hands back a create or update payload and the
//! caller decides what to do with it.

use std::fmt::Write as _;

use validator::Validate;

use crate::entities::{Employee, EmployeeCreate, EmployeeId, EmployeeUpdate};
use crate::error::{Error, Result};

/// An editable input of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Role,
    Department,
    Salary,
    PerformanceRating,
    Skills,
}

impl Field {
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Email,
        Self::Role,
        Self::Department,
        Self::Salary,
        Self::PerformanceRating,
        Self::Skills,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Full Name *",
            Self::Email => "Email Address",
            Self::Role => "Job Role *",
            Self::Department => "Department",
            Self::Salary => "Annual Salary (₹) *",
            Self::PerformanceRating => "Performance (0-5)",
            Self::Skills => "Skills (comma separated)",
        }
    }

    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Name => "John Doe",
            Self::Email => "john.doe@company.com",
            Self::Role => "Software Engineer",
            Self::Department => "Engineering",
            Self::Salary => "1200000",
            Self::PerformanceRating => "4.5",
            Self::Skills => "React, TypeScript, Node.js",
        }
    }
}

/// Raw text of every input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub salary: String,
    pub performance_rating: String,
    pub skills: String,
}

impl FormFields {
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Role => &self.role,
            Field::Department => &self.department,
            Field::Salary => &self.salary,
            Field::PerformanceRating => &self.performance_rating,
            Field::Skills => &self.skills,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Role => &mut self.role,
            Field::Department => &mut self.department,
            Field::Salary => &mut self.salary,
            Field::PerformanceRating => &mut self.performance_rating,
            Field::Skills => &mut self.skills,
        }
    }

    /// Build the create payload, coercing numeric inputs.
    ///
    /// Unparseable numbers become `0`. Optional text left blank is omitted.
    #[must_use]
    pub fn to_create(&self) -> EmployeeCreate {
        EmployeeCreate {
            name: self.name.clone(),
            role: self.role.clone(),
            salary: coerce_number(&self.salary),
            email: optional_text(&self.email),
            department: optional_text(&self.department),
            performance_rating: (!self.performance_rating.trim().is_empty())
                .then(|| coerce_number(&self.performance_rating)),
            skills: optional_text(&self.skills),
        }
    }

    /// Build the update payload from the same coerced values as [`FormFields::to_create`].
    ///
    /// Email and department are always sent; a blank input becomes `""` so clearing one
    /// clears it on the server instead of leaving the old value in place.
    #[must_use]
    pub fn to_update(&self) -> EmployeeUpdate {
        EmployeeUpdate {
            email: Some(optional_text(&self.email).unwrap_or_default()),
            department: Some(optional_text(&self.department).unwrap_or_default()),
            ..EmployeeUpdate::from(self.to_create())
        }
    }
}

impl From<&Employee> for FormFields {
    fn from(employee: &Employee) -> Self {
        Self {
            name: employee.name.clone(),
            email: employee.email.clone().unwrap_or_default(),
            role: employee.role.clone(),
            department: employee.department.clone().unwrap_or_default(),
            salary: employee.salary.to_string(),
            performance_rating: employee
                .performance_rating
                .filter(|rating| *rating != 0.0)
                .map(|rating| rating.to_string())
                .unwrap_or_default(),
            skills: employee.skills.clone().unwrap_or_default(),
        }
    }
}

fn coerce_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

fn optional_text(raw: &str) -> Option<String> {
    (!raw.trim().is_empty()).then(|| raw.to_string())
}

/// Whether the form creates a record or edits one.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    New,
    Existing(Employee),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FormState {
    #[default]
    Closed,
    Editing { mode: FormMode, fields: FormFields },
}

/// What a successful submit hands to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(EmployeeCreate),
    Update { id: EmployeeId, changes: EmployeeUpdate },
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeForm {
    state: FormState,
}

impl EmployeeForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, FormState::Editing { .. })
    }

    /// The employee being edited, if the form is editing an existing record.
    #[must_use]
    pub fn editing(&self) -> Option<&Employee> {
        match &self.state {
            FormState::Editing { mode: FormMode::Existing(employee), .. } => Some(employee),
            _ => None,
        }
    }

    #[must_use]
    pub fn fields(&self) -> Option<&FormFields> {
        match &self.state {
            FormState::Editing { fields, .. } => Some(fields),
            FormState::Closed => None,
        }
    }

    /// Start a new record from the empty template.
    pub fn open_new(&mut self) {
        self.state = FormState::Editing {
            mode: FormMode::New,
            fields: FormFields::default(),
        };
    }

    /// Start editing `employee`, pre-populating every field from it.
    pub fn open_existing(&mut self, employee: Employee) {
        let fields = FormFields::from(&employee);
        self.state = FormState::Editing {
            mode: FormMode::Existing(employee),
            fields,
        };
    }

    /// Update one input. Ignored while the form is closed.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> bool {
        match &mut self.state {
            FormState::Editing { fields, .. } => {
                *fields.get_mut(field) = value.into();
                true
            }
            FormState::Closed => false,
        }
    }

    /// Close without emitting anything.
    pub fn cancel(&mut self) {
        self.state = FormState::Closed;
    }

    /// Validate the current input and emit it as a payload.
    ///
    /// On success the inputs are reset to the empty template while the form stays open
    /// on the same record; the caller closes it once the save has gone through. On a
    /// validation failure the inputs are kept so the user can fix them.
    pub fn submit(&mut self) -> Result<Submission> {
        let FormState::Editing { mode, fields } = &mut self.state else {
            return Err(Error::FormClosed);
        };

        let payload = fields.to_create();
        payload.validate()?;
        let submitted = std::mem::take(fields);

        Ok(match mode {
            FormMode::New => Submission::Create(payload),
            FormMode::Existing(employee) => Submission::Update {
                id: employee.id,
                changes: submitted.to_update(),
            },
        })
    }

    #[must_use]
    pub fn title(&self) -> Option<&'static str> {
        match &self.state {
            FormState::Closed => None,
            FormState::Editing { mode: FormMode::New, .. } => Some("Add New Employee"),
            FormState::Editing { mode: FormMode::Existing(_), .. } => Some("Edit Employee"),
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&'static str> {
        match &self.state {
            FormState::Closed => None,
            FormState::Editing { mode: FormMode::New, .. } => {
                Some("Fill in the details to add a new employee")
            }
            FormState::Editing { mode: FormMode::Existing(_), .. } => {
                Some("Update employee information below")
            }
        }
    }

    #[must_use]
    pub fn submit_label(&self) -> Option<&'static str> {
        match &self.state {
            FormState::Closed => None,
            FormState::Editing { mode: FormMode::New, .. } => Some("Add Employee"),
            FormState::Editing { mode: FormMode::Existing(_), .. } => Some("Update Employee"),
        }
    }

    /// Plain-text rendering; empty while closed.
    #[must_use]
    pub fn render(&self) -> String {
        let (Some(title), Some(fields)) = (self.title(), self.fields()) else {
            return String::new();
        };

        let mut out = String::new();
        let _ = writeln!(out, "{title}");
        if let Some(description) = self.description() {
            let _ = writeln!(out, "{description}");
        }
        let width = Field::ALL.iter().map(|f| f.label().chars().count()).max().unwrap_or(0);
        for field in Field::ALL {
            let value = fields.get(field);
            let shown = if value.is_empty() {
                format!("({})", field.placeholder())
            } else {
                value.to_string()
            };
            let _ = writeln!(out, "  {:<width$}  {shown}", field.label());
        }
        let _ = writeln!(out, "[{}] [Cancel]", self.submit_label().unwrap_or_default());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> Employee {
        Employee {
            id: 12,
            name: "Asha Rao".to_string(),
            role: "Manager".to_string(),
            salary: 1_500_000.0,
            email: Some("asha@x.com".to_string()),
            department: None,
            performance_rating: Some(4.5),
            skills: Some("Rust, SQL".to_string()),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn starts_closed() {
        let mut form = EmployeeForm::new();
        assert!(!form.is_open());
        assert!(!form.set(Field::Name, "ignored"));
        assert!(matches!(form.submit(), Err(Error::FormClosed)));
        assert_eq!(form.render(), "");
    }

    #[test]
    fn new_form_emits_current_values() {
        let mut form = EmployeeForm::new();
        form.open_new();
        assert_eq!(form.title(), Some("Add New Employee"));
        assert_eq!(form.fields(), Some(&FormFields::default()));

        form.set(Field::Name, "Ravi Kumar");
        form.set(Field::Role, "Designer");
        form.set(Field::Salary, "850000");
        form.set(Field::Department, "UX");
        form.set(Field::PerformanceRating, "3.5");

        let submission = form.submit().unwrap();
        assert_eq!(
            submission,
            Submission::Create(EmployeeCreate {
                name: "Ravi Kumar".to_string(),
                role: "Designer".to_string(),
                salary: 850_000.0,
                email: None,
                department: Some("UX".to_string()),
                performance_rating: Some(3.5),
                skills: None,
            })
        );
        // Inputs reset, form still open until the caller closes it.
        assert!(form.is_open());
        assert_eq!(form.fields(), Some(&FormFields::default()));
    }

    #[test]
    fn invalid_numbers_coerce_to_zero() {
        let mut form = EmployeeForm::new();
        form.open_new();
        form.set(Field::Name, "Ravi");
        form.set(Field::Role, "Designer");
        form.set(Field::Salary, "a lot");
        form.set(Field::PerformanceRating, "great");

        let Submission::Create(payload) = form.submit().unwrap() else {
            panic!("expected a create submission");
        };
        assert!(payload.salary.abs() < f64::EPSILON);
        assert_eq!(payload.performance_rating, Some(0.0));
    }

    #[test]
    fn missing_required_fields_keep_the_input() {
        let mut form = EmployeeForm::new();
        form.open_new();
        form.set(Field::Name, "Ravi");
        form.set(Field::Salary, "10");

        let err = form.submit().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.user_message("Failed to save employee"), "Job role is required");
        assert_eq!(form.fields().map(|f| f.name.as_str()), Some("Ravi"));
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let mut form = EmployeeForm::new();
        form.open_new();
        form.set(Field::Name, "Ravi");
        form.set(Field::Role, "Designer");
        form.set(Field::PerformanceRating, "7");
        assert!(matches!(form.submit(), Err(Error::Validation(_))));

        form.set(Field::PerformanceRating, "5");
        form.set(Field::Salary, "-3");
        assert!(matches!(form.submit(), Err(Error::Validation(_))));
    }

    #[test]
    fn editing_prepopulates_and_emits_update() {
        let mut form = EmployeeForm::new();
        form.open_existing(employee());
        assert_eq!(form.title(), Some("Edit Employee"));
        assert_eq!(form.submit_label(), Some("Update Employee"));
        assert_eq!(form.editing().map(|e| e.id), Some(12));

        let fields = form.fields().unwrap();
        assert_eq!(fields.name, "Asha Rao");
        assert_eq!(fields.salary, "1500000");
        assert_eq!(fields.department, "");
        assert_eq!(fields.performance_rating, "4.5");

        form.set(Field::Salary, "1600000");
        let submission = form.submit().unwrap();
        assert_eq!(
            submission,
            Submission::Update {
                id: 12,
                changes: EmployeeUpdate {
                    name: Some("Asha Rao".to_string()),
                    role: Some("Manager".to_string()),
                    salary: Some(1_600_000.0),
                    email: Some("asha@x.com".to_string()),
                    department: Some(String::new()),
                },
            }
        );
    }

    #[test]
    fn clearing_optional_text_is_sent_as_empty() {
        let mut existing = employee();
        existing.department = Some("Ops".to_string());
        let mut form = EmployeeForm::new();
        form.open_existing(existing);
        form.set(Field::Email, "");
        form.set(Field::Department, "   ");

        let Submission::Update { changes, .. } = form.submit().unwrap() else {
            panic!("expected an update submission");
        };
        assert_eq!(changes.email.as_deref(), Some(""));
        assert_eq!(changes.department.as_deref(), Some(""));

        let body = serde_json::to_value(&changes).unwrap();
        assert_eq!(body["email"], "");
        assert_eq!(body["department"], "");
        assert_eq!(body["name"], "Asha Rao");
    }

    #[test]
    fn cancel_closes_without_emitting() {
        let mut form = EmployeeForm::new();
        form.open_existing(employee());
        form.set(Field::Name, "Changed");
        form.cancel();
        assert_eq!(form.state(), &FormState::Closed);
        assert!(form.editing().is_none());
    }

    #[test]
    fn render_shows_labels_and_placeholders() {
        let mut form = EmployeeForm::new();
        form.open_new();
        form.set(Field::Name, "Ravi");
        let text = form.render();
        assert!(text.starts_with("Add New Employee\n"));
        assert!(text.contains("Ravi"));
        assert!(text.contains("(Software Engineer)"));
        assert!(text.contains("[Add Employee] [Cancel]"));
    }
}
