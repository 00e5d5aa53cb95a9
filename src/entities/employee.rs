use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    Client,
    endpoints::EmsEndpoint,
    error::Result,
    utils::serde_helpers::{empty_string_as_none, null_as_default},
};

/// Server-assigned identifier. The client never assigns or changes it.
pub type EmployeeId = i64;

/// An employee record as returned by the API.
///
/// The client only ever holds a cached copy of the last successful fetch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub salary: f64,
    #[serde(default, deserialize_with = "empty_string_as_none", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none", skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// 0 to 5 inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_rating: Option<f64>,
    /// Comma separated.
    #[serde(default, deserialize_with = "empty_string_as_none", skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Payload for creating an employee.
///
/// The validation rules mirror what the API accepts so that obviously bad input
/// never leaves the client. The API remains the authority.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EmployeeCreate {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Job role is required"))]
    pub role: String,
    #[validate(range(min = 0.0, message = "Salary must not be negative"))]
    pub salary: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 5.0, message = "Performance rating must be between 0 and 5"))]
    pub performance_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
}

/// Partial update. Absent fields are left unchanged by the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EmployeeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Full name is required"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Job role is required"))]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Salary must not be negative"))]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl From<EmployeeCreate> for EmployeeUpdate {
    fn from(employee: EmployeeCreate) -> Self {
        Self {
            name: Some(employee.name),
            role: Some(employee.role),
            salary: Some(employee.salary),
            email: employee.email,
            department: employee.department,
        }
    }
}

/// Query filters for listing employees. Unset fields are left out of the query string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ListParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl ListParameters {
    /// Filters by a free-text search. Blank input clears the filter.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.trim().is_empty()).then_some(search);
        self
    }

    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    #[must_use]
    pub fn with_page(mut self, skip: u32, limit: u32) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub employees: Vec<Employee>,
}

/// Result of a bulk create: how many rows the server stored and its per-record errors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkCreateResponse {
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

/// Retrieve a list of employees.
#[instrument(skip(client))]
pub async fn list(client: &Client, parameters: &ListParameters) -> Result<Vec<Employee>> {
    let response: ListResponse = client.get(EmsEndpoint::Employees, parameters).await?;
    Ok(response.employees)
}

/// Retrieve a single employee by its `id`.
#[instrument(skip(client))]
pub async fn get(client: &Client, id: EmployeeId) -> Result<Employee> {
    client.get(EmsEndpoint::Employee(id), &()).await
}

#[instrument(skip(client, employee))]
pub async fn create(client: &Client, employee: &EmployeeCreate) -> Result<Employee> {
    client.post(EmsEndpoint::Employees, employee).await
}

#[instrument(skip(client, changes))]
pub async fn update(client: &Client, id: EmployeeId, changes: &EmployeeUpdate) -> Result<Employee> {
    client.put(EmsEndpoint::Employee(id), changes).await
}

/// Delete an employee. The acknowledgement body is returned as-is.
#[instrument(skip(client))]
pub async fn delete(client: &Client, id: EmployeeId) -> Result<serde_json::Value> {
    client.delete(EmsEndpoint::Employee(id)).await
}

#[instrument(skip(client, employees), fields(count = employees.len()))]
pub async fn bulk_create(client: &Client, employees: &[EmployeeCreate]) -> Result<BulkCreateResponse> {
    client.post(EmsEndpoint::EmployeesBulk, &employees).await
}

/// Download the server-generated CSV export, untouched.
#[instrument(skip(client))]
pub async fn export_csv(client: &Client) -> Result<Vec<u8>> {
    client.get_bytes(EmsEndpoint::EmployeesExportCsv).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use validator::Validate;

    use super::*;

    #[test]
    fn deserializes_sparse_employee() {
        let employee: Employee = serde_json::from_value(json!({
            "id": 7,
            "name": "Asha Rao",
            "role": "Engineer",
            "salary": 1_200_000,
            "email": "",
            "department": null
        }))
        .unwrap();
        assert_eq!(employee.id, 7);
        assert!((employee.salary - 1_200_000.0).abs() < f64::EPSILON);
        assert_eq!(employee.email, None);
        assert_eq!(employee.department, None);
        assert_eq!(employee.performance_rating, None);
    }

    #[test]
    fn create_omits_unset_optionals() {
        let payload = EmployeeCreate {
            name: "Asha Rao".to_string(),
            role: "Engineer".to_string(),
            salary: 900_000.0,
            department: Some("R&D".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "name": "Asha Rao", "role": "Engineer", "salary": 900_000.0, "department": "R&D" })
        );
    }

    #[test]
    fn update_is_a_partial_patch() {
        let changes = EmployeeUpdate {
            salary: Some(1_000.0),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&changes).unwrap(), json!({ "salary": 1_000.0 }));
    }

    #[test]
    fn validation_rejects_bad_payloads() {
        let mut payload = EmployeeCreate {
            name: "Asha".to_string(),
            role: "Engineer".to_string(),
            salary: 10.0,
            ..Default::default()
        };
        assert!(payload.validate().is_ok());

        payload.salary = -1.0;
        assert!(payload.validate().is_err());

        payload.salary = 1.0;
        payload.performance_rating = Some(5.5);
        assert!(payload.validate().is_err());

        payload.performance_rating = Some(5.0);
        payload.email = Some("not-an-email".to_string());
        assert!(payload.validate().is_err());

        payload.email = None;
        payload.role = String::new();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("role"));
    }

    #[test]
    fn blank_search_is_dropped_from_the_query() {
        assert_eq!(ListParameters::default().with_search("  ").search, None);
        assert_eq!(
            ListParameters::default().with_search("asha").search.as_deref(),
            Some("asha")
        );
    }
}
