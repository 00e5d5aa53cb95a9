use std::fmt;

use url::Url;

use crate::entities::employee::EmployeeId;
use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// A typed representation of the employee API endpoints.
///
/// Paths are relative; [`EmsEndpoint::to_url`] joins them onto the configured base URL,
/// which may itself carry a path prefix such as `/api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmsEndpoint {
    Employees,
    Employee(EmployeeId),
    EmployeeStats,
    EmployeesBulk,
    EmployeesExportCsv,
    Health,
}

impl EmsEndpoint {
    /// Path of the endpoint relative to the API base.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Employees => "employees".to_string(),
            Self::Employee(id) => format!("employees/{id}"),
            Self::EmployeeStats => "employees/stats/summary".to_string(),
            Self::EmployeesBulk => "employees/bulk".to_string(),
            Self::EmployeesExportCsv => "employees/export/csv".to_string(),
            Self::Health => "health".to_string(),
        }
    }

    /// Converts the endpoint to a full URL under `base`.
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        if base.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint);
        }

        // Url::join replaces the last segment unless the base ends with a slash.
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        base.join(&self.path()).map_err(|_| Error::InvalidEndpoint)
    }
}

impl fmt::Display for EmsEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse(DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn keeps_base_path_prefix() {
        assert_eq!(
            EmsEndpoint::Employees.to_url(&base()).unwrap().as_str(),
            "http://localhost:8000/api/employees"
        );
        assert_eq!(
            EmsEndpoint::Employee(42).to_url(&base()).unwrap().as_str(),
            "http://localhost:8000/api/employees/42"
        );
        assert_eq!(
            EmsEndpoint::Health.to_url(&base()).unwrap().as_str(),
            "http://localhost:8000/api/health"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let base = Url::parse("https://ems.example.com/api/v1/").unwrap();
        assert_eq!(
            EmsEndpoint::EmployeeStats.to_url(&base).unwrap().as_str(),
            "https://ems.example.com/api/v1/employees/stats/summary"
        );
        assert_eq!(
            EmsEndpoint::EmployeesExportCsv.to_url(&base).unwrap().as_str(),
            "https://ems.example.com/api/v1/employees/export/csv"
        );
    }

    #[test]
    fn rejects_opaque_base() {
        let base = Url::parse("mailto:hr@example.com").unwrap();
        assert!(matches!(
            EmsEndpoint::EmployeesBulk.to_url(&base),
            Err(Error::InvalidEndpoint)
        ));
    }

    #[test]
    fn display_is_the_relative_path() {
        assert_eq!(EmsEndpoint::EmployeesBulk.to_string(), "/employees/bulk");
    }
}
