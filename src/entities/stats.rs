use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Client, endpoints::EmsEndpoint, error::Result, utils::serde_helpers::null_as_default};

/// Head count of a single department.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentCount {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

/// Server-computed aggregates over the whole employee set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_employees: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_salary: f64,
    /// Percentage; absent means no growth figure is available.
    #[serde(default)]
    pub growth_rate: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub departments: Vec<DepartmentCount>,
}

impl StatsSummary {
    /// Number of distinct departments, derived from the department list.
    #[must_use]
    pub fn department_count(&self) -> usize {
        self.departments
            .iter()
            .map(|department| department.name.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Retrieve the aggregate summary.
#[instrument(skip(client))]
pub async fn summary(client: &Client) -> Result<StatsSummary> {
    client.get(EmsEndpoint::EmployeeStats, &()).await
}
