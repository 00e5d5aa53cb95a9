//! The remote operations the dashboard depends on.
//!
//! [`Client`] is the production implementation; tests substitute an in-memory one.

use crate::Client;
use crate::entities::{
    BulkCreateResponse, Employee, EmployeeCreate, EmployeeId, EmployeeUpdate, ListParameters,
    StatsSummary,
};
use crate::error::Result;

#[allow(async_fn_in_trait)]
pub trait EmployeeService {
    async fn list(&self, parameters: ListParameters) -> Result<Vec<Employee>>;

    async fn stats(&self) -> Result<StatsSummary>;

    async fn create(&self, employee: EmployeeCreate) -> Result<Employee>;

    async fn update(&self, id: EmployeeId, changes: EmployeeUpdate) -> Result<Employee>;

    async fn delete(&self, id: EmployeeId) -> Result<serde_json::Value>;

    async fn bulk_create(&self, employees: Vec<EmployeeCreate>) -> Result<BulkCreateResponse>;

    async fn export_csv(&self) -> Result<Vec<u8>>;
}

impl EmployeeService for Client {
    async fn list(&self, parameters: ListParameters) -> Result<Vec<Employee>> {
        self.employees().list(&parameters).await
    }

    async fn stats(&self) -> Result<StatsSummary> {
        self.employees().stats().await
    }

    async fn create(&self, employee: EmployeeCreate) -> Result<Employee> {
        self.employees().create(&employee).await
    }

    async fn update(&self, id: EmployeeId, changes: EmployeeUpdate) -> Result<Employee> {
        self.employees().update(id, &changes).await
    }

    async fn delete(&self, id: EmployeeId) -> Result<serde_json::Value> {
        self.employees().delete(id).await
    }

    async fn bulk_create(&self, employees: Vec<EmployeeCreate>) -> Result<BulkCreateResponse> {
        self.employees().bulk_create(&employees).await
    }

    async fn export_csv(&self) -> Result<Vec<u8>> {
        self.employees().export_csv().await
    }
}
