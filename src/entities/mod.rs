//! Wire types of the employee API and the calls that produce them.

pub mod employee;
pub mod stats;

pub use employee::{
    BulkCreateResponse, Employee, EmployeeCreate, EmployeeId, EmployeeUpdate, ListParameters,
};
pub use stats::{DepartmentCount, StatsSummary};
