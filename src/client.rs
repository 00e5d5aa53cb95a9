use core::fmt;

use reqwest::{Method, RequestBuilder, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use tracing_error::SpanTrace;
use url::Url;

use crate::config::Config;
use crate::csv::{self, ImportReport};
use crate::endpoints::EmsEndpoint;
use crate::entities::{
    employee::{self, BulkCreateResponse, Employee, EmployeeCreate, EmployeeId, EmployeeUpdate, ListParameters},
    stats::{self, StatsSummary},
};
use crate::error::{Error, ErrorResponse, Result};

/// Client for the employee management API.
///
/// Every call issues exactly one HTTP request. There are no retries and no timeouts
/// beyond the transport defaults; failures surface to the caller immediately.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// # Errors
    /// Returns an error if the HTTP client can't be built.
    #[instrument(skip(config), fields(base_url = %config.base_url))]
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Creates a client pointed at the URL in `EMS_API_URL`, or the local default.
    pub fn from_env() -> Result<Self> {
        Self::new(&Config::from_env()?)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn build_request(&self, method: Method, endpoint: EmsEndpoint) -> Result<RequestBuilder> {
        let url = endpoint.to_url(&self.base_url)?;
        Ok(self.http.request(method, url))
    }

    /// Perform a `GET` request and decode the JSON body.
    #[instrument(skip(self, query))]
    pub async fn get<R: DeserializeOwned, T: Serialize + ?Sized + fmt::Debug>(
        &self,
        endpoint: EmsEndpoint,
        query: &T,
    ) -> Result<R> {
        trace!(?query, %endpoint, "making GET request");
        let response = self
            .build_request(Method::GET, endpoint)?
            .query(query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Perform a `GET` request and return the raw body bytes.
    #[instrument(skip(self))]
    pub async fn get_bytes(&self, endpoint: EmsEndpoint) -> Result<Vec<u8>> {
        trace!(%endpoint, "making binary GET request");
        let response = self.build_request(Method::GET, endpoint)?.send().await?;
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        debug!("Response body size: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Perform a `POST` request with a JSON body.
    #[instrument(skip(self, data))]
    pub async fn post<R: DeserializeOwned, T: Serialize + ?Sized>(
        &self,
        endpoint: EmsEndpoint,
        data: &T,
    ) -> Result<R> {
        trace!(json = ?serde_json::to_string(data).ok(), %endpoint, "making POST request");
        let response = self
            .build_request(Method::POST, endpoint)?
            .json(data)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Perform a `PUT` request with a JSON body.
    #[instrument(skip(self, data))]
    pub async fn put<R: DeserializeOwned, T: Serialize + ?Sized>(
        &self,
        endpoint: EmsEndpoint,
        data: &T,
    ) -> Result<R> {
        trace!(json = ?serde_json::to_string(data).ok(), %endpoint, "making PUT request");
        let response = self
            .build_request(Method::PUT, endpoint)?
            .json(data)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Perform a `DELETE` request. An empty acknowledgement decodes as `null`.
    #[instrument(skip(self))]
    pub async fn delete(&self, endpoint: EmsEndpoint) -> Result<serde_json::Value> {
        trace!(%endpoint, "making DELETE request");
        let response = self.build_request(Method::DELETE, endpoint)?.send().await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(serde_json::Value::Null);
        }
        Self::handle_response(response).await
    }

    /// Turn a non-2xx response into an [`Error`], passing successful responses through.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|body| body.message());

        if status == StatusCode::NOT_FOUND {
            warn!(%url, ?detail, "resource not found");
            return Err(Error::NotFound {
                entity: entity_from_url(&url),
                url,
                detail,
                response_body: Some(text),
            });
        }

        error!(%url, %status, ?detail, "API request failed");
        Err(Error::Api {
            status_code: status,
            url,
            detail,
            response_body: Some(text),
            span_trace: SpanTrace::capture(),
        })
    }

    #[instrument(skip(response))]
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let url = response.url().to_string();
        debug!("Response from {}: status={}", url, status);

        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        debug!("Response body size: {} bytes", text.len());
        trace!("Response text:\n{}", text);

        let text = if text.trim().is_empty() { "null".to_string() } else { text };
        serde_json::from_str(&text).map_err(|source| {
            error!(
                "Deserialization error: {}, near column {} of the response from {}",
                source,
                source.column(),
                url
            );
            Error::DeserializationError {
                source,
                response_body: Some(text),
            }
        })
    }

    /// Access the employees API
    #[must_use]
    pub fn employees(&self) -> EmployeesApi<'_> {
        EmployeesApi { client: self }
    }

    /// Ping the API. The acknowledgement body is returned as-is.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<serde_json::Value> {
        self.get(EmsEndpoint::Health, &()).await
    }
}

/// Best-effort entity name for 404 reports, e.g. `employees` for `/api/employees/7`.
fn entity_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()?
                .rev()
                .find(|segment| !segment.is_empty() && segment.parse::<EmployeeId>().is_err())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| "resource".to_string())
}

/// API handler for the employees endpoints
#[derive(Debug)]
pub struct EmployeesApi<'a> {
    client: &'a Client,
}

impl EmployeesApi<'_> {
    /// List employees matching the given filters
    pub async fn list(&self, parameters: &ListParameters) -> Result<Vec<Employee>> {
        employee::list(self.client, parameters).await
    }

    /// List employees without any filtering
    pub async fn list_all(&self) -> Result<Vec<Employee>> {
        self.list(&ListParameters::default()).await
    }

    /// Retrieve a single employee by ID
    pub async fn get(&self, id: EmployeeId) -> Result<Employee> {
        employee::get(self.client, id).await
    }

    /// Create a new employee
    pub async fn create(&self, employee: &EmployeeCreate) -> Result<Employee> {
        employee::create(self.client, employee).await
    }

    /// Update an existing employee in place
    pub async fn update(&self, id: EmployeeId, changes: &EmployeeUpdate) -> Result<Employee> {
        employee::update(self.client, id, changes).await
    }

    /// Delete an employee
    pub async fn delete(&self, id: EmployeeId) -> Result<serde_json::Value> {
        employee::delete(self.client, id).await
    }

    /// Retrieve the aggregate statistics
    pub async fn stats(&self) -> Result<StatsSummary> {
        stats::summary(self.client).await
    }

    /// Create many employees in one request
    pub async fn bulk_create(&self, employees: &[EmployeeCreate]) -> Result<BulkCreateResponse> {
        employee::bulk_create(self.client, employees).await
    }

    /// Download the CSV export generated by the server
    pub async fn export_csv(&self) -> Result<Vec<u8>> {
        employee::export_csv(self.client).await
    }

    /// Decode an uploaded CSV file and submit the surviving rows as one bulk create.
    #[instrument(skip(self, upload), fields(bytes = upload.len()))]
    pub async fn import_csv(&self, upload: &[u8]) -> Result<ImportReport> {
        let employees = csv::decode_bytes(upload)?;
        let submitted = employees.len();
        let response = self.bulk_create(&employees).await?;
        Ok(ImportReport::new(submitted, &response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_name_skips_numeric_ids() {
        assert_eq!(entity_from_url("http://localhost:8000/api/employees/7"), "employees");
        assert_eq!(entity_from_url("http://localhost:8000/api/health"), "health");
        assert_eq!(entity_from_url("not a url"), "resource");
    }
}
