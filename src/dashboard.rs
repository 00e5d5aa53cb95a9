//! The dashboard controller.
//!
//! [`Dashboard`] owns the transient session state: the cached employee list and stats,
//! the search query, the form and a loading flag. State changes only through
//! [`Dashboard::handle`] (user input) and through completed remote calls.
//!
//! Everything runs on one task. Remote calls are queued as futures and polled
//! concurrently, so several can be in flight at once and none is ever cancelled.
//! Responses to list and stats fetches carry the sequence number they were issued
//! with. Only the newest one per category is applied, so a slow response to an old
//! query can't overwrite a newer one.
//!
//! Any create, update, delete or import that succeeds refetches both the list and the
//! stats. Failures become [`Notice`]s and the cached data is left as it was.

use std::fmt::Write as _;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::config::Config;
use crate::csv::{self, ImportReport};
use crate::entities::{Employee, EmployeeCreate, EmployeeId, ListParameters, StatsSummary};
use crate::error::{Error, Result};
use crate::form::{EmployeeForm, Field, Submission};
use crate::service::EmployeeService;
use crate::stats;
use crate::table::{EmployeeTable, TableAction};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this employee?";

const FETCH_EMPLOYEES_FAILED: &str = "Failed to fetch employees. Is the backend running?";
const FETCH_STATS_FAILED: &str = "Failed to fetch statistics";
const SAVE_FAILED: &str = "Failed to save employee";
const DELETE_FAILED: &str = "Failed to delete employee";
const IMPORT_FAILED: &str = "Failed to import employees";
const EXPORT_FAILED: &str = "Failed to export employees";

/// User input delivered to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The dashboard became visible.
    Mount,
    Refresh,
    /// A keystroke in the search box, carrying the full new query.
    SearchChanged(String),
    OpenNewForm,
    Edit(Employee),
    FormInput(Field, String),
    SubmitForm,
    CancelForm,
    /// Pointer entered a row (`Some`) or left the table (`None`).
    Hover(Option<EmployeeId>),
    Delete(EmployeeId),
    /// Contents of an uploaded CSV file.
    ImportCsv(Vec<u8>),
    ExportCsv,
}

impl From<TableAction> for Event {
    fn from(action: TableAction) -> Self {
        match action {
            TableAction::Edit(employee) => Self::Edit(employee),
            TableAction::Delete(id) => Self::Delete(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the user, e.g. an alert or a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Interactive yes/no prompt shown before destructive actions.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Everything the dashboard shows. A cache of the last successful fetches plus UI state.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub employees: Vec<Employee>,
    pub stats: StatsSummary,
    pub search_query: String,
    /// Open while adding or editing; the record being edited lives inside it.
    pub form: EmployeeForm,
    pub table: EmployeeTable,
    /// A list fetch is in flight.
    pub loading: bool,
    /// A bulk import is in flight.
    pub importing: bool,
}

/// Issue counter for one category of fetch.
#[derive(Debug, Default)]
struct Sequence(u64);

impl Sequence {
    fn issue(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    fn is_latest(&self, seq: u64) -> bool {
        seq == self.0
    }
}

enum Completion {
    Employees { seq: u64, result: Result<Vec<Employee>> },
    Stats { seq: u64, result: Result<StatsSummary> },
    Saved(Result<Employee>),
    Deleted { id: EmployeeId, result: Result<serde_json::Value> },
    Imported(Result<ImportReport>),
    Exported(Result<PathBuf>),
}

enum Wake {
    Event(Event),
    Completed(Completion),
    SearchDue,
    Closed,
}

pub struct Dashboard<S, C> {
    service: Arc<S>,
    confirm: C,
    state: DashboardState,
    notices: Vec<Notice>,
    list_seq: Sequence,
    stats_seq: Sequence,
    lists_in_flight: usize,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, Completion>>,
    search_deadline: Option<Instant>,
    debounce: Duration,
    export_path: PathBuf,
}

impl<S, C> Dashboard<S, C>
where
    S: EmployeeService + 'static,
    C: Confirm,
{
    pub fn new(service: Arc<S>, confirm: C, config: &Config) -> Self {
        Self {
            service,
            confirm,
            state: DashboardState::default(),
            notices: Vec::new(),
            list_seq: Sequence::default(),
            stats_seq: Sequence::default(),
            lists_in_flight: 0,
            in_flight: FuturesUnordered::new(),
            search_deadline: None,
            debounce: config.search_debounce,
            export_path: config.export_path.clone(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Drain the notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Number of remote calls that have not completed yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Nothing in flight and no search waiting on the debounce.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty() && self.search_deadline.is_none()
    }

    /// Apply one piece of user input. Remote calls it triggers are queued, not awaited.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Mount | Event::Refresh => self.refetch_all(),
            Event::SearchChanged(query) => {
                self.state.search_query = query;
                self.search_deadline = Some(Instant::now() + self.debounce);
            }
            Event::OpenNewForm => {
                if !self.state.form.is_open() {
                    self.state.form.open_new();
                }
            }
            Event::Edit(employee) => self.state.form.open_existing(employee),
            Event::FormInput(field, value) => {
                self.state.form.set(field, value);
            }
            Event::SubmitForm => self.submit_form(),
            Event::CancelForm => self.state.form.cancel(),
            Event::Hover(Some(id)) => self.state.table.hover(id),
            Event::Hover(None) => self.state.table.leave(),
            Event::Delete(id) => self.delete(id),
            Event::ImportCsv(upload) => self.import(&upload),
            Event::ExportCsv => self.export(),
        }
    }

    /// Wait for the next completed call or debounce expiry and apply it.
    ///
    /// Returns `false` without waiting when the dashboard is idle.
    pub async fn step(&mut self) -> bool {
        match self.wait(None).await {
            Some(wake) => {
                self.dispatch(wake);
                true
            }
            None => false,
        }
    }

    /// Drive the dashboard until nothing is pending.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    /// Process events from `events` until the channel closes and all pending work has
    /// been applied.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        let mut listening = true;
        loop {
            match self.wait(listening.then_some(&mut events)).await {
                Some(Wake::Closed) => {
                    debug!("event channel closed, draining pending work");
                    listening = false;
                }
                Some(wake) => self.dispatch(wake),
                None => break,
            }
        }
    }

    async fn wait(&mut self, events: Option<&mut mpsc::UnboundedReceiver<Event>>) -> Option<Wake> {
        let deadline = self.search_deadline;
        let has_in_flight = !self.in_flight.is_empty();
        let listening = events.is_some();
        let next_event = async move {
            match events {
                Some(events) => events.recv().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            Some(completion) = self.in_flight.next(), if has_in_flight => Some(Wake::Completed(completion)),
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Some(Wake::SearchDue),
            event = next_event, if listening => Some(event.map_or(Wake::Closed, Wake::Event)),
            else => None,
        }
    }

    fn dispatch(&mut self, wake: Wake) {
        match wake {
            Wake::Event(event) => self.handle(event),
            Wake::Completed(completion) => self.apply(completion),
            Wake::SearchDue => {
                self.search_deadline = None;
                debug!(query = %self.state.search_query, "search input settled");
                self.fetch_employees();
            }
            Wake::Closed => {}
        }
    }

    fn spawn(&mut self, call: impl Future<Output = Completion> + 'static) {
        self.in_flight.push(call.boxed_local());
    }

    fn refetch_all(&mut self) {
        self.fetch_employees();
        self.fetch_stats();
    }

    fn fetch_employees(&mut self) {
        let seq = self.list_seq.issue();
        let parameters = ListParameters::default().with_search(self.state.search_query.as_str());
        debug!(seq, search = ?parameters.search, "fetching employees");

        self.lists_in_flight += 1;
        self.state.loading = true;
        let service = Arc::clone(&self.service);
        self.spawn(async move {
            Completion::Employees {
                seq,
                result: service.list(parameters).await,
            }
        });
    }

    fn fetch_stats(&mut self) {
        let seq = self.stats_seq.issue();
        debug!(seq, "fetching stats");

        let service = Arc::clone(&self.service);
        self.spawn(async move {
            Completion::Stats {
                seq,
                result: service.stats().await,
            }
        });
    }

    fn submit_form(&mut self) {
        let submission = match self.state.form.submit() {
            Ok(submission) => submission,
            Err(Error::FormClosed) => return,
            Err(e) => {
                warn!("employee form rejected: {e}");
                self.notices.push(Notice::error(e.user_message(SAVE_FAILED)));
                return;
            }
        };

        let service = Arc::clone(&self.service);
        self.spawn(async move {
            let result = match submission {
                Submission::Create(employee) => service.create(employee).await,
                Submission::Update { id, changes } => service.update(id, changes).await,
            };
            Completion::Saved(result)
        });
    }

    fn delete(&mut self, id: EmployeeId) {
        if !self.confirm.confirm(DELETE_PROMPT) {
            debug!(id, "delete not confirmed");
            return;
        }

        let service = Arc::clone(&self.service);
        self.spawn(async move {
            Completion::Deleted {
                id,
                result: service.delete(id).await,
            }
        });
    }

    fn import(&mut self, upload: &[u8]) {
        let employees = match csv::decode_bytes(upload) {
            Ok(employees) => employees,
            Err(e) => {
                warn!("rejected CSV upload: {e}");
                self.notices.push(Notice::error(IMPORT_FAILED));
                return;
            }
        };

        info!(rows = employees.len(), "importing employees");
        self.state.importing = true;
        let service = Arc::clone(&self.service);
        self.spawn(async move { Completion::Imported(bulk_import(&*service, employees).await) });
    }

    fn export(&mut self) {
        let service = Arc::clone(&self.service);
        let path = self.export_path.clone();
        self.spawn(async move { Completion::Exported(export_to(&*service, path).await) });
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Employees { seq, result } => {
                self.lists_in_flight = self.lists_in_flight.saturating_sub(1);
                self.state.loading = self.lists_in_flight > 0;
                if !self.list_seq.is_latest(seq) {
                    debug!(seq, "dropping stale employee list");
                    return;
                }
                match result {
                    Ok(employees) => {
                        debug!(count = employees.len(), "employee list updated");
                        self.state.employees = employees;
                    }
                    Err(e) => {
                        error!("Error fetching employees: {e}");
                        self.notices.push(Notice::error(FETCH_EMPLOYEES_FAILED));
                    }
                }
            }
            Completion::Stats { seq, result } => {
                if !self.stats_seq.is_latest(seq) {
                    debug!(seq, "dropping stale stats");
                    return;
                }
                match result {
                    Ok(stats) => self.state.stats = stats,
                    Err(e) => {
                        error!("Error fetching stats: {e}");
                        self.notices.push(Notice::error(FETCH_STATS_FAILED));
                    }
                }
            }
            Completion::Saved(result) => match result {
                Ok(employee) => {
                    info!(id = employee.id, "saved employee");
                    self.state.form.cancel();
                    self.refetch_all();
                }
                Err(e) => {
                    error!("Error saving employee: {e}");
                    self.notices.push(Notice::error(e.user_message(SAVE_FAILED)));
                }
            },
            Completion::Deleted { id, result } => match result {
                Ok(_) => {
                    info!(id, "deleted employee");
                    self.refetch_all();
                }
                Err(e) => {
                    error!(id, "Error deleting employee: {e}");
                    self.notices.push(Notice::error(e.user_message(DELETE_FAILED)));
                }
            },
            Completion::Imported(result) => {
                self.state.importing = false;
                match result {
                    Ok(report) => {
                        info!(submitted = report.submitted, created = report.created, errors = report.errors, "import finished");
                        self.notices.push(Notice::info(report.to_string()));
                        self.refetch_all();
                    }
                    Err(e) => {
                        error!("Error importing employees: {e}");
                        self.notices.push(Notice::error(e.user_message(IMPORT_FAILED)));
                    }
                }
            }
            Completion::Exported(result) => match result {
                Ok(path) => {
                    self.notices
                        .push(Notice::info(format!("Exported employees to {}", path.display())));
                }
                Err(e) => {
                    error!("Error exporting employees: {e}");
                    self.notices.push(Notice::error(EXPORT_FAILED));
                }
            },
        }
    }

    /// Plain-text rendering of the whole dashboard.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Enterprise EMS | Employee Management System\n");
        out.push_str(&stats::render(&self.state.stats));
        out.push('\n');
        if self.state.form.is_open() {
            out.push_str(&self.state.form.render());
            out.push('\n');
        }
        let status = if self.state.loading { "  (loading...)" } else { "" };
        let _ = writeln!(out, "Search: {}{status}", self.state.search_query);
        out.push_str(&self.state.table.render(&self.state.employees));
        out
    }
}

async fn bulk_import<S: EmployeeService>(service: &S, employees: Vec<EmployeeCreate>) -> Result<ImportReport> {
    let submitted = employees.len();
    let response = service.bulk_create(employees).await?;
    Ok(ImportReport::new(submitted, &response))
}

async fn export_to<S: EmployeeService>(service: &S, path: PathBuf) -> Result<PathBuf> {
    let contents = service.export_csv().await?;
    csv::save_export(&contents, &path).await?;
    Ok(path)
}
