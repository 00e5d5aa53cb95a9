//! Interactive terminal front end for the dashboard.
//!
//! Reads one command per line from stdin and prints the dashboard after each one.
//! Point it at a running API with `EMS_API_URL` (defaults to `http://localhost:8000/api`).
//!
//! ```text
//! search <text>              filter the table (debounced)
//! add                        open the form for a new employee
//! edit <id>                  open the form on an existing employee
//! set <field> <value>        fill a form input (name, email, role, department, salary, rating, skills)
//! save | cancel              submit or close the form
//! delete <id>                delete after confirmation
//! import <path>              bulk import a CSV file
//! export                     download the CSV export
//! refresh | quit
//! ```

#[macro_use]
extern crate tracing;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use ems_rs::form::Field;
use ems_rs::{Client, Config, Dashboard, EmployeeId, Event, NoticeLevel};

fn confirm(message: &str) -> bool {
    print!("{message} [y/N] ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).is_ok() && answer.trim().eq_ignore_ascii_case("y")
}

fn parse_field(name: &str) -> Result<Field> {
    Ok(match name {
        "name" => Field::Name,
        "email" => Field::Email,
        "role" => Field::Role,
        "department" => Field::Department,
        "salary" => Field::Salary,
        "rating" => Field::PerformanceRating,
        "skills" => Field::Skills,
        other => bail!("unknown field {other:?}"),
    })
}

fn parse_command(line: &str, dashboard: &Dashboard<Client, fn(&str) -> bool>) -> Result<Option<Event>> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let event = match command {
        "" => return Ok(None),
        "search" => Event::SearchChanged(rest.to_string()),
        "add" => Event::OpenNewForm,
        "edit" => {
            let id: EmployeeId = rest.trim().parse().context("edit takes an employee id")?;
            let employee = dashboard
                .state()
                .employees
                .iter()
                .find(|employee| employee.id == id)
                .cloned()
                .with_context(|| format!("employee #{id} is not in the table"))?;
            Event::Edit(employee)
        }
        "set" => {
            let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
            Event::FormInput(parse_field(field)?, value.to_string())
        }
        "save" => Event::SubmitForm,
        "cancel" => Event::CancelForm,
        "delete" => Event::Delete(rest.trim().parse().context("delete takes an employee id")?),
        "import" => {
            let upload = std::fs::read(rest.trim()).with_context(|| format!("reading {rest}"))?;
            Event::ImportCsv(upload)
        }
        "export" => Event::ExportCsv,
        "refresh" => Event::Refresh,
        other => bail!("unknown command {other:?}"),
    };
    Ok(Some(event))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let config = Config::from_env()?;
    let client = Arc::new(Client::new(&config)?);
    info!(base_url = %client.base_url(), "starting dashboard");

    match client.health().await {
        Ok(status) => info!(%status, "API is reachable"),
        Err(e) => warn!("health check failed: {e}"),
    }

    let mut dashboard = Dashboard::new(client, confirm as fn(&str) -> bool, &config);
    dashboard.handle(Event::Mount);

    let stdin = io::stdin();
    loop {
        dashboard.settle().await;
        for notice in dashboard.take_notices() {
            match notice.level {
                NoticeLevel::Info => println!("[info] {}", notice.message),
                NoticeLevel::Error => println!("[error] {}", notice.message),
            }
        }
        println!("\n{}", dashboard.render());
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line == "quit" {
            break;
        }
        match parse_command(line, &dashboard) {
            Ok(Some(event)) => dashboard.handle(event),
            Ok(None) => {}
            Err(e) => println!("[error] {e:#}"),
        }
    }

    Ok(())
}
