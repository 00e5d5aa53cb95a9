//! CSV bulk import and export.
//!
//! Export is produced by the server; the client saves the downloaded bytes untouched.
//! [`encode`] writes the same column layout locally and is what the import side is
//! checked against.
//!
//! Import is deliberately lenient. The first line is taken to be a header and
//! skipped. Every other non-blank line is split on `,` into
//! `(placeholder, name, email, role, department, salary)`. Rows without a name, a
//! role or a usable salary are dropped without comment, and only the server's
//! aggregate result is reported back.
//!
//! The import reads column 0 as a throwaway placeholder while the export writes the
//! real `id` there. Re-importing an export therefore creates fresh records rather
//! than updating the originals.

use std::fmt;
use std::path::Path;

use crate::entities::{BulkCreateResponse, Employee, EmployeeCreate};
use crate::error::{Error, Result};

/// Column order of the export file.
pub const EXPORT_COLUMNS: [&str; 6] = ["id", "name", "email", "role", "department", "salary"];

/// Decode an uploaded file, aborting on input that isn't CSV at all.
///
/// The file must be UTF-8 and have a header row with at least one column. Past that,
/// individual rows are filtered by [`decode`].
pub fn decode_bytes(upload: &[u8]) -> Result<Vec<EmployeeCreate>> {
    let text = std::str::from_utf8(upload).map_err(|e| Error::MalformedCsv {
        reason: format!("file is not valid UTF-8: {e}"),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let header = text.split('\n').next().unwrap_or_default();
    if header.split(',').all(|column| column.trim().is_empty()) {
        return Err(Error::MalformedCsv {
            reason: "header row has no columns".to_string(),
        });
    }

    Ok(decode(text))
}

/// Decode CSV text into candidate records, skipping the header and any malformed rows.
#[must_use]
pub fn decode(text: &str) -> Vec<EmployeeCreate> {
    let mut dropped = 0usize;
    let employees: Vec<EmployeeCreate> = text
        .split('\n')
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let decoded = decode_row(line);
            if decoded.is_none() {
                dropped += 1;
            }
            decoded
        })
        .collect();

    if dropped > 0 {
        debug!(kept = employees.len(), dropped, "skipped malformed CSV rows");
    }
    employees
}

fn decode_row(line: &str) -> Option<EmployeeCreate> {
    let mut fields = line.split(',').map(str::trim);
    let _placeholder = fields.next();
    let name = fields.next().unwrap_or_default();
    let email = fields.next().unwrap_or_default();
    let role = fields.next().unwrap_or_default();
    let department = fields.next().unwrap_or_default();
    let salary = parse_salary(fields.next())?;

    if name.is_empty() || role.is_empty() {
        return None;
    }

    Some(EmployeeCreate {
        name: name.to_string(),
        role: role.to_string(),
        salary,
        email: non_empty(email),
        department: non_empty(department),
        performance_rating: None,
        skills: None,
    })
}

/// A salary must start with a finite, non-zero number. Zero counts as missing.
fn parse_salary(raw: Option<&str>) -> Option<f64> {
    let salary = leading_number(raw?)?;
    (salary.is_finite() && salary != 0.0).then_some(salary)
}

/// Parse the longest decimal prefix of `raw`, ignoring whatever follows it.
///
/// `"900000INR"` reads as `900000`; input that doesn't start with a number is `None`.
fn leading_number(raw: &str) -> Option<f64> {
    let bytes = raw.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digits_from(end);
    end += whole;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if whole > 0 || fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole == 0 && fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits_from(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }

    raw[..end].parse().ok()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Encode employees with a header row, in [`EXPORT_COLUMNS`] order.
#[must_use]
pub fn encode(employees: &[Employee]) -> String {
    let mut out = EXPORT_COLUMNS.join(",");
    out.push('\n');
    for employee in employees {
        let row = [
            employee.id.to_string(),
            escape(&employee.name),
            escape(employee.email.as_deref().unwrap_or_default()),
            escape(&employee.role),
            escape(employee.department.as_deref().unwrap_or_default()),
            employee.salary.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write a downloaded export to `path` exactly as received.
#[instrument(skip(contents), fields(bytes = contents.len()))]
pub async fn save_export(contents: &[u8], path: &Path) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), "saved employee export");
    Ok(())
}

/// Outcome of a bulk import as reported to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportReport {
    /// Rows that survived decoding and were sent.
    pub submitted: usize,
    /// Records the server confirmed as created.
    pub created: u64,
    /// Per-record errors the server reported.
    pub errors: usize,
}

impl ImportReport {
    #[must_use]
    pub fn new(submitted: usize, response: &BulkCreateResponse) -> Self {
        Self {
            submitted,
            created: response.created,
            errors: response.errors.len(),
        }
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Created {} employees. {} errors.", self.created, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn discards_placeholder_column() {
        let employees =
            decode("id,name,email,role,department,salary\n,Jane Doe,jane@x.com,Engineer,R&D,900000");
        assert_eq!(
            employees,
            vec![EmployeeCreate {
                name: "Jane Doe".to_string(),
                role: "Engineer".to_string(),
                salary: 900_000.0,
                email: Some("jane@x.com".to_string()),
                department: Some("R&D".to_string()),
                performance_rating: None,
                skills: None,
            }]
        );
    }

    #[test]
    fn drops_short_rows_and_bad_salaries() {
        let text = "\
id,name,email,role,department,salary
1,Short,short@x.com,Engineer
2,Words,words@x.com,Engineer,R&D,lots
3,Zero,zero@x.com,Engineer,R&D,0
4,,nobody@x.com,Engineer,R&D,10
5,Roleless,r@x.com,,R&D,10
6,Kept,,Analyst,,42.5
";
        let employees = decode(text);
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].name, "Kept");
        assert_eq!(employees[0].email, None);
        assert_eq!(employees[0].department, None);
        assert!((employees[0].salary - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn salary_reads_leading_number() {
        let text = "\
id,name,email,role,department,salary
1,Suffixed,,Engineer,,900000INR
2,Decimal,,Engineer,,12.5k
3,Exponent,,Engineer,,1e3 per month
4,Prefixed,,Engineer,,INR900000
5,Dot,,Engineer,,.
";
        let salaries: Vec<(String, f64)> = decode(text)
            .into_iter()
            .map(|employee| (employee.name, employee.salary))
            .collect();
        assert_eq!(
            salaries,
            vec![
                ("Suffixed".to_string(), 900_000.0),
                ("Decimal".to_string(), 12.5),
                ("Exponent".to_string(), 1000.0),
            ]
        );
        assert_eq!(leading_number("-4.e"), Some(-4.0));
        assert_eq!(leading_number("+"), None);
    }

    #[test]
    fn trims_fields_and_handles_crlf() {
        let employees = decode("header\r\n7 ,  Ravi Kumar , ravi@x.com , Designer , UX , 50000 \r\n\r\n");
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].name, "Ravi Kumar");
        assert_eq!(employees[0].role, "Designer");
        assert_eq!(employees[0].department.as_deref(), Some("UX"));
        assert!((employees[0].salary - 50_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn header_only_file_yields_nothing() {
        assert!(decode("id,name,email,role,department,salary\n").is_empty());
        assert!(decode("").is_empty());
    }

    #[test]
    fn rejects_unreadable_uploads() {
        assert!(matches!(decode_bytes(&[0xff, 0xfe, 0x00]), Err(Error::MalformedCsv { .. })));
        assert!(matches!(decode_bytes(b""), Err(Error::MalformedCsv { .. })));
        assert!(matches!(decode_bytes(b" , ,\n1,a,b,c,d,5"), Err(Error::MalformedCsv { .. })));
    }

    #[test]
    fn strips_byte_order_mark() {
        let upload = "\u{feff}id,name,email,role,department,salary\n,Asha,,Engineer,,10\n";
        let employees = decode_bytes(upload.as_bytes()).unwrap();
        assert_eq!(employees.len(), 1);
    }

    #[test]
    fn encode_writes_export_columns() {
        let employees = vec![Employee {
            id: 3,
            name: "Doe, Jane".to_string(),
            role: "Engineer".to_string(),
            salary: 900_000.0,
            email: Some("jane@x.com".to_string()),
            department: None,
            performance_rating: Some(4.0),
            skills: None,
            created_at: None,
            updated_at: None,
        }];
        assert_eq!(
            encode(&employees),
            "id,name,email,role,department,salary\n3,\"Doe, Jane\",jane@x.com,Engineer,,900000\n"
        );
    }

    #[test]
    fn reimporting_an_export_keeps_columns_aligned() {
        let employees = vec![Employee {
            id: 11,
            name: "Asha Rao".to_string(),
            role: "Manager".to_string(),
            salary: 1_500_000.0,
            email: Some("asha@x.com".to_string()),
            department: Some("Ops".to_string()),
            performance_rating: None,
            skills: None,
            created_at: None,
            updated_at: None,
        }];
        let decoded = decode(&encode(&employees));
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].name, "Asha Rao");
        assert_eq!(decoded[0].email.as_deref(), Some("asha@x.com"));
        assert_eq!(decoded[0].department.as_deref(), Some("Ops"));
    }

    #[test]
    fn report_reads_like_a_notice() {
        let response: BulkCreateResponse =
            serde_json::from_value(json!({ "created": 4, "errors": [{ "row": 2 }] })).unwrap();
        let report = ImportReport::new(5, &response);
        assert_eq!(report.to_string(), "Created 4 employees. 1 errors.");
        assert_eq!(report.submitted, 5);
    }

    #[tokio::test]
    async fn saves_export_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.csv");
        let contents = b"id,name,email,role,department,salary\r\n1,A,,B,,2\r\n";
        save_export(contents, &path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), contents);
    }
}
