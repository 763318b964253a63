//! The remote metadata catalog, reached through a textual command protocol.
//!
//! Everything above this module talks in rendered command strings and
//! [`Rows`]. The [`Catalog`] trait is the seam where tests plug in scripted
//! backends; [`AmiCommandCatalog`] is the production backend that shells out
//! to the `ami` command line client and parses its JSON output.

use std::collections::BTreeMap;
use std::process::Command;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AmiError, Result};
use crate::settings::CatalogSettings;

/// One record of a catalog response, field name to rendered value.
///
/// Joined queries may name fields `alias.FIELD`; see [`field`].
pub type Row = BTreeMap<String, String>;
pub type Rows = Vec<Row>;

pub trait Catalog {
    /// Run one command against the catalog. Zero matching rows is an empty
    /// vector, not an error.
    fn execute(&self, command: &str) -> Result<Rows>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn execute(&self, command: &str) -> Result<Rows> {
        (**self).execute(command)
    }
}

impl<C: Catalog + ?Sized> Catalog for Box<C> {
    fn execute(&self, command: &str) -> Result<Rows> {
        (**self).execute(command)
    }
}

/// Value of `name` in `row`, accepting both the bare column and any
/// `alias.name` spelling used for joined tables.
pub fn field<'r>(row: &'r Row, name: &str) -> Option<&'r str> {
    if let Some(value) = row.get(name) {
        return Some(value);
    }
    row.iter()
        .find(|(key, _)| {
            key.rsplit_once('.')
                .is_some_and(|(_, column)| column == name)
        })
        .map(|(_, value)| value.as_str())
}

// ------------- AMI client -------------
pub struct AmiCommandCatalog {
    program: String,
    arguments: Vec<String>,
    endpoint: String,
}

impl AmiCommandCatalog {
    pub fn new(settings: &CatalogSettings) -> Self {
        Self {
            program: settings.program.clone(),
            arguments: settings.arguments.clone(),
            endpoint: settings.endpoint.clone(),
        }
    }
    fn command_line(&self, command: &str) -> Result<Vec<String>> {
        let mut line = self.arguments.clone();
        line.push(format!("-endpoint={}", self.endpoint));
        line.push("-format=json".to_string());
        line.extend(split_command(command)?);
        Ok(line)
    }
}

impl Catalog for AmiCommandCatalog {
    fn execute(&self, command: &str) -> Result<Rows> {
        let arguments = self.command_line(command)?;
        info!(program = %self.program, endpoint = %self.endpoint, "calling catalog");
        debug!(%command, "catalog command");
        let output = Command::new(&self.program)
            .args(&arguments)
            .output()
            .map_err(|e| AmiError::RemoteCallFailure(format!("could not run '{}': {e}", self.program)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AmiError::RemoteCallFailure(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| AmiError::MalformedResponse(format!("response is not UTF-8: {e}")))?;
        let rows = parse_ami_json(&stdout)?;
        debug!(rows = rows.len(), "catalog answered");
        Ok(rows)
    }
}

/// Splits `Name -key="value" -other="..."` into process arguments, dropping
/// the quotes and resolving `\"` escapes inside them.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_quotes = false;
    let mut chars = command.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => match chars.next() {
                Some(escaped) => word.push(escaped),
                None => word.push('\\'),
            },
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
            }
            c => word.push(c),
        }
    }
    if in_quotes {
        return Err(AmiError::MalformedResponse(format!(
            "unbalanced quotes in command: {command}"
        )));
    }
    if !word.is_empty() {
        words.push(word);
    }
    Ok(words)
}

// AMI renders its XML messages as JSON where a lone child is an object and
// repeated children are an array.
fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item) => vec![item],
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parses the AMI JSON envelope
/// `{"AMIMessage":{"rowset":[{"row":[{"field":[{"@name":..,"$":..}]}]}]}}`
/// into rows. A message without any rowset has no rows.
pub fn parse_ami_json(text: &str) -> Result<Rows> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| AmiError::MalformedResponse(format!("invalid JSON: {e}")))?;
    let message = value
        .get("AMIMessage")
        .ok_or_else(|| AmiError::MalformedResponse("missing AMIMessage".to_string()))?;
    let mut rows = Rows::new();
    for rowset in as_list(message.get("rowset")) {
        for row in as_list(rowset.get("row")) {
            let fields = row
                .get("field")
                .ok_or_else(|| AmiError::MalformedResponse("row without fields".to_string()))?;
            let mut parsed = Row::new();
            for field in as_list(Some(fields)) {
                let name = field
                    .get("@name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AmiError::MalformedResponse("field without @name".to_string()))?;
                let value = field.get("$").map(render).unwrap_or_default();
                parsed.insert(name.to_string(), value);
            }
            rows.push(parsed);
        }
    }
    Ok(rows)
}
