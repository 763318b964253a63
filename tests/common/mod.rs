#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use ami_helper::adapter::CandidateSource;
use ami_helper::address::TagAddress;
use ami_helper::catalog::{Catalog, Row, Rows};
use ami_helper::{AmiError, Result};

pub const SCOPE: &str = "mc16_13TeV";

pub fn row(fields: &[(&str, &str)]) -> Row {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

pub fn hashtag(dimension: &str, name: &str) -> Row {
    row(&[("NAME", name), ("SCOPE", dimension)])
}

pub fn address(slots: [Option<&str>; 4]) -> TagAddress {
    TagAddress::new(SCOPE, slots.map(|slot| slot.map(str::to_string)))
}

/// Answers commands from a script and remembers every command it was sent.
/// Unscripted commands answer with no rows.
#[derive(Default)]
pub struct ScriptedCatalog {
    responses: HashMap<String, Rows>,
    failures_left: RefCell<usize>,
    pub commands: RefCell<Vec<String>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn respond(mut self, command: impl Into<String>, rows: Rows) -> Self {
        self.responses.insert(command.into(), rows);
        self
    }
    /// The next `count` calls fail before reaching the script.
    pub fn failing(self, count: usize) -> Self {
        *self.failures_left.borrow_mut() = count;
        self
    }
    pub fn calls(&self) -> usize {
        self.commands.borrow().len()
    }
}

impl Catalog for ScriptedCatalog {
    fn execute(&self, command: &str) -> Result<Rows> {
        self.commands.borrow_mut().push(command.to_string());
        let mut failures_left = self.failures_left.borrow_mut();
        if *failures_left > 0 {
            *failures_left -= 1;
            return Err(AmiError::RemoteCallFailure("catalog unreachable".to_string()));
        }
        Ok(self.responses.get(command).cloned().unwrap_or_default())
    }
}

/// Candidate values keyed by the bound prefix of an address, e.g.
/// `["Top"]` -> values for slot 1 once slot 0 is "Top".
#[derive(Default)]
pub struct TreeSource {
    children: HashMap<Vec<String>, Vec<String>>,
    fail_on: Option<Vec<String>>,
    pub requests: RefCell<Vec<(TagAddress, usize)>>,
}

impl TreeSource {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn children(mut self, prefix: &[&str], values: &[&str]) -> Self {
        self.children.insert(
            prefix.iter().map(|v| v.to_string()).collect(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }
    pub fn fail_on(mut self, prefix: &[&str]) -> Self {
        self.fail_on = Some(prefix.iter().map(|v| v.to_string()).collect());
        self
    }
    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl CandidateSource for TreeSource {
    fn find_slot_candidates(&self, partial: &TagAddress, slot: usize) -> Result<Vec<TagAddress>> {
        self.requests.borrow_mut().push((partial.clone(), slot));
        let prefix: Vec<String> = partial.bound_slots().map(|(_, v)| v.to_string()).collect();
        if self.fail_on.as_ref() == Some(&prefix) {
            return Err(AmiError::RemoteCallFailure("catalog unreachable".to_string()));
        }
        self.children
            .get(&prefix)
            .map(|values| values.iter().map(|v| partial.with_slot_bound(slot, v.clone())).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// A full tree: every address with `depth` bound slots has `branching` children.
pub struct UniformSource {
    pub branching: usize,
    pub requests: RefCell<usize>,
}

impl UniformSource {
    pub fn new(branching: usize) -> Self {
        Self { branching, requests: RefCell::new(0) }
    }
}

impl CandidateSource for UniformSource {
    fn find_slot_candidates(&self, partial: &TagAddress, slot: usize) -> Result<Vec<TagAddress>> {
        *self.requests.borrow_mut() += 1;
        (0..self.branching)
            .map(|n| partial.with_slot_bound(slot, format!("v{n}")))
            .collect()
    }
}
