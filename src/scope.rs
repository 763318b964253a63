use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AmiError, Result};
use crate::query::catalog_name;

lazy_static! {
    // simulation tag followed by reconstruction tag, e.g. "_s4162_r15540"
    static ref SIM_RECO_PAIR: Regex = Regex::new(r"_([as]\d+)_(r\d+)").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvgenInfo {
    pub short: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastSim {
    pub kind: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimInfo {
    pub short: String,
    // full simulation tags
    #[serde(default)]
    pub fs: Vec<String>,
    // fast simulation flavours (AF2, AF3) and their tags
    #[serde(default)]
    pub af: Vec<FastSim>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoInfo {
    pub short: String,
    // campaign name -> r-tags
    #[serde(default)]
    pub campaigns: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeTags {
    pub evgen: EvgenInfo,
    pub sim: SimInfo,
    pub reco: RecoInfo,
}

impl ScopeTags {
    /// Catalog that holds the hashtags for this campaign.
    pub fn catalog(&self) -> String {
        catalog_name(&self.evgen.short)
    }
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn campaigns(entries: Vec<(&str, Vec<String>)>) -> BTreeMap<String, Vec<String>> {
    entries
        .into_iter()
        .map(|(name, r_tags)| (name.to_string(), r_tags))
        .collect()
}

/// The campaigns known without any configuration file.
pub fn builtin_scopes() -> BTreeMap<String, ScopeTags> {
    let mut scopes = BTreeMap::new();
    scopes.insert(
        "mc16".to_string(),
        ScopeTags {
            evgen: EvgenInfo { short: "mc15".into() },
            sim: SimInfo {
                short: "mc16".into(),
                fs: tags(&["s3126"]),
                af: vec![FastSim { kind: "AF2".into(), tags: tags(&["a875"]) }],
            },
            reco: RecoInfo {
                short: "mc16".into(),
                campaigns: campaigns(vec![
                    ("mc16a", tags(&["r9364"])),
                    ("mc16d", tags(&["r10201"])),
                    ("mc16e", tags(&["r10724"])),
                ]),
            },
        },
    );
    scopes.insert(
        "mc20".to_string(),
        ScopeTags {
            evgen: EvgenInfo { short: "mc15".into() },
            sim: SimInfo {
                short: "mc16".into(),
                fs: tags(&["s3681", "s4231", "s3797"]),
                af: vec![FastSim { kind: "AF2".into(), tags: tags(&["a907"]) }],
            },
            reco: RecoInfo {
                short: "mc20".into(),
                campaigns: campaigns(vec![
                    ("mc20a", tags(&["r13167", "r14859"])),
                    ("mc20d", tags(&["r13144", "r14860"])),
                    ("mc20e", tags(&["r13145", "r14861"])),
                ]),
            },
        },
    );
    scopes.insert(
        "mc23".to_string(),
        ScopeTags {
            evgen: EvgenInfo { short: "mc23".into() },
            sim: SimInfo {
                short: "mc23".into(),
                fs: tags(&["s4162", "s4159", "s4369"]),
                af: vec![FastSim { kind: "AF3".into(), tags: tags(&["a910", "a911", "a934"]) }],
            },
            reco: RecoInfo {
                short: "mc23".into(),
                campaigns: campaigns(vec![
                    ("mc23a", tags(&["r15540", "r14622"])),
                    ("mc23d", tags(&["r15530", "r15224"])),
                    ("mc23e", tags(&["r16083"])),
                ]),
            },
        },
    );
    scopes
}

/// Short prefix of a scope, `mc16_13TeV` -> `mc16`.
pub fn scope_short(scope: &str) -> &str {
    scope.split_once('_').map_or(scope, |(short, _)| short)
}

// ------------- ScopeTable -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTable {
    scopes: BTreeMap<String, ScopeTags>,
}

impl ScopeTable {
    pub fn new(scopes: BTreeMap<String, ScopeTags>) -> Self {
        Self { scopes }
    }
    pub fn builtin() -> Self {
        Self::new(builtin_scopes())
    }
    pub fn lookup(&self, scope: &str) -> Result<&ScopeTags> {
        self.scopes
            .get(scope_short(scope))
            .ok_or_else(|| AmiError::UnknownScope { scope: scope.to_string() })
    }
    pub fn catalog_for(&self, scope: &str) -> Result<String> {
        Ok(self.lookup(scope)?.catalog())
    }
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Production campaign of a dataset, read off the simulation and
/// reconstruction tags in its name, e.g. `"mc23a - FS"` or `"mc23d - AF3"`.
pub fn get_campaign(tags: &ScopeTags, dataset: &str) -> Result<String> {
    for pair in SIM_RECO_PAIR.captures_iter(dataset) {
        let (sim, reco) = (&pair[1], &pair[2]);
        let Some(campaign) = tags
            .reco
            .campaigns
            .iter()
            .find(|(_, r_tags)| r_tags.iter().any(|r| r == reco))
            .map(|(name, _)| name)
        else {
            continue;
        };
        if tags.sim.fs.iter().any(|s| s == sim) {
            return Ok(format!("{campaign} - FS"));
        }
        if let Some(fast) = tags.sim.af.iter().find(|fast| fast.tags.iter().any(|a| a == sim)) {
            return Ok(format!("{campaign} - {}", fast.kind));
        }
    }
    Err(AmiError::NotFound(format!("no known campaign for dataset '{dataset}'")))
}
