//! ami-helper – resolving dataset hashtags against the AMI metadata catalog.
//!
//! Datasets in the catalog carry up to four hierarchical hashtags, one per
//! dimension `PMGL1` .. `PMGL4`. Analysts usually know some of them and want
//! every valid combination that completes the rest. This crate answers that by
//! querying the catalog slot by slot and exploring the resulting branching
//! search space, while making sure no distinct query is ever sent twice.
//!
//! ## Modules
//! * [`address`] – The [`address::TagAddress`] value: a scope plus four
//!   optionally bound slots.
//! * [`cache`] – The [`cache::QueryCache`], memoizing catalog answers by the
//!   exact command text on top of the [`persist::Persistor`] SQLite store.
//! * [`catalog`] – The [`catalog::Catalog`] seam and the AMI command line
//!   backend with its JSON response parser.
//! * [`query`] – Deterministic rendering of `SearchQuery` commands.
//! * [`adapter`] – The [`adapter::CatalogQueryAdapter`], turning domain
//!   requests into commands and rows back into addresses.
//! * [`search`] – The [`search::CompletionSearch`] worklist driver.
//! * [`scope`] – Per-campaign catalog identifiers and campaign detection.
//! * [`settings`] – Layered configuration.
//!
//! ## Data Flow
//! caller → [`search::CompletionSearch`] → [`adapter::CatalogQueryAdapter`]
//! → [`cache::QueryCache`] → catalog (on a miss) → adapter (parse) → search
//! (expand) → caller.
//!
//! ## Quick Start
//! ```
//! use ami_helper::address::TagAddress;
//! use ami_helper::adapter::CatalogQueryAdapter;
//! use ami_helper::cache::QueryCache;
//! use ami_helper::catalog::{Catalog, Rows};
//! use ami_helper::scope::ScopeTable;
//! use ami_helper::search::CompletionSearch;
//!
//! // A catalog that knows nothing.
//! struct Empty;
//! impl Catalog for Empty {
//!     fn execute(&self, _command: &str) -> ami_helper::Result<Rows> { Ok(Vec::new()) }
//! }
//!
//! let cache = QueryCache::in_memory().unwrap();
//! let scopes = ScopeTable::builtin();
//! let adapter = CatalogQueryAdapter::new(Empty, &cache, &scopes);
//! let search = CompletionSearch::new(&adapter);
//! let seed = TagAddress::new("mc16_13TeV", [Some("Top".into()), None, None, None]);
//! assert!(search.complete_address(&seed).unwrap().is_empty());
//! ```
//!
//! ## Caching
//! The cache has no expiry; catalog answers are kept until cleared by hand
//! (`ami-helper cache clear`). Failed catalog calls are never cached.

pub mod adapter;
pub mod address;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod persist;
pub mod query;
pub mod scope;
pub mod search;
pub mod settings;

pub use error::{AmiError, Result};
