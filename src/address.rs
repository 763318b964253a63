// used to print out readable forms of an address
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AmiError, Result};

// ------------- Dimensions -------------
pub const SLOT_COUNT: usize = 4;
pub const DIMENSION_PREFIX: &str = "PMGL";

/// Catalog dimension for a slot, slot 0 being `PMGL1`.
pub fn dimension_name(index: usize) -> String {
    format!("{}{}", DIMENSION_PREFIX, index + 1)
}

/// Slot for a catalog dimension name, the inverse of [`dimension_name`].
pub fn dimension_index(name: &str) -> Result<usize> {
    name.strip_prefix(DIMENSION_PREFIX)
        .and_then(|number| number.parse::<usize>().ok())
        .filter(|number| (1..=SLOT_COUNT).contains(number))
        .map(|number| number - 1)
        .ok_or_else(|| AmiError::UnknownDimension(name.to_string()))
}

// ------------- TagAddress -------------
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TagAddress {
    scope: String,
    slots: [Option<String>; SLOT_COUNT],
}

impl TagAddress {
    pub fn new(scope: impl Into<String>, slots: [Option<String>; SLOT_COUNT]) -> Self {
        Self {
            scope: scope.into(),
            slots,
        }
    }
    pub fn unbound(scope: impl Into<String>) -> Self {
        Self::new(scope, Default::default())
    }
    /// All four values known up front, as typed in by a user.
    pub fn complete<S: Into<String>>(scope: impl Into<String>, values: [S; SLOT_COUNT]) -> Self {
        Self::new(scope, values.map(|value| Some(value.into())))
    }
    /// A single catalog row naming one dimension and its value.
    pub fn from_row(
        scope: impl Into<String>,
        dimension: &str,
        value: impl Into<String>,
    ) -> Result<Self> {
        let index = dimension_index(dimension)?;
        Self::unbound(scope).with_slot_bound(index, value)
    }
    // Fields are only exposed through getters, so an address
    // can never change after it has been constructed.
    pub fn scope(&self) -> &str {
        &self.scope
    }
    pub fn slots(&self) -> &[Option<String>; SLOT_COUNT] {
        &self.slots
    }
    pub fn slot(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|slot| slot.as_deref())
    }
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
    /// Leftmost unbound slot. Searches always fill slots in this order so that
    /// the rendered queries, and with them the cache keys, are stable.
    pub fn first_unbound_index(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }
    pub fn unbound_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }
    pub fn bound_slots(&self) -> impl Iterator<Item = (usize, &str)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_deref().map(|value| (index, value)))
    }
    pub fn with_slot_bound(&self, index: usize, value: impl Into<String>) -> Result<Self> {
        match self.slots.get(index) {
            Some(None) => {
                let mut slots = self.slots.clone();
                slots[index] = Some(value.into());
                Ok(Self {
                    scope: self.scope.clone(),
                    slots,
                })
            }
            _ => Err(AmiError::InvalidIndex { index }),
        }
    }
}

impl fmt::Display for TagAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rendered: Vec<&str> = self
            .slots
            .iter()
            .map(|slot| slot.as_deref().unwrap_or("-"))
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}
