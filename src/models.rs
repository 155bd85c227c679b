//! Shared domain types: operations, parameters, selections, inputs and
//! result sets.
//!
//! `Operation` derives `Ord` in checklist order (Addition, Subtraction,
//! Multiplication, Division), so ordered collections keyed by it iterate in
//! the order the report expects.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use serde::{Deserialize, Serialize};

// ─── Operation ────────────────────────────────────────────────────────────────

/// One of the four elementwise arithmetic transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    /// Checklist order.
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Operation::Addition => "Addition",
            Operation::Subtraction => "Subtraction",
            Operation::Multiplication => "Multiplication",
            Operation::Division => "Division",
        }
    }

    /// Lowercase name used for scratch file names.
    pub fn file_stem(self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Operation::ALL
            .into_iter()
            .find(|op| op.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownOperation(trimmed.to_string()))
    }
}

// ─── Parameter ────────────────────────────────────────────────────────────────

/// Scalar for single-image mode, blend weight for two-image mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Parameter {
    Scalar(u8),
    Weight(f32),
}

impl Parameter {
    pub const DEFAULT_SCALAR: u8 = 50;
    pub const DEFAULT_WEIGHT: f32 = 0.5;

    /// Human-readable line for report pages.
    pub fn describe(&self) -> String {
        match self {
            Parameter::Scalar(v) => format!("Value: {v}"),
            Parameter::Weight(w) => format!("Weight: {w:.2}"),
        }
    }
}

// ─── Operation selection ──────────────────────────────────────────────────────

/// Which checkboxes were ticked. `select_all` overrides the individual set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSelection {
    pub select_all: bool,
    pub operations: BTreeSet<Operation>,
}

impl OperationSelection {
    pub fn all() -> Self {
        Self {
            select_all: true,
            operations: BTreeSet::new(),
        }
    }

    pub fn only(ops: impl IntoIterator<Item = Operation>) -> Self {
        Self {
            select_all: false,
            operations: ops.into_iter().collect(),
        }
    }

    /// Selected operations in checklist order.
    pub fn resolved(&self) -> Vec<Operation> {
        if self.select_all {
            Operation::ALL.to_vec()
        } else {
            self.operations.iter().copied().collect()
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.select_all && self.operations.is_empty()
    }
}

// ─── Inputs ───────────────────────────────────────────────────────────────────

/// One image, or a pair for the two-image formulas.
#[derive(Debug, Clone, PartialEq)]
pub enum Inputs {
    Single(RgbImage),
    Pair { first: RgbImage, second: RgbImage },
}

impl Inputs {
    pub fn is_pair(&self) -> bool {
        matches!(self, Inputs::Pair { .. })
    }

    /// Originals in upload order.
    pub fn images(&self) -> Vec<&RgbImage> {
        match self {
            Inputs::Single(img) => vec![img],
            Inputs::Pair { first, second } => vec![first, second],
        }
    }

    /// Parameter used when the caller supplies none.
    pub fn default_parameter(&self) -> Parameter {
        match self {
            Inputs::Single(_) => Parameter::Scalar(Parameter::DEFAULT_SCALAR),
            Inputs::Pair { .. } => Parameter::Weight(Parameter::DEFAULT_WEIGHT),
        }
    }
}

// ─── Result set ───────────────────────────────────────────────────────────────

/// Operation → output buffer. Iterates in checklist order whatever the
/// insertion order was.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: BTreeMap<Operation, RgbImage>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the result for `op`.
    pub fn insert(&mut self, op: Operation, image: RgbImage) -> Option<RgbImage> {
        self.entries.insert(op, image)
    }

    pub fn get(&self, op: Operation) -> Option<&RgbImage> {
        self.entries.get(&op)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operation, &RgbImage)> {
        self.entries.iter().map(|(op, img)| (*op, img))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
