// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression type resolution, data-flow narrowing, and cross-template
//! indirect parameter analysis.
//!
//! Runs after name resolution. Every expression node is assigned a lattice
//! type; conditions narrow the types of the access paths they test within
//! the branches they guard. Errors are collected across the whole file
//! rather than stopping at the first one.

pub mod checker;
pub mod errors;
pub mod indirect;
pub mod narrow;
pub mod path;

pub use checker::{check_file, CheckOptions, TypedFile};
pub use errors::TypeError;
pub use indirect::{IndirectParams, IndirectParamsAnalyzer};
pub use narrow::{ConditionFacts, Facts, Narrower};
pub use path::{AccessPath, PathSeg};
