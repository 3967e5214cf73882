// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type system for the weft template language.
//!
//! Defines the type lattice shared by the resolution passes and the
//! simplifier, plus the configuration-time type and function registries.

mod registry;
mod types;
mod value;

pub use registry::{
    ConstEvalFn, EnumDef, FunctionEntry, FunctionRegistry, FunctionSignature, TypeRegistry,
    UnknownTypeName,
};
pub use types::{EnumId, Type};
pub use value::ConstVal;
