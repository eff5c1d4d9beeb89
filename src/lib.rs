//! SBML Units Rust Library
//!
//! This library derives the units of the components of SBML models:
//! - An object model for the unit-bearing parts of SBML models
//! - Unit algebra over unit definitions
//! - Derivation of units from component attributes and infix math
//! - A per-model registry of derived units with keyed lookup
//! - Reading, writing and schema validation of JSON model documents

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::io::*;
    pub use crate::model::*;
    pub use crate::units::base::{BaseQuantity, BaseUnits, SUBSTANCE_PER_TIME};
    pub use crate::units::data::*;
    pub use crate::units::formatter::{DerivedUnits, MathScope, UnitFormulaFormatter};
    pub use crate::units::registry::*;
}

/// SBML object model
pub mod model;

/// Infix math parsing
pub mod math;

/// Unit derivation
pub mod units {
    /// Model-wide base units
    pub mod base;
    /// Per-component derived units records
    pub mod data;
    /// Unit algebra
    pub mod definition;
    /// Unit derivation from components and math
    pub mod formatter;
    /// Unit kind names
    pub mod kind;
    /// Registry of derived units records
    pub mod registry;
}

/// Validation of JSON model documents
pub mod validation {
    pub use crate::validation::schema::*;
    /// Main schema validation interface
    pub mod schema;
}

/// Procedural and helper macros
pub mod macros {
    /// Macros for unit handling
    #[macro_use]
    pub mod unit_macro;
    /// Unit symbol and prefix tables
    pub mod unit_maps;
}

/// Display of derived units
pub mod info;

/// IO functionality
pub mod io;
