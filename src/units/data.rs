//! Formula Units Data Module
//!
//! The per-entity record of derived units. One [`FormulaUnitsData`] exists
//! for every model component that has a declared unit role or carries
//! math. Records are keyed by a reference identifier together with a
//! [`ComponentTypeCode`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::UnitDefinition;
use crate::units::formatter::DerivedUnits;

/// The kind of SBML construct a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentTypeCode {
    Model,
    Compartment,
    Species,
    Parameter,
    SpeciesReference,
    StoichiometryMath,
    KineticLaw,
    InitialAssignment,
    AlgebraicRule,
    AssignmentRule,
    RateRule,
    Reaction,
    Event,
    EventAssignment,
    Priority,
    /// Synthetic records without a construct of their own, such as the
    /// substance-per-time record.
    Unknown,
}

impl fmt::Display for ComponentTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentTypeCode::Model => "Model",
            ComponentTypeCode::Compartment => "Compartment",
            ComponentTypeCode::Species => "Species",
            ComponentTypeCode::Parameter => "Parameter",
            ComponentTypeCode::SpeciesReference => "SpeciesReference",
            ComponentTypeCode::StoichiometryMath => "StoichiometryMath",
            ComponentTypeCode::KineticLaw => "KineticLaw",
            ComponentTypeCode::InitialAssignment => "InitialAssignment",
            ComponentTypeCode::AlgebraicRule => "AlgebraicRule",
            ComponentTypeCode::AssignmentRule => "AssignmentRule",
            ComponentTypeCode::RateRule => "RateRule",
            ComponentTypeCode::Reaction => "Reaction",
            ComponentTypeCode::Event => "Event",
            ComponentTypeCode::EventAssignment => "EventAssignment",
            ComponentTypeCode::Priority => "Priority",
            ComponentTypeCode::Unknown => "Unknown",
        };
        write!(f, "{name}")
    }
}

/// Derived units of a single model component.
///
/// A record owns all of its unit definitions. `unit_definition` is `None`
/// when the component has no math to derive units from, which is distinct
/// from an empty definition (units that could not be determined).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaUnitsData {
    unit_reference_id: String,
    component_typecode: ComponentTypeCode,
    unit_definition: Option<UnitDefinition>,
    per_time_unit_definition: Option<UnitDefinition>,
    species_substance_unit_definition: Option<UnitDefinition>,
    species_extent_unit_definition: Option<UnitDefinition>,
    event_time_unit_definition: Option<UnitDefinition>,
    contains_parameters_with_undeclared_units: bool,
    can_ignore_undeclared_units: bool,
}

impl FormulaUnitsData {
    /// Creates a record without unit definitions in the "fully known"
    /// state.
    ///
    /// # Arguments
    ///
    /// * `unit_reference_id` - Identifier of the described entity, or a
    ///   synthetic identifier.
    /// * `component_typecode` - The construct kind of the entity.
    pub fn new(unit_reference_id: impl Into<String>, component_typecode: ComponentTypeCode) -> Self {
        Self {
            unit_reference_id: unit_reference_id.into(),
            component_typecode,
            unit_definition: None,
            per_time_unit_definition: None,
            species_substance_unit_definition: None,
            species_extent_unit_definition: None,
            event_time_unit_definition: None,
            contains_parameters_with_undeclared_units: false,
            can_ignore_undeclared_units: true,
        }
    }

    pub fn unit_reference_id(&self) -> &str {
        &self.unit_reference_id
    }

    pub fn component_typecode(&self) -> ComponentTypeCode {
        self.component_typecode
    }

    pub fn unit_definition(&self) -> Option<&UnitDefinition> {
        self.unit_definition.as_ref()
    }

    pub fn per_time_unit_definition(&self) -> Option<&UnitDefinition> {
        self.per_time_unit_definition.as_ref()
    }

    pub fn species_substance_unit_definition(&self) -> Option<&UnitDefinition> {
        self.species_substance_unit_definition.as_ref()
    }

    pub fn species_extent_unit_definition(&self) -> Option<&UnitDefinition> {
        self.species_extent_unit_definition.as_ref()
    }

    pub fn event_time_unit_definition(&self) -> Option<&UnitDefinition> {
        self.event_time_unit_definition.as_ref()
    }

    /// Whether the derivation met a component whose units are unknown.
    pub fn contains_parameters_with_undeclared_units(&self) -> bool {
        self.contains_parameters_with_undeclared_units
    }

    /// Whether the unknown units met during derivation leave the result
    /// unaffected.
    pub fn can_ignore_undeclared_units(&self) -> bool {
        self.can_ignore_undeclared_units
    }

    /// Whether the primary units are known, possibly after ignoring
    /// undeclared parts.
    pub fn has_known_units(&self) -> bool {
        !self.contains_parameters_with_undeclared_units || self.can_ignore_undeclared_units
    }

    /// Sets the primary definition and applies the empty-means-unknown
    /// rule: an empty definition flags the record as undeclared and not
    /// ignorable.
    pub(crate) fn set_declared_unit_definition(&mut self, unit_definition: UnitDefinition) {
        if unit_definition.is_empty() {
            self.mark_undeclared();
        }
        self.unit_definition = Some(unit_definition);
    }

    /// Takes over the units and both flags reported by the formatter.
    pub(crate) fn apply(&mut self, derived: DerivedUnits) {
        self.contains_parameters_with_undeclared_units = derived.contains_undeclared_units;
        self.can_ignore_undeclared_units = derived.can_ignore_undeclared_units;
        self.unit_definition = Some(derived.unit_definition);
    }

    pub(crate) fn mark_undeclared(&mut self) {
        self.contains_parameters_with_undeclared_units = true;
        self.can_ignore_undeclared_units = false;
    }

    pub(crate) fn set_species_substance_unit_definition(&mut self, ud: UnitDefinition) {
        self.species_substance_unit_definition = Some(ud);
    }

    pub(crate) fn set_species_extent_unit_definition(&mut self, ud: UnitDefinition) {
        self.species_extent_unit_definition = Some(ud);
    }

    pub(crate) fn set_event_time_unit_definition(&mut self, ud: UnitDefinition) {
        self.event_time_unit_definition = Some(ud);
    }

    /// Attaches the per-time view: the primary units divided by the model
    /// time units, simplified.
    ///
    /// Nothing is attached when the time record is itself undeclared or
    /// when this record has no primary definition.
    ///
    /// # Arguments
    ///
    /// * `time` - The model-wide `time` record.
    pub(crate) fn populate_per_time(&mut self, time: &FormulaUnitsData) {
        if time.contains_parameters_with_undeclared_units {
            return;
        }

        let (Some(unit_definition), Some(time_definition)) =
            (&self.unit_definition, &time.unit_definition)
        else {
            return;
        };

        self.per_time_unit_definition = Some(unit_definition.divided_by(time_definition));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnitType;

    fn time_record(ud: UnitDefinition) -> FormulaUnitsData {
        let mut time = FormulaUnitsData::new("time", ComponentTypeCode::Model);
        time.set_declared_unit_definition(ud);
        time
    }

    #[test]
    fn test_new_record_is_fully_known() {
        let record = FormulaUnitsData::new("k", ComponentTypeCode::Parameter);

        assert_eq!(record.unit_reference_id(), "k");
        assert_eq!(record.component_typecode(), ComponentTypeCode::Parameter);
        assert!(record.unit_definition().is_none());
        assert!(!record.contains_parameters_with_undeclared_units());
        assert!(record.can_ignore_undeclared_units());
    }

    #[test]
    fn test_empty_definition_marks_undeclared() {
        let mut record = FormulaUnitsData::new("cell", ComponentTypeCode::Compartment);
        record.set_declared_unit_definition(UnitDefinition::default());

        assert!(record.contains_parameters_with_undeclared_units());
        assert!(!record.can_ignore_undeclared_units());
        assert!(!record.has_known_units());
    }

    #[test]
    fn test_populate_per_time() {
        let time = time_record(UnitDefinition::from_kind(UnitType::Second));
        let mut record = FormulaUnitsData::new("S", ComponentTypeCode::Species);
        record.set_declared_unit_definition(UnitDefinition::from_kind(UnitType::Mole));
        record.populate_per_time(&time);

        let per_time = record.per_time_unit_definition().expect("missing per-time units");
        assert_eq!(per_time.to_string(), "mole * second^-1");
    }

    #[test]
    fn test_populate_per_time_skipped_for_undeclared_time() {
        let time = time_record(UnitDefinition::default());
        let mut record = FormulaUnitsData::new("S", ComponentTypeCode::Species);
        record.set_declared_unit_definition(UnitDefinition::from_kind(UnitType::Mole));
        record.populate_per_time(&time);

        assert!(record.per_time_unit_definition().is_none());
    }
}
