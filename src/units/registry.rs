//! Formula Units Registry
//!
//! Holds the [`FormulaUnitsData`] records of a model. The registry is filled
//! in a single pass over the model and is never kept in sync with later
//! model edits: callers rebuild it when they need fresh data.
//!
//! The pass visits the model in a fixed order:
//!
//! 1. the base quantities and the substance-per-time record
//! 2. compartments, species and parameters
//! 3. the substance and extent views of Level 3 species
//! 4. initial assignments and rules
//! 5. kinetic laws and species references of every reaction
//! 6. event delays, priorities and assignments
//!
//! Constructs without an identifier of their own (algebraic rules and
//! events without an id) get synthetic identifiers. These live in the
//! registry and are never written back onto the model.

use std::collections::{HashMap, HashSet};

use log::{debug, trace, warn};

use crate::model::{Event, Model, RuleType, SpeciesReference, UnitDefinition};
use crate::units::base::{BaseQuantity, BaseUnits};
use crate::units::data::{ComponentTypeCode, FormulaUnitsData};
use crate::units::formatter::{DerivedUnits, MathScope, UnitFormulaFormatter};

/// Prefix of the synthetic identifiers of algebraic rules.
pub const ALGEBRAIC_RULE_PREFIX: &str = "alg_rule_";

/// Prefix of the synthetic identifiers of events without an id.
pub const EVENT_PREFIX: &str = "event_";

/// Ordered collection of derived-units records with keyed lookup.
#[derive(Debug, Clone, Default)]
pub struct FormulaUnitsRegistry {
    records: Vec<FormulaUnitsData>,
    index: HashMap<ComponentTypeCode, HashMap<String, usize>>,
    algebraic_rules: HashMap<usize, String>,
    events: HashMap<usize, String>,
    kinetic_laws: HashMap<usize, String>,
    collisions: Vec<(String, ComponentTypeCode)>,
    generation: u64,
    populated: bool,
}

impl FormulaUnitsRegistry {
    /// Builds a fresh registry for a model.
    pub fn build(model: &Model) -> Self {
        let mut registry = FormulaUnitsRegistry::default();
        registry.rebuild(model);
        registry
    }

    /// Discards all records and derives them again from the model.
    ///
    /// # Arguments
    ///
    /// * `model` - The model to derive units for. It is only read.
    pub fn rebuild(&mut self, model: &Model) {
        self.clear();

        let base = BaseUnits::derive(model);
        let formatter = UnitFormulaFormatter::new(model, &base);
        let mut pass = Pass {
            registry: self,
            model,
            base: &base,
            formatter,
            sids: model.all_sids().into_iter().collect(),
        };

        pass.base_units();
        pass.compartments();
        pass.species();
        pass.parameters();
        if model.level >= 3 {
            pass.species_views();
        }
        pass.initial_assignments();
        pass.rules();
        pass.reactions();
        pass.events();

        self.populated = true;
        debug!(
            "Derived {} formula units records ({} key collisions)",
            self.records.len(),
            self.collisions.len()
        );
    }

    /// Removes every record and synthetic identifier. Safe to call on an
    /// empty registry.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
        self.algebraic_rules.clear();
        self.events.clear();
        self.kinetic_laws.clear();
        self.collisions.clear();
        self.populated = false;
        self.generation += 1;
    }

    /// Whether the registry holds the result of a derivation pass.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the first record registered under the given key.
    pub fn get(&self, id: &str, typecode: ComponentTypeCode) -> Option<&FormulaUnitsData> {
        self.index
            .get(&typecode)
            .and_then(|ids| ids.get(id))
            .map(|&position| &self.records[position])
    }

    /// Iterates the records in derivation order.
    pub fn iter(&self) -> impl Iterator<Item = &FormulaUnitsData> {
        self.records.iter()
    }

    /// The records in derivation order.
    pub fn records(&self) -> &[FormulaUnitsData] {
        &self.records
    }

    /// Counter bumped every time the registry is cleared or rebuilt.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Keys registered more than once. Lookups return the first record.
    pub fn collisions(&self) -> &[(String, ComponentTypeCode)] {
        &self.collisions
    }

    /// Synthetic identifier of the algebraic rule at `index` in the
    /// model's rule list.
    pub fn algebraic_rule_id(&self, index: usize) -> Option<&str> {
        self.algebraic_rules.get(&index).map(String::as_str)
    }

    /// Identifier under which the event at `index` was registered. This is
    /// the event's own id or a synthetic one.
    pub fn event_id(&self, index: usize) -> Option<&str> {
        self.events.get(&index).map(String::as_str)
    }

    /// Identifier under which the kinetic law of the reaction at `index`
    /// was registered.
    pub fn kinetic_law_id(&self, index: usize) -> Option<&str> {
        self.kinetic_laws.get(&index).map(String::as_str)
    }

    fn insert(&mut self, record: FormulaUnitsData) {
        let id = record.unit_reference_id().to_string();
        let typecode = record.component_typecode();
        trace!("Registering units of {typecode} '{id}'");

        let ids = self.index.entry(typecode).or_default();
        if ids.contains_key(&id) {
            warn!("Duplicate formula units key ({typecode}, '{id}'), keeping the first record");
            self.collisions.push((id, typecode));
        } else {
            ids.insert(id, self.records.len());
        }

        self.records.push(record);
    }
}

/// State of a single derivation pass.
struct Pass<'a> {
    registry: &'a mut FormulaUnitsRegistry,
    model: &'a Model,
    base: &'a BaseUnits,
    formatter: UnitFormulaFormatter<'a>,
    sids: HashSet<&'a str>,
}

impl Pass<'_> {
    fn base_units(&mut self) {
        for record in self.base.records() {
            self.registry.insert(record.clone());
        }
    }

    fn compartments(&mut self) {
        let model = self.model;
        for compartment in &model.compartments {
            let derived = self.formatter.compartment_units(compartment);
            let mut record = FormulaUnitsData::new(&compartment.id, ComponentTypeCode::Compartment);
            record.set_declared_unit_definition(derived.unit_definition);
            self.insert_per_time(record);
        }
    }

    fn species(&mut self) {
        let model = self.model;
        for species in &model.species {
            let mut record = FormulaUnitsData::new(&species.id, ComponentTypeCode::Species);
            record.apply(self.formatter.species_units(species));

            if model.level >= 3 {
                let substance = self.formatter.species_substance_units(species);
                let extent = self.formatter.species_extent_units(species);
                record.set_species_substance_unit_definition(substance.unit_definition);
                record.set_species_extent_unit_definition(extent.unit_definition);
            }

            self.insert_per_time(record);
        }
    }

    fn parameters(&mut self) {
        let model = self.model;
        for parameter in &model.parameters {
            let mut record = FormulaUnitsData::new(&parameter.id, ComponentTypeCode::Parameter);
            record.apply(self.formatter.parameter_units(parameter));
            self.insert_per_time(record);
        }
    }

    /// Level 3 species get two extra records: `<id>subs` in substance
    /// units and `<id>extent` in the units reactions change them in.
    ///
    /// These keys are not checked against model SIds. A species whose id
    /// equals another species' view key (`A` and `Asubs`) keeps its own
    /// record, and the view only shows up in `collisions()`.
    fn species_views(&mut self) {
        let model = self.model;
        for species in &model.species {
            let mut substance =
                FormulaUnitsData::new(format!("{}subs", species.id), ComponentTypeCode::Species);
            substance.apply(self.formatter.species_substance_units(species));
            self.insert_per_time(substance);

            let mut extent =
                FormulaUnitsData::new(format!("{}extent", species.id), ComponentTypeCode::Species);
            extent.apply(self.formatter.species_extent_units(species));
            self.insert_per_time(extent);
        }
    }

    fn initial_assignments(&mut self) {
        let model = self.model;
        for assignment in &model.initial_assignments {
            let record = self.math_record(
                &assignment.symbol,
                ComponentTypeCode::InitialAssignment,
                assignment.math.as_deref(),
                MathScope::Model,
            );
            self.registry.insert(record);
        }
    }

    fn rules(&mut self) {
        let model = self.model;
        let mut counter = 0;

        for (index, rule) in model.rules.iter().enumerate() {
            let (id, typecode) = match (rule.rule_type, rule.variable.as_deref()) {
                (RuleType::Assignment, Some(variable)) => {
                    (variable.to_string(), ComponentTypeCode::AssignmentRule)
                }
                (RuleType::Rate, Some(variable)) => {
                    (variable.to_string(), ComponentTypeCode::RateRule)
                }
                (RuleType::Algebraic, _) => {
                    let id = self.synthetic_id(ALGEBRAIC_RULE_PREFIX, &mut counter);
                    self.registry.algebraic_rules.insert(index, id.clone());
                    (id, ComponentTypeCode::AlgebraicRule)
                }
                (rule_type, None) => {
                    debug!("Skipping {rule_type:?} rule at position {index} without a variable");
                    continue;
                }
            };

            let record = self.math_record(&id, typecode, rule.math.as_deref(), MathScope::Model);
            self.registry.insert(record);
        }
    }

    fn reactions(&mut self) {
        let model = self.model;
        for (index, reaction) in model.reactions.iter().enumerate() {
            if let Some(kinetic_law) = &reaction.kinetic_law {
                self.registry
                    .kinetic_laws
                    .insert(index, reaction.id.clone());
                let record = self.math_record(
                    &reaction.id,
                    ComponentTypeCode::KineticLaw,
                    kinetic_law.math.as_deref(),
                    MathScope::KineticLaw(kinetic_law),
                );
                self.registry.insert(record);
            }

            for reference in reaction.reactants.iter().chain(reaction.products.iter()) {
                self.species_reference(reference);
            }
        }
    }

    fn species_reference(&mut self, reference: &SpeciesReference) {
        if let Some(stoichiometry_math) = &reference.stoichiometry_math {
            let record = self.math_record(
                &reference.species,
                ComponentTypeCode::StoichiometryMath,
                stoichiometry_math.math.as_deref(),
                MathScope::Model,
            );
            self.insert_per_time(record);
            return;
        }

        if self.model.level < 3 {
            return;
        }

        if let Some(id) = &reference.id {
            let mut record = FormulaUnitsData::new(id, ComponentTypeCode::SpeciesReference);
            record.apply(DerivedUnits::declared(UnitDefinition::dimensionless()));
            self.insert_per_time(record);
        }
    }

    fn events(&mut self) {
        let model = self.model;
        let mut counter = 0;

        for (index, event) in model.events.iter().enumerate() {
            let event_id = match &event.id {
                Some(id) => id.clone(),
                None => self.synthetic_id(EVENT_PREFIX, &mut counter),
            };
            self.registry.events.insert(index, event_id.clone());

            if let Some(delay) = &event.delay {
                let mut record = self.math_record(
                    &event_id,
                    ComponentTypeCode::Event,
                    delay.math.as_deref(),
                    MathScope::Model,
                );
                record.set_event_time_unit_definition(self.event_time_units(event));
                self.registry.insert(record);
            }

            if let Some(priority) = &event.priority {
                let record = self.math_record(
                    &event_id,
                    ComponentTypeCode::Priority,
                    priority.math.as_deref(),
                    MathScope::Model,
                );
                self.registry.insert(record);
            }

            for assignment in &event.event_assignments {
                let record = self.math_record(
                    &format!("{}{}", assignment.variable, event_id),
                    ComponentTypeCode::EventAssignment,
                    assignment.math.as_deref(),
                    MathScope::Model,
                );
                self.registry.insert(record);
            }
        }
    }

    /// Units the delay of an event is measured in. Level 2 versions 1 and
    /// 2 allow events to override the model time units.
    fn event_time_units(&self, event: &Event) -> UnitDefinition {
        match &event.time_units {
            Some(units) if self.model.level == 2 && self.model.version <= 2 => {
                self.formatter.resolve_units(units)
            }
            _ => self.base.units(BaseQuantity::Time),
        }
    }

    /// Creates a record for a construct carrying math. Without math the
    /// record has no unit definition and keeps the default flags.
    fn math_record(
        &self,
        id: &str,
        typecode: ComponentTypeCode,
        math: Option<&str>,
        scope: MathScope<'_>,
    ) -> FormulaUnitsData {
        let mut record = FormulaUnitsData::new(id, typecode);
        if let Some(math) = math {
            record.apply(self.formatter.math_units(math, scope));
        }
        record
    }

    fn insert_per_time(&mut self, mut record: FormulaUnitsData) {
        record.populate_per_time(&self.base.time);
        self.registry.insert(record);
    }

    /// Next `<prefix><n>` that does not clash with an identifier of the
    /// model.
    fn synthetic_id(&mut self, prefix: &str, counter: &mut usize) -> String {
        loop {
            let id = format!("{prefix}{counter}");
            *counter += 1;
            if !self.sids.contains(id.as_str()) {
                return id;
            }
            debug!("Synthetic id '{id}' is taken by the model, skipping");
        }
    }
}

impl Model {
    /// Derives the units of every component and stores them on the model.
    ///
    /// Any previous records are discarded first. The records are not
    /// updated when the model changes afterwards.
    pub fn populate_list_formula_units_data(&mut self) {
        let mut registry = std::mem::take(&mut self.units_data);
        registry.rebuild(self);
        self.units_data = registry;
    }

    /// Removes all derived units records.
    pub fn remove_list_formula_units_data(&mut self) {
        self.units_data.clear();
    }

    /// Whether derived units records are present.
    pub fn is_populated_list_formula_units_data(&self) -> bool {
        self.units_data.is_populated()
    }

    /// Returns the record registered under the given key.
    ///
    /// # Arguments
    ///
    /// * `id` - The unit reference identifier, e.g. a species id or `time`.
    /// * `typecode` - The construct kind of the record.
    pub fn get_formula_units_data(
        &self,
        id: &str,
        typecode: ComponentTypeCode,
    ) -> Option<&FormulaUnitsData> {
        self.units_data.get(id, typecode)
    }

    /// Returns the record of the variable with the given id. The id is
    /// checked against parameters, compartments, species and species
    /// references, in that order.
    pub fn get_formula_units_data_for_variable(&self, id: &str) -> Option<&FormulaUnitsData> {
        let typecode = if self.get_parameter(id).is_some() {
            ComponentTypeCode::Parameter
        } else if self.get_compartment(id).is_some() {
            ComponentTypeCode::Compartment
        } else if self.get_species(id).is_some() {
            ComponentTypeCode::Species
        } else if self.get_species_reference(id).is_some() {
            ComponentTypeCode::SpeciesReference
        } else {
            return None;
        };

        self.get_formula_units_data(id, typecode)
    }

    /// Returns the record of the initial assignment or assignment rule
    /// targeting the given symbol. Initial assignments take precedence.
    pub fn get_formula_units_data_for_assignment(&self, id: &str) -> Option<&FormulaUnitsData> {
        if self.get_initial_assignment(id).is_some() {
            return self.get_formula_units_data(id, ComponentTypeCode::InitialAssignment);
        }

        if self.get_assignment_rule(id).is_some() {
            return self.get_formula_units_data(id, ComponentTypeCode::AssignmentRule);
        }

        None
    }

    /// Number of derived units records.
    pub fn get_num_formula_units_data(&self) -> usize {
        self.units_data.len()
    }

    /// The derived units records in derivation order.
    pub fn formula_units_data(&self) -> &[FormulaUnitsData] {
        self.units_data.records()
    }

    /// The registry holding the derived units records.
    pub fn formula_units_registry(&self) -> &FormulaUnitsRegistry {
        &self.units_data
    }
}
