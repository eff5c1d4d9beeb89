//! SBML object model
//!
//! Struct definitions for the parts of an SBML model that carry units or
//! mathematics. The layout follows the SBML Level 3 Core structure with the
//! Level 2 attributes that influence unit derivation (`spatial_size_units`,
//! event `time_units`, stoichiometry math) kept alongside.
//!
//! All types serialize with serde, describe themselves through `schemars`
//! and come with a `derive_builder` builder.

use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::units::registry::FormulaUnitsRegistry;

fn default_level() -> u32 {
    3
}

fn default_version() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

fn default_exponent() -> f64 {
    1.0
}

fn default_multiplier() -> f64 {
    1.0
}

//
// Type definitions
//
/// The Model is the root object of an SBML document. It holds the
/// model-wide unit attributes, user defined units and every component
/// whose units can be derived.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder)]
pub struct Model {
    /// Identifier of the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub id: Option<String>,

    /// Name of the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub name: Option<String>,

    /// SBML level. Default is 3.
    #[serde(default = "default_level")]
    #[builder(default = "default_level()")]
    pub level: u32,

    /// SBML version within the level. Default is 2.
    #[serde(default = "default_version")]
    #[builder(default = "default_version()")]
    pub version: u32,

    /// Model-wide substance units (Level 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub substance_units: Option<String>,

    /// Model-wide time units (Level 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub time_units: Option<String>,

    /// Model-wide volume units (Level 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub volume_units: Option<String>,

    /// Model-wide area units (Level 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub area_units: Option<String>,

    /// Model-wide length units (Level 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub length_units: Option<String>,

    /// Model-wide extent units (Level 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub extent_units: Option<String>,

    /// Identifier of the parameter converting extent to substance units
    /// for every species without its own conversion factor (Level 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub conversion_factor: Option<String>,

    /// User defined units.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_unit_definitions")))]
    pub unit_definitions: Vec<UnitDefinition>,

    /// Compartments of the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_compartments")))]
    pub compartments: Vec<Compartment>,

    /// Species of the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_species")))]
    pub species: Vec<Species>,

    /// Global parameters of the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_parameters")))]
    pub parameters: Vec<Parameter>,

    /// Initial assignments of the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_initial_assignments")))]
    pub initial_assignments: Vec<InitialAssignment>,

    /// Algebraic, assignment and rate rules in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_rules")))]
    pub rules: Vec<Rule>,

    /// Reactions of the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_reactions")))]
    pub reactions: Vec<Reaction>,

    /// Events of the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_events")))]
    pub events: Vec<Event>,

    /// Derived units of the model's components. Filled on demand by
    /// `populate_list_formula_units_data`.
    #[serde(skip)]
    #[schemars(skip)]
    #[builder(default, setter(skip))]
    pub(crate) units_data: FormulaUnitsRegistry,
}

/// A bounded container in which species are located.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Compartment {
    /// Unique identifier of the compartment.
    #[builder(setter(into))]
    pub id: String,

    /// Name of the compartment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub name: Option<String>,

    /// Number of spatial dimensions. Levels 1 and 2 assume 3 when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub spatial_dimensions: Option<f64>,

    /// Size of the compartment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub size: Option<f64>,

    /// Units of the compartment size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub units: Option<String>,

    /// Whether the size is constant. Default is True.
    #[serde(default = "default_true")]
    #[builder(default = "true")]
    pub constant: bool,
}

/// A pool of entities of the same kind located in a compartment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Species {
    /// Unique identifier of the species.
    #[builder(setter(into))]
    pub id: String,

    /// Name of the species.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub name: Option<String>,

    /// Identifier of the compartment the species is located in.
    #[builder(setter(into))]
    pub compartment: String,

    /// Initial amount of the species.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub initial_amount: Option<f64>,

    /// Initial concentration of the species.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub initial_concentration: Option<f64>,

    /// Units of the species amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub substance_units: Option<String>,

    /// Units of the compartment size used for this species (Level 2
    /// versions 1 and 2 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub spatial_size_units: Option<String>,

    /// Whether the species is expressed as an amount rather than a
    /// concentration. Default is False.
    #[serde(default)]
    #[builder(default)]
    pub has_only_substance_units: bool,

    /// Whether the species is on the boundary of the reaction system.
    /// Default is False.
    #[serde(default)]
    #[builder(default)]
    pub boundary_condition: bool,

    /// Whether the species amount is constant. Default is False.
    #[serde(default)]
    #[builder(default)]
    pub constant: bool,

    /// Identifier of the parameter converting reaction extent to species
    /// substance units (Level 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub conversion_factor: Option<String>,
}

/// A global quantity of the model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Parameter {
    /// Unique identifier of the parameter.
    #[builder(setter(into))]
    pub id: String,

    /// Name of the parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub name: Option<String>,

    /// Value of the parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub value: Option<f64>,

    /// Units of the parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub units: Option<String>,

    /// Whether the parameter is constant. Default is True.
    #[serde(default = "default_true")]
    #[builder(default = "true")]
    pub constant: bool,
}

/// A parameter scoped to a single kinetic law.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct LocalParameter {
    /// Identifier of the parameter, unique within the kinetic law.
    #[builder(setter(into))]
    pub id: String,

    /// Value of the parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub value: Option<f64>,

    /// Units of the parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub units: Option<String>,
}

/// A transformation of species described by reactants, products and a
/// kinetic law.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Reaction {
    /// Unique identifier of the reaction.
    #[builder(setter(into))]
    pub id: String,

    /// Name of the reaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub name: Option<String>,

    /// Whether the reaction is reversible. Default is False.
    #[serde(default)]
    #[builder(default)]
    pub reversible: bool,

    /// Species consumed by the reaction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_reactants")))]
    pub reactants: Vec<SpeciesReference>,

    /// Species produced by the reaction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_products")))]
    pub products: Vec<SpeciesReference>,

    /// Rate of the reaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub kinetic_law: Option<KineticLaw>,
}

/// The rate expression of a reaction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct KineticLaw {
    /// Infix math of the rate expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub math: Option<String>,

    /// Parameters only visible within this kinetic law.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_local_parameters")))]
    pub local_parameters: Vec<LocalParameter>,
}

/// Reference to a species taking part in a reaction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct SpeciesReference {
    /// Identifier of the reference itself (Level 3 and Level 2 version 2+).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub id: Option<String>,

    /// Identifier of the referenced species.
    #[builder(setter(into))]
    pub species: String,

    /// Constant stoichiometry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub stoichiometry: Option<f64>,

    /// Stoichiometry given as math (Level 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub stoichiometry_math: Option<StoichiometryMath>,
}

/// Stoichiometry of a species reference expressed as math.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct StoichiometryMath {
    /// Infix math of the stoichiometry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub math: Option<String>,
}

/// Value of a symbol at the start of the simulation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct InitialAssignment {
    /// Identifier of the assigned compartment, species, species reference
    /// or parameter.
    #[builder(setter(into))]
    pub symbol: String,

    /// Infix math of the assigned value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub math: Option<String>,
}

/// A rule constraining the model over time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Rule {
    /// Type of the rule.
    #[builder(setter(into))]
    pub rule_type: RuleType,

    /// Identifier of the variable determined by the rule. Algebraic rules
    /// have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub variable: Option<String>,

    /// Infix math of the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub math: Option<String>,
}

/// A discontinuous change of the model state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Event {
    /// Identifier of the event. Optional in every level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub id: Option<String>,

    /// Name of the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub name: Option<String>,

    /// Units of the delay (Level 2 versions 1 and 2 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub time_units: Option<String>,

    /// Condition firing the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub trigger: Option<Trigger>,

    /// Time between firing and execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub delay: Option<Delay>,

    /// Ordering of simultaneous events (Level 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub priority: Option<Priority>,

    /// Assignments executed with the event.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_event_assignments")))]
    pub event_assignments: Vec<EventAssignment>,
}

/// Boolean condition of an event.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Trigger {
    /// Infix math of the condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub math: Option<String>,
}

/// Delay of an event.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Delay {
    /// Infix math of the delay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub math: Option<String>,
}

/// Priority of an event.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Priority {
    /// Infix math of the priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub math: Option<String>,
}

/// Assignment executed when an event fires.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct EventAssignment {
    /// Identifier of the assigned variable.
    #[builder(setter(into))]
    pub variable: String,

    /// Infix math of the assigned value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub math: Option<String>,
}

/// A unit built as the product of base units raised to exponents.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct UnitDefinition {
    /// Unique identifier of the unit definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub id: Option<String>,

    /// Common name of the unit definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into))]
    pub name: Option<String>,

    /// Base units that define the unit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_base_units")))]
    pub base_units: Vec<BaseUnit>,
}

/// A single term of a unit definition:
/// `(multiplier * 10^scale * kind)^exponent`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, PartialEq)]
pub struct BaseUnit {
    /// Kind of the base unit (e.g., metre, mole, second).
    #[builder(setter(into))]
    pub kind: UnitType,

    /// Exponent of the base unit. Default is 1.
    #[serde(default = "default_exponent")]
    #[builder(default = "1.0")]
    pub exponent: f64,

    /// Power of ten scaling the base unit. Default is 0.
    #[serde(default)]
    #[builder(default)]
    pub scale: i32,

    /// Multiplier of the base unit. Default is 1.
    #[serde(default = "default_multiplier")]
    #[builder(default = "1.0")]
    pub multiplier: f64,
}

//
// Enum definitions
//
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub enum RuleType {
    #[default]
    #[serde(rename = "algebraic")]
    Algebraic,

    #[serde(rename = "assignment")]
    Assignment,

    #[serde(rename = "rate")]
    Rate,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    JsonSchema,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Ampere,
    Avogadro,
    Becquerel,
    Candela,
    Celsius,
    Coulomb,
    #[default]
    Dimensionless,
    Farad,
    Gram,
    Gray,
    Henry,
    Hertz,
    Item,
    Joule,
    Katal,
    Kelvin,
    Kilogram,
    #[serde(alias = "liter")]
    Litre,
    Lumen,
    Lux,
    #[serde(alias = "meter")]
    Metre,
    Mole,
    Newton,
    Ohm,
    Pascal,
    Radian,
    Second,
    Siemens,
    Sievert,
    Steradian,
    Tesla,
    Volt,
    Watt,
    Weber,
}

impl Default for Model {
    /// An empty Level 3 Version 2 model, matching the builder and serde
    /// defaults.
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            level: default_level(),
            version: default_version(),
            substance_units: None,
            time_units: None,
            volume_units: None,
            area_units: None,
            length_units: None,
            extent_units: None,
            conversion_factor: None,
            unit_definitions: Vec::new(),
            compartments: Vec::new(),
            species: Vec::new(),
            parameters: Vec::new(),
            initial_assignments: Vec::new(),
            rules: Vec::new(),
            reactions: Vec::new(),
            events: Vec::new(),
            units_data: FormulaUnitsRegistry::default(),
        }
    }
}

//
// Lookups
//
impl Model {
    /// Returns the user unit definition with the given identifier.
    pub fn get_unit_definition(&self, id: &str) -> Option<&UnitDefinition> {
        self.unit_definitions
            .iter()
            .find(|ud| ud.id.as_deref() == Some(id))
    }

    /// Returns the compartment with the given identifier.
    pub fn get_compartment(&self, id: &str) -> Option<&Compartment> {
        self.compartments.iter().find(|c| c.id == id)
    }

    /// Returns the species with the given identifier.
    pub fn get_species(&self, id: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    /// Returns the global parameter with the given identifier.
    pub fn get_parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    /// Returns the reaction with the given identifier.
    pub fn get_reaction(&self, id: &str) -> Option<&Reaction> {
        self.reactions.iter().find(|r| r.id == id)
    }

    /// Returns the reactant or product reference carrying the given
    /// identifier.
    pub fn get_species_reference(&self, id: &str) -> Option<&SpeciesReference> {
        self.reactions
            .iter()
            .flat_map(|r| r.reactants.iter().chain(r.products.iter()))
            .find(|sr| sr.id.as_deref() == Some(id))
    }

    /// Returns the initial assignment targeting the given symbol.
    pub fn get_initial_assignment(&self, symbol: &str) -> Option<&InitialAssignment> {
        self.initial_assignments
            .iter()
            .find(|ia| ia.symbol == symbol)
    }

    /// Returns the assignment rule determining the given variable.
    pub fn get_assignment_rule(&self, variable: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| {
            rule.rule_type == RuleType::Assignment && rule.variable.as_deref() == Some(variable)
        })
    }

    /// Returns the event with the given identifier.
    pub fn get_event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id.as_deref() == Some(id))
    }

    /// Collects every identifier in the model's SId namespace.
    pub fn all_sids(&self) -> Vec<&str> {
        let compartments = self.compartments.iter().map(|c| c.id.as_str());
        let species = self.species.iter().map(|s| s.id.as_str());
        let parameters = self.parameters.iter().map(|p| p.id.as_str());
        let reactions = self.reactions.iter().map(|r| r.id.as_str());
        let species_refs = self
            .reactions
            .iter()
            .flat_map(|r| r.reactants.iter().chain(r.products.iter()))
            .filter_map(|sr| sr.id.as_deref());
        let events = self.events.iter().filter_map(|e| e.id.as_deref());

        compartments
            .chain(species)
            .chain(parameters)
            .chain(reactions)
            .chain(species_refs)
            .chain(events)
            .collect()
    }
}
