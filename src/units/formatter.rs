//! Unit Formula Formatter
//!
//! Derives the units implied by a model component or by a math expression.
//! Every derivation reports, next to the unit definition, whether it met a
//! component with undeclared units and whether those undeclared units can
//! be ignored without affecting the result.
//!
//! Math is parsed with `meval`, which yields tokens in reverse polish order.
//! The formatter walks the tokens with an operand stack, combining units
//! the way the operators combine values.

use std::f64::consts::{E, PI};

use log::{debug, trace, warn};
use meval::tokenizer::{Operation, Token};
use meval::Expr;

use crate::math::{extract_symbols, parse_math};
use crate::model::{Compartment, KineticLaw, Model, Parameter, Species, UnitDefinition};
use crate::units::base::{lookup_units, BaseQuantity, BaseUnits};
use crate::units::data::FormulaUnitsData;

/// Units derived for a component or expression, together with the
/// undeclared-units flags.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedUnits {
    pub unit_definition: UnitDefinition,
    pub contains_undeclared_units: bool,
    pub can_ignore_undeclared_units: bool,
}

impl DerivedUnits {
    /// Fully known units. An empty definition is treated as undeclared.
    pub fn declared(unit_definition: UnitDefinition) -> Self {
        if unit_definition.is_empty() {
            return DerivedUnits::undeclared();
        }

        Self {
            unit_definition,
            contains_undeclared_units: false,
            can_ignore_undeclared_units: true,
        }
    }

    /// Unknown units that cannot be ignored.
    pub fn undeclared() -> Self {
        Self {
            unit_definition: UnitDefinition::default(),
            contains_undeclared_units: true,
            can_ignore_undeclared_units: false,
        }
    }

    /// Unknown units that do not affect the surrounding expression, such as
    /// a bare number in Level 3.
    fn ignorable() -> Self {
        Self {
            unit_definition: UnitDefinition::default(),
            contains_undeclared_units: true,
            can_ignore_undeclared_units: true,
        }
    }

    /// Takes the primary units and flags of an existing record.
    pub fn from_record(record: &FormulaUnitsData) -> Self {
        Self {
            unit_definition: record.unit_definition().cloned().unwrap_or_default(),
            contains_undeclared_units: record.contains_parameters_with_undeclared_units(),
            can_ignore_undeclared_units: record.can_ignore_undeclared_units(),
        }
    }

    fn is_usable(&self) -> bool {
        !self.contains_undeclared_units || self.can_ignore_undeclared_units
    }
}

/// Identifier scope of a math expression.
#[derive(Debug, Clone, Copy, Default)]
pub enum MathScope<'a> {
    /// Global identifiers only.
    #[default]
    Model,
    /// Local parameters of the kinetic law shadow global identifiers.
    KineticLaw(&'a KineticLaw),
}

/// An entry of the evaluation stack. `value` is tracked for literals and
/// constant parameters so that exponents can be resolved.
#[derive(Debug, Clone)]
struct Operand {
    units: DerivedUnits,
    value: Option<f64>,
}

impl Operand {
    fn new(units: DerivedUnits, value: Option<f64>) -> Self {
        Self { units, value }
    }

    fn undeclared() -> Self {
        Self::new(DerivedUnits::undeclared(), None)
    }

    fn dimensionless(value: Option<f64>) -> Self {
        Self::new(DerivedUnits::declared(UnitDefinition::dimensionless()), value)
    }

    fn finish(self) -> DerivedUnits {
        let mut units = self.units;
        units.unit_definition.simplify();
        units
    }
}

impl From<DerivedUnits> for Operand {
    fn from(units: DerivedUnits) -> Self {
        Self::new(units, None)
    }
}

/// Derives units of model components and math.
///
/// The formatter borrows the model read-only together with the base units
/// of the current derivation pass.
pub struct UnitFormulaFormatter<'a> {
    model: &'a Model,
    base: &'a BaseUnits,
}

impl<'a> UnitFormulaFormatter<'a> {
    /// Creates a formatter over a model.
    ///
    /// # Arguments
    ///
    /// * `model` - The model whose identifiers and unit definitions are used.
    /// * `base` - The model-wide base units derived for `model`.
    pub fn new(model: &'a Model, base: &'a BaseUnits) -> Self {
        Self { model, base }
    }

    /// Resolves a units attribute value.
    ///
    /// Built-in kinds valid for the model's level and version come first,
    /// then user unit definitions, then (Levels 1 and 2 only) the predefined
    /// `substance`, `time`, `volume`, `area` and `length` units.
    ///
    /// # Returns
    ///
    /// The resolved units, or an empty definition if the name is unknown.
    pub fn resolve_units(&self, name: &str) -> UnitDefinition {
        if let Some(ud) = lookup_units(self.model, name) {
            return ud;
        }

        if self.model.level < 3 {
            match BaseQuantity::from_id(name) {
                Some(BaseQuantity::Extent) | None => {}
                Some(quantity) => return self.base.units(quantity),
            }
        }

        UnitDefinition::default()
    }

    /// Units of a compartment's size.
    pub fn compartment_units(&self, compartment: &Compartment) -> DerivedUnits {
        DerivedUnits::declared(self.compartment_definition(compartment))
    }

    fn compartment_definition(&self, compartment: &Compartment) -> UnitDefinition {
        if let Some(units) = &compartment.units {
            return self.resolve_units(units);
        }

        let dimensions = compartment
            .spatial_dimensions
            .or(if self.model.level < 3 { Some(3.0) } else { None });

        match dimensions {
            Some(d) if d == 3.0 => self.base.units(BaseQuantity::Volume),
            Some(d) if d == 2.0 => self.base.units(BaseQuantity::Area),
            Some(d) if d == 1.0 => self.base.units(BaseQuantity::Length),
            _ => UnitDefinition::default(),
        }
    }

    /// Units of a species' quantity: substance per compartment size, or
    /// substance alone for amounts and 0-dimensional compartments.
    ///
    /// A species in a compartment that does not exist gets undeclared
    /// units instead of failing the derivation.
    pub fn species_units(&self, species: &Species) -> DerivedUnits {
        let Some(compartment) = self.model.get_compartment(&species.compartment) else {
            debug!(
                "Species '{}' references unknown compartment '{}'",
                species.id, species.compartment
            );
            return DerivedUnits::undeclared();
        };

        let substance = self.species_substance_definition(species);
        if substance.is_empty() || species.has_only_substance_units {
            return DerivedUnits::declared(substance);
        }

        if compartment.spatial_dimensions == Some(0.0) {
            return DerivedUnits::declared(substance);
        }

        let size = match &species.spatial_size_units {
            Some(units) if self.model.level == 2 && self.model.version <= 2 => {
                self.resolve_units(units)
            }
            _ => self.compartment_definition(compartment),
        };

        if size.is_empty() {
            return DerivedUnits::undeclared();
        }

        DerivedUnits::declared(substance.divided_by(&size))
    }

    /// Substance units of a species, regardless of whether it is
    /// expressed as a concentration.
    pub fn species_substance_units(&self, species: &Species) -> DerivedUnits {
        DerivedUnits::declared(self.species_substance_definition(species))
    }

    fn species_substance_definition(&self, species: &Species) -> UnitDefinition {
        match &species.substance_units {
            Some(units) => self.resolve_units(units),
            None => self.base.units(BaseQuantity::Substance),
        }
    }

    /// Units in which reactions change a species (Level 3): the model
    /// extent units times the units of the applicable conversion factor.
    pub fn species_extent_units(&self, species: &Species) -> DerivedUnits {
        let extent = self.base.units(BaseQuantity::Extent);
        if extent.is_empty() {
            return DerivedUnits::undeclared();
        }

        let factor = species
            .conversion_factor
            .as_deref()
            .or(self.model.conversion_factor.as_deref());

        let Some(factor) = factor else {
            return DerivedUnits::declared(extent);
        };

        let Some(parameter) = self.model.get_parameter(factor) else {
            debug!(
                "Species '{}' references unknown conversion factor '{factor}'",
                species.id
            );
            return DerivedUnits::undeclared();
        };

        let factor_units = self.parameter_units(parameter);
        if factor_units.contains_undeclared_units {
            return DerivedUnits::undeclared();
        }

        DerivedUnits::declared(
            extent
                .multiplied_by(&factor_units.unit_definition)
                .simplified(),
        )
    }

    /// Units of a global parameter.
    pub fn parameter_units(&self, parameter: &Parameter) -> DerivedUnits {
        self.units_attribute(parameter.units.as_deref())
    }

    fn units_attribute(&self, units: Option<&str>) -> DerivedUnits {
        match units {
            Some(units) => DerivedUnits::declared(self.resolve_units(units)),
            None => DerivedUnits::undeclared(),
        }
    }

    /// Units of an infix math string.
    ///
    /// Math that cannot be parsed is logged and reported as undeclared.
    pub fn math_units(&self, math: &str, scope: MathScope<'_>) -> DerivedUnits {
        match parse_math(math) {
            Ok(expr) => self.expression_units(&expr, scope),
            Err(e) => {
                warn!("{e}");
                DerivedUnits::undeclared()
            }
        }
    }

    /// Units of a parsed expression.
    pub fn expression_units(&self, expr: &Expr, scope: MathScope<'_>) -> DerivedUnits {
        trace!("Deriving units over symbols {:?}", extract_symbols(expr));

        let mut stack: Vec<Operand> = Vec::new();

        for token in expr.iter() {
            let operand = match token {
                Token::Number(value) => self.number(*value),
                Token::Var(name) => self.symbol(name, scope),
                Token::Unary(op) => {
                    let Some(operand) = stack.pop() else {
                        return DerivedUnits::undeclared();
                    };
                    unary(op, operand)
                }
                Token::Binary(op) => {
                    let (Some(rhs), Some(lhs)) = (stack.pop(), stack.pop()) else {
                        return DerivedUnits::undeclared();
                    };
                    binary(op, lhs, rhs)
                }
                Token::Func(name, nargs) => {
                    let nargs = nargs.unwrap_or(1);
                    if nargs > stack.len() {
                        return DerivedUnits::undeclared();
                    }
                    let args = stack.split_off(stack.len() - nargs);
                    function(name, args)
                }
                _ => continue,
            };

            stack.push(operand);
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(result), true) => result.finish(),
            _ => DerivedUnits::undeclared(),
        }
    }

    /// Bare numbers are dimensionless in Levels 1 and 2. Level 3 numbers
    /// carry no units and are ignorable.
    fn number(&self, value: f64) -> Operand {
        if self.model.level < 3 {
            Operand::dimensionless(Some(value))
        } else {
            Operand::new(DerivedUnits::ignorable(), Some(value))
        }
    }

    fn symbol(&self, name: &str, scope: MathScope<'_>) -> Operand {
        if let MathScope::KineticLaw(kinetic_law) = scope {
            if let Some(local) = kinetic_law
                .local_parameters
                .iter()
                .find(|lp| lp.id == name)
            {
                return Operand::new(self.units_attribute(local.units.as_deref()), local.value);
            }
        }

        if let Some(compartment) = self.model.get_compartment(name) {
            let value = compartment.size.filter(|_| compartment.constant);
            return Operand::new(self.compartment_units(compartment), value);
        }

        if let Some(species) = self.model.get_species(name) {
            return self.species_units(species).into();
        }

        if let Some(parameter) = self.model.get_parameter(name) {
            let value = parameter.value.filter(|_| parameter.constant);
            return Operand::new(self.parameter_units(parameter), value);
        }

        if self.model.level >= 3 && self.model.get_species_reference(name).is_some() {
            return Operand::dimensionless(None);
        }

        if self.model.get_reaction(name).is_some() {
            return DerivedUnits::from_record(&self.base.substance_per_time).into();
        }

        match name {
            "time" => DerivedUnits::from_record(&self.base.time).into(),
            "avogadro" if self.model.level >= 3 => {
                DerivedUnits::declared(crate::unit!(1 / [_ mole])).into()
            }
            "pi" => Operand::dimensionless(Some(PI)),
            "e" | "exponentiale" => Operand::dimensionless(Some(E)),
            _ => {
                debug!("Identifier '{name}' has no units");
                Operand::undeclared()
            }
        }
    }
}

fn unary(op: &Operation, operand: Operand) -> Operand {
    match op {
        Operation::Minus => {
            let value = operand.value.map(|v| -v);
            Operand::new(operand.units, value)
        }
        _ => operand,
    }
}

fn binary(op: &Operation, lhs: Operand, rhs: Operand) -> Operand {
    match op {
        Operation::Plus => {
            let value = lhs.value.zip(rhs.value).map(|(a, b)| a + b);
            sum(vec![lhs, rhs], value)
        }
        Operation::Minus => {
            let value = lhs.value.zip(rhs.value).map(|(a, b)| a - b);
            sum(vec![lhs, rhs], value)
        }
        Operation::Times => product(lhs, rhs, false),
        Operation::Div => product(lhs, rhs, true),
        Operation::Pow => power(lhs, rhs.value),
        Operation::Rem => {
            let value = lhs.value.zip(rhs.value).map(|(a, b)| a % b);
            let flags = product(lhs.clone(), rhs, false).units;
            Operand::new(
                DerivedUnits {
                    unit_definition: lhs.units.unit_definition,
                    ..flags
                },
                value,
            )
        }
    }
}

fn function(name: &str, mut args: Vec<Operand>) -> Operand {
    match name {
        "exp" | "ln" | "log" | "log10" | "log2" | "sin" | "cos" | "tan" | "asin" | "acos"
        | "atan" | "atan2" | "sinh" | "cosh" | "tanh" | "asinh" | "acosh" | "atanh" => {
            Operand::dimensionless(None)
        }
        "sqrt" if args.len() == 1 => power(args.remove(0), Some(0.5)),
        "pow" if args.len() == 2 => {
            let exponent = args.remove(1).value;
            power(args.remove(0), exponent)
        }
        "abs" | "floor" | "ceil" | "round" | "signum" if args.len() == 1 => {
            Operand::from(args.remove(0).units)
        }
        "min" | "max" if !args.is_empty() => sum(args, None),
        _ => {
            debug!("No unit rule for function '{name}'");
            Operand::undeclared()
        }
    }
}

/// Multiplication and division: terms combine, unknown operands make the
/// result unknown unless every unknown operand is ignorable.
fn product(lhs: Operand, rhs: Operand, divide: bool) -> Operand {
    let value = lhs
        .value
        .zip(rhs.value)
        .map(|(a, b)| if divide { a / b } else { a * b });

    let rhs_units = if divide {
        rhs.units.unit_definition.inverted()
    } else {
        rhs.units.unit_definition.clone()
    };

    let units = DerivedUnits {
        unit_definition: lhs.units.unit_definition.multiplied_by(&rhs_units),
        contains_undeclared_units: lhs.units.contains_undeclared_units
            || rhs.units.contains_undeclared_units,
        can_ignore_undeclared_units: lhs.units.is_usable() && rhs.units.is_usable(),
    };

    Operand::new(units, value)
}

/// Addition, subtraction, `min` and `max`: all operands share units, so
/// the first operand with declared units determines the result and makes
/// the unknown ones ignorable.
fn sum(operands: Vec<Operand>, value: Option<f64>) -> Operand {
    let contains = operands.iter().any(|o| o.units.contains_undeclared_units);

    if let Some(known) = operands.iter().find(|o| !o.units.contains_undeclared_units) {
        let units = DerivedUnits {
            unit_definition: known.units.unit_definition.clone(),
            contains_undeclared_units: contains,
            can_ignore_undeclared_units: true,
        };
        return Operand::new(units, value);
    }

    let all_usable = operands.iter().all(|o| o.units.is_usable());
    let unit_definition = operands
        .iter()
        .find(|o| o.units.is_usable() && !o.units.unit_definition.is_empty())
        .map(|o| o.units.unit_definition.clone())
        .unwrap_or_default();

    let units = DerivedUnits {
        unit_definition,
        contains_undeclared_units: true,
        can_ignore_undeclared_units: all_usable,
    };
    Operand::new(units, value)
}

/// Exponentiation requires a known exponent unless the base is
/// dimensionless.
fn power(base: Operand, exponent: Option<f64>) -> Operand {
    let value = base.value.zip(exponent).map(|(b, p)| b.powf(p));

    if base.units.unit_definition.is_dimensionless() {
        return Operand::new(base.units, value);
    }

    match exponent {
        Some(p) => Operand::new(
            DerivedUnits {
                unit_definition: base.units.unit_definition.raised_to(p),
                ..base.units
            },
            value,
        ),
        None => Operand::undeclared(),
    }
}

impl Model {
    /// Derives the units of an infix expression against the identifiers
    /// of the model. The stored records are neither read nor changed.
    pub fn derive_math_units(&self, math: &str) -> DerivedUnits {
        let base = BaseUnits::derive(self);
        UnitFormulaFormatter::new(self, &base).math_units(math, MathScope::Model)
    }
}
