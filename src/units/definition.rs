//! Unit Algebra Module
//!
//! Operations on [`UnitDefinition`] treated as a product of powers of base
//! units: construction from a single kind, multiplication, division,
//! exponentiation, simplification and comparison.
//!
//! Simplification is the only operation that merges terms. Everything else
//! appends or rewrites terms in place so that insertion order is kept for
//! output.

use std::fmt;

use crate::model::{BaseUnit, UnitDefinition, UnitType};

const EXPONENT_EPSILON: f64 = 1e-12;

impl BaseUnit {
    /// Creates a term of the given kind with exponent 1, scale 0 and
    /// multiplier 1.
    pub fn new(kind: UnitType) -> Self {
        BaseUnit {
            kind,
            exponent: 1.0,
            scale: 0,
            multiplier: 1.0,
        }
    }

    /// Returns the term with its exponent replaced.
    pub fn with_exponent(mut self, exponent: f64) -> Self {
        self.exponent = exponent;
        self
    }

    /// Returns the term with its exponent negated.
    pub fn negated(&self) -> Self {
        let mut unit = self.clone();
        unit.exponent = -unit.exponent;
        unit
    }

    /// The numeric factor `multiplier * 10^scale` of the term.
    fn factor(&self) -> f64 {
        self.multiplier * 10f64.powi(self.scale)
    }

    /// Merges a term of the same kind into this one.
    ///
    /// Exponents add. If scale or multiplier differ, both factors are folded
    /// into a single multiplier with scale 0.
    fn merge(&mut self, other: &BaseUnit) {
        let exponent = self.exponent + other.exponent;

        if self.scale != other.scale || self.multiplier != other.multiplier {
            let factor = self.factor().powf(self.exponent) * other.factor().powf(other.exponent);
            self.scale = 0;
            self.multiplier = if exponent.abs() < EXPONENT_EPSILON {
                1.0
            } else {
                factor.powf(1.0 / exponent)
            };
        }

        self.exponent = exponent;
    }
}

impl fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiplier == 1.0 && self.scale == 0 {
            write!(f, "{}", self.kind)?;
        } else if self.multiplier == 1.0 {
            write!(f, "(10^{} {})", self.scale, self.kind)?;
        } else {
            write!(f, "({} {})", self.factor(), self.kind)?;
        }

        if self.exponent != 1.0 {
            write!(f, "^{}", self.exponent)?;
        }

        Ok(())
    }
}

impl UnitDefinition {
    /// Creates an anonymous unit definition from a list of terms.
    pub fn from_units(base_units: Vec<BaseUnit>) -> Self {
        UnitDefinition {
            id: None,
            name: None,
            base_units,
        }
    }

    /// Creates an anonymous unit definition holding a single term of the
    /// given kind.
    pub fn from_kind(kind: UnitType) -> Self {
        UnitDefinition::from_units(vec![BaseUnit::new(kind)])
    }

    /// Creates the `dimensionless` unit definition.
    pub fn dimensionless() -> Self {
        UnitDefinition::from_kind(UnitType::Dimensionless)
    }

    /// Number of terms in the definition.
    pub fn num_units(&self) -> usize {
        self.base_units.len()
    }

    /// Whether the definition has no terms, meaning its units are unknown.
    pub fn is_empty(&self) -> bool {
        self.base_units.is_empty()
    }

    /// Appends a term.
    pub fn add_unit(&mut self, unit: BaseUnit) {
        self.base_units.push(unit);
    }

    /// Appends copies of all terms of `other`, unsimplified.
    pub fn extend(&mut self, other: &UnitDefinition) {
        self.base_units.extend(other.base_units.iter().cloned());
    }

    /// Returns an anonymous copy holding only the terms of this definition.
    pub fn terms(&self) -> UnitDefinition {
        UnitDefinition::from_units(self.base_units.clone())
    }

    /// Merges terms of identical kind, drops cancelled terms and redundant
    /// `dimensionless` terms.
    ///
    /// A non-empty definition whose terms all cancel becomes
    /// `dimensionless`. An empty definition stays empty.
    pub fn simplify(&mut self) {
        if self.base_units.is_empty() {
            return;
        }

        let mut merged: Vec<BaseUnit> = Vec::with_capacity(self.base_units.len());
        for unit in self.base_units.drain(..) {
            match merged.iter_mut().find(|u| u.kind == unit.kind) {
                Some(existing) => existing.merge(&unit),
                None => merged.push(unit),
            }
        }

        merged.retain(|u| u.exponent.abs() >= EXPONENT_EPSILON);

        if merged.iter().any(|u| u.kind != UnitType::Dimensionless) {
            merged.retain(|u| u.kind != UnitType::Dimensionless);
        }

        if merged.is_empty() {
            merged.push(BaseUnit::new(UnitType::Dimensionless));
        }

        self.base_units = merged;
    }

    /// Returns a simplified copy.
    pub fn simplified(&self) -> UnitDefinition {
        let mut ud = self.clone();
        ud.simplify();
        ud
    }

    /// Returns a copy with every exponent negated.
    pub fn inverted(&self) -> UnitDefinition {
        UnitDefinition::from_units(self.base_units.iter().map(BaseUnit::negated).collect())
    }

    /// Returns the unsimplified product of both definitions.
    pub fn multiplied_by(&self, other: &UnitDefinition) -> UnitDefinition {
        let mut ud = self.terms();
        ud.extend(other);
        ud
    }

    /// Returns `self / other`, simplified.
    ///
    /// This is how every per-time view is built: the primary units with
    /// the terms of the time units appended with negated exponents.
    pub fn divided_by(&self, other: &UnitDefinition) -> UnitDefinition {
        let mut ud = self.multiplied_by(&other.inverted());
        ud.simplify();
        ud
    }

    /// Returns a copy with every exponent multiplied by `power`.
    pub fn raised_to(&self, power: f64) -> UnitDefinition {
        UnitDefinition::from_units(
            self.base_units
                .iter()
                .map(|u| {
                    let exponent = u.exponent * power;
                    u.clone().with_exponent(exponent)
                })
                .collect(),
        )
    }

    /// Whether the definition is empty or consists of `dimensionless`
    /// terms only.
    pub fn is_dimensionless(&self) -> bool {
        self.base_units
            .iter()
            .all(|u| u.kind == UnitType::Dimensionless)
    }

    /// Compares kinds and exponents after simplification, ignoring scale
    /// and multiplier.
    pub fn is_equivalent(&self, other: &UnitDefinition) -> bool {
        let lhs = self.sorted_terms();
        let rhs = other.sorted_terms();

        lhs.len() == rhs.len()
            && lhs.iter().zip(rhs.iter()).all(|(a, b)| {
                a.kind == b.kind && (a.exponent - b.exponent).abs() < EXPONENT_EPSILON
            })
    }

    /// Compares kinds, exponents, scales and multipliers after
    /// simplification.
    pub fn is_identical(&self, other: &UnitDefinition) -> bool {
        self.is_equivalent(other)
            && self
                .sorted_terms()
                .iter()
                .zip(other.sorted_terms().iter())
                .all(|(a, b)| a.scale == b.scale && a.multiplier == b.multiplier)
    }

    fn sorted_terms(&self) -> Vec<BaseUnit> {
        let mut terms = self.simplified().base_units;
        terms.sort_by_key(|u| u.kind);
        terms
    }
}

impl fmt::Display for UnitDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.base_units.is_empty() {
            return write!(f, "(undeclared)");
        }

        let terms = self
            .base_units
            .iter()
            .map(|u| u.to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", terms.join(" * "))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    use super::*;

    fn per_second() -> UnitDefinition {
        UnitDefinition::from_units(vec![BaseUnit::new(UnitType::Second).with_exponent(-1.0)])
    }

    #[test]
    fn test_simplify_merges_same_kind() {
        let mut ud = UnitDefinition::from_units(vec![
            BaseUnit::new(UnitType::Mole),
            BaseUnit::new(UnitType::Second).with_exponent(-1.0),
            BaseUnit::new(UnitType::Mole).with_exponent(2.0),
        ]);
        ud.simplify();

        assert_eq!(ud.num_units(), 2);
        assert_eq!(ud.base_units[0].kind, UnitType::Mole);
        assert_eq!(ud.base_units[0].exponent, 3.0);
        assert_eq!(ud.base_units[1].kind, UnitType::Second);
    }

    #[test]
    fn test_simplify_cancels_to_dimensionless() {
        let ud = UnitDefinition::from_kind(UnitType::Second).multiplied_by(&per_second());
        let ud = ud.simplified();

        assert_eq!(ud.base_units, vec![BaseUnit::new(UnitType::Dimensionless)]);
    }

    #[test]
    fn test_simplify_keeps_empty_definition_empty() {
        let mut ud = UnitDefinition::default();
        ud.simplify();
        assert!(ud.is_empty());
    }

    #[test]
    fn test_simplify_drops_redundant_dimensionless() {
        let ud = UnitDefinition::dimensionless()
            .multiplied_by(&UnitDefinition::from_kind(UnitType::Litre))
            .simplified();

        assert_eq!(ud.base_units, vec![BaseUnit::new(UnitType::Litre)]);
    }

    #[test]
    fn test_simplify_folds_scales_into_multiplier() {
        let mut millimole = BaseUnit::new(UnitType::Mole);
        millimole.scale = -3;
        let ud = UnitDefinition::from_units(vec![millimole, BaseUnit::new(UnitType::Mole)]);
        let ud = ud.simplified();

        assert_eq!(ud.num_units(), 1);
        assert_eq!(ud.base_units[0].exponent, 2.0);
        assert_eq!(ud.base_units[0].scale, 0);
        assert_relative_eq!(ud.base_units[0].multiplier, 1e-3f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_divided_by_builds_rate_units() {
        let ud = UnitDefinition::from_kind(UnitType::Mole)
            .divided_by(&UnitDefinition::from_kind(UnitType::Second));

        assert_eq!(
            ud.base_units,
            vec![
                BaseUnit::new(UnitType::Mole),
                BaseUnit::new(UnitType::Second).with_exponent(-1.0),
            ]
        );
        assert_eq!(ud.to_string(), "mole * second^-1");
    }

    #[test]
    fn test_extend_keeps_terms_unsimplified() {
        let mut ud = per_second();
        ud.extend(&per_second());

        assert_eq!(ud.num_units(), 2);
        assert_eq!(ud.simplified().base_units[0].exponent, -2.0);
    }

    #[test]
    fn test_raised_to_scales_exponents() {
        let area = UnitDefinition::from_kind(UnitType::Metre).raised_to(2.0);
        assert_eq!(area.base_units[0].exponent, 2.0);
        assert_eq!(area.raised_to(0.5).base_units[0].exponent, 1.0);
    }

    #[test]
    fn test_equivalence_ignores_order_and_scale() {
        let mut millimole = BaseUnit::new(UnitType::Mole);
        millimole.scale = -3;
        let a = UnitDefinition::from_units(vec![
            millimole,
            BaseUnit::new(UnitType::Litre).with_exponent(-1.0),
        ]);
        let b = UnitDefinition::from_units(vec![
            BaseUnit::new(UnitType::Litre).with_exponent(-1.0),
            BaseUnit::new(UnitType::Mole),
        ]);

        assert!(a.is_equivalent(&b));
        assert!(!a.is_identical(&b));
        assert!(!a.is_equivalent(&per_second()));
    }

    #[test]
    fn test_display() {
        let mut millimole = BaseUnit::new(UnitType::Mole);
        millimole.scale = -3;
        let ud = UnitDefinition::from_units(vec![
            millimole,
            BaseUnit::new(UnitType::Litre).with_exponent(-1.0),
        ]);

        assert_eq!(ud.to_string(), "(10^-3 mole) * litre^-1");
        assert_eq!(UnitDefinition::default().to_string(), "(undeclared)");
    }
}
