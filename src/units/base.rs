//! Model-wide base units
//!
//! Every model has six default quantity kinds: substance, time, volume,
//! area, length and extent. Their units come from the model-wide units
//! attributes in Level 3, and from redefinable built-in units in Levels 1
//! and 2. This module derives one record per kind plus the
//! substance-per-time record built from them.
//!
//! The records are computed as local values and handed to the rest of the
//! derivation explicitly, so nothing downstream has to look them up.

use log::debug;

use crate::model::{Model, UnitDefinition, UnitType};
use crate::units::data::{ComponentTypeCode, FormulaUnitsData};

/// Identifier of the substance-per-time record.
pub const SUBSTANCE_PER_TIME: &str = "subs_per_time";

/// The default quantity kinds of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseQuantity {
    Substance,
    Time,
    Volume,
    Area,
    Length,
    Extent,
}

impl BaseQuantity {
    /// Identifier of the quantity's record, which is also the name of the
    /// unit definition overriding it in Levels 1 and 2.
    pub fn id(&self) -> &'static str {
        match self {
            BaseQuantity::Substance => "substance",
            BaseQuantity::Time => "time",
            BaseQuantity::Volume => "volume",
            BaseQuantity::Area => "area",
            BaseQuantity::Length => "length",
            BaseQuantity::Extent => "extent",
        }
    }

    /// Looks up the quantity by its record identifier.
    pub fn from_id(id: &str) -> Option<BaseQuantity> {
        match id {
            "substance" => Some(BaseQuantity::Substance),
            "time" => Some(BaseQuantity::Time),
            "volume" => Some(BaseQuantity::Volume),
            "area" => Some(BaseQuantity::Area),
            "length" => Some(BaseQuantity::Length),
            "extent" => Some(BaseQuantity::Extent),
            _ => None,
        }
    }

    /// Built-in units used in Levels 1 and 2 when the model does not
    /// redefine the quantity. Extent has none.
    fn builtin_units(&self) -> Option<UnitDefinition> {
        match self {
            BaseQuantity::Substance => Some(crate::unit!([_ mole])),
            BaseQuantity::Time => Some(crate::unit!([_ second])),
            BaseQuantity::Volume => Some(crate::unit!([_ litre])),
            BaseQuantity::Area => Some(crate::unit!([_ metre^2])),
            BaseQuantity::Length => Some(crate::unit!([_ metre])),
            BaseQuantity::Extent => None,
        }
    }

    /// The Level 3 model attribute naming the quantity's units.
    fn model_attribute<'a>(&self, model: &'a Model) -> Option<&'a str> {
        match self {
            BaseQuantity::Substance => model.substance_units.as_deref(),
            BaseQuantity::Time => model.time_units.as_deref(),
            BaseQuantity::Volume => model.volume_units.as_deref(),
            BaseQuantity::Area => model.area_units.as_deref(),
            BaseQuantity::Length => model.length_units.as_deref(),
            BaseQuantity::Extent => model.extent_units.as_deref(),
        }
    }
}

/// Resolves a units attribute to a built-in kind valid for the model's
/// level and version, or to a user unit definition.
///
/// # Arguments
///
/// * `model` - The model providing level, version and unit definitions.
/// * `name` - The attribute value.
///
/// # Returns
///
/// An anonymous copy of the referenced terms, or `None` if the name
/// resolves to neither.
pub(crate) fn lookup_units(model: &Model, name: &str) -> Option<UnitDefinition> {
    if UnitType::is_valid_name(name, model.level, model.version) {
        return UnitType::from_name(name).map(UnitDefinition::from_kind);
    }

    model.get_unit_definition(name).map(UnitDefinition::terms)
}

/// The model-wide base unit records of one derivation pass.
#[derive(Debug, Clone)]
pub struct BaseUnits {
    pub substance: FormulaUnitsData,
    pub time: FormulaUnitsData,
    pub volume: FormulaUnitsData,
    pub area: FormulaUnitsData,
    pub length: FormulaUnitsData,
    pub extent: FormulaUnitsData,
    pub substance_per_time: FormulaUnitsData,
}

impl BaseUnits {
    /// Derives the six base quantities and the substance-per-time record.
    pub fn derive(model: &Model) -> Self {
        let substance = base_record(model, BaseQuantity::Substance);
        let time = base_record(model, BaseQuantity::Time);
        let volume = base_record(model, BaseQuantity::Volume);
        let area = base_record(model, BaseQuantity::Area);
        let length = base_record(model, BaseQuantity::Length);
        let extent = base_record(model, BaseQuantity::Extent);

        let numerator = if model.level < 3 { &substance } else { &extent };
        let substance_per_time = substance_per_time_record(numerator, &time);

        debug!(
            "Derived base units: substance = {}, time = {}, extent = {}",
            display_units(&substance),
            display_units(&time),
            display_units(&extent),
        );

        Self {
            substance,
            time,
            volume,
            area,
            length,
            extent,
            substance_per_time,
        }
    }

    /// The records in registration order.
    pub fn records(&self) -> [&FormulaUnitsData; 7] {
        [
            &self.substance,
            &self.time,
            &self.volume,
            &self.area,
            &self.length,
            &self.extent,
            &self.substance_per_time,
        ]
    }

    /// The record of a single quantity.
    pub fn get(&self, quantity: BaseQuantity) -> &FormulaUnitsData {
        match quantity {
            BaseQuantity::Substance => &self.substance,
            BaseQuantity::Time => &self.time,
            BaseQuantity::Volume => &self.volume,
            BaseQuantity::Area => &self.area,
            BaseQuantity::Length => &self.length,
            BaseQuantity::Extent => &self.extent,
        }
    }

    /// The primary units of a single quantity. Empty when undeclared.
    pub fn units(&self, quantity: BaseQuantity) -> UnitDefinition {
        self.get(quantity)
            .unit_definition()
            .cloned()
            .unwrap_or_default()
    }
}

fn display_units(record: &FormulaUnitsData) -> String {
    record
        .unit_definition()
        .map(|ud| ud.to_string())
        .unwrap_or_default()
}

/// Builds the record of one base quantity. The record is always created,
/// even when its units end up empty.
fn base_record(model: &Model, quantity: BaseQuantity) -> FormulaUnitsData {
    let unit_definition = if model.level < 3 {
        legacy_units(model, quantity)
    } else {
        model_attribute_units(model, quantity)
    };

    let mut record = FormulaUnitsData::new(quantity.id(), ComponentTypeCode::Model);
    record.set_declared_unit_definition(unit_definition);
    record
}

/// Levels 1 and 2: a unit definition named after the quantity overrides
/// the built-in units.
fn legacy_units(model: &Model, quantity: BaseQuantity) -> UnitDefinition {
    if quantity == BaseQuantity::Extent {
        return UnitDefinition::default();
    }

    match model.get_unit_definition(quantity.id()) {
        Some(redefined) => redefined.terms(),
        None => quantity.builtin_units().unwrap_or_default(),
    }
}

/// Level 3: the model attribute names a built-in kind or a user unit
/// definition. Anything else leaves the quantity undeclared.
fn model_attribute_units(model: &Model, quantity: BaseQuantity) -> UnitDefinition {
    quantity
        .model_attribute(model)
        .and_then(|name| lookup_units(model, name))
        .unwrap_or_default()
}

/// Substance-per-time is the numerator divided by time. It is undeclared
/// as soon as either input is.
fn substance_per_time_record(
    numerator: &FormulaUnitsData,
    time: &FormulaUnitsData,
) -> FormulaUnitsData {
    let mut record = FormulaUnitsData::new(SUBSTANCE_PER_TIME, ComponentTypeCode::Unknown);

    let numerator_units = numerator.unit_definition().cloned().unwrap_or_default();
    let time_units = time.unit_definition().cloned().unwrap_or_default();
    let mut unit_definition = numerator_units.multiplied_by(&time_units.inverted());
    if !numerator_units.is_empty() {
        unit_definition.simplify();
    }

    let undeclared = numerator.contains_parameters_with_undeclared_units()
        || time.contains_parameters_with_undeclared_units();

    record.set_declared_unit_definition(unit_definition);
    if undeclared {
        record.mark_undeclared();
    }

    record
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{BaseUnit, ModelBuilder, UnitDefinitionBuilder};

    fn units_of(record: &FormulaUnitsData) -> String {
        record.unit_definition().expect("missing units").to_string()
    }

    #[test]
    fn test_level2_builtin_defaults() {
        let model = ModelBuilder::default()
            .level(2u32)
            .version(4u32)
            .build()
            .expect("Failed to build model");
        let base = BaseUnits::derive(&model);

        assert_eq!(units_of(&base.substance), "mole");
        assert_eq!(units_of(&base.time), "second");
        assert_eq!(units_of(&base.volume), "litre");
        assert_eq!(units_of(&base.area), "metre^2");
        assert_eq!(units_of(&base.length), "metre");
        assert_eq!(
            base.area.unit_definition().unwrap().base_units,
            vec![BaseUnit::new(UnitType::Metre).with_exponent(2.0)]
        );
        assert!(!base.time.contains_parameters_with_undeclared_units());
        assert_eq!(units_of(&base.substance_per_time), "mole * second^-1");
        assert!(!base
            .substance_per_time
            .contains_parameters_with_undeclared_units());
    }

    #[test]
    fn test_level2_extent_is_undeclared() {
        let model = ModelBuilder::default()
            .level(2u32)
            .version(4u32)
            .build()
            .expect("Failed to build model");
        let base = BaseUnits::derive(&model);

        assert!(base.extent.unit_definition().unwrap().is_empty());
        assert!(base.extent.contains_parameters_with_undeclared_units());
        assert!(!base.extent.can_ignore_undeclared_units());
    }

    #[test]
    fn test_level2_redefined_time() {
        let minute = UnitDefinitionBuilder::default()
            .id("time".to_string())
            .to_base_units(BaseUnit {
                kind: UnitType::Second,
                exponent: 1.0,
                scale: 0,
                multiplier: 60.0,
            })
            .build()
            .expect("Failed to build unit definition");
        let model = ModelBuilder::default()
            .level(2u32)
            .version(4u32)
            .to_unit_definitions(minute)
            .build()
            .expect("Failed to build model");
        let base = BaseUnits::derive(&model);

        let time = base.time.unit_definition().unwrap();
        assert_eq!(time.num_units(), 1);
        assert_eq!(time.base_units[0].multiplier, 60.0);
        assert!(time.id.is_none());
    }

    #[test]
    fn test_level3_model_attributes() {
        let per_litre = UnitDefinitionBuilder::default()
            .id("ml".to_string())
            .to_base_units(BaseUnit {
                kind: UnitType::Litre,
                exponent: 1.0,
                scale: -3,
                multiplier: 1.0,
            })
            .build()
            .expect("Failed to build unit definition");
        let model = ModelBuilder::default()
            .to_unit_definitions(per_litre)
            .substance_units("mole".to_string())
            .time_units("second".to_string())
            .volume_units("ml".to_string())
            .extent_units("mole".to_string())
            .build()
            .expect("Failed to build model");
        let base = BaseUnits::derive(&model);

        assert_eq!(units_of(&base.substance), "mole");
        assert_eq!(units_of(&base.volume), "(10^-3 litre)");
        assert_eq!(units_of(&base.substance_per_time), "mole * second^-1");

        // Unset attributes are undeclared in Level 3
        assert!(base.area.unit_definition().unwrap().is_empty());
        assert!(base.area.contains_parameters_with_undeclared_units());
        assert!(base.length.contains_parameters_with_undeclared_units());
    }

    #[test]
    fn test_level3_unresolvable_attribute() {
        let model = ModelBuilder::default()
            .time_units("fortnight".to_string())
            .build()
            .expect("Failed to build model");
        let base = BaseUnits::derive(&model);

        assert!(base.time.unit_definition().unwrap().is_empty());
        assert!(base.time.contains_parameters_with_undeclared_units());
    }

    #[test]
    fn test_substance_per_time_propagates_undeclared_time() {
        let model = ModelBuilder::default()
            .extent_units("mole".to_string())
            .build()
            .expect("Failed to build model");
        let base = BaseUnits::derive(&model);

        assert!(base
            .substance_per_time
            .contains_parameters_with_undeclared_units());
        assert!(!base.substance_per_time.can_ignore_undeclared_units());
        assert_eq!(
            base.substance_per_time.component_typecode(),
            ComponentTypeCode::Unknown
        );
    }

    #[test]
    fn test_substance_per_time_propagates_undeclared_extent() {
        let model = ModelBuilder::default()
            .time_units("second".to_string())
            .build()
            .expect("Failed to build model");
        let base = BaseUnits::derive(&model);

        assert!(base
            .substance_per_time
            .contains_parameters_with_undeclared_units());
    }
}
