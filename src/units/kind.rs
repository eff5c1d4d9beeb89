//! Unit Kind Module
//!
//! Name handling for the SBML base unit kinds. Unit attributes in a model
//! are plain strings; this module decides whether such a string names a
//! built-in kind for a given SBML level and version, and maps it to the
//! corresponding [`UnitType`].

use std::{collections::HashMap, fmt, str::FromStr};

use crate::model::UnitType;

lazy_static::lazy_static! {
    static ref KIND_NAMES: HashMap<&'static str, UnitType> = {
        let mut m = HashMap::new();
        m.insert("ampere", UnitType::Ampere);
        m.insert("avogadro", UnitType::Avogadro);
        m.insert("becquerel", UnitType::Becquerel);
        m.insert("candela", UnitType::Candela);
        m.insert("celsius", UnitType::Celsius);
        m.insert("Celsius", UnitType::Celsius);
        m.insert("coulomb", UnitType::Coulomb);
        m.insert("dimensionless", UnitType::Dimensionless);
        m.insert("farad", UnitType::Farad);
        m.insert("gram", UnitType::Gram);
        m.insert("gray", UnitType::Gray);
        m.insert("henry", UnitType::Henry);
        m.insert("hertz", UnitType::Hertz);
        m.insert("item", UnitType::Item);
        m.insert("joule", UnitType::Joule);
        m.insert("katal", UnitType::Katal);
        m.insert("kelvin", UnitType::Kelvin);
        m.insert("kilogram", UnitType::Kilogram);
        m.insert("litre", UnitType::Litre);
        m.insert("liter", UnitType::Litre);
        m.insert("lumen", UnitType::Lumen);
        m.insert("lux", UnitType::Lux);
        m.insert("metre", UnitType::Metre);
        m.insert("meter", UnitType::Metre);
        m.insert("mole", UnitType::Mole);
        m.insert("newton", UnitType::Newton);
        m.insert("ohm", UnitType::Ohm);
        m.insert("pascal", UnitType::Pascal);
        m.insert("radian", UnitType::Radian);
        m.insert("second", UnitType::Second);
        m.insert("siemens", UnitType::Siemens);
        m.insert("sievert", UnitType::Sievert);
        m.insert("steradian", UnitType::Steradian);
        m.insert("tesla", UnitType::Tesla);
        m.insert("volt", UnitType::Volt);
        m.insert("watt", UnitType::Watt);
        m.insert("weber", UnitType::Weber);
        m
    };
}

impl UnitType {
    /// Looks up a unit kind by name, accepting the `liter`/`meter` and
    /// `Celsius` spellings.
    ///
    /// # Arguments
    ///
    /// * `name` - The unit kind name as it appears in a units attribute.
    ///
    /// # Returns
    ///
    /// The matching `UnitType`, or `None` if the name is not a base unit kind.
    pub fn from_name(name: &str) -> Option<UnitType> {
        KIND_NAMES.get(name).copied()
    }

    /// Checks whether `name` denotes a built-in unit kind in the given SBML
    /// level and version.
    ///
    /// The American spellings are only part of Level 1, `celsius` was
    /// removed in Level 2 Version 2 and `avogadro` only exists in Level 3.
    pub fn is_valid_name(name: &str, level: u32, version: u32) -> bool {
        let Some(kind) = UnitType::from_name(name) else {
            return false;
        };

        match (name, kind) {
            ("liter" | "meter", _) => level == 1,
            (_, UnitType::Celsius) => level == 1 || (level == 2 && version == 1),
            (_, UnitType::Avogadro) => level >= 3,
            _ => true,
        }
    }

    /// Canonical lowercase name of the unit kind.
    pub fn name(&self) -> &'static str {
        match self {
            UnitType::Ampere => "ampere",
            UnitType::Avogadro => "avogadro",
            UnitType::Becquerel => "becquerel",
            UnitType::Candela => "candela",
            UnitType::Celsius => "celsius",
            UnitType::Coulomb => "coulomb",
            UnitType::Dimensionless => "dimensionless",
            UnitType::Farad => "farad",
            UnitType::Gram => "gram",
            UnitType::Gray => "gray",
            UnitType::Henry => "henry",
            UnitType::Hertz => "hertz",
            UnitType::Item => "item",
            UnitType::Joule => "joule",
            UnitType::Katal => "katal",
            UnitType::Kelvin => "kelvin",
            UnitType::Kilogram => "kilogram",
            UnitType::Litre => "litre",
            UnitType::Lumen => "lumen",
            UnitType::Lux => "lux",
            UnitType::Metre => "metre",
            UnitType::Mole => "mole",
            UnitType::Newton => "newton",
            UnitType::Ohm => "ohm",
            UnitType::Pascal => "pascal",
            UnitType::Radian => "radian",
            UnitType::Second => "second",
            UnitType::Siemens => "siemens",
            UnitType::Sievert => "sievert",
            UnitType::Steradian => "steradian",
            UnitType::Tesla => "tesla",
            UnitType::Volt => "volt",
            UnitType::Watt => "watt",
            UnitType::Weber => "weber",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for UnitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitType::from_name(s).ok_or_else(|| format!("Invalid unit kind: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_type_from_name() {
        assert_eq!(UnitType::from_name("mole"), Some(UnitType::Mole));
        assert_eq!(UnitType::from_name("liter"), Some(UnitType::Litre));
        assert_eq!(UnitType::from_name("meter"), Some(UnitType::Metre));
        assert_eq!(UnitType::from_name("per_second"), None);
        assert_eq!(UnitType::from_name("Mole"), None);
    }

    #[test]
    fn test_unit_type_validity_per_level() {
        assert!(UnitType::is_valid_name("liter", 1, 2));
        assert!(!UnitType::is_valid_name("liter", 2, 4));
        assert!(UnitType::is_valid_name("litre", 3, 2));

        assert!(UnitType::is_valid_name("celsius", 2, 1));
        assert!(!UnitType::is_valid_name("celsius", 2, 2));
        assert!(!UnitType::is_valid_name("celsius", 3, 1));

        assert!(UnitType::is_valid_name("avogadro", 3, 1));
        assert!(!UnitType::is_valid_name("avogadro", 2, 4));

        assert!(!UnitType::is_valid_name("substance", 2, 4));
    }

    #[test]
    fn test_unit_type_display_round_trip() {
        let kind: UnitType = "second".parse().expect("Failed to parse unit kind");
        assert_eq!(kind.to_string(), "second");
        assert!("fortnight".parse::<UnitType>().is_err());
    }
}
