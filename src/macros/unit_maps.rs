use std::collections::HashMap;

use crate::model::UnitType;

lazy_static::lazy_static! {
    /// Unit symbols accepted by the `unit!` macro, mapped to their kind and
    /// the multiplier relative to that kind.
    pub static ref KIND_MAPPINGS: HashMap<&'static str, (UnitType, f64)> = {
        let mut m = HashMap::new();
        // Mole
        m.insert("mole", (UnitType::Mole, 1.0));
        m.insert("mol", (UnitType::Mole, 1.0));

        // Item
        m.insert("item", (UnitType::Item, 1.0));

        // Litre
        m.insert("liter", (UnitType::Litre, 1.0));
        m.insert("litre", (UnitType::Litre, 1.0));
        m.insert("l", (UnitType::Litre, 1.0));

        // Metre
        m.insert("metre", (UnitType::Metre, 1.0));
        m.insert("meter", (UnitType::Metre, 1.0));
        m.insert("m", (UnitType::Metre, 1.0));

        // Second
        m.insert("second", (UnitType::Second, 1.0));
        m.insert("s", (UnitType::Second, 1.0));

        // Minute
        m.insert("minute", (UnitType::Second, 60.0));
        m.insert("min", (UnitType::Second, 60.0));

        // Hour
        m.insert("hour", (UnitType::Second, 3600.0));
        m.insert("h", (UnitType::Second, 3600.0));

        // Day
        m.insert("day", (UnitType::Second, 86400.0));
        m.insert("d", (UnitType::Second, 86400.0));

        // Mass
        m.insert("gram", (UnitType::Gram, 1.0));
        m.insert("g", (UnitType::Gram, 1.0));
        m.insert("kilogram", (UnitType::Kilogram, 1.0));
        m.insert("kg", (UnitType::Kilogram, 1.0));

        // Catalytic activity
        m.insert("katal", (UnitType::Katal, 1.0));
        m.insert("kat", (UnitType::Katal, 1.0));

        // Frequency
        m.insert("hertz", (UnitType::Hertz, 1.0));
        m.insert("Hz", (UnitType::Hertz, 1.0));

        // Dimensionless
        m.insert("dimensionless", (UnitType::Dimensionless, 1.0));
        m.insert("_", (UnitType::Dimensionless, 1.0));

        // Kelvin
        m.insert("kelvin", (UnitType::Kelvin, 1.0));
        m.insert("K", (UnitType::Kelvin, 1.0));

        m
    };

    /// SI prefixes mapped to their power of ten. `_` means no prefix.
    pub static ref PREFIX_MAPPING: HashMap<&'static str, i32> = {
        let mut m: HashMap<&str, i32> = HashMap::new();
        m.insert("kilo", 3);
        m.insert("k", 3);
        m.insert("centi", -2);
        m.insert("c", -2);
        m.insert("milli", -3);
        m.insert("m", -3);
        m.insert("micro", -6);
        m.insert("mu", -6);
        m.insert("u", -6);
        m.insert("nano", -9);
        m.insert("n", -9);
        m.insert("pico", -12);
        m.insert("p", -12);
        m.insert("femto", -15);
        m.insert("f", -15);
        m.insert("atto", -18);
        m.insert("a", -18);
        m.insert("_", 0);
        m
    };
}

/// Kind and multiplier of a unit symbol.
///
/// # Panics
/// If the symbol is not listed in [`KIND_MAPPINGS`]. Symbols reach this
/// function only as literal `unit!` tokens.
pub fn kind_of(symbol: &str) -> (UnitType, f64) {
    match KIND_MAPPINGS.get(symbol) {
        Some(mapping) => *mapping,
        None => panic!("Unit {symbol} not found"),
    }
}

/// Power of ten of a prefix token.
///
/// # Panics
/// If the prefix is not listed in [`PREFIX_MAPPING`].
pub fn scale_of(prefix: &str) -> i32 {
    match PREFIX_MAPPING.get(prefix) {
        Some(scale) => *scale,
        None => panic!("Prefix {prefix} not found"),
    }
}
