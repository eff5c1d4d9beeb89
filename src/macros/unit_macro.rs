//! Unit Macro Module
//!
//! Provides the `unit!` macro for writing unit definitions as bracketed
//! `[prefix unit]` pairs. Use `_` for "no prefix".
//!
//! ```
//! use sbml_units::unit;
//!
//! let concentration = unit!([m mole] / [_ litre]);
//! let rate_constant = unit!(1 / [_ second]);
//! let amount = unit!([u mol]);
//! let area = unit!([_ metre^2]);
//!
//! assert_eq!(area.to_string(), "metre^2");
//! assert_eq!(concentration.name.as_deref(), Some("mmole / litre"));
//! ```
//!
//! A symbol may carry a positive integer exponent (`[_ metre^2]`). Terms
//! after the `/` are negated. Non-SI time units such as `min` or `h`
//! become `second` terms with the matching multiplier.

/// One term of a unit definition. `$sign` is `1.0` for numerator terms and
/// `-1.0` for denominator terms.
#[doc(hidden)]
#[macro_export]
macro_rules! unit_term {
    ($sign:expr; $prefix:tt $symbol:ident $($exponent:literal)?) => {{
        let (kind, multiplier) = $crate::macros::unit_maps::kind_of(stringify!($symbol));
        $crate::prelude::BaseUnit {
            kind,
            exponent: $sign * (1 $(* $exponent)?) as f64,
            scale: $crate::macros::unit_maps::scale_of(stringify!($prefix)),
            multiplier,
        }
    }};
}

/// Written form of a term, e.g. `mmole` or `metre^2`.
#[doc(hidden)]
#[macro_export]
macro_rules! unit_symbol {
    ($prefix:tt $symbol:ident $($exponent:literal)?) => {
        concat!(
            stringify!($prefix),
            stringify!($symbol)
            $(, "^", stringify!($exponent))?
        )
        .trim_start_matches('_')
    };
}

/// Assembles a named definition from numerator and denominator terms.
#[doc(hidden)]
#[macro_export]
macro_rules! unit_definition {
    (
        [$($np:tt $nu:ident $($ne:literal)?),*] /
        [$($dp:tt $du:ident $($de:literal)?),*]
    ) => {{
        let numerator: &[&str] = &[$($crate::unit_symbol!($np $nu $($ne)?)),*];
        let denominator: &[&str] = &[$($crate::unit_symbol!($dp $du $($de)?)),*];
        let name = match (numerator.is_empty(), denominator.is_empty()) {
            (_, true) => numerator.join(" "),
            (true, false) => format!("1 / {}", denominator.join(" ")),
            (false, false) => format!("{} / {}", numerator.join(" "), denominator.join(" ")),
        };

        $crate::prelude::UnitDefinition {
            id: None,
            name: Some(name),
            base_units: vec![
                $($crate::unit_term!(1.0; $np $nu $($ne)?),)*
                $($crate::unit_term!(-1.0; $dp $du $($de)?),)*
            ],
        }
    }};
}

/// Builds a [`UnitDefinition`](crate::prelude::UnitDefinition) from
/// bracketed `[prefix symbol]` terms.
#[macro_export]
macro_rules! unit {
    (1 / $([$dp:tt $du:ident $(^ $de:literal)?])+) => {
        $crate::unit_definition!([] / [$($dp $du $($de)?),+])
    };

    (
        $([$np:tt $nu:ident $(^ $ne:literal)?])+ /
        $([$dp:tt $du:ident $(^ $de:literal)?])+
    ) => {
        $crate::unit_definition!([$($np $nu $($ne)?),+] / [$($dp $du $($de)?),+])
    };

    ($([$np:tt $nu:ident $(^ $ne:literal)?])+) => {
        $crate::unit_definition!([$($np $nu $($ne)?),+] / [])
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::UnitType;

    #[test]
    fn test_unit_ratio_macro() {
        let unit = unit!([_ mole] / [_ liter]);
        assert_eq!(unit.name, Some("mole / liter".to_string()));
        assert_eq!(unit.base_units.len(), 2);
        assert_eq!(unit.base_units[0].kind, UnitType::Mole);
        assert_eq!(unit.base_units[0].exponent, 1.0);
        assert_eq!(unit.base_units[0].scale, 0);
        assert_eq!(unit.base_units[1].kind, UnitType::Litre);
        assert_eq!(unit.base_units[1].exponent, -1.0);
        assert_eq!(unit.base_units[1].multiplier, 1.0);
    }

    #[test]
    fn test_unit_ratio_macro_with_prefix() {
        let unit = unit!([m mol] / [_ l]);
        assert_eq!(unit.name, Some("mmol / l".to_string()));
        assert_eq!(unit.base_units[0].kind, UnitType::Mole);
        assert_eq!(unit.base_units[0].scale, -3);
        assert_eq!(unit.to_string(), "(10^-3 mole) * litre^-1");
    }

    #[test]
    fn test_unit_macro_product() {
        let unit = unit!([_ mole] [_ second]);
        assert_eq!(unit.name, Some("mole second".to_string()));
        assert_eq!(unit.to_string(), "mole * second");
    }

    #[test]
    fn test_unit_macro_time_multiplier() {
        let unit = unit!(1 / [_ min]);
        assert_eq!(unit.name, Some("1 / min".to_string()));
        assert_eq!(unit.base_units[0].kind, UnitType::Second);
        assert_eq!(unit.base_units[0].multiplier, 60.0);
        assert_eq!(unit.base_units[0].exponent, -1.0);
    }

    #[test]
    fn test_unit_macro_exponent() {
        let unit = unit!([_ mole] / [_ metre^3]);
        assert_eq!(unit.name, Some("mole / metre^3".to_string()));
        assert_eq!(unit.base_units[1].kind, UnitType::Metre);
        assert_eq!(unit.base_units[1].exponent, -3.0);
        assert_eq!(unit.to_string(), "mole * metre^-3");
    }

    #[test]
    fn test_unit_macro_inverse() {
        let unit = unit!(1 / [_ mole]);
        assert_eq!(unit.name, Some("1 / mole".to_string()));
        assert_eq!(unit.base_units.len(), 1);
        assert_eq!(unit.base_units[0].kind, UnitType::Mole);
        assert_eq!(unit.base_units[0].scale, 0);
        assert_eq!(unit.to_string(), "mole^-1");
    }
}
