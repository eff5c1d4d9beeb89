//! Information display module for derived units
//!
//! Renders the records of a [`FormulaUnitsRegistry`] as a table with one
//! row per record: its key, its primary and per-time units and the
//! undeclared-units flags.

use std::fmt::{self, Display};

use tabled::{builder::Builder, settings::Style};

use crate::prelude::{FormulaUnitsData, FormulaUnitsRegistry, UnitDefinition};

/// Trait for converting records to table rows
trait TableRecord {
    /// Get the column headers for the table
    fn columns() -> Vec<String>;

    /// Convert the instance to a row of the table
    fn to_record(&self) -> Vec<String>;
}

impl Display for FormulaUnitsRegistry {
    /// Formats the registry as a single table in derivation order. An
    /// unpopulated registry renders as a one-line notice.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_populated() {
            return write!(f, "No derived units");
        }

        write!(f, "{}", to_table(self.records()))?;

        if !self.collisions().is_empty() {
            let keys = self
                .collisions()
                .iter()
                .map(|(id, typecode)| format!("{typecode} '{id}'"))
                .collect::<Vec<_>>();
            write!(f, "\nDuplicate keys: {}", keys.join(", "))?;
        }

        Ok(())
    }
}

/// Converts a collection of TableRecord implementors to a formatted table string
///
/// # Arguments
/// * `records` - A slice of objects implementing TableRecord
///
/// # Returns
/// * A formatted string containing the table representation
fn to_table<T: TableRecord>(records: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::columns());

    for record in records {
        builder.push_record(record.to_record());
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn units_cell(unit_definition: Option<&UnitDefinition>) -> String {
    unit_definition
        .map(|ud| ud.to_string())
        .unwrap_or("-".to_string())
}

impl TableRecord for FormulaUnitsData {
    fn columns() -> Vec<String> {
        vec![
            "ID".to_string(),
            "Component".to_string(),
            "Units".to_string(),
            "Per Time".to_string(),
            "Undeclared".to_string(),
            "Ignorable".to_string(),
        ]
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.unit_reference_id().to_string(),
            self.component_typecode().to_string(),
            units_cell(self.unit_definition()),
            units_cell(self.per_time_unit_definition()),
            self.contains_parameters_with_undeclared_units().to_string(),
            self.can_ignore_undeclared_units().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_table_output() {
        let mut model =
            load_model("tests/data/enzyme_l3.json").expect("Failed to load model");
        model.populate_list_formula_units_data();

        let table = model.formula_units_registry().to_string();
        let header = table.lines().nth(1).expect("Missing table header");
        assert!(header.contains("ID"));
        assert!(header.contains("Per Time"));
        assert!(table.contains("subs_per_time"));
        assert!(table.contains("mole * second^-1"));
        assert!(!table.contains("Duplicate keys"));
    }

    #[test]
    fn test_unpopulated_output() {
        let model = Model::default();
        assert_eq!(model.formula_units_registry().to_string(), "No derived units");
    }
}
