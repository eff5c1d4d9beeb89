#[cfg(test)]
mod test_units {
    use pretty_assertions::assert_eq;
    use sbml_units::prelude::*;
    use sbml_units::unit;

    fn load(path: &str) -> Model {
        let mut model = load_model(path).expect("Failed to load model");
        model.populate_list_formula_units_data();
        model
    }

    fn units(model: &Model, id: &str, typecode: ComponentTypeCode) -> UnitDefinition {
        model
            .get_formula_units_data(id, typecode)
            .unwrap_or_else(|| panic!("Missing record ({typecode}, {id})"))
            .unit_definition()
            .cloned()
            .unwrap_or_else(|| panic!("Record ({typecode}, {id}) has no units"))
    }

    /// Mass action with a user defined rate constant. The rate must reduce
    /// to mole per second without undeclared units.
    #[test]
    fn test_mass_action_round_trip() {
        // ARRANGE
        let mut model = ModelBuilder::default()
            .time_units("second".to_string())
            .extent_units("mole".to_string())
            .to_unit_definitions(
                UnitDefinitionBuilder::default()
                    .id("per_second".to_string())
                    .to_base_units(BaseUnit::new(UnitType::Second).with_exponent(-1.0))
                    .build()
                    .expect("Failed to build unit definition"),
            )
            .to_compartments(
                CompartmentBuilder::default()
                    .id("c".to_string())
                    .spatial_dimensions(3.0)
                    .build()
                    .expect("Failed to build compartment"),
            )
            .to_species(
                SpeciesBuilder::default()
                    .id("S".to_string())
                    .compartment("c".to_string())
                    .substance_units("mole".to_string())
                    .has_only_substance_units(true)
                    .build()
                    .expect("Failed to build species"),
            )
            .to_parameters(
                ParameterBuilder::default()
                    .id("k".to_string())
                    .value(1.0)
                    .units("per_second".to_string())
                    .build()
                    .expect("Failed to build parameter"),
            )
            .to_reactions(
                ReactionBuilder::default()
                    .id("R".to_string())
                    .kinetic_law(
                        KineticLawBuilder::default()
                            .math("k*S".to_string())
                            .build()
                            .expect("Failed to build kinetic law"),
                    )
                    .build()
                    .expect("Failed to build reaction"),
            )
            .build()
            .expect("Failed to build model");

        // ACT
        model.populate_list_formula_units_data();

        // ASSERT
        let record = model
            .get_formula_units_data("R", ComponentTypeCode::KineticLaw)
            .expect("Missing kinetic law record");
        let rate = record.unit_definition().unwrap().simplified();

        assert_eq!(
            rate.base_units,
            vec![
                BaseUnit::new(UnitType::Second).with_exponent(-1.0),
                BaseUnit::new(UnitType::Mole),
            ]
        );
        assert!(rate.is_equivalent(&unit!([_ mole] / [_ second])));
        assert!(!record.contains_parameters_with_undeclared_units());
    }

    #[test]
    fn test_algebraic_rule_ids_follow_document_order() {
        let mut model = ModelBuilder::default()
            .to_rules(
                RuleBuilder::default()
                    .rule_type(RuleType::Algebraic)
                    .math("x - 1".to_string())
                    .build()
                    .expect("Failed to build rule"),
            )
            .to_rules(
                RuleBuilder::default()
                    .rule_type(RuleType::Assignment)
                    .variable("y".to_string())
                    .math("2".to_string())
                    .build()
                    .expect("Failed to build rule"),
            )
            .to_rules(
                RuleBuilder::default()
                    .rule_type(RuleType::Algebraic)
                    .build()
                    .expect("Failed to build rule"),
            )
            .to_rules(
                RuleBuilder::default()
                    .rule_type(RuleType::Algebraic)
                    .math("y".to_string())
                    .build()
                    .expect("Failed to build rule"),
            )
            .build()
            .expect("Failed to build model");
        model.populate_list_formula_units_data();

        let registry = model.formula_units_registry();
        assert_eq!(registry.algebraic_rule_id(0), Some("alg_rule_0"));
        assert_eq!(registry.algebraic_rule_id(1), None);
        assert_eq!(registry.algebraic_rule_id(2), Some("alg_rule_1"));
        assert_eq!(registry.algebraic_rule_id(3), Some("alg_rule_2"));

        let keys = model
            .formula_units_data()
            .iter()
            .filter(|r| r.component_typecode() == ComponentTypeCode::AlgebraicRule)
            .map(|r| r.unit_reference_id().to_string())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["alg_rule_0", "alg_rule_1", "alg_rule_2"]);

        // A rule without math still gets a record, just without units
        let empty = model
            .get_formula_units_data("alg_rule_1", ComponentTypeCode::AlgebraicRule)
            .unwrap();
        assert!(empty.unit_definition().is_none());
    }

    #[test]
    fn test_enzyme_model_records() {
        let model = load("tests/data/enzyme_l3.json");

        assert_eq!(model.get_num_formula_units_data(), 29);
        assert!(model.formula_units_registry().collisions().is_empty());

        let concentration = unit!([_ mole] / [_ litre]);
        for species in ["S", "E", "P"] {
            let ud = units(&model, species, ComponentTypeCode::Species);
            assert!(ud.is_equivalent(&concentration), "{species}: {ud}");
        }

        let rate = units(&model, "r1", ComponentTypeCode::KineticLaw);
        assert!(rate.is_equivalent(&unit!([_ mole] / [_ second])));
        let record = model
            .get_formula_units_data("r1", ComponentTypeCode::KineticLaw)
            .unwrap();
        assert!(!record.contains_parameters_with_undeclared_units());
    }

    #[test]
    fn test_enzyme_model_conversion_factor() {
        let model = load("tests/data/enzyme_l3.json");

        let product = model
            .get_formula_units_data("P", ComponentTypeCode::Species)
            .unwrap();
        assert_eq!(
            product.species_extent_unit_definition().unwrap().to_string(),
            "mole"
        );
        assert_eq!(
            units(&model, "Pextent", ComponentTypeCode::Species).to_string(),
            "mole"
        );
        assert_eq!(
            units(&model, "Ssubs", ComponentTypeCode::Species).to_string(),
            "mole"
        );
    }

    #[test]
    fn test_enzyme_model_assignments() {
        let model = load("tests/data/enzyme_l3.json");

        let initial = model
            .get_formula_units_data_for_assignment("S")
            .expect("Missing initial assignment record");
        assert_eq!(initial.component_typecode(), ComponentTypeCode::InitialAssignment);
        assert!(initial
            .unit_definition()
            .unwrap()
            .is_equivalent(&unit!([_ mole] / [_ litre])));
        // The literal 20 carries no units but does not change the result
        assert!(initial.contains_parameters_with_undeclared_units());
        assert!(initial.can_ignore_undeclared_units());

        let rule = model
            .get_formula_units_data_for_assignment("total")
            .expect("Missing assignment rule record");
        assert_eq!(rule.component_typecode(), ComponentTypeCode::AssignmentRule);
        assert!(!rule.contains_parameters_with_undeclared_units());

        // `total` is also a parameter, which takes precedence for variables
        let variable = model.get_formula_units_data_for_variable("total").unwrap();
        assert_eq!(variable.component_typecode(), ComponentTypeCode::Parameter);
    }

    #[test]
    fn test_enzyme_model_event() {
        let model = load("tests/data/enzyme_l3.json");

        let delay = model
            .get_formula_units_data("feed", ComponentTypeCode::Event)
            .expect("Missing delay record");
        assert_eq!(
            delay.event_time_unit_definition().unwrap().to_string(),
            "second"
        );
        assert!(delay.can_ignore_undeclared_units());

        let assignment = model
            .get_formula_units_data("Sfeed", ComponentTypeCode::EventAssignment)
            .expect("Missing event assignment record");
        assert!(assignment
            .unit_definition()
            .unwrap()
            .is_equivalent(&unit!([_ mole] / [_ litre])));
        assert!(assignment.contains_parameters_with_undeclared_units());
        assert!(assignment.can_ignore_undeclared_units());
    }

    #[test]
    fn test_parameter_without_units() {
        let model = load("tests/data/enzyme_l3.json");

        let record = model.get_formula_units_data_for_variable("h").unwrap();
        assert!(record.unit_definition().unwrap().is_empty());
        assert!(record.contains_parameters_with_undeclared_units());
        assert!(!record.can_ignore_undeclared_units());
        assert!(!record.has_known_units());
    }

    #[test]
    fn test_legacy_model_overrides() {
        let model = load("tests/data/legacy_l2.json");

        assert_eq!(model.get_num_formula_units_data(), 19);
        assert_eq!(
            units(&model, "substance", ComponentTypeCode::Model).to_string(),
            "(10^-3 mole)"
        );
        assert_eq!(
            units(&model, "time", ComponentTypeCode::Model).to_string(),
            "(60 second)"
        );
        assert_eq!(
            units(&model, "cyto", ComponentTypeCode::Compartment).to_string(),
            "litre"
        );
        assert!(model
            .get_formula_units_data("Asubs", ComponentTypeCode::Species)
            .is_none());

        let extent = model
            .get_formula_units_data("extent", ComponentTypeCode::Model)
            .unwrap();
        assert!(extent.unit_definition().unwrap().is_empty());
        assert!(!extent.can_ignore_undeclared_units());
    }

    #[test]
    fn test_legacy_model_kinetic_law_matches_substance_per_time() {
        let model = load("tests/data/legacy_l2.json");

        let rate = units(&model, "conv", ComponentTypeCode::KineticLaw);
        let expected = units(&model, SUBSTANCE_PER_TIME, ComponentTypeCode::Unknown);
        assert!(rate.is_identical(&expected), "{rate} != {expected}");

        let stoichiometry = model
            .get_formula_units_data("A", ComponentTypeCode::StoichiometryMath)
            .unwrap();
        assert!(stoichiometry.unit_definition().unwrap().is_dimensionless());
        assert_eq!(
            stoichiometry.per_time_unit_definition().unwrap().to_string(),
            "(60 second)^-1"
        );
    }

    #[test]
    fn test_legacy_model_rules_and_events() {
        let model = load("tests/data/legacy_l2.json");
        let registry = model.formula_units_registry();

        assert_eq!(registry.algebraic_rule_id(0), Some("alg_rule_0"));
        assert_eq!(
            units(&model, "alg_rule_0", ComponentTypeCode::AlgebraicRule).to_string(),
            "(10^-3 mole) * litre^-1"
        );
        assert!(units(&model, "v", ComponentTypeCode::RateRule)
            .is_identical(&units(&model, SUBSTANCE_PER_TIME, ComponentTypeCode::Unknown)));

        assert_eq!(registry.event_id(0), Some("event_0"));
        let delay = model
            .get_formula_units_data("event_0", ComponentTypeCode::Event)
            .unwrap();
        assert!(delay.unit_definition().unwrap().is_dimensionless());
        assert_eq!(
            delay.event_time_unit_definition().unwrap().to_string(),
            "second"
        );
        assert!(model
            .get_formula_units_data("Aevent_0", ComponentTypeCode::EventAssignment)
            .is_some());
    }

    #[test]
    fn test_repopulation_after_model_edit() {
        let mut model = load("tests/data/enzyme_l3.json");
        let before = model.formula_units_data().to_vec();

        model.time_units = Some("per_second".to_string());
        assert_eq!(model.formula_units_data(), before.as_slice());

        model.populate_list_formula_units_data();
        assert_ne!(model.formula_units_data(), before.as_slice());
        assert_eq!(
            units(&model, "time", ComponentTypeCode::Model).to_string(),
            "second^-1"
        );
    }
}
