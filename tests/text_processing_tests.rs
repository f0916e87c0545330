#[cfg(test)]
mod tests {
    use shopping_list::text_processing::{parse_quantity, LineParser, ParserConfig};
    use shopping_list::units::{CanonicalUnit, UnitAliasTable};

    fn create_parser() -> LineParser {
        LineParser::with_units(UnitAliasTable::builtin())
    }

    #[test]
    fn test_mixed_number_with_unit() {
        let line = create_parser().parse_line("1 1/2 cups milk").unwrap();
        assert_eq!(line.quantity, Some(1.5));
        assert_eq!(line.unit, Some(CanonicalUnit::Cup));
        assert_eq!(line.unit_token(), "cup");
        assert_eq!(line.name, "milk");
    }

    #[test]
    fn test_unit_glued_to_quantity() {
        let line = create_parser().parse_line("250g flour").unwrap();
        assert_eq!(line.quantity, Some(250.0));
        assert_eq!(line.unit_token(), "g");
        assert_eq!(line.name, "flour");
    }

    #[test]
    fn test_name_only_line() {
        let line = create_parser().parse_line("salt").unwrap();
        assert_eq!(line.quantity, None);
        assert_eq!(line.unit, None);
        assert_eq!(line.unit_token(), "");
        assert_eq!(line.name, "salt");
    }

    #[test]
    fn test_decimal_comma() {
        let line = create_parser().parse_line("2,5 l water").unwrap();
        assert_eq!(line.quantity, Some(2.5));
        assert_eq!(line.unit_token(), "l");
        assert_eq!(line.name, "water");
    }

    #[test]
    fn test_german_units_are_canonicalized() {
        let parser = create_parser();

        let line = parser.parse_line("2 EL Olivenöl").unwrap();
        assert_eq!(line.unit, Some(CanonicalUnit::Tbsp));
        assert_eq!(line.name, "olivenöl");

        let line = parser.parse_line("1 Prise Salz").unwrap();
        assert_eq!(line.unit, Some(CanonicalUnit::Pinch));
        assert_eq!(line.unit_token(), "prise");

        let line = parser.parse_line("1 Päckchen Hefe").unwrap();
        assert_eq!(line.unit, Some(CanonicalUnit::Pck));
    }

    #[test]
    fn test_unit_word_without_following_text_is_the_name() {
        let line = create_parser().parse_line("3 cups").unwrap();
        assert_eq!(line.quantity, Some(3.0));
        assert_eq!(line.unit, None);
        assert_eq!(line.name, "cups");
    }

    #[test]
    fn test_unknown_first_word_stays_in_name() {
        let line = create_parser().parse_line("2 large eggs").unwrap();
        assert_eq!(line.quantity, Some(2.0));
        assert_eq!(line.unit, None);
        assert_eq!(line.name, "large eggs");
    }

    #[test]
    fn test_quantity_only_line_is_unparsable() {
        let parser = create_parser();
        assert!(parser.parse_line("250").is_none());
        assert!(parser.parse_line("1 1/2").is_none());
        assert!(parser.parse_line("").is_none());
        assert!(parser.parse_line(" \t ").is_none());
    }

    #[test]
    fn test_zero_denominator_keeps_whole_line_as_name() {
        let line = create_parser().parse_line("1/0 cup sugar").unwrap();
        assert_eq!(line.quantity, None);
        assert_eq!(line.unit, None);
        assert_eq!(line.name, "1/0 cup sugar");
    }

    #[test]
    fn test_negative_quantities_propagate() {
        let line = create_parser().parse_line("-2 g salt").unwrap();
        assert_eq!(line.quantity, Some(-2.0));
        assert_eq!(line.unit_token(), "g");
    }

    #[test]
    fn test_zero_quantity_is_accepted_by_the_parser() {
        let line = create_parser().parse_line("0 g sugar").unwrap();
        assert_eq!(line.quantity, Some(0.0));
        assert_eq!(line.name, "sugar");
    }

    #[test]
    fn test_raw_text_is_preserved() {
        let line = create_parser().parse_line("  200 ML Sahne ").unwrap();
        assert_eq!(line.raw, "  200 ML Sahne ");
        assert_eq!(line.unit, Some(CanonicalUnit::Ml));
        assert_eq!(line.name, "sahne");
    }

    #[test]
    fn test_parse_lines_drops_unusable_lines() {
        let text = "2 cups flour\n\n250\n1 tsp salt\npepper";
        let lines = create_parser().parse_lines(text);
        let names: Vec<&str> = lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["flour", "salt", "pepper"]);
    }

    #[test]
    fn test_long_names_are_truncated_at_word_boundary() {
        let parser = LineParser::with_config(ParserConfig {
            max_ingredient_length: 12,
        })
        .unwrap();
        let line = parser.parse_line("1 very finely chopped onion").unwrap();
        assert_eq!(line.name, "very finely");
    }

    #[test]
    fn test_parse_quantity_standalone() {
        assert_eq!(parse_quantity("1,25"), Some(1.25));
        assert_eq!(parse_quantity("1/2"), Some(0.5));
        assert_eq!(parse_quantity("abc"), None);
    }
}
