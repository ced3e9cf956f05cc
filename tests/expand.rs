use pretty_assertions::assert_eq;
use stylekit::macros::CompositionOrder;
use stylekit::{Config, Expander, Severity};

const THEME: &str = r#"import SwiftUI

extension EnvironmentValues {
    @EnvironmentValue var cardPadding: CGFloat = 12
}

extension FocusedValues {
    @FocusValue var selectedCard: Card.ID?
}

let brand = #color("1E90FF")
"#;

#[test]
fn test_expands_whole_file() {
    let expansion = Expander::default().expand(THEME).unwrap();
    assert!(expansion.diagnostics.is_empty(), "{:?}", expansion.diagnostics);
    assert_eq!(
        expansion.source,
        r#"import SwiftUI

extension EnvironmentValues {
    var cardPadding: CGFloat {
        get {
            self[EnvironmentKey_cardPadding.self]
        }
        set {
            self[EnvironmentKey_cardPadding.self] = newValue
        }
    }

    struct EnvironmentKey_cardPadding: EnvironmentKey {
        static let defaultValue: CGFloat = 12
    }
}

extension FocusedValues {
    var selectedCard: Card.ID? {
        get {
            self[FocusedValueKey_selectedCard.self]
        }
        set {
            self[FocusedValueKey_selectedCard.self] = newValue
        }
    }

    struct FocusedValueKey_selectedCard: FocusedValueKey {
        typealias Value = Card.ID
    }
}

let brand = Color(red: 30 / 255, green: 144 / 255, blue: 255 / 255, opacity: 255 / 255)
"#
    );
}

#[test]
fn test_expansion_is_stable() {
    let expander = Expander::default();
    let once = expander.expand(THEME).unwrap().source;
    let twice = expander.expand(&once).unwrap();
    assert_eq!(twice.source, once);
    assert!(twice.diagnostics.is_empty());
}

#[test]
fn test_let_property_reports_once_per_role() {
    let expansion = Expander::default()
        .expand("extension EnvironmentValues {\n    @EnvironmentValue let x = 5\n}\n")
        .unwrap();
    assert_eq!(expansion.diagnostics.len(), 2);
    for diagnostic in &expansion.diagnostics {
        assert_eq!(diagnostic.id, "invalidPropertyType");
        assert_eq!(diagnostic.location.line, 2);
        assert_eq!(diagnostic.location.column, 5);
    }
}

#[test]
fn test_non_optional_focus_value_suggests_optional() {
    let source = "@FocusValue var x: Bool\n";
    let expander = Expander::default();
    let expansion = expander.expand(source).unwrap();
    let diagnostic = &expansion.diagnostics[0];
    assert_eq!(diagnostic.id, "invalidOptionalTypeAnnotation");
    assert_eq!(diagnostic.fix_its[0].edits[0].replacement, "Bool?");
    assert_eq!(expander.fix(source).unwrap(), "@FocusValue var x: Bool?\n");
}

#[test]
fn test_stylable_without_view_still_generates() {
    let source = "@Stylable\nstruct Badge {\n}\n";
    let expansion = Expander::default().expand(source).unwrap();

    let notes: Vec<_> = expansion
        .diagnostics
        .iter()
        .filter(|d| d.id == "missingViewConformance")
        .collect();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|d| d.severity == Severity::Note));
    assert!(!expansion.has_errors());

    let output = &expansion.source;
    assert!(output.starts_with("struct Badge {\n}\n\nprotocol BadgeStyle: ViewStyle"));
    assert!(output.contains("struct AggregatedStyle<Style: BadgeStyle>: BadgeStyle"));
    assert!(output.contains("struct StyleViewModifier<Style: BadgeStyle>: ViewModifier"));
    assert!(output.contains("@Environment(\\.badgeStyle) private var currentStyle"));
}

#[test]
fn test_stylable_invalid_access_level_emits_nothing() {
    let source = "@Stylable(accessLevel: .invalidToken)\nstruct Badge: View {\n}\n";
    let expansion = Expander::default().expand(source).unwrap();

    let ids: Vec<_> = expansion.diagnostics.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["invalidAccessModifier", "invalidAccessModifier"]);
    assert_eq!(
        expansion.diagnostics[0].message,
        "The access level 'invalidToken' is invalid."
    );
    assert_eq!(expansion.source, "struct Badge: View {\n}\n");
}

#[test]
fn test_composition_order_from_config() {
    let source = "@Stylable\nstruct Badge: View {\n}\n";
    let style_first = Expander::default().expand(source).unwrap().source;
    assert!(style_first
        .contains("configuration.withContent(style.makeBody(configuration: configuration))"));

    let config = Config::from_toml_str("[stylable]\ncomposition = \"current-innermost\"\n").unwrap();
    assert_eq!(config.stylable.composition, CompositionOrder::CurrentInnermost);
    let current_first = Expander::from_config(&config).expand(source).unwrap().source;
    assert!(current_first
        .contains("configuration.withContent(currentStyle.makeBody(configuration: configuration))"));
}
