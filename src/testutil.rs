use crate::analyzer::{Analysis, analyze_source};
use crate::config::AnalysisConfig;
use crate::model::Shop;

/// Try to parse an expectation line.
///
/// Format: optional leading whitespace, then `//= `, then the item as
/// `id` or `id: Cond && Cond(param)`. Items are listed in registration order.
fn try_parse_expectation(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("//=")?;
    let rest = rest.strip_prefix(' ')?.trim_end();
    (!rest.is_empty()).then_some(rest)
}

/// Split a fixture into analyzable source and the expected item lines.
/// Expectation lines are replaced by blank lines so source line numbers
/// stay put.
pub fn parse_fixture(raw: &str) -> (String, Vec<String>) {
    let mut source = String::with_capacity(raw.len());
    let mut expected = Vec::new();
    for line in raw.lines() {
        match try_parse_expectation(line) {
            Some(item) => expected.push(item.to_string()),
            None => source.push_str(line),
        }
        source.push('\n');
    }
    (source, expected)
}

/// Render a shop's items the way fixtures spell them.
pub fn render_items(shop: &Shop) -> Vec<String> {
    shop.items
        .iter()
        .map(|item| {
            if item.conditions.is_empty() {
                return item.id.to_string();
            }
            let conditions: Vec<String> = item.conditions.iter().map(|c| c.to_string()).collect();
            format!("{}: {}", item.id, conditions.join(" && "))
        })
        .collect()
}

pub fn analyze_fixture(src: &str) -> Analysis {
    analyze_source(src, &AnalysisConfig::default())
        .unwrap_or_else(|e| panic!("fixture failed to parse: {e}"))
}

/// Assert that `shop_id` in the annotated fixture yields exactly the
/// `//=` items.
pub fn assert_shop_items(fixture: &str, shop_id: i64) {
    let (source, expected) = parse_fixture(fixture);
    let analysis = analyze_fixture(&source);
    let shop = analysis
        .model
        .get(shop_id)
        .unwrap_or_else(|| panic!("no shop {shop_id}; shops: {:?}", analysis.model.shop_ids()));
    let actual = render_items(shop);

    if actual != expected {
        let mut msg = format!("shop {shop_id} items differ.\n\nExpected:\n");
        for line in &expected {
            msg.push_str(&format!("  {line}\n"));
        }
        msg.push_str("\nActual:\n");
        for line in &actual {
            msg.push_str(&format!("  {line}\n"));
        }
        if !analysis.diagnostics.is_empty() {
            msg.push_str("\nDiagnostics:\n");
            for d in &analysis.diagnostics {
                msg.push_str(&format!("  {d}\n"));
            }
        }
        panic!("{msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expectation_lines_are_split_out() {
        let raw = "switch (type) {\n  //= 1\n  case 1: array[num++].SetDefaults(1); break;\n}\n";
        let (source, expected) = parse_fixture(raw);
        assert_eq!(expected, vec!["1"]);
        assert_eq!(source.lines().count(), 4);
        assert!(!source.contains("//="));
    }

    #[test]
    fn non_expectations_are_kept() {
        assert_eq!(try_parse_expectation("// = 1"), None);
        assert_eq!(try_parse_expectation("//=1"), None);
        assert_eq!(try_parse_expectation("//= "), None);
        assert_eq!(try_parse_expectation("   //= 5: Hardmode"), Some("5: Hardmode"));
    }

    #[test]
    fn fixture_round_trip() {
        assert_shop_items(
            "switch (type) {
                case 2:
                    //= 10
                    //= 11: Hardmode && TimeNight
                    array[num++].SetDefaults(10);
                    if (Main.hardMode && !Main.dayTime) array[num++].SetDefaults(11);
                    break;
            }",
            2,
        );
    }

    #[test]
    #[should_panic(expected = "items differ")]
    fn mismatch_panics() {
        assert_shop_items(
            "switch (type) { case 2:
                //= 10: Hardmode
                array[num++].SetDefaults(10); break; }",
            2,
        );
    }
}
