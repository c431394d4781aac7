use crate::types::ClusterSelector;

fn bracketed_list(items: &[String]) -> String {
    format!("[{}]", items.join(" "))
}

fn pretty_label_selector(selector: &crate::types::LabelSelector) -> String {
    let mut keys: Vec<&String> = selector.match_labels.keys().collect();
    keys.sort();
    let pairs: Vec<String> = keys
        .into_iter()
        .map(|k| format!("{k}:{v}", v = selector.match_labels[k]))
        .collect();
    format!("map[{}]", pairs.join(" "))
}

/// Canonical string derived from a cluster selector, used as the
/// round-robin cursor key. Trailing absent components are dropped; an
/// entirely empty selector (or no selector at all) maps to `"default"`.
pub fn generate_selector_key(selector: Option<&ClusterSelector>) -> String {
    let Some(selector) = selector else {
        return "default".to_string();
    };

    let labels_part = selector
        .label_selector
        .as_ref()
        .filter(|s| !s.is_empty())
        .map(|s| format!("labels:{}", pretty_label_selector(s)));

    let locations_part = if selector.location_selector.is_empty() {
        None
    } else {
        Some(format!(
            "locations:{}",
            bracketed_list(&selector.location_selector)
        ))
    };

    let names_part = if selector.cluster_names.is_empty() {
        None
    } else {
        Some(format!("names:{}", bracketed_list(&selector.cluster_names)))
    };

    let mut parts = vec![labels_part, locations_part, names_part];
    while matches!(parts.last(), Some(None)) {
        parts.pop();
    }

    if parts.is_empty() {
        return "default".to_string();
    }

    parts
        .into_iter()
        .map(|p| p.unwrap_or_default())
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClusterSelector;

    #[test]
    fn nil_selector_is_default() {
        assert_eq!(generate_selector_key(None), "default");
    }

    #[test]
    fn empty_selector_is_default() {
        assert_eq!(
            generate_selector_key(Some(&ClusterSelector::default())),
            "default"
        );
    }

    #[test]
    fn locations_only_has_a_leading_pipe_and_no_trailing_one() {
        let selector = ClusterSelector {
            location_selector: vec!["us-west".to_string(), "us-east".to_string()],
            ..ClusterSelector::default()
        };
        assert_eq!(
            generate_selector_key(Some(&selector)),
            "|locations:[us-west us-east]"
        );
    }

    #[test]
    fn names_only_has_two_leading_pipes() {
        let selector = ClusterSelector {
            cluster_names: vec!["cluster-a".to_string()],
            ..ClusterSelector::default()
        };
        assert_eq!(generate_selector_key(Some(&selector)), "||names:[cluster-a]");
    }
}
