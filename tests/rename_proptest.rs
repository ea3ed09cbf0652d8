//! Randomized checks over generated nested configurations.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::str::FromStr;
use yaml_property_edit::{
    rename_property, Coalesce, CoalesceProperties, DocumentTransform, MappingBuilder, Yaml,
    YamlBuilder,
};

#[derive(Debug, Clone)]
enum Node {
    Leaf(String),
    Map(BTreeMap<String, Node>),
}

fn node() -> impl Strategy<Value = Node> {
    let leaf = "[a-z]{1,5}".prop_map(Node::Leaf);
    leaf.prop_recursive(3, 24, 3, |inner| {
        prop::collection::btree_map("[a-z]{1,3}", inner, 1..4).prop_map(Node::Map)
    })
}

fn config() -> impl Strategy<Value = BTreeMap<String, Node>> {
    prop::collection::btree_map("[a-z]{1,3}", node(), 1..4)
}

fn add(builder: MappingBuilder, key: &str, node: &Node) -> MappingBuilder {
    match node {
        Node::Leaf(value) => builder.pair(key, value.as_str()),
        Node::Map(children) => builder.mapping(key, |mut nested| {
            for (key, child) in children {
                nested = add(nested, key, child);
            }
            nested
        }),
    }
}

fn render(config: &BTreeMap<String, Node>) -> String {
    let mut builder = YamlBuilder::mapping();
    for (key, node) in config {
        builder = add(builder, key, node);
    }
    builder.build().build().to_string()
}

proptest! {
    #[test]
    fn test_parse_print_is_lossless(config in config()) {
        let text = render(&config);
        let yaml = Yaml::from_str(&text).unwrap();
        prop_assert_eq!(yaml.to_string(), text);
    }

    #[test]
    fn test_missing_property_is_noop(config in config(), coalesce in any::<bool>()) {
        let text = render(&config);
        let yaml = Yaml::from_str(&text).unwrap();
        // Generated keys are at most three characters long.
        let renamed = rename_property("zzzz.q", "y", coalesce).transform_yaml(&yaml);
        prop_assert_eq!(renamed.to_string(), text);
    }

    #[test]
    fn test_rename_moves_exactly_one_property(config in config(), pick in any::<prop::sample::Index>()) {
        let text = render(&config);
        let yaml = Yaml::from_str(&text).unwrap();
        let properties = yaml.document().unwrap().properties();
        let old = pick.get(&properties).clone();

        let renamed = rename_property(old.as_str(), "zzzz", false).transform_yaml(&yaml);
        let output = renamed.to_string();

        let mut expected: Vec<String> = properties.iter().filter(|p| **p != old).cloned().collect();
        expected.push("zzzz".to_string());
        expected.sort();
        let mut actual = renamed.document().unwrap().properties();
        actual.sort();
        prop_assert_eq!(actual, expected);

        let reparsed = Yaml::from_str(&output).unwrap();
        prop_assert_eq!(reparsed.to_string(), output);
    }

    #[test]
    fn test_coalesce_keeps_properties_and_is_idempotent(config in config(), pick in any::<prop::sample::Index>()) {
        let text = render(&config);
        let yaml = Yaml::from_str(&text).unwrap();
        let properties = yaml.document().unwrap().properties();
        let old = pick.get(&properties).clone();

        let once = rename_property(old.as_str(), "zzzz", true).transform_yaml(&yaml);
        let plain = rename_property(old.as_str(), "zzzz", false).transform_yaml(&yaml);
        let mut coalesced = once.document().unwrap().properties();
        let mut uncoalesced = plain.document().unwrap().properties();
        coalesced.sort();
        uncoalesced.sort();
        prop_assert_eq!(coalesced, uncoalesced);

        let document = once.document().unwrap();
        let twice = CoalesceProperties.coalesce(document);
        prop_assert_eq!(twice.to_string(), document.to_string());
    }

    #[test]
    fn test_identical_rename_is_noop(config in config(), pick in any::<prop::sample::Index>()) {
        let text = render(&config);
        let yaml = Yaml::from_str(&text).unwrap();
        let properties = yaml.document().unwrap().properties();
        let old = pick.get(&properties).clone();
        let renamed = rename_property(old.as_str(), old.as_str(), true).transform_yaml(&yaml);
        prop_assert_eq!(renamed.to_string(), text);
    }
}
