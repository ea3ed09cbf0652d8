//! End-to-end renames on parsed text.

use std::str::FromStr;
use yaml_property_edit::{
    rename_property, try_rename_property, Document, DocumentTransform, RenameProperty, Yaml,
    YamlError,
};

fn rename(text: &str, old: &str, new: &str, coalesce: bool) -> String {
    let yaml = Yaml::from_str(text).unwrap();
    rename_property(old, new, coalesce)
        .transform_yaml(&yaml)
        .to_string()
}

#[test]
fn test_no_match_leaves_text_unchanged() {
    let text = "# settings\na:\n  b: 1\n\n# trailing group\nc: 'x'  # why\nlist:\n- one\n- two\n";
    assert_eq!(rename(text, "a.x", "y", true), text);
    assert_eq!(rename(text, "list.one", "y", false), text);
    assert_eq!(rename(text, "c.d", "y", true), text);
}

#[test]
fn test_full_match_without_shared_prefix() {
    assert_eq!(rename("a:\n  b:\n    c: v\n", "a.b.c", "x.y.z", false), "x.y.z: v\n");
    assert_eq!(
        rename("a:\n  b:\n    c: v\nkeep: 1\n", "a.b.c", "x.y.z", false),
        "keep: 1\nx.y.z: v\n"
    );
}

#[test]
fn test_shared_prefix_is_preserved() {
    let text = "a:\n  b:\n    c: v\n  d: w\n";
    assert_eq!(rename(text, "a.b.c", "a.e.f", false), "a:\n  d: w\n  e.f: v\n");
    assert_eq!(rename(text, "a.b.c", "a.e.f", true), "a:\n  d: w\n  e.f: v\n");
}

#[test]
fn test_singleton_collapse_leaves_no_blank_lines() {
    assert_eq!(rename("a:\n  b:\n    c: v\n", "a.b.c", "z", false), "z: v\n");
    assert_eq!(rename("a:\n  b: 1\n\n  c: 2\n", "a.b", "x", false), "a:\n  c: 2\nx: 1\n");
}

#[test]
fn test_surviving_siblings_keep_their_layout() {
    assert_eq!(
        rename("a:\n  x: 1\n  b:\n    c: v\n", "a.b.c", "a.z", false),
        "a:\n  x: 1\n  z: v\n"
    );
}

#[test]
fn test_identical_rename_is_noop() {
    let text = "a:\n  b: 1\n";
    assert_eq!(rename(text, "a.b", "a.b", true), text);
    assert_eq!(rename(text, "a.b", "a.b", false), text);
}

#[test]
fn test_value_subtree_is_preserved() {
    let text = "tools:\n  build:\n    steps:\n    - compile\n    - test\n";
    let yaml = Yaml::from_str(text).unwrap();
    let renamed = rename_property("tools.build.steps", "tools.pipeline", false).transform_yaml(&yaml);
    assert_eq!(
        renamed.to_string(),
        "tools:\n  pipeline:\n    - compile\n    - test\n"
    );

    let steps = yaml.document().unwrap().as_mapping().unwrap().entries()[0]
        .value()
        .as_mapping()
        .unwrap()
        .entries()[0]
        .value()
        .as_mapping()
        .unwrap()
        .entries()[0]
        .value()
        .clone();
    let pipeline = renamed.document().unwrap().as_mapping().unwrap().entries()[0]
        .value()
        .as_mapping()
        .unwrap()
        .entries()[0]
        .value()
        .clone();
    assert!(pipeline.content_eq(&steps));
    assert_ne!(pipeline.id(), steps.id());

    assert_eq!(
        rename(text, "tools.build.steps", "tools.pipeline", true),
        "tools.pipeline:\n    - compile\n    - test\n"
    );
}

#[test]
fn test_block_scalar_value_moves_verbatim() {
    assert_eq!(
        rename("a:\n  b: |\n    line1\n    line2\nc: 1\n", "a.b", "d", false),
        "c: 1\nd: |\n    line1\n    line2\n"
    );
}

#[test]
fn test_mapping_valued_property_moves() {
    assert_eq!(
        rename("a:\n  b:\n    x: 1\n    y: 2\nother: 1\n", "a.b", "c", false),
        "other: 1\nc:\n    x: 1\n    y: 2\n"
    );
}

#[test]
fn test_new_name_below_the_split_point() {
    assert_eq!(rename("a:\n  b: 1\n", "a.b", "a.c.d", false), "a:\n  c.d: 1\n");
}

#[test]
fn test_coalesce_folds_remaining_chains() {
    assert_eq!(rename("a:\n  b: 1\n\n  c: 2\n", "a.b", "x", true), "a.c: 2\nx: 1\n");
    assert_eq!(rename("a:\n  b:\n    c: v\n", "a.b.c", "x.y.z", true), "x.y.z: v\n");
}

#[test]
fn test_comments_stay_with_their_mapping() {
    let text = "# config\nserver:\n  # the port\n  port: 80\n  host: localhost\n";
    assert_eq!(
        rename(text, "server.port", "server.http.port", false),
        "# config\nserver:\n  # the port\n  host: localhost\n  http.port: 80\n"
    );
}

#[test]
fn test_comment_above_removed_entry_goes_with_it() {
    assert_eq!(
        rename("a: 1\n# about b\nb: 2\nc: 3\n", "b", "d", false),
        "a: 1\nc: 3\nd: 2\n"
    );
}

#[test]
fn test_flat_keys_are_matched() {
    assert_eq!(rename("a.b: 1\nc: 2\n", "a.b", "a.c", false), "c: 2\na.c: 1\n");
}

#[test]
fn test_every_match_is_renamed() {
    assert_eq!(
        rename("a.b: 1\na:\n  b: 2\n", "a.b", "a.c", false),
        "a:\n  c: 2\na.c: 1\n"
    );
}

#[test]
fn test_entries_inside_sequences() {
    assert_eq!(
        rename("items:\n- name: x\n  size: 1\n", "items.name", "items.title", false),
        "items:\n- size: 1\n  title: x\n"
    );
}

#[test]
fn test_quoted_keys_and_spacing() {
    assert_eq!(rename("'a':\n  b: 1\n", "a.b", "a.c", false), "'a':\n  c: 1\n");
    assert_eq!(rename("a :\n  b : 1\n", "a.b", "a.c", false), "a :\n  c : 1\n");
}

#[test]
fn test_every_document_is_rewritten() {
    assert_eq!(
        rename("---\na:\n  b: 1\n---\na:\n  b: 2\n  c: 3\n", "a.b", "a.x", false),
        "---\na:\n  x: 1\n---\na:\n  c: 3\n  x: 2\n"
    );
}

#[test]
fn test_explicit_document_root() {
    assert_eq!(
        rename("---\na:\n  b: 1\nc: 2\n", "a.b", "d", false),
        "---\nc: 2\nd: 1\n"
    );
}

#[test]
fn test_renames_chain() {
    let yaml = Yaml::from_str("a:\n  b: 1\n  c: 2\n").unwrap();
    let first = rename_property("a.b", "a.x", false).transform_yaml(&yaml);
    assert_eq!(first.to_string(), "a:\n  c: 2\n  x: 1\n");
    let second = rename_property("a.c", "a.y", false).transform_yaml(&first);
    assert_eq!(second.to_string(), "a:\n  x: 1\n  y: 2\n");
}

#[test]
fn test_input_is_not_modified() {
    let text = "a:\n  b:\n    c: v\n";
    let yaml = Yaml::from_str(text).unwrap();
    let renamed = rename_property("a.b.c", "z", true).transform_yaml(&yaml);
    assert_eq!(renamed.to_string(), "z: v\n");
    assert_eq!(yaml.to_string(), text);
}

#[test]
fn test_custom_transform() {
    struct Both(RenameProperty, RenameProperty);

    impl DocumentTransform for Both {
        fn transform(&self, document: &Document) -> Document {
            self.1.transform(&self.0.transform(document))
        }
    }

    let yaml = Yaml::from_str("a: 1\nb: 2\n").unwrap();
    let both = Both(
        RenameProperty::new("a", "x.a"),
        RenameProperty::new("b", "x.b"),
    );
    assert_eq!(both.transform_yaml(&yaml).to_string(), "x.a: 1\nx.b: 2\n");
}

#[test]
fn test_invalid_names_are_rejected() {
    assert!(matches!(
        try_rename_property("a..b", "c", true),
        Err(YamlError::InvalidProperty { .. })
    ));
    assert!(matches!(
        try_rename_property("a", "", false),
        Err(YamlError::InvalidProperty { .. })
    ));
    let rename = try_rename_property("a.b", "c", false).unwrap();
    assert_eq!(rename.old_property_key(), "a.b");
    assert!(!rename.options().coalesce);
}

#[test]
fn test_names_needing_quotes_are_rejected() {
    for new in ["x: y", "x #y", "- x", "a.&b"] {
        assert!(
            matches!(
                try_rename_property("a", new, false),
                Err(YamlError::InvalidProperty { .. })
            ),
            "{:?} should be rejected",
            new
        );
    }

    let yaml = Yaml::from_str("a: 1\nb: 2\n").unwrap();
    let renamed = try_rename_property("a", "x y.jdbc-url", false)
        .unwrap()
        .transform_yaml(&yaml)
        .to_string();
    assert_eq!(renamed, "b: 2\nx y.jdbc-url: 1\n");
    assert_eq!(Yaml::from_str(&renamed).unwrap().to_string(), renamed);
}

#[test]
fn test_same_line_comment_goes_with_its_entry() {
    assert_eq!(
        rename("a:\n  b: 1  # note\n  c: 2\n", "a.b", "a.z", false),
        "a:\n  c: 2\n  z: 1\n"
    );
    assert_eq!(
        rename("a: 1  # keep\nb: 2  # drop\nc: 3\n", "b", "d", false),
        "a: 1  # keep\nc: 3\nd: 2\n"
    );
}

#[test]
fn test_crlf_line_breaks_are_kept() {
    assert_eq!(rename("a: 1\r\nb: 2\r\n", "a", "c", false), "b: 2\r\nc: 1\r\n");
    assert_eq!(
        rename("a:\r\n  b: 1\r\n  c: 2\r\n", "a.b", "a.x", false),
        "a:\r\n  c: 2\r\n  x: 1\r\n"
    );
}
