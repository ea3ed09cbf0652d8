#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str::FromStr;
use yaml_property_edit::{rename_property, DocumentTransform, Yaml};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 100_000 {
        return;
    }
    // First line: "old new", rest: the document.
    let Some((names, body)) = text.split_once('\n') else {
        return;
    };
    let Some((old, new)) = names.split_once(' ') else {
        return;
    };
    let Ok(yaml) = Yaml::from_str(body) else {
        return;
    };

    for coalesce in [false, true] {
        let renamed = rename_property(old, new, coalesce).transform_yaml(&yaml);
        let _ = renamed.to_string();
    }
    assert_eq!(yaml.to_string(), body);
});
