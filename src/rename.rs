//! Renaming of dotted properties.
//!
//! A rename runs as a fixed sequence of passes, each taking the previous
//! result as input:
//!
//! 1. planning finds every entry whose dotted path equals the old name and
//!    the ancestor at which old and new names diverge (the split point);
//! 2. the remainder of the new name is appended, with a copy of the value,
//!    to the mapping holding the split point;
//! 3. the old entry is removed, together with any mappings that end up
//!    empty;
//! 4. optionally, single-entry mapping chains are folded into dotted keys.

use crate::coalesce::{Coalesce, CoalesceProperties};
use crate::delete::DeleteProperty;
use crate::error::YamlResult;
use crate::insert::InsertSubproperty;
use crate::property::{property_path, strip_segment, PropertyName};
use crate::visitor::{walk_entry, Cursor, YamlAccept, YamlVisitor};
use crate::yaml::{Block, Document, Entry, NodeId, Yaml};
use log::{debug, trace, warn};
use std::fmt;
use std::sync::Arc;

/// A rewrite applied to each document of a stream.
pub trait DocumentTransform {
    /// Rewrite one document.
    fn transform(&self, document: &Document) -> Document;

    /// Rewrite every document of a stream.
    fn transform_yaml(&self, yaml: &Yaml) -> Yaml {
        let documents = yaml
            .documents()
            .iter()
            .map(|document| self.transform(document))
            .collect();
        yaml.with_documents(documents)
    }
}

/// Settings for a [`RenameProperty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameOptions {
    /// Fold single-entry mapping chains into dotted keys after the move.
    pub coalesce: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self { coalesce: true }
    }
}

impl RenameOptions {
    /// The default options: coalescing enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable coalescing.
    pub fn coalesce(mut self, coalesce: bool) -> Self {
        self.coalesce = coalesce;
        self
    }
}

/// Build a rename of `old_property_key` to `new_property_key`.
///
/// Names are used as given. Use [`try_rename_property`] to reject
/// malformed names up front.
pub fn rename_property(
    old_property_key: impl Into<String>,
    new_property_key: impl Into<String>,
    coalesce: bool,
) -> RenameProperty {
    RenameProperty::new(old_property_key, new_property_key)
        .with_options(RenameOptions::new().coalesce(coalesce))
}

/// Like [`rename_property`], but validates both names first.
pub fn try_rename_property(
    old_property_key: &str,
    new_property_key: &str,
    coalesce: bool,
) -> YamlResult<RenameProperty> {
    let old = PropertyName::parse(old_property_key)?;
    let new = PropertyName::parse(new_property_key)?;
    Ok(rename_property(old.as_str(), new.as_str(), coalesce))
}

/// Moves the value of one dotted property to another name.
///
/// ```rust
/// use std::str::FromStr;
/// use yaml_property_edit::{rename_property, DocumentTransform, Yaml};
///
/// let yaml = Yaml::from_str("a:\n  b:\n    c: v\n  d: w\n").unwrap();
/// let renamed = rename_property("a.b.c", "a.e.f", false).transform_yaml(&yaml);
/// assert_eq!(renamed.to_string(), "a:\n  d: w\n  e.f: v\n");
/// ```
pub struct RenameProperty {
    old_property_key: String,
    new_property_key: String,
    options: RenameOptions,
    coalescer: Box<dyn Coalesce + Send + Sync>,
}

impl RenameProperty {
    /// Rename with the default options.
    pub fn new(old_property_key: impl Into<String>, new_property_key: impl Into<String>) -> Self {
        Self {
            old_property_key: old_property_key.into(),
            new_property_key: new_property_key.into(),
            options: RenameOptions::default(),
            coalescer: Box::new(CoalesceProperties),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: RenameOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the pass run when coalescing is enabled.
    pub fn with_coalescer(mut self, coalescer: impl Coalesce + Send + Sync + 'static) -> Self {
        self.coalescer = Box::new(coalescer);
        self
    }

    /// The property being renamed.
    pub fn old_property_key(&self) -> &str {
        &self.old_property_key
    }

    /// The name it is renamed to.
    pub fn new_property_key(&self) -> &str {
        &self.new_property_key
    }

    /// The options in effect.
    pub fn options(&self) -> RenameOptions {
        self.options
    }

    /// Find every entry to move, in post-order.
    pub fn plan(&self, document: &Document) -> Vec<RenamePlan> {
        let mut planner = Planner {
            old_property_key: &self.old_property_key,
            new_property_key: &self.new_property_key,
            plans: Vec::new(),
        };
        document.accept(&mut planner);
        planner.plans
    }
}

impl fmt::Debug for RenameProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameProperty")
            .field("old_property_key", &self.old_property_key)
            .field("new_property_key", &self.new_property_key)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DocumentTransform for RenameProperty {
    fn transform(&self, document: &Document) -> Document {
        if self.old_property_key == self.new_property_key {
            debug!("'{}' is renamed to itself; nothing to do", self.old_property_key);
            return document.clone();
        }

        let plans = self.plan(document);
        if plans.is_empty() {
            return document.clone();
        }

        let mut result = document.clone();
        for plan in &plans {
            debug!(
                "moving '{}' to '{}' below entry {}",
                self.old_property_key, plan.subproperty, plan.split_point
            );
            result = InsertSubproperty::new(plan.split_point, &plan.subproperty, &plan.value)
                .apply(&result);
            result = DeleteProperty::new(plan.property).apply(&result);
        }
        if self.options.coalesce {
            debug!("coalescing properties");
            result = self.coalescer.coalesce(&result);
        }
        result
    }
}

/// One scheduled move: where to insert, under which name, what, and which
/// entry to remove afterwards.
#[derive(Debug, Clone)]
pub struct RenamePlan {
    split_point: NodeId,
    subproperty: String,
    value: Block,
    property: NodeId,
}

impl RenamePlan {
    /// The entry whose mapping receives the new entry.
    pub fn split_point(&self) -> NodeId {
        self.split_point
    }

    /// The key of the new entry: what is left of the new name below the
    /// common ancestors.
    pub fn subproperty(&self) -> &str {
        &self.subproperty
    }

    /// The value being moved.
    pub fn value(&self) -> &Block {
        &self.value
    }

    /// The entry that is removed.
    pub fn property(&self) -> NodeId {
        self.property
    }
}

enum SplitPoint<'a> {
    /// The new name leaves the old path at this entry.
    At {
        entry: &'a Arc<Entry>,
        subproperty: String,
    },
    /// The new name is an ancestor of the old one.
    Ancestor,
    /// The new name extends the old one.
    Exhausted,
}

/// Walk the old path from the root, consuming matching leading segments of
/// `new_property_key`, until a key no longer matches.
fn split_point<'a>(entries: &[&'a Arc<Entry>], new_property_key: &str) -> SplitPoint<'a> {
    let mut remaining = new_property_key;
    for (depth, entry) in entries.iter().copied().enumerate() {
        let key = entry.key().value();
        match strip_segment(remaining, key) {
            None => {
                trace!("'{}' diverges at key '{}'", new_property_key, key);
                return SplitPoint::At {
                    entry,
                    subproperty: remaining.to_string(),
                };
            }
            Some("") if depth + 1 < entries.len() => return SplitPoint::Ancestor,
            Some(rest) => remaining = rest,
        }
    }
    SplitPoint::Exhausted
}

struct Planner<'r> {
    old_property_key: &'r str,
    new_property_key: &'r str,
    plans: Vec<RenamePlan>,
}

impl YamlVisitor for Planner<'_> {
    fn visit_entry<'a>(&mut self, entry: &'a Arc<Entry>, cursor: &mut Cursor<'a>) -> Arc<Entry> {
        let visited = walk_entry(self, entry, cursor);

        let entries = cursor.property_entries();
        if property_path(&entries) != self.old_property_key {
            return visited;
        }
        debug!("found '{}' at entry {}", self.old_property_key, entry.id());

        match split_point(&entries, self.new_property_key) {
            SplitPoint::At { entry: split, subproperty } => self.plans.push(RenamePlan {
                split_point: split.id(),
                subproperty,
                value: entry.value().clone(),
                property: entry.id(),
            }),
            SplitPoint::Ancestor => warn!(
                "not renaming '{}': '{}' already exists as one of its parents",
                self.old_property_key, self.new_property_key
            ),
            SplitPoint::Exhausted => debug!(
                "not renaming '{}': '{}' lies below it",
                self.old_property_key, self.new_property_key
            ),
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn parse(text: &str) -> Document {
        Yaml::from_str(text).unwrap().document().unwrap().clone()
    }

    fn rename(text: &str, old: &str, new: &str, coalesce: bool) -> String {
        rename_property(old, new, coalesce)
            .transform(&parse(text))
            .to_string()
    }

    #[test]
    fn test_plan_split_point() {
        let document = parse("a:\n  b:\n    c: v\n  d: w\n");
        let plans = rename_property("a.b.c", "a.e.f", false).plan(&document);
        assert_eq!(plans.len(), 1);
        let plan = &plans[0];
        let a = &document.as_mapping().unwrap().entries()[0];
        let b = &a.value().as_mapping().unwrap().entries()[0];
        let c = &b.value().as_mapping().unwrap().entries()[0];
        assert_eq!(plan.split_point(), b.id());
        assert_eq!(plan.subproperty(), "e.f");
        assert_eq!(plan.property(), c.id());
        assert!(plan.value().ptr_eq(c.value()));
    }

    #[test]
    fn test_plan_no_shared_prefix() {
        let document = parse("a:\n  b:\n    c: v\n");
        let plans = rename_property("a.b.c", "x.y.z", false).plan(&document);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].split_point(), document.as_mapping().unwrap().entries()[0].id());
        assert_eq!(plans[0].subproperty(), "x.y.z");
    }

    #[test]
    fn test_plan_matches_flat_keys() {
        let document = parse("a.b: 1\n");
        let plans = rename_property("a.b", "a.c", false).plan(&document);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].subproperty(), "a.c");
    }

    #[test]
    fn test_segment_prefix_is_not_a_match() {
        // 'ab' must not be treated as sharing the segment 'a'
        assert_eq!(rename("a:\n  b: 1\n", "a.b", "ab.c", false), "ab.c: 1\n");
    }

    #[test]
    fn test_rename_to_ancestor_is_skipped() {
        let text = "a:\n  b:\n    c: 1\n";
        assert_eq!(rename(text, "a.b.c", "a.b", false), text);
        assert_eq!(rename(text, "a.b.c", "a", false), text);
    }

    #[test]
    fn test_rename_to_descendant_is_skipped() {
        let text = "a:\n  b: 1\n";
        assert_eq!(rename(text, "a.b", "a.b.c", false), text);
    }

    #[test]
    fn test_identical_names_are_noop() {
        let document = parse("a:\n  b: 1\n");
        let result = rename_property("a.b", "a.b", true).transform(&document);
        assert!(result.block().ptr_eq(document.block()));
    }

    #[test]
    fn test_rename_leaf_in_place() {
        assert_eq!(rename("a:\n  b:\n    c: v\n", "a.b.c", "a.b.d", false), "a:\n  b:\n    d: v\n");
    }

    #[test]
    fn test_coalesce_after_move() {
        assert_eq!(rename("a:\n  b:\n    c: v\n", "a.b.c", "x.y.z", true), "x.y.z: v\n");
        // 'new' is not on the old path, so the moved entry lands at the root
        // and both single-entry chains fold.
        assert_eq!(
            rename("old:\n  k: 1\nnew:\n  other: 2\n", "old.k", "new.inner.k", true),
            "new.other: 2\nnew.inner.k: 1\n"
        );
    }

    #[test]
    fn test_custom_coalescer() {
        let document = parse("a:\n  b: 1\n");
        let result = rename_property("a.b", "c", true)
            .with_coalescer(|document: &Document| document.with_end("\n# renamed\n"))
            .transform(&document);
        assert_eq!(result.to_string(), "c: 1\n# renamed\n");
    }

    #[test]
    fn test_options() {
        assert!(RenameOptions::default().coalesce);
        let rename = RenameProperty::new("a", "b").with_options(RenameOptions::new().coalesce(false));
        assert!(!rename.options().coalesce);
        assert_eq!(rename.old_property_key(), "a");
        assert_eq!(rename.new_property_key(), "b");
    }

    #[test]
    fn test_try_rename_property_validates() {
        assert!(try_rename_property("a.b", "c", true).is_ok());
        assert!(try_rename_property("a..b", "c", true).is_err());
        assert!(try_rename_property("a", "", true).is_err());
    }
}
