//! Interned gameplay tags.
//!
//! A [`Tag`] is an opaque identifier ("Element.Fire", "Status.Oil") with no
//! structure beyond identity. Names are interned once through a
//! [`TagRegistry`], so every membership test is an integer compare.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use lasso::{Spur, ThreadedRodeo};

use crate::data::normalize_id;

/// Name of the tag attached to every effect the reaction engine applies.
pub const REACTION_TAG_NAME: &str = "Effect.Reaction";

/// Opaque interned tag identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(Spur);

/// Interns tag names into [`Tag`] identifiers.
///
/// Cloning the registry is cheap and every clone shares the same interner,
/// so rule sets and worlds built from clones agree on tag identity.
#[derive(Clone)]
pub struct TagRegistry {
    rodeo: Arc<ThreadedRodeo>,
    reaction: Tag,
}

impl TagRegistry {
    /// Create a registry with the reaction marker tag pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let rodeo = Arc::new(ThreadedRodeo::new());
        let reaction = Tag(rodeo.get_or_intern_static(REACTION_TAG_NAME));
        Self { rodeo, reaction }
    }

    /// Intern a tag name, returning the existing tag if already known.
    pub fn intern(&self, name: &str) -> Tag {
        Tag(self.rodeo.get_or_intern(name))
    }

    /// Intern an optional name. Blank names count as unset.
    pub fn intern_optional(&self, name: Option<&str>) -> Option<Tag> {
        name.and_then(normalize_id).map(|n| self.intern(n))
    }

    /// Look up a tag without interning it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Tag> {
        self.rodeo.get(name).map(Tag)
    }

    /// Resolve a tag back to its name.
    #[must_use]
    pub fn name(&self, tag: Tag) -> &str {
        self.rodeo.resolve(&tag.0)
    }

    /// The marker tag carried by effects the reaction engine applies.
    #[must_use]
    pub const fn reaction_tag(&self) -> Tag {
        self.reaction
    }

    /// Build a tag set from names, interning as needed.
    pub fn tag_set<'a, I>(&self, names: I) -> TagSet
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().map(|n| self.intern(n)).collect()
    }

    /// Sorted tag names, for stable display output.
    #[must_use]
    pub fn sorted_names(&self, tags: &TagSet) -> Vec<String> {
        let mut names: Vec<String> = tags.iter().map(|t| self.name(*t).to_string()).collect();
        names.sort_unstable();
        names
    }

    /// Number of distinct interned tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Check if no tags are interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagRegistry")
            .field("tags", &self.rodeo.len())
            .finish()
    }
}

/// A set of tags supporting membership tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(HashSet<Tag>);

impl TagSet {
    /// Create an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    /// Check whether the set holds `tag`.
    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    /// Insert a tag, returning true if it was not present.
    pub fn insert(&mut self, tag: Tag) -> bool {
        self.0.insert(tag)
    }

    /// Iterate over the tags in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    /// Number of tags in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Tag> for TagSet {
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// Tags owned by one entity.
///
/// Each grant is counted: a tag granted by two sources (say, two pieces of
/// equipment) stays owned until both grants are removed.
#[derive(Debug, Clone, Default)]
pub struct TagContainer {
    counts: HashMap<Tag, u32>,
}

impl TagContainer {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one grant of `tag`.
    pub fn add(&mut self, tag: Tag) {
        *self.counts.entry(tag).or_insert(0) += 1;
    }

    /// Add one grant of each tag.
    pub fn add_all<'a, I>(&mut self, tags: I)
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        for tag in tags {
            self.add(*tag);
        }
    }

    /// Remove one grant of `tag`. Returns false if the tag was not owned.
    pub fn remove(&mut self, tag: Tag) -> bool {
        match self.counts.get_mut(&tag) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(&tag);
                true
            }
            None => false,
        }
    }

    /// Remove one grant of each tag.
    pub fn remove_all<'a, I>(&mut self, tags: I)
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        for tag in tags {
            self.remove(*tag);
        }
    }

    /// Check whether `tag` is currently owned.
    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.counts.contains_key(&tag)
    }

    /// Number of outstanding grants of `tag`.
    #[must_use]
    pub fn count(&self, tag: Tag) -> u32 {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    /// Snapshot of the owned tags.
    #[must_use]
    pub fn to_set(&self) -> TagSet {
        self.counts.keys().copied().collect()
    }
}
