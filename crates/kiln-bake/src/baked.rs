use std::collections::BTreeMap;

use crate::job::BakeKey;
use crate::pass::PassType;

/// Index from `(material, pass)` to the name of the image holding that bake.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BakedImages {
    entries: BTreeMap<BakeKey, String>,
}

impl BakedImages {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the image for `key`, replacing any previous entry.
    pub fn insert(&mut self, key: BakeKey, image: impl Into<String>) {
        self.entries.insert(key, image.into());
    }

    /// Image baked for `material` in `pass`.
    pub fn get(&self, material: &str, pass: PassType) -> Option<&str> {
        self.entries
            .get(&BakeKey::new(material, pass))
            .map(String::as_str)
    }

    /// First present image among `candidates`, tried in order.
    pub fn first_of(&self, material: &str, candidates: &[PassType]) -> Option<(PassType, &str)> {
        candidates
            .iter()
            .find_map(|&pass| self.get(material, pass).map(|image| (pass, image)))
    }

    /// Returns `true` if any pass of `material` has an image.
    pub fn has_material(&self, material: &str) -> bool {
        self.entries.keys().any(|key| key.material == material)
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&BakeKey, &str)> {
        self.entries.iter().map(|(key, image)| (key, image.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds every entry of `other`, overwriting duplicates.
    pub fn extend(&mut self, other: BakedImages) {
        self.entries.extend(other.entries);
    }
}

impl FromIterator<(BakeKey, String)> for BakedImages {
    fn from_iter<I: IntoIterator<Item = (BakeKey, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_of_follows_candidate_order() {
        let mut baked = BakedImages::new();
        baked.insert(BakeKey::new("KK Face", PassType::Unlit), "KK Face dark.png");
        baked.insert(BakeKey::new("KK Face", PassType::Normal), "KK Face normal.png");

        assert_eq!(
            baked.first_of("KK Face", &[PassType::Lit, PassType::Unlit]),
            Some((PassType::Unlit, "KK Face dark.png"))
        );
        assert_eq!(baked.first_of("KK Body", &[PassType::Lit, PassType::Unlit]), None);
        assert!(baked.has_material("KK Face"));
        assert!(!baked.has_material("KK Face light"));
    }

    #[test]
    fn test_keys_do_not_collide_on_tokens() {
        // A material whose name contains a pass token keeps distinct keys.
        let mut baked = BakedImages::new();
        baked.insert(BakeKey::new("KK light", PassType::Lit), "a.png");
        baked.insert(BakeKey::new("KK dark", PassType::Lit), "b.png");
        assert_eq!(baked.get("KK light", PassType::Lit), Some("a.png"));
        assert_eq!(baked.get("KK light", PassType::Unlit), None);
        assert_eq!(baked.len(), 2);
    }
}
