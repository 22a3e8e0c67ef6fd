//! In-memory model of the asset inventory the chargeback engine resolves
//! against.
//!
//! The engine links usage records to application accounts and chargeback
//! accounts that live in an external CMDB. All fetching happens before a run
//! starts; this crate models the fetched result — an [`AssetType`] bundles
//! one object type's attribute definitions with its asset instances — and
//! provides the typed lookups the engine needs.
//!
//! # Attribute identity
//!
//! Attribute lookup is indirect: callers supply a configured semantic
//! attribute id, which is first matched against the type's definition list
//! before being read on the instance. An id absent from the definition list
//! reads as missing, never as an error.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of an asset type's attribute-definition list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute id, unique within the asset type.
    pub id: String,

    /// Human-readable attribute name.
    pub name: String,
}

/// An attribute instance on an asset: the id plus its display values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    /// Id of the attribute definition this entry belongs to.
    pub attr_id: String,

    /// Display values. Multi-value attributes carry several.
    pub values: Vec<String>,
}

/// One asset instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Inventory identity of the asset.
    pub id: String,

    /// Attribute instances present on the asset.
    pub attributes: Vec<AttributeEntry>,
}

impl Asset {
    /// Create an asset with no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Vec::new(),
        }
    }

    /// Add a scalar attribute value.
    #[must_use]
    pub fn with_attr(self, attr_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_attrs(attr_id, [value])
    }

    /// Add a multi-value attribute.
    #[must_use]
    pub fn with_attrs<I, S>(mut self, attr_id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.push(AttributeEntry {
            attr_id: attr_id.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }
}

/// One asset type's full export: attribute definitions plus instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetType {
    /// The type's attribute-definition list.
    pub defs: Vec<AttributeDef>,

    /// The asset instances of this type.
    pub assets: Vec<Asset>,
}

impl AssetType {
    /// Create an asset type from definitions and instances.
    #[must_use]
    pub fn new(defs: Vec<AttributeDef>, assets: Vec<Asset>) -> Self {
        Self { defs, assets }
    }

    /// Whether a configured attribute id exists in the definition list.
    fn has_def(&self, attr_id: &str) -> bool {
        self.defs.iter().any(|def| def.id == attr_id)
    }

    /// First display value of an attribute on an asset.
    ///
    /// Returns `None` when the id is not in the definition list, when the
    /// asset lacks the attribute, or when the attribute has no values.
    #[must_use]
    pub fn attribute_value<'a>(&self, asset: &'a Asset, attr_id: &str) -> Option<&'a str> {
        if !self.has_def(attr_id) {
            return None;
        }
        asset
            .attributes
            .iter()
            .find(|entry| entry.attr_id == attr_id && !entry.values.is_empty())
            .map(|entry| entry.values[0].as_str())
    }

    /// All display values of an attribute on an asset.
    ///
    /// Returns an empty slice in every case `attribute_value` would return
    /// `None`.
    #[must_use]
    pub fn attribute_values<'a>(&self, asset: &'a Asset, attr_id: &str) -> &'a [String] {
        if !self.has_def(attr_id) {
            return &[];
        }
        asset
            .attributes
            .iter()
            .find(|entry| entry.attr_id == attr_id)
            .map_or(&[], |entry| entry.values.as_slice())
    }

    /// Index the instances by the display value of one key attribute.
    ///
    /// Assets whose key attribute is missing or empty are left out of the
    /// index.
    #[must_use]
    pub fn index_by(&self, key_attr_id: &str) -> AssetIndex<'_> {
        let mut by_key = BTreeMap::new();
        for asset in &self.assets {
            if let Some(key) = self.attribute_value(asset, key_attr_id) {
                if !key.is_empty() {
                    by_key.insert(key.to_string(), asset);
                }
            }
        }
        AssetIndex {
            asset_type: self,
            by_key,
        }
    }
}

/// An asset type indexed by one key attribute's display value.
#[derive(Debug)]
pub struct AssetIndex<'a> {
    asset_type: &'a AssetType,
    by_key: BTreeMap<String, &'a Asset>,
}

impl<'a> AssetIndex<'a> {
    /// Look up an asset by key value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Asset> {
        self.by_key.get(key).copied()
    }

    /// First display value of an attribute on an asset of this type.
    #[must_use]
    pub fn attribute_value(&self, asset: &'a Asset, attr_id: &str) -> Option<&'a str> {
        self.asset_type.attribute_value(asset, attr_id)
    }

    /// All display values of an attribute on an asset of this type.
    #[must_use]
    pub fn attribute_values(&self, asset: &'a Asset, attr_id: &str) -> &'a [String] {
        self.asset_type.attribute_values(asset, attr_id)
    }

    /// Number of indexed assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_type() -> AssetType {
        AssetType::new(
            vec![
                AttributeDef {
                    id: "attr-1".into(),
                    name: "Account Id".into(),
                },
                AttributeDef {
                    id: "attr-2".into(),
                    name: "Contacts".into(),
                },
            ],
            vec![
                Asset::new("asset-1")
                    .with_attr("attr-1", "acct-1")
                    .with_attrs("attr-2", ["a@example.com", "b@example.com"]),
                Asset::new("asset-2").with_attr("attr-1", ""),
                Asset::new("asset-3"),
            ],
        )
    }

    #[test]
    fn lookup_requires_a_matching_definition() {
        let assets = sample_type();
        let asset = &assets.assets[0];

        assert_eq!(assets.attribute_value(asset, "attr-1"), Some("acct-1"));
        // Present on the instance but not defined for the type.
        assert_eq!(assets.attribute_value(asset, "attr-99"), None);
        assert!(assets.attribute_values(asset, "attr-99").is_empty());
    }

    #[test]
    fn multi_value_lookup_returns_all_values() {
        let assets = sample_type();
        let values = assets.attribute_values(&assets.assets[0], "attr-2");
        assert_eq!(values, ["a@example.com", "b@example.com"]);
    }

    #[test]
    fn index_skips_assets_without_a_key() {
        let assets = sample_type();
        let index = assets.index_by("attr-1");

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("acct-1").map(|a| a.id.as_str()), Some("asset-1"));
        assert!(index.get("").is_none());
    }

    #[test]
    fn missing_attribute_reads_as_missing() {
        let assets = sample_type();
        let bare = &assets.assets[2];
        assert_eq!(assets.attribute_value(bare, "attr-1"), None);
    }
}
