//! Ordered shopping list keyed by category.
//!
//! The planner returns the list as a JSON object; category order in that
//! object is the display order, so it is kept as a list rather than a
//! sorted map. Category names are unique.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    categories: Vec<(String, Vec<String>)>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append items under `category`, creating it at the end if new.
    pub fn extend_category(
        &mut self,
        category: impl Into<String>,
        items: impl IntoIterator<Item = String>,
    ) {
        let category = category.into();
        match self.categories.iter_mut().find(|(name, _)| *name == category) {
            Some((_, existing)) => existing.extend(items),
            None => self.categories.push((category, items.into_iter().collect())),
        }
    }

    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, items)| items.as_slice())
    }

    /// Categories in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of items across all categories.
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|(_, items)| items.len()).sum()
    }
}

impl Serialize for ShoppingList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (name, items) in &self.categories {
            map.serialize_entry(name, items)?;
        }
        map.end()
    }
}

struct ShoppingListVisitor;

impl<'de> Visitor<'de> for ShoppingListVisitor {
    type Value = ShoppingList;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of category name to item list")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut list = ShoppingList::new();
        while let Some((category, items)) = access.next_entry::<String, Vec<String>>()? {
            list.extend_category(category, items);
        }
        Ok(list)
    }
}

impl<'de> Deserialize<'de> for ShoppingList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ShoppingListVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_response_order() {
        let json = r#"{"蔬菜豆菌":["青菜 200g"],"肉蛋水产":["鸡蛋 6个"],"主食谷物":["燕麦 300g"]}"#;
        let list: ShoppingList = serde_json::from_str(json).unwrap();
        let names: Vec<_> = list.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["蔬菜豆菌", "肉蛋水产", "主食谷物"]);
        assert_eq!(serde_json::to_string(&list).unwrap(), json);
    }

    #[test]
    fn duplicate_category_merges_into_first() {
        let json = r#"{"a":["1"],"b":["2"],"a":["3"]}"#;
        let list: ShoppingList = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get("a").unwrap(), ["1".to_string(), "3".to_string()]);
        assert_eq!(list.item_count(), 3);
    }

    #[test]
    fn rejects_non_map() {
        assert!(serde_json::from_str::<ShoppingList>("[1,2]").is_err());
    }
}
