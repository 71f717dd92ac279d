//! Builder API for ergonomic entity construction.
//!
//! # Example
//!
//! ```rust
//! use entity_changeops::model::builder::{ItemBuilder, StatementBuilder};
//! use entity_changeops::{DataValue, ItemId, PropertyId};
//!
//! let item = ItemBuilder::new()
//!     .id(ItemId::new(64))
//!     .label("en", "Berlin")
//!     .description("en", "capital of Germany")
//!     .aliases("en", ["Berlin, Germany"])
//!     .site_link("enwiki", "Berlin", [ItemId::new(17437796)])
//!     .statement(
//!         StatementBuilder::value(PropertyId::new(17), DataValue::EntityId(ItemId::new(183).into()))
//!             .guid("Q64$5E7C1E46-7DD4-4D54-9F1A-3B1B8D1A5B47"),
//!     )
//!     .build();
//!
//! assert_eq!(item.fingerprint().labels.get("en"), Some("Berlin"));
//! ```

use crate::model::{
    DataType, DataValue, Entity, Fingerprint, Item, ItemId, Property, PropertyId, Rank, Reference,
    SiteLink, Snak, SnakList, Statement,
};

/// Builder for an [`Entity::Item`].
#[derive(Debug, Clone, Default)]
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    /// Creates a builder for an item without id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the item id.
    pub fn id(mut self, id: ItemId) -> Self {
        self.item.id = Some(id);
        self
    }

    /// Sets a label.
    pub fn label(mut self, language: &str, text: &str) -> Self {
        self.item.fingerprint.labels.set(language, text);
        self
    }

    /// Sets a description.
    pub fn description(mut self, language: &str, text: &str) -> Self {
        self.item.fingerprint.descriptions.set(language, text);
        self
    }

    /// Replaces the aliases of one language.
    pub fn aliases<'s>(mut self, language: &str, aliases: impl IntoIterator<Item = &'s str>) -> Self {
        self.item
            .fingerprint
            .aliases
            .set(language, aliases.into_iter().map(str::to_string));
        self
    }

    /// Adds a site link.
    pub fn site_link(
        mut self,
        site_id: &str,
        page_title: &str,
        badges: impl IntoIterator<Item = ItemId>,
    ) -> Self {
        self.item
            .site_links
            .set(SiteLink::new(site_id, page_title).with_badges(badges));
        self
    }

    /// Appends a statement.
    pub fn statement(mut self, statement: StatementBuilder) -> Self {
        self.item.statements.push(statement.build());
        self
    }

    /// Builds the entity.
    pub fn build(self) -> Entity {
        Entity::Item(self.item)
    }
}

/// Builder for an [`Entity::Property`].
#[derive(Debug, Clone)]
pub struct PropertyBuilder {
    property: Property,
}

impl PropertyBuilder {
    /// Creates a builder for a property of the given data type.
    pub fn new(data_type: DataType) -> Self {
        Self {
            property: Property::new(None, data_type),
        }
    }

    pub fn id(mut self, id: PropertyId) -> Self {
        self.property.id = Some(id);
        self
    }

    pub fn label(mut self, language: &str, text: &str) -> Self {
        self.property.fingerprint.labels.set(language, text);
        self
    }

    pub fn description(mut self, language: &str, text: &str) -> Self {
        self.property.fingerprint.descriptions.set(language, text);
        self
    }

    /// Replaces the whole fingerprint.
    pub fn fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.property.fingerprint = fingerprint;
        self
    }

    pub fn statement(mut self, statement: StatementBuilder) -> Self {
        self.property.statements.push(statement.build());
        self
    }

    pub fn build(self) -> Entity {
        Entity::Property(self.property)
    }
}

/// Builder for a [`Statement`].
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    statement: Statement,
}

impl StatementBuilder {
    /// Starts from a main snak.
    pub fn new(main_snak: Snak) -> Self {
        Self {
            statement: Statement::new(main_snak),
        }
    }

    /// Starts from a value main snak.
    pub fn value(property: PropertyId, value: DataValue) -> Self {
        Self::new(Snak::value(property, value))
    }

    /// Starts from a string value main snak.
    pub fn string(property: PropertyId, value: &str) -> Self {
        Self::value(property, DataValue::String(value.to_string()))
    }

    pub fn guid(mut self, guid: &str) -> Self {
        self.statement.set_guid(guid);
        self
    }

    pub fn rank(mut self, rank: Rank) -> Self {
        self.statement.rank = rank;
        self
    }

    pub fn qualifier(mut self, snak: Snak) -> Self {
        self.statement.claim.qualifiers.add(snak);
        self
    }

    /// Appends a reference made of the given snaks.
    pub fn reference(mut self, snaks: impl IntoIterator<Item = Snak>) -> Self {
        let snaks: SnakList = snaks.into_iter().collect();
        self.statement.references.add(Reference::new(snaks), None);
        self
    }

    pub fn build(self) -> Statement {
        self.statement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityType;

    #[test]
    fn test_item_builder() {
        let item = ItemBuilder::new()
            .id(ItemId::new(1))
            .label("en", "foo")
            .aliases("en", ["a", "b", "a"])
            .site_link("plwiki", "Berlin", [ItemId::new(42), ItemId::new(42)])
            .build();

        assert_eq!(item.entity_type(), EntityType::Item);
        assert_eq!(item.fingerprint().aliases.get("en").len(), 2);
        let link = item.site_links().and_then(|l| l.get("plwiki")).cloned();
        assert_eq!(link.map(|l| l.badges), Some(vec![ItemId::new(42)]));
    }

    #[test]
    fn test_statement_builder() {
        let p = PropertyId::new(7);
        let statement = StatementBuilder::string(p, "main")
            .guid("Q1$x")
            .rank(Rank::Deprecated)
            .qualifier(Snak::NoValue { property: p })
            .reference([Snak::SomeValue { property: p }])
            .build();

        assert_eq!(statement.guid(), Some("Q1$x"));
        assert_eq!(statement.rank, Rank::Deprecated);
        assert_eq!(statement.claim.qualifiers.len(), 1);
        assert_eq!(statement.references.len(), 1);
    }

    #[test]
    fn test_property_builder() {
        let property = PropertyBuilder::new(DataType::Url)
            .id(PropertyId::new(856))
            .label("en", "official website")
            .build();
        assert_eq!(property.id().map(|id| id.to_string()), Some("P856".to_string()));
    }
}
