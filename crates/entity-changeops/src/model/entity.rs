//! Items, properties and the entity sum type the change ops operate on.

use serde::{Deserialize, Serialize};

use crate::error::InvalidArgument;
use crate::model::{
    DataType, EntityId, EntityType, Fingerprint, ItemId, PropertyId, SiteLinkList, StatementList,
};

/// An item: terms, statements and site links.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<ItemId>,
    #[serde(default)]
    pub fingerprint: Fingerprint,
    #[serde(default)]
    pub statements: StatementList,
    #[serde(default)]
    pub site_links: SiteLinkList,
}

impl Item {
    pub fn new(id: Option<ItemId>) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// A property: terms, statements and the data type its values must have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: Option<PropertyId>,
    pub data_type: DataType,
    #[serde(default)]
    pub fingerprint: Fingerprint,
    #[serde(default)]
    pub statements: StatementList,
}

impl Property {
    pub fn new(id: Option<PropertyId>, data_type: DataType) -> Self {
        Self {
            id,
            data_type,
            fingerprint: Fingerprint::new(),
            statements: StatementList::new(),
        }
    }
}

/// Any editable entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entity {
    Item(Item),
    Property(Property),
}

impl Entity {
    /// Creates an empty item without an id.
    pub fn new_item() -> Self {
        Entity::Item(Item::default())
    }

    /// Creates an empty property without an id.
    pub fn new_property(data_type: DataType) -> Self {
        Entity::Property(Property::new(None, data_type))
    }

    /// Creates an empty entity of the same type (and data type) with no id.
    pub fn empty_like(&self) -> Self {
        match self {
            Entity::Item(_) => Entity::new_item(),
            Entity::Property(p) => Entity::new_property(p.data_type),
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        match self {
            Entity::Item(item) => item.id.map(EntityId::Item),
            Entity::Property(property) => property.id.map(EntityId::Property),
        }
    }

    /// Assigns an id; it must name an entity of this type.
    pub fn set_id(&mut self, id: EntityId) -> Result<(), InvalidArgument> {
        match (self, id) {
            (Entity::Item(item), EntityId::Item(item_id)) => item.id = Some(item_id),
            (Entity::Property(property), EntityId::Property(property_id)) => {
                property.id = Some(property_id)
            }
            (entity, id) => {
                return Err(InvalidArgument::UnexpectedEntityType {
                    id,
                    expected: entity.entity_type(),
                });
            }
        }
        Ok(())
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Entity::Item(_) => EntityType::Item,
            Entity::Property(_) => EntityType::Property,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            Entity::Item(item) => &item.fingerprint,
            Entity::Property(property) => &property.fingerprint,
        }
    }

    pub fn fingerprint_mut(&mut self) -> &mut Fingerprint {
        match self {
            Entity::Item(item) => &mut item.fingerprint,
            Entity::Property(property) => &mut property.fingerprint,
        }
    }

    pub fn statements(&self) -> &StatementList {
        match self {
            Entity::Item(item) => &item.statements,
            Entity::Property(property) => &property.statements,
        }
    }

    pub fn statements_mut(&mut self) -> &mut StatementList {
        match self {
            Entity::Item(item) => &mut item.statements,
            Entity::Property(property) => &mut property.statements,
        }
    }

    /// Site links; `None` for entity types that cannot have them.
    pub fn site_links(&self) -> Option<&SiteLinkList> {
        match self {
            Entity::Item(item) => Some(&item.site_links),
            Entity::Property(_) => None,
        }
    }

    pub fn site_links_mut(&mut self) -> Option<&mut SiteLinkList> {
        match self {
            Entity::Item(item) => Some(&mut item.site_links),
            Entity::Property(_) => None,
        }
    }

    /// True if the entity has no terms, statements or site links.
    pub fn is_empty(&self) -> bool {
        self.fingerprint().is_empty()
            && self.statements().is_empty()
            && self.site_links().is_none_or(SiteLinkList::is_empty)
    }
}

impl From<Item> for Entity {
    fn from(item: Item) -> Self {
        Entity::Item(item)
    }
}

impl From<Property> for Entity {
    fn from(property: Property) -> Self {
        Entity::Property(property)
    }
}
