//! Menu catalog

use mrfoods_util::MenuItemId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CartItem;

/// A dish as listed in its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
}

/// A named group of dishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// A dish tagged with the name of its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub category: String,
}

impl CatalogItem {
    /// A single-plate cart entry for this dish
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: self.id.to_string(),
            name: self.name.clone(),
            price: self.price,
            quantity: 1,
            image: self.image.clone(),
            category: self.category.clone(),
        }
    }
}

/// Read-only menu: categories in display order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<MenuCategory>,
}

impl Catalog {
    pub fn new(categories: Vec<MenuCategory>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[MenuCategory] {
        &self.categories
    }

    /// Look up a dish by id
    pub fn find(&self, id: MenuItemId) -> Option<CatalogItem> {
        self.categories.iter().find_map(|category| {
            category
                .items
                .iter()
                .find(|item| item.id == id)
                .map(|item| Self::tag(category, item))
        })
    }

    /// Dishes belonging to the category with the given id or name
    pub fn in_category(&self, key: &str) -> Vec<CatalogItem> {
        self.categories
            .iter()
            .filter(|c| c.id == key || c.name.eq_ignore_ascii_case(key))
            .flat_map(|category| {
                category
                    .items
                    .iter()
                    .map(move |item| Self::tag(category, item))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn tag(category: &MenuCategory, item: &MenuItem) -> CatalogItem {
        CatalogItem {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
            image: item.image.clone(),
            category: category.name.clone(),
        }
    }
}
