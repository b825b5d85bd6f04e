//! Product data the suite types into the admin panel's forms

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories the suite files products under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Clothing,
    Home,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Electronics, Category::Clothing, Category::Home];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Clothing => "Clothing",
            Category::Home => "Home",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which category the add form gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryChoice {
    /// This category's label
    Named(Category),
    /// The first category: [`Category::Electronics`] when typed, or whatever
    /// option a category select lists first
    First,
}

/// Field values for the add form.
///
/// Fields left as `None` are not typed at all, which is how the incomplete
/// submission case exercises form validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: Option<CategoryChoice>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
}

impl ProductDraft {
    /// A draft with every field filled
    pub fn complete(
        name: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        price: u64,
        quantity: u32,
    ) -> Self {
        Self {
            name: name.into(),
            category: Some(CategoryChoice::Named(category)),
            description: Some(description.into()),
            price: Some(price.to_string()),
            quantity: Some(quantity.to_string()),
        }
    }

    /// A draft with only the name typed
    pub fn name_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            description: None,
            price: None,
            quantity: None,
        }
    }

    pub fn with_category(mut self, choice: CategoryChoice) -> Self {
        self.category = Some(choice);
        self
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && self.category.is_some()
            && self.description.as_deref().is_some_and(|d| !d.is_empty())
            && self.price.is_some()
            && self.quantity.is_some()
    }
}

/// Names products created during one run.
///
/// With tagging enabled every name gets the run's short id appended, so a
/// re-run against a long-lived application does not trip over data left by
/// an earlier run.
#[derive(Debug, Clone)]
pub struct FixtureNames {
    tag: Option<String>,
}

impl FixtureNames {
    pub fn new(unique: bool) -> Self {
        let tag = unique.then(|| {
            let id = uuid::Uuid::new_v4().simple().to_string();
            id[..8].to_string()
        });
        Self { tag }
    }

    pub fn untagged() -> Self {
        Self { tag: None }
    }

    pub fn name(&self, base: &str) -> String {
        match &self.tag {
            Some(tag) => format!("{} {}", base, tag),
            None => base.to_string(),
        }
    }
}
