use std::fmt;

use serde::{Deserialize, Serialize};

use crate::i18n::Language;

/// Menu section a dish is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Appetizers,
    #[serde(rename = "Main Courses")]
    MainCourses,
    Desserts,
    Beverages,
}

impl Category {
    /// Display order on the menu page.
    pub const ALL: [Category; 4] = [
        Category::Appetizers,
        Category::MainCourses,
        Category::Desserts,
        Category::Beverages,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Appetizers => "Appetizers",
            Category::MainCourses => "Main Courses",
            Category::Desserts => "Desserts",
            Category::Beverages => "Beverages",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dietary and promotional markers shown as menu filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    #[serde(rename = "vegan")]
    Vegan,
    #[serde(rename = "gluten-free")]
    GlutenFree,
    #[serde(rename = "spicy")]
    Spicy,
    #[serde(rename = "chef's recommendation", alias = "chefs-recommendation")]
    ChefsRecommendation,
}

impl Tag {
    pub const ALL: [Tag; 4] = [Tag::Vegan, Tag::GlutenFree, Tag::Spicy, Tag::ChefsRecommendation];

    /// Canonical (English) tag text, as stored on menu items.
    pub fn label(&self) -> &'static str {
        match self {
            Tag::Vegan => "vegan",
            Tag::GlutenFree => "gluten-free",
            Tag::Spicy => "spicy",
            Tag::ChefsRecommendation => "chef's recommendation",
        }
    }

    /// Identifier used in query strings and translation keys.
    pub fn slug(&self) -> &'static str {
        match self {
            Tag::Vegan => "vegan",
            Tag::GlutenFree => "gluten-free",
            Tag::Spicy => "spicy",
            Tag::ChefsRecommendation => "chefs-recommendation",
        }
    }

    /// Parse either the slug or the canonical label.
    pub fn parse(value: &str) -> Option<Tag> {
        let value = value.trim();
        Tag::ALL
            .into_iter()
            .find(|tag| tag.slug().eq_ignore_ascii_case(value) || tag.label().eq_ignore_ascii_case(value))
    }

    /// Localized filter label, e.g. "fără gluten".
    pub fn localized(&self, language: Language) -> String {
        language
            .translate(&format!("menuPage.filters.{}", self.slug()))
            .to_string()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub category: Category,
    pub price: String,
    pub description: String,
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl MenuItem {
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Selection applied on the menu page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFilter {
    /// Every selected tag must be present on the item
    pub tags: Vec<Tag>,
    /// Case-insensitive text matched against name, description and ingredients
    pub query: Option<String>,
}

impl MenuFilter {
    /// Build a filter from a comma-separated tag list and a search string.
    ///
    /// Unknown tags and blank queries are ignored.
    pub fn from_params(tags: Option<&str>, query: Option<&str>) -> Self {
        let tags = tags
            .map(|raw| raw.split(',').filter_map(Tag::parse).collect())
            .unwrap_or_default();
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        Self { tags, query }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.query.is_none()
    }

    pub fn matches(&self, item: &MenuItem) -> bool {
        if !self.tags.iter().all(|tag| item.has_tag(*tag)) {
            return false;
        }

        match &self.query {
            None => true,
            Some(query) => {
                let needle = query.to_lowercase();
                item.name.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
                    || item
                        .ingredients
                        .iter()
                        .any(|ingredient| ingredient.to_lowercase().contains(&needle))
            }
        }
    }

    pub fn apply<'a>(&self, items: &'a [MenuItem]) -> Vec<&'a MenuItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// One category heading with its dishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub category: Category,
    pub items: Vec<MenuItem>,
}

/// Group matching items by category in display order, dropping empty sections.
pub fn group_by_category(items: &[MenuItem], filter: &MenuFilter) -> Vec<MenuSection> {
    let matching = filter.apply(items);

    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let items: Vec<MenuItem> = matching
                .iter()
                .filter(|item| item.category == category)
                .map(|item| (*item).clone())
                .collect();
            (!items.is_empty()).then_some(MenuSection { category, items })
        })
        .collect()
}

/// The eight dishes the restaurant opens with.
pub fn seed_menu() -> Vec<MenuItem> {
    fn item(
        name: &str,
        category: Category,
        price: &str,
        description: &str,
        ingredients: &[&str],
        tags: &[Tag],
    ) -> MenuItem {
        MenuItem {
            name: name.to_string(),
            category,
            price: price.to_string(),
            description: description.to_string(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            tags: tags.to_vec(),
        }
    }

    vec![
        item(
            "Bruschetta al Pomodoro",
            Category::Appetizers,
            "$12",
            "Grilled sourdough bread topped with fresh tomatoes, garlic, basil, and a drizzle of extra virgin olive oil.",
            &["Sourdough bread", "Tomatoes", "Garlic", "Basil", "Olive oil", "Salt", "Pepper"],
            &[Tag::Vegan],
        ),
        item(
            "Calamari Fritti",
            Category::Appetizers,
            "$16",
            "Lightly battered and fried squid served with a spicy marinara sauce and a lemon wedge.",
            &["Squid", "Flour", "Cornstarch", "Spices", "Marinara sauce", "Lemon"],
            &[Tag::Spicy],
        ),
        item(
            "Spaghetti Carbonara",
            Category::MainCourses,
            "$24",
            "A classic Roman pasta dish with pancetta, egg yolks, pecorino cheese, and a generous amount of black pepper.",
            &["Spaghetti", "Pancetta", "Egg yolks", "Pecorino Romano cheese", "Black pepper"],
            &[Tag::ChefsRecommendation],
        ),
        item(
            "Filet Mignon",
            Category::MainCourses,
            "$45",
            "An 8oz center-cut filet, perfectly seasoned and seared, served with roasted asparagus and a red wine reduction sauce.",
            &["Filet Mignon", "Asparagus", "Red wine", "Beef broth", "Butter", "Herbs"],
            &[Tag::GlutenFree, Tag::ChefsRecommendation],
        ),
        item(
            "Salmon Al Forno",
            Category::MainCourses,
            "$32",
            "Oven-baked Atlantic salmon fillet with a lemon-dill crust, served over a bed of quinoa and seasonal vegetables.",
            &["Salmon", "Lemon", "Dill", "Breadcrumbs", "Quinoa", "Seasonal vegetables"],
            &[Tag::GlutenFree],
        ),
        item(
            "Tiramisu",
            Category::Desserts,
            "$10",
            "Layers of coffee-soaked ladyfingers and a rich, creamy mascarpone cheese mixture, dusted with cocoa powder.",
            &["Ladyfingers", "Espresso", "Mascarpone cheese", "Eggs", "Sugar", "Cocoa powder"],
            &[],
        ),
        item(
            "Panna Cotta",
            Category::Desserts,
            "$9",
            "A silky smooth Italian custard served with a fresh berry coulis.",
            &["Heavy cream", "Sugar", "Gelatin", "Vanilla bean", "Mixed berries"],
            &[Tag::GlutenFree],
        ),
        item(
            "Tuscan Sunset",
            Category::Beverages,
            "$14",
            "A signature cocktail with Aperol, prosecco, and a splash of blood orange juice.",
            &["Aperol", "Prosecco", "Blood orange juice"],
            &[Tag::Vegan, Tag::GlutenFree],
        ),
    ]
}
