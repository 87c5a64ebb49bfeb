//! Food reference table
//!
//! Static reference data for the food-text estimator: per-food aliases,
//! caloric density, and a default portion. Densities are heuristic logging
//! values, not an authoritative nutrition database. The table is built once
//! at startup and shared read-only across all estimator calls.

use serde::{Deserialize, Serialize};

/// Caloric density basis of a food
///
/// Exactly one basis per entry; which one decides how quantities convert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Density {
    /// Kilocalories per 100 grams (solids)
    Per100g(f64),
    /// Kilocalories per 100 milliliters (liquids)
    Per100Ml(f64),
    /// Kilocalories per discrete item (eggs, buns, burgers)
    PerEach(f64),
}

/// Food category, used to prioritize follow-up questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Staple,
    Protein,
    Vegetable,
    Fruit,
    Drink,
    Oil,
    Sauce,
    Snack,
}

impl FoodCategory {
    /// Oils and sauces are the most commonly underestimated part of a meal,
    /// so they are asked about first.
    pub fn followup_priority(&self) -> u8 {
        match self {
            FoodCategory::Oil => 0,
            FoodCategory::Sauce => 1,
            FoodCategory::Protein => 2,
            FoodCategory::Staple => 3,
            FoodCategory::Snack => 4,
            FoodCategory::Drink => 5,
            FoodCategory::Fruit => 6,
            FoodCategory::Vegetable => 7,
        }
    }
}

/// One food the estimator can recognize
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntry {
    /// Canonical display name
    pub name: String,
    /// Lowercase alias substrings that match this food in free text
    pub aliases: Vec<String>,
    /// Caloric density (exactly one basis)
    pub density: Density,
    /// Default portion in the density's own unit (grams, ml, or count)
    pub default_portion: f64,
    /// Label for the default portion ("bowl", "碗", "piece"...)
    pub default_unit: String,
    pub category: FoodCategory,
}

impl FoodEntry {
    fn new(
        name: &str,
        aliases: &[&str],
        density: Density,
        default_portion: f64,
        default_unit: &str,
        category: FoodCategory,
    ) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_lowercase()).collect(),
            density,
            default_portion,
            default_unit: default_unit.to_string(),
            category,
        }
    }

    /// Nominal grams for one item of a per-each food, used when the text
    /// gives an explicit weight for a counted food
    pub fn nominal_item_grams(&self) -> f64 {
        crate::estimate::units::unit_portion(&self.default_unit)
            .map(|p| p.amount)
            .unwrap_or(100.0)
    }
}

/// The immutable food reference table
///
/// Built once at process start and passed by reference into every
/// estimation call; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FoodTable {
    entries: Vec<FoodEntry>,
}

impl FoodTable {
    /// Build the built-in reference table
    ///
    /// Panics if an entry is malformed (empty alias set, non-positive
    /// density or portion) - reference data errors are programming errors
    /// and must fail at load time, not per call.
    pub fn builtin() -> Self {
        let table = Self {
            entries: builtin_entries(),
        };
        table.validate();
        table
    }

    pub fn entries(&self) -> &[FoodEntry] {
        &self.entries
    }

    fn validate(&self) {
        for entry in &self.entries {
            assert!(
                !entry.aliases.is_empty(),
                "food entry '{}' has no aliases",
                entry.name
            );
            let d = match entry.density {
                Density::Per100g(d) | Density::Per100Ml(d) | Density::PerEach(d) => d,
            };
            assert!(d > 0.0, "food entry '{}' has non-positive density", entry.name);
            assert!(
                entry.default_portion > 0.0,
                "food entry '{}' has non-positive default portion",
                entry.name
            );
        }
    }
}

fn builtin_entries() -> Vec<FoodEntry> {
    use Density::{Per100Ml, Per100g, PerEach};
    use FoodCategory::*;

    vec![
        // Staples
        FoodEntry::new("rice", &["米饭", "白饭", "rice"], Per100g(130.0), 200.0, "碗", Staple),
        FoodEntry::new("fried rice", &["炒饭", "fried rice"], Per100g(190.0), 300.0, "碗", Staple),
        FoodEntry::new("noodles", &["面条", "拉面", "面", "noodles", "noodle"], Per100g(110.0), 250.0, "碗", Staple),
        FoodEntry::new("congee", &["粥", "稀饭", "congee", "porridge"], Per100g(50.0), 300.0, "碗", Staple),
        FoodEntry::new("bread", &["面包", "吐司", "bread", "toast"], Per100g(265.0), 60.0, "片", Staple),
        FoodEntry::new("steamed bun", &["包子", "馒头", "bun"], PerEach(220.0), 1.0, "个", Staple),
        FoodEntry::new("dumplings", &["饺子", "dumplings", "dumpling"], PerEach(45.0), 10.0, "个", Staple),
        FoodEntry::new("instant noodles", &["泡面", "方便面", "instant noodle"], PerEach(470.0), 1.0, "份", Staple),
        FoodEntry::new("potato", &["土豆", "马铃薯", "potato"], Per100g(80.0), 150.0, "个", Staple),
        // Proteins
        FoodEntry::new("egg", &["鸡蛋", "蛋", "eggs", "egg"], PerEach(75.0), 1.0, "个", Protein),
        FoodEntry::new("chicken breast", &["鸡胸", "chicken breast"], Per100g(165.0), 150.0, "块", Protein),
        FoodEntry::new("fried chicken", &["炸鸡", "fried chicken"], Per100g(290.0), 150.0, "块", Protein),
        FoodEntry::new("pork", &["猪肉", "五花肉", "红烧肉", "排骨", "pork"], Per100g(240.0), 100.0, "份", Protein),
        FoodEntry::new("beef", &["牛肉", "beef", "steak"], Per100g(250.0), 100.0, "份", Protein),
        FoodEntry::new("fish", &["鱼", "fish", "salmon"], Per100g(130.0), 150.0, "份", Protein),
        FoodEntry::new("shrimp", &["虾", "shrimp", "prawn"], Per100g(100.0), 100.0, "份", Protein),
        FoodEntry::new("tofu", &["豆腐", "tofu"], Per100g(80.0), 150.0, "块", Protein),
        // Vegetables & fruit
        FoodEntry::new("vegetables", &["青菜", "蔬菜", "西兰花", "vegetable", "broccoli"], Per100g(35.0), 200.0, "份", Vegetable),
        FoodEntry::new("salad", &["沙拉", "salad"], Per100g(80.0), 200.0, "碗", Vegetable),
        FoodEntry::new("apple", &["苹果", "apples", "apple"], PerEach(95.0), 1.0, "个", Fruit),
        FoodEntry::new("banana", &["香蕉", "bananas", "banana"], PerEach(105.0), 1.0, "根", Fruit),
        FoodEntry::new("orange", &["橙子", "橘子", "oranges", "orange"], PerEach(62.0), 1.0, "个", Fruit),
        // Drinks
        FoodEntry::new("milk", &["牛奶", "milk"], Per100Ml(64.0), 250.0, "杯", Drink),
        FoodEntry::new("soy milk", &["豆浆", "soy milk"], Per100Ml(45.0), 300.0, "杯", Drink),
        FoodEntry::new("yogurt", &["酸奶", "yogurt", "yoghurt"], Per100Ml(70.0), 200.0, "杯", Drink),
        FoodEntry::new("latte", &["拿铁", "咖啡", "latte", "coffee"], Per100Ml(45.0), 350.0, "杯", Drink),
        FoodEntry::new("cola", &["可乐", "汽水", "cola", "soda"], Per100Ml(42.0), 330.0, "杯", Drink),
        FoodEntry::new("juice", &["果汁", "juice"], Per100Ml(45.0), 300.0, "杯", Drink),
        FoodEntry::new("beer", &["啤酒", "beer"], Per100Ml(43.0), 500.0, "杯", Drink),
        // Oils & sauces
        FoodEntry::new("cooking oil", &["油", "olive oil", "cooking oil", "oil"], Per100Ml(884.0), 10.0, "勺", Oil),
        FoodEntry::new("butter", &["黄油", "奶油", "butter"], Per100g(717.0), 10.0, "勺", Oil),
        FoodEntry::new("sauce", &["酱油", "酱料", "酱", "sauce", "dressing"], Per100Ml(200.0), 20.0, "勺", Sauce),
        FoodEntry::new("peanut butter", &["花生酱", "peanut butter"], Per100g(590.0), 15.0, "勺", Sauce),
        // Snacks & sweets
        FoodEntry::new("chocolate", &["巧克力", "chocolate"], Per100g(545.0), 30.0, "块", Snack),
        FoodEntry::new("cookie", &["饼干", "cookies", "cookie", "biscuits", "biscuit"], PerEach(50.0), 3.0, "片", Snack),
        FoodEntry::new("cake", &["蛋糕", "cake"], Per100g(350.0), 100.0, "片", Snack),
        FoodEntry::new("fries", &["薯条", "fries", "french fries"], Per100g(310.0), 120.0, "份", Snack),
        FoodEntry::new("pizza", &["披萨", "比萨", "pizza"], Per100g(265.0), 150.0, "片", Snack),
        FoodEntry::new("hamburger", &["汉堡", "hamburgers", "hamburger", "burgers", "burger"], PerEach(500.0), 1.0, "个", Snack),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = FoodTable::builtin();
        assert!(table.entries().len() >= 30);
    }

    #[test]
    fn test_aliases_are_lowercase() {
        let table = FoodTable::builtin();
        for entry in table.entries() {
            for alias in &entry.aliases {
                assert_eq!(alias, &alias.to_lowercase(), "alias not lowercase: {}", alias);
            }
        }
    }

    #[test]
    fn test_exactly_one_density_basis() {
        // The enum makes multiple bases unrepresentable; spot-check a few
        let table = FoodTable::builtin();
        let rice = table.entries().iter().find(|e| e.name == "rice").unwrap();
        assert_eq!(rice.density, Density::Per100g(130.0));
        let egg = table.entries().iter().find(|e| e.name == "egg").unwrap();
        assert_eq!(egg.density, Density::PerEach(75.0));
    }

    #[test]
    fn test_followup_priority_orders_oils_first() {
        assert!(FoodCategory::Oil.followup_priority() < FoodCategory::Sauce.followup_priority());
        assert!(FoodCategory::Sauce.followup_priority() < FoodCategory::Staple.followup_priority());
    }

    #[test]
    fn test_nominal_item_grams_falls_back() {
        let table = FoodTable::builtin();
        let egg = table.entries().iter().find(|e| e.name == "egg").unwrap();
        // "个" has no table weight, falls back to 100 g
        assert_eq!(egg.nominal_item_grams(), 100.0);
        let banana = table.entries().iter().find(|e| e.name == "banana").unwrap();
        // "根" is a stick
        assert_eq!(banana.nominal_item_grams(), crate::estimate::units::G_PER_STICK);
    }
}
