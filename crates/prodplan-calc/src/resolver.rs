//! 生產類別判定

use prodplan_core::{InventorySnapshot, OrderLineItem, ProductionCategory, RecipeDefinition};

// 部門/配方類別層的關鍵字組（依檢查順序排列，先中先贏）
const CAKE_PASTRY_KEYWORDS: &[&str] = &["cake", "pastry"];
const BAKERY_KEYWORDS: &[&str] = &["bakery", "frozen", "savory"];
const RESULTANT_KEYWORDS: &[&str] = &["resultant"];

// 品名層的擴充關鍵字組
const CAKE_PASTRY_NAME_KEYWORDS: &[&str] = &["cake", "pastry", "tart", "donut", "muffin"];
const BAKERY_NAME_KEYWORDS: &[&str] = &[
    "bread", "bun", "cookie", "puri", "samosa", "roll", "frozen", "pizza", "sandwich",
];
const RESULTANT_NAME_KEYWORDS: &[&str] = &["resultant", "final", "mixed"];

/// 類別判定器
///
/// 優先序：庫存部門名 → 配方類別 → 品名關鍵字 → 預設類別。
/// 純函數，同樣輸入必得同樣結果。
pub struct CategoryResolver;

impl CategoryResolver {
    /// 判定品項的生產類別
    pub fn resolve(
        item: &OrderLineItem,
        recipe: Option<&RecipeDefinition>,
        inventory: Option<&InventorySnapshot>,
    ) -> ProductionCategory {
        // 第一優先：庫存部門名
        if let Some(division) = inventory.and_then(|inv| inv.division_name.as_deref()) {
            if let Some(category) = Self::match_category_text(division) {
                return category;
            }
        }

        // 第二優先：配方類別
        if let Some(category_name) = recipe.and_then(|r| r.category.as_deref()) {
            if let Some(category) = Self::match_category_text(category_name) {
                return category;
            }
        }

        // 第三優先：品名關鍵字
        if let Some(category) = Self::match_item_name(&item.name) {
            return category;
        }

        ProductionCategory::default()
    }

    /// 類別的預設負責人
    pub fn default_assignee(category: ProductionCategory) -> &'static str {
        category.assignee()
    }

    /// 比對部門名/配方類別文字
    fn match_category_text(text: &str) -> Option<ProductionCategory> {
        let text = text.to_lowercase();
        if contains_any(&text, CAKE_PASTRY_KEYWORDS) {
            return Some(ProductionCategory::CakePastry);
        }
        if contains_any(&text, BAKERY_KEYWORDS) {
            return Some(ProductionCategory::BakeryFrozenSavory);
        }
        if contains_any(&text, RESULTANT_KEYWORDS) {
            return Some(ProductionCategory::Resultant);
        }
        None
    }

    /// 比對品名關鍵字
    fn match_item_name(name: &str) -> Option<ProductionCategory> {
        let name = name.to_lowercase();
        if contains_any(&name, CAKE_PASTRY_NAME_KEYWORDS) {
            return Some(ProductionCategory::CakePastry);
        }
        if contains_any(&name, BAKERY_NAME_KEYWORDS) {
            return Some(ProductionCategory::BakeryFrozenSavory);
        }
        if contains_any(&name, RESULTANT_NAME_KEYWORDS) {
            return Some(ProductionCategory::Resultant);
        }
        None
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}
