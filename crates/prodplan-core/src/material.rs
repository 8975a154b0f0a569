//! 物料需求模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::ProductionCategory;
use crate::recipe::RecipeIngredient;

/// 物料需求的單筆來源（供明細展開/稽核）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialContribution {
    /// 來源成品名稱
    pub source_item_name: String,

    /// 來源配方名稱
    pub source_recipe_name: String,

    /// 本筆需要的原料量
    pub quantity: Decimal,

    /// 來源的生產類別
    pub category: ProductionCategory,

    /// 來源的負責人
    pub assigned_to: String,

    /// 來源的生產數量
    pub production_quantity: Decimal,
}

/// 彙總後的物料需求（以原料識別為鍵，完全由當前需求集推導，不獨立保存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRequirement {
    /// 原料識別（優先庫存品項ID，未連結時為原料自身ID）
    pub ingredient_id: String,

    /// 原料名稱
    pub name: String,

    /// 單位
    pub unit: String,

    /// 單位成本（首見值）
    pub unit_cost: Decimal,

    /// 可用庫存量（首見值）
    pub available_stock: Decimal,

    /// 需求總量 = 各筆來源量的加總
    pub total_required: Decimal,

    /// 需求總成本（逐筆以該筆原料成本累計）
    pub total_cost: Decimal,

    /// 來源明細
    pub contributions: Vec<MaterialContribution>,
}

impl MaterialRequirement {
    /// 以首見的配方原料建立空的物料需求
    pub fn from_ingredient(ingredient: &RecipeIngredient) -> Self {
        Self {
            ingredient_id: ingredient.effective_id().to_string(),
            name: ingredient.name.clone(),
            unit: ingredient.unit.clone(),
            unit_cost: ingredient.unit_cost,
            available_stock: ingredient.available_stock,
            total_required: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            contributions: Vec::new(),
        }
    }

    /// 累計一筆來源（總量與成本同步累計）
    pub fn add_contribution(&mut self, contribution: MaterialContribution, unit_cost: Decimal) {
        self.total_required += contribution.quantity;
        self.total_cost += contribution.quantity * unit_cost;
        self.contributions.push(contribution);
    }

    /// 檢查庫存是否不足
    pub fn is_insufficient(&self) -> bool {
        self.available_stock < self.total_required
    }

    /// 缺口量（庫存足夠時為 0）
    pub fn shortage(&self) -> Decimal {
        (self.total_required - self.available_stock).max(Decimal::ZERO)
    }
}
