//! 配方模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::OrderLineItem;

/// 配方原料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// 原料自身ID（配方明細ID）
    pub ingredient_id: String,

    /// 連結的庫存品項ID（優先作為彙總識別）
    pub inventory_item_id: Option<String>,

    /// 原料名稱
    pub name: String,

    /// 每批產出所需數量
    pub quantity_per_yield: Decimal,

    /// 單位
    pub unit: String,

    /// 單位成本
    pub unit_cost: Decimal,

    /// 可用庫存量（擷取時隨配方內嵌的快照值）
    pub available_stock: Decimal,
}

impl RecipeIngredient {
    /// 創建新的配方原料
    pub fn new(ingredient_id: String, name: String, quantity_per_yield: Decimal, unit: String) -> Self {
        Self {
            ingredient_id,
            inventory_item_id: None,
            name,
            quantity_per_yield,
            unit,
            unit_cost: Decimal::ZERO,
            available_stock: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置連結的庫存品項ID
    pub fn with_inventory_item_id(mut self, inventory_item_id: String) -> Self {
        self.inventory_item_id = Some(inventory_item_id);
        self
    }

    /// 建構器模式：設置單位成本
    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = unit_cost;
        self
    }

    /// 建構器模式：設置可用庫存量
    pub fn with_available_stock(mut self, available_stock: Decimal) -> Self {
        self.available_stock = available_stock;
        self
    }

    /// 彙總識別（優先取庫存品項ID，未連結時退回原料自身ID）
    pub fn effective_id(&self) -> &str {
        self.inventory_item_id
            .as_deref()
            .unwrap_or(&self.ingredient_id)
    }
}

/// 成品配方
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDefinition {
    /// 配方ID
    pub id: Option<String>,

    /// 配方名稱
    pub name: String,

    /// 配方類別（用於類別判定的第二優先）
    pub category: Option<String>,

    /// 每批產出數量（> 0）
    pub yield_quantity: Decimal,

    /// 產出單位
    pub yield_unit: String,

    /// 原料清單
    pub ingredients: Vec<RecipeIngredient>,

    /// 連結的成品庫存品項ID
    pub inventory_item_id: Option<String>,
}

impl RecipeDefinition {
    /// 創建新的配方
    pub fn new(name: String, yield_quantity: Decimal, yield_unit: String) -> Self {
        Self {
            id: None,
            name,
            category: None,
            yield_quantity,
            yield_unit,
            ingredients: Vec::new(),
            inventory_item_id: None,
        }
    }

    /// 建構器模式：設置配方ID
    pub fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    /// 建構器模式：設置配方類別
    pub fn with_category(mut self, category: String) -> Self {
        self.category = Some(category);
        self
    }

    /// 建構器模式：加入原料
    pub fn with_ingredient(mut self, ingredient: RecipeIngredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    /// 建構器模式：設置連結的成品庫存品項ID
    pub fn with_inventory_item_id(mut self, inventory_item_id: String) -> Self {
        self.inventory_item_id = Some(inventory_item_id);
        self
    }

    /// 檢查是否對應某訂單明細（名稱包含比對，或 ERP 主檔ID相同）
    pub fn matches_line(&self, line: &OrderLineItem) -> bool {
        if !line.name.is_empty()
            && self.name.to_lowercase().contains(&line.name.to_lowercase())
        {
            return true;
        }
        match (&self.inventory_item_id, &line.inventory_item_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
