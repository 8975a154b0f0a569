//! 生產需求模型

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::ProductionCategory;
use crate::recipe::RecipeDefinition;

/// 履行狀態（單向，只能由 pending 轉為 created）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    /// 規劃中
    Pending,
    /// 已建立生產訂單
    Created,
}

impl FulfillmentStatus {
    /// 檢查是否已建立
    pub fn is_created(&self) -> bool {
        *self == FulfillmentStatus::Created
    }
}

/// 拆分部分（一筆生產需求的子分配）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitPart {
    /// 部分ID
    pub id: Uuid,

    /// 分配數量（>= 0）
    pub quantity: Decimal,

    /// 負責人
    pub assigned_to: String,

    /// 班次ID
    pub shift_id: Option<String>,

    /// 生產類別
    pub category: ProductionCategory,

    /// 履行狀態
    pub status: FulfillmentStatus,

    /// 建立日期（提交成功後填入）
    pub created_on: Option<NaiveDate>,
}

impl SplitPart {
    /// 由父需求繼承負責人/班次/類別，建立新的部分
    pub fn inherit_from(requirement: &ProductionRequirement, quantity: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            quantity,
            assigned_to: requirement.assigned_to.clone(),
            shift_id: requirement.shift_id.clone(),
            category: requirement.category,
            status: FulfillmentStatus::Pending,
            created_on: None,
        }
    }

    /// 標記為已建立
    pub fn mark_created(&mut self, on: NaiveDate) {
        self.status = FulfillmentStatus::Created;
        self.created_on = Some(on);
    }
}

/// 生產需求（訂單彙總的核心輸出單位，以「代碼-名稱」為鍵）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionRequirement {
    /// 需求ID
    pub id: Uuid,

    /// 品項代碼
    pub item_code: String,

    /// 品項名稱
    pub item_name: String,

    /// ERP 主檔品項ID
    pub inventory_item_id: Option<String>,

    /// 訂購總量（符合明細的數量加總）
    pub total_ordered: Decimal,

    /// 目前庫存（取自庫存快照）
    pub current_stock: Decimal,

    /// 淨需求 = max(0, 訂購總量 - 目前庫存)
    pub net_required: Decimal,

    /// 生產數量（預設等於淨需求，使用者改過後不再跟隨）
    pub production_quantity: Decimal,

    /// 生產數量是否被使用者改過
    pub quantity_touched: bool,

    /// 生產類別
    pub category: ProductionCategory,

    /// 負責人
    pub assigned_to: String,

    /// 班次ID
    pub shift_id: Option<String>,

    /// 對應配方（找不到時為 None，仍參與規劃但不產生物料需求）
    pub recipe: Option<RecipeDefinition>,

    /// 來源訂單ID（只增不減）
    pub source_orders: BTreeSet<String>,

    /// 是否已拆分
    pub is_split: bool,

    /// 拆分部分（未拆分時為空）
    pub split_parts: Vec<SplitPart>,

    /// 履行狀態
    pub status: FulfillmentStatus,

    /// 建立日期（提交成功後填入）
    pub created_on: Option<NaiveDate>,
}

impl ProductionRequirement {
    /// 創建新的生產需求
    pub fn new(item_code: String, item_name: String, category: ProductionCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_code,
            item_name,
            inventory_item_id: None,
            total_ordered: Decimal::ZERO,
            current_stock: Decimal::ZERO,
            net_required: Decimal::ZERO,
            production_quantity: Decimal::ZERO,
            quantity_touched: false,
            category,
            assigned_to: category.assignee().to_string(),
            shift_id: None,
            recipe: None,
            source_orders: BTreeSet::new(),
            is_split: false,
            split_parts: Vec::new(),
            status: FulfillmentStatus::Pending,
            created_on: None,
        }
    }

    /// 建構器模式：設置 ERP 主檔品項ID
    pub fn with_inventory_item_id(mut self, inventory_item_id: String) -> Self {
        self.inventory_item_id = Some(inventory_item_id);
        self
    }

    /// 建構器模式：設置目前庫存
    pub fn with_current_stock(mut self, current_stock: Decimal) -> Self {
        self.current_stock = current_stock;
        self.recalculate();
        self
    }

    /// 建構器模式：設置對應配方
    pub fn with_recipe(mut self, recipe: RecipeDefinition) -> Self {
        self.recipe = Some(recipe);
        self
    }

    /// 建構器模式：設置班次
    pub fn with_shift(mut self, shift_id: String) -> Self {
        self.shift_id = Some(shift_id);
        self
    }

    /// 彙總鍵（代碼-名稱）
    pub fn item_key(&self) -> String {
        format!("{}-{}", self.item_code, self.item_name)
    }

    /// 併入一筆訂單明細的數量，並記錄來源訂單
    pub fn fold_order_line(&mut self, quantity: Decimal, order_id: &str) {
        self.total_ordered += quantity;
        self.source_orders.insert(order_id.to_string());
        self.recalculate();
    }

    /// 以較新的庫存值重算淨需求
    pub fn refresh_stock(&mut self, current_stock: Decimal) {
        self.current_stock = current_stock;
        self.recalculate();
    }

    /// 使用者指定生產數量（此後不再跟隨淨需求）
    pub fn set_production_quantity(&mut self, quantity: Decimal) {
        self.production_quantity = quantity;
        self.quantity_touched = true;
    }

    /// 重算淨需求，未被改過的生產數量跟隨淨需求
    fn recalculate(&mut self) {
        self.net_required = (self.total_ordered - self.current_stock).max(Decimal::ZERO);
        if !self.quantity_touched {
            self.production_quantity = self.net_required;
        }
    }

    /// 配方ID
    pub fn recipe_id(&self) -> Option<&str> {
        self.recipe.as_ref().and_then(|r| r.id.as_deref())
    }

    /// 配方名稱
    pub fn recipe_name(&self) -> Option<&str> {
        self.recipe.as_ref().map(|r| r.name.as_str())
    }

    /// 拆分部分數量總和
    pub fn split_quantity_total(&self) -> Decimal {
        self.split_parts.iter().map(|p| p.quantity).sum()
    }

    /// 檢查是否有任何拆分部分已建立
    pub fn has_created_parts(&self) -> bool {
        self.split_parts.iter().any(|p| p.status.is_created())
    }

    /// 檢查是否可編輯（已建立者不可再改）
    pub fn is_editable(&self) -> bool {
        !self.status.is_created()
    }

    /// 檢查是否已完全建立（拆分需求需所有部分皆已建立）
    pub fn is_fully_created(&self) -> bool {
        if self.is_split {
            !self.split_parts.is_empty() && self.split_parts.iter().all(|p| p.status.is_created())
        } else {
            self.status.is_created()
        }
    }

    /// 標記為已建立
    pub fn mark_created(&mut self, on: NaiveDate) {
        self.status = FulfillmentStatus::Created;
        self.created_on = Some(on);
    }
}
