//! 訂單模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 品項類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// 成品（由配方生產）
    FinishedGood,
    /// 配件
    Accessory,
    /// 其他
    Other,
}

/// 銷售訂單明細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// 品項代碼
    pub code: String,

    /// 品項名稱
    pub name: String,

    /// 訂購數量（> 0）
    pub quantity: Decimal,

    /// 品項類型
    pub item_type: ItemType,

    /// 所屬訂單ID
    pub order_id: String,

    /// ERP 主檔品項ID（用於庫存/配方比對）
    pub inventory_item_id: Option<String>,

    /// 單位
    pub unit: Option<String>,
}

impl OrderLineItem {
    /// 創建新的訂單明細
    pub fn new(code: String, name: String, quantity: Decimal, item_type: ItemType, order_id: String) -> Self {
        Self {
            code,
            name,
            quantity,
            item_type,
            order_id,
            inventory_item_id: None,
            unit: None,
        }
    }

    /// 建構器模式：設置 ERP 主檔品項ID
    pub fn with_inventory_item_id(mut self, inventory_item_id: String) -> Self {
        self.inventory_item_id = Some(inventory_item_id);
        self
    }

    /// 建構器模式：設置單位
    pub fn with_unit(mut self, unit: String) -> Self {
        self.unit = Some(unit);
        self
    }

    /// 檢查是否為成品（類型為成品，或代碼以 fg 開頭）
    pub fn is_finished_good(&self) -> bool {
        self.item_type == ItemType::FinishedGood
            || self.code.to_lowercase().starts_with("fg")
    }

    /// 彙總鍵（代碼-名稱，避免同名不同碼的品項互相覆蓋）
    pub fn item_key(&self) -> String {
        format!("{}-{}", self.code, self.name)
    }
}

/// 銷售訂單摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    /// 訂單ID
    pub id: String,

    /// 訂單參考號（如客戶單號）
    pub reference: Option<String>,

    /// 訂單明細
    pub items: Vec<OrderLineItem>,
}

impl OrderSummary {
    /// 創建新的訂單摘要
    pub fn new(id: String, items: Vec<OrderLineItem>) -> Self {
        Self {
            id,
            reference: None,
            items,
        }
    }

    /// 建構器模式：設置訂單參考號
    pub fn with_reference(mut self, reference: String) -> Self {
        self.reference = Some(reference);
        self
    }

    /// 取出其中的成品明細
    pub fn finished_good_items(&self) -> impl Iterator<Item = &OrderLineItem> {
        self.items.iter().filter(|item| item.is_finished_good())
    }
}
