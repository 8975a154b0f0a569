//! 庫存快照模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::OrderLineItem;

/// 庫存快照（某一時間點的庫存視圖，本核心只讀不寫）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// 品項代碼
    pub code: String,

    /// 品項名稱
    pub name: String,

    /// 部門/分區名稱（用於類別判定）
    pub division_name: Option<String>,

    /// 可用庫存量（>= 0）
    pub quantity_available: Decimal,

    /// 單位
    pub unit: Option<String>,

    /// 單位成本
    pub unit_cost: Decimal,

    /// ERP 主檔品項ID
    pub item_id: Option<String>,
}

impl InventorySnapshot {
    /// 創建新的庫存快照
    pub fn new(code: String, name: String, quantity_available: Decimal) -> Self {
        Self {
            code,
            name,
            division_name: None,
            quantity_available,
            unit: None,
            unit_cost: Decimal::ZERO,
            item_id: None,
        }
    }

    /// 建構器模式：設置部門名稱
    pub fn with_division(mut self, division_name: String) -> Self {
        self.division_name = Some(division_name);
        self
    }

    /// 建構器模式：設置單位
    pub fn with_unit(mut self, unit: String) -> Self {
        self.unit = Some(unit);
        self
    }

    /// 建構器模式：設置單位成本
    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = unit_cost;
        self
    }

    /// 建構器模式：設置 ERP 主檔品項ID
    pub fn with_item_id(mut self, item_id: String) -> Self {
        self.item_id = Some(item_id);
        self
    }

    /// 檢查是否對應某訂單明細（代碼相同，或 ERP 主檔ID相同）
    pub fn matches_line(&self, line: &OrderLineItem) -> bool {
        if self.code == line.code {
            return true;
        }
        match (&self.item_id, &line.inventory_item_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// 檢查是否缺貨
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity_available <= Decimal::ZERO
    }
}
