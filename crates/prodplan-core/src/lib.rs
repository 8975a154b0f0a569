//! # Production Planning Core
//!
//! 烘焙生產計劃核心資料模型與類型定義

pub mod adapter;
pub mod category;
pub mod inventory;
pub mod material;
pub mod order;
pub mod recipe;
pub mod requirement;
pub mod shift;

// Re-export 主要類型
pub use adapter::{RawIngredient, RawInventoryRecord, RawOrder, RawOrderLine, RawRecipe, RawShift};
pub use category::{CategoryInfo, ProductionCategory};
pub use inventory::InventorySnapshot;
pub use material::{MaterialContribution, MaterialRequirement};
pub use order::{ItemType, OrderLineItem, OrderSummary};
pub use recipe::{RecipeDefinition, RecipeIngredient};
pub use requirement::{FulfillmentStatus, ProductionRequirement, SplitPart};
pub use shift::{Shift, ShiftType};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 提交前驗證未通過的欄位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// 展平後的記錄索引
    pub index: usize,

    /// 品項名稱（可能為空字串）
    pub item_name: String,

    /// 未通過的欄位
    pub field: String,

    /// 說明
    pub message: String,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "第 {} 筆 [{}] {}: {}", self.index + 1, self.item_name, self.field, self.message)
    }
}

/// 生產計劃錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("拆分數量總和不符: 應為 {expected}，實際為 {actual}")]
    SplitQuantityMismatch { expected: Decimal, actual: Decimal },

    #[error("拆分至少需要保留兩個部分")]
    SplitTooFewParts,

    #[error("找不到拆分部分: {0}")]
    SplitPartNotFound(Uuid),

    #[error("找不到生產需求: {0}")]
    RequirementNotFound(Uuid),

    #[error("生產需求已建立，無法修改: {0}")]
    RequirementAlreadyCreated(String),

    #[error("生產需求已拆分，數量由各部分分配: {0}")]
    RequirementSplit(String),

    #[error("生產需求未拆分: {0}")]
    RequirementNotSplit(String),

    #[error("拆分已有部分建立，無法變更: {0}")]
    SplitLocked(String),

    #[error("提交驗證失敗: {} 筆記錄缺少必要欄位", .0.len())]
    MissingRequiredFields(Vec<FieldViolation>),

    #[error("找不到成品配方: {0}")]
    RecipeUnresolved(String),

    #[error("生產訂單提交失敗: {failed} 筆記錄未建立")]
    SubmissionFailed { failed: usize },
}

pub type Result<T> = std::result::Result<T, PlanError>;
