//! # Production Planning Calculation Engine
//!
//! 生產需求彙總與分配計算引擎

pub mod aggregator;
pub mod consolidator;
pub mod netting;
pub mod resolver;
pub mod split;

// Re-export 主要類型
pub use aggregator::{AggregationScope, OrderLineAggregator};
pub use consolidator::{GroupAxis, MaterialConsolidator, MaterialGroup, MaterialSummary};
pub use netting::RequirementCalculator;
pub use resolver::CategoryResolver;
pub use split::SplitAllocator;

use rust_decimal::Decimal;
use uuid::Uuid;

use prodplan_core::{ProductionCategory, ProductionRequirement, RecipeDefinition};

/// 訂單彙總結果
#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    /// 生產需求（以彙總鍵排序）
    pub requirements: std::collections::BTreeMap<String, ProductionRequirement>,

    /// 警告信息
    pub warnings: Vec<PlanWarning>,

    /// 計算耗時（毫秒）
    pub elapsed_ms: Option<u128>,
}

impl AggregateOutcome {
    /// 創建空的彙總結果
    pub fn empty() -> Self {
        Self {
            requirements: std::collections::BTreeMap::new(),
            warnings: Vec::new(),
            elapsed_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: PlanWarning) {
        self.warnings.push(warning);
    }
}

/// 計算警告
#[derive(Debug, Clone)]
pub struct PlanWarning {
    pub item_key: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl PlanWarning {
    pub fn new(item_key: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            item_key,
            message,
            severity,
        }
    }

    pub fn info(item_key: String, message: String) -> Self {
        Self::new(item_key, message, WarningSeverity::Info)
    }

    pub fn warning(item_key: String, message: String) -> Self {
        Self::new(item_key, message, WarningSeverity::Warning)
    }

    pub fn error(item_key: String, message: String) -> Self {
        Self::new(item_key, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}

/// 一筆待生產分配（整筆需求，或其中一個拆分部分）
#[derive(Debug, Clone)]
pub struct PlannedAllocation {
    /// 來源需求ID
    pub requirement_id: Uuid,

    /// 品項代碼
    pub item_code: String,

    /// 品項名稱
    pub item_name: String,

    /// 有效生產數量（整筆需求取生產數量，拆分部分取該部分數量）
    pub quantity: Decimal,

    /// 生產類別
    pub category: ProductionCategory,

    /// 負責人
    pub assigned_to: String,

    /// 班次ID
    pub shift_id: Option<String>,

    /// 對應配方
    pub recipe: Option<RecipeDefinition>,

    /// 來源訂單ID
    pub source_orders: Vec<String>,

    /// 拆分部分序號（整筆需求為 None）
    pub split_index: Option<usize>,
}

impl PlannedAllocation {
    /// 由整筆需求建立分配
    pub fn from_requirement(requirement: &ProductionRequirement) -> Self {
        Self {
            requirement_id: requirement.id,
            item_code: requirement.item_code.clone(),
            item_name: requirement.item_name.clone(),
            quantity: requirement.production_quantity,
            category: requirement.category,
            assigned_to: requirement.assigned_to.clone(),
            shift_id: requirement.shift_id.clone(),
            recipe: requirement.recipe.clone(),
            source_orders: requirement.source_orders.iter().cloned().collect(),
            split_index: None,
        }
    }

    /// 由某個拆分部分建立分配，序號超出範圍時回傳 None
    pub fn from_split_part(requirement: &ProductionRequirement, part_index: usize) -> Option<Self> {
        let part = requirement.split_parts.get(part_index)?;
        Some(Self {
            requirement_id: requirement.id,
            item_code: requirement.item_code.clone(),
            item_name: requirement.item_name.clone(),
            quantity: part.quantity,
            category: part.category,
            assigned_to: part.assigned_to.clone(),
            shift_id: part.shift_id.clone(),
            recipe: requirement.recipe.clone(),
            source_orders: requirement.source_orders.iter().cloned().collect(),
            split_index: Some(part_index),
        })
    }

    /// 檢查是否來自拆分部分
    pub fn is_split_order(&self) -> bool {
        self.split_index.is_some()
    }

    /// 顯示名稱（拆分部分附加序號）
    pub fn display_name(&self) -> String {
        match self.split_index {
            Some(index) => format!("{} (Split {})", self.item_name, index + 1),
            None => self.item_name.clone(),
        }
    }
}
