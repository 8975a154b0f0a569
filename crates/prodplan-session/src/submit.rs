//! 生產訂單提交管道
//!
//! 把選取的分配轉成收單端能獨立處理的扁平記錄。
//! 拆分結構不隨記錄外流，收單端看到的每一筆都是獨立訂單。

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use prodplan_calc::PlannedAllocation;
use prodplan_core::{FieldViolation, PlanError, ProductionCategory, Result};

/// 單筆生產訂單記錄
///
/// 記錄ID規則："{需求ID}" 或 "{需求ID}-split-{部分序號}"，
/// 回報時靠它定位回會話中的需求與部分。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrderRecord {
    /// 記錄ID
    pub record_id: String,

    /// 品項名稱（拆分部分帶 " (Split N)" 後綴）
    pub item_name: String,

    /// 品項代碼
    pub item_code: String,

    /// 生產數量
    pub production_quantity: Decimal,

    /// 生產類別（序列化為 ERP 類別代碼）
    pub category: ProductionCategory,

    /// 負責人
    pub assigned_to: String,

    /// 班次ID
    pub shift_id: Option<String>,

    /// 來源訂單ID
    pub source_orders: Vec<String>,

    /// 配方ID
    pub recipe_id: Option<String>,

    /// 備註
    pub notes: Option<String>,

    /// 是否來自拆分
    pub is_split_order: bool,
}

/// 把分配轉為提交記錄
///
/// 一次驗證全部分配，回報所有未通過的欄位而不是遇錯即停。
pub fn build_records(allocations: &[PlannedAllocation]) -> Result<Vec<ProductionOrderRecord>> {
    let mut violations = Vec::new();

    for (index, allocation) in allocations.iter().enumerate() {
        if allocation.item_name.trim().is_empty() {
            violations.push(FieldViolation {
                index,
                item_name: allocation.item_name.clone(),
                field: "item_name".to_string(),
                message: "品項名稱不可為空".to_string(),
            });
        }
        if allocation.quantity <= Decimal::ZERO {
            violations.push(FieldViolation {
                index,
                item_name: allocation.item_name.clone(),
                field: "production_quantity".to_string(),
                message: "生產數量必須大於零".to_string(),
            });
        }
    }

    if !violations.is_empty() {
        tracing::warn!("提交驗證失敗: {} 筆記錄有缺漏", violations.len());
        return Err(PlanError::MissingRequiredFields(violations));
    }

    Ok(allocations.iter().map(to_record).collect())
}

fn to_record(allocation: &PlannedAllocation) -> ProductionOrderRecord {
    let record_id = match allocation.split_index {
        Some(index) => format!("{}-split-{}", allocation.requirement_id, index),
        None => allocation.requirement_id.to_string(),
    };

    ProductionOrderRecord {
        record_id,
        item_name: allocation.display_name(),
        item_code: allocation.item_code.clone(),
        production_quantity: allocation.quantity,
        category: allocation.category,
        assigned_to: allocation.assigned_to.clone(),
        shift_id: allocation.shift_id.clone(),
        source_orders: allocation.source_orders.clone(),
        recipe_id: allocation.recipe.as_ref().and_then(|r| r.id.clone()),
        notes: None,
        is_split_order: allocation.split_index.is_some(),
    }
}

/// 提交請求載荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// 生產日期
    pub date: NaiveDate,

    /// 預設班次ID
    pub shift_id: Option<String>,

    /// 生產項目
    pub production_items: Vec<ProductionOrderRecord>,
}

impl SubmissionRequest {
    /// 創建提交請求
    pub fn new(
        date: NaiveDate,
        shift_id: Option<String>,
        production_items: Vec<ProductionOrderRecord>,
    ) -> Self {
        Self {
            date,
            shift_id,
            production_items,
        }
    }
}

/// 建立成功的記錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRecord {
    /// 記錄ID
    pub record_id: String,

    /// 收單端產生的訂單號
    pub order_ref: Option<String>,
}

/// 建立失敗的記錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedRecord {
    /// 記錄ID
    pub record_id: String,

    /// 失敗原因
    pub message: String,
}

/// 收單端的逐筆回覆（允許部分成功）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionReport {
    /// 建立成功的記錄
    #[serde(default)]
    pub created: Vec<CreatedRecord>,

    /// 建立失敗的記錄
    #[serde(default)]
    pub failed: Vec<FailedRecord>,
}

impl SubmissionReport {
    /// 全部成功回傳 Ok，否則整理為提交失敗錯誤
    pub fn ensure_all_created(&self) -> Result<()> {
        if self.failed.is_empty() {
            return Ok(());
        }
        for failure in &self.failed {
            tracing::warn!("生產訂單建立失敗: {} ({})", failure.record_id, failure.message);
        }
        Err(PlanError::SubmissionFailed {
            failed: self.failed.len(),
        })
    }
}
