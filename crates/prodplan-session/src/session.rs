//! 規劃會話
//!
//! 以生產日期為單位的工作狀態：需求表、選取集合與欄位編輯，
//! 最後展平成提交記錄送往訂單系統。

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prodplan_calc::{
    AggregateOutcome, AggregationScope, MaterialConsolidator, OrderLineAggregator,
    PlanWarning, PlannedAllocation, RequirementCalculator, SplitAllocator,
};
use prodplan_core::{
    InventorySnapshot, MaterialRequirement, OrderSummary, PlanError, ProductionCategory,
    ProductionRequirement, Result, SplitPart,
};

use crate::selection::{Selection, SelectionSet};
use crate::submit::{build_records, SubmissionReport, SubmissionRequest};

/// 會話快照的最長可還原時效（小時）
const SNAPSHOT_MAX_AGE_HOURS: i64 = 24;

/// 批次編輯指令（None 欄位保持原值）
#[derive(Debug, Clone, Default)]
pub struct BulkEdit {
    /// 生產類別
    pub category: Option<ProductionCategory>,

    /// 負責人
    pub assigned_to: Option<String>,

    /// 班次ID
    pub shift_id: Option<String>,
}

impl BulkEdit {
    /// 檢查是否沒有任何欄位要改
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.assigned_to.is_none() && self.shift_id.is_none()
    }
}

/// 規劃會話
///
/// 需求表與選取集合只能透過會話操作變更，
/// 已建立的記錄在這裡一律拒絕修改。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningSession {
    production_date: NaiveDate,
    default_shift_id: Option<String>,
    requirements: BTreeMap<String, ProductionRequirement>,
    selections: SelectionSet,
}

impl PlanningSession {
    /// 創建空的會話
    pub fn new(production_date: NaiveDate) -> Self {
        Self {
            production_date,
            default_shift_id: None,
            requirements: BTreeMap::new(),
            selections: SelectionSet::new(),
        }
    }

    /// 以彙總結果建立會話
    pub fn from_aggregation(production_date: NaiveDate, outcome: AggregateOutcome) -> Self {
        tracing::info!(
            "建立規劃會話: {} 於 {} 項需求",
            production_date,
            outcome.requirements.len()
        );
        Self {
            production_date,
            default_shift_id: None,
            requirements: outcome.requirements,
            selections: SelectionSet::new(),
        }
    }

    /// 建構器模式：設置預設班次
    pub fn with_default_shift(mut self, shift_id: String) -> Self {
        self.default_shift_id = Some(shift_id);
        self
    }

    /// 生產日期
    pub fn production_date(&self) -> NaiveDate {
        self.production_date
    }

    /// 預設班次ID
    pub fn default_shift_id(&self) -> Option<&str> {
        self.default_shift_id.as_deref()
    }

    /// 以彙總鍵順序走訪需求
    pub fn requirements(&self) -> impl Iterator<Item = &ProductionRequirement> + '_ {
        self.requirements.values()
    }

    /// 需求數量
    pub fn requirement_count(&self) -> usize {
        self.requirements.len()
    }

    /// 以需求ID查找
    pub fn requirement_by_id(&self, requirement_id: Uuid) -> Option<&ProductionRequirement> {
        self.requirements
            .values()
            .find(|requirement| requirement.id == requirement_id)
    }

    /// 目前的選取集合
    pub fn selections(&self) -> &SelectionSet {
        &self.selections
    }

    /// 併入新抓到的訂單（增量彙總）
    ///
    /// 既有需求的ID、使用者編輯與拆分狀態都保留，數量走累加路徑。
    pub fn fold_orders(
        &mut self,
        aggregator: &OrderLineAggregator,
        orders: &[OrderSummary],
        scope: &AggregationScope,
    ) -> Vec<PlanWarning> {
        let mut warnings = Vec::new();
        aggregator.aggregate_into(&mut self.requirements, orders, scope, &mut warnings);
        warnings
    }

    /// 以較新的庫存快照重算淨需求，回傳更新筆數
    pub fn refresh_stock(&mut self, snapshots: &[InventorySnapshot]) -> usize {
        RequirementCalculator::refresh_stock(&mut self.requirements, snapshots)
    }

    /// 取出可編輯的需求，已建立者一律拒絕
    fn editable_mut(&mut self, requirement_id: Uuid) -> Result<&mut ProductionRequirement> {
        let requirement = self
            .requirements
            .values_mut()
            .find(|requirement| requirement.id == requirement_id)
            .ok_or(PlanError::RequirementNotFound(requirement_id))?;
        if requirement.status.is_created() {
            return Err(PlanError::RequirementAlreadyCreated(requirement.item_name.clone()));
        }
        Ok(requirement)
    }

    /// 指定生產數量（此後不再跟隨淨需求）
    ///
    /// 拆分需求的數量由各部分承擔，須先取消拆分才能改整筆。
    pub fn set_production_quantity(&mut self, requirement_id: Uuid, quantity: Decimal) -> Result<()> {
        let requirement = self.editable_mut(requirement_id)?;
        if requirement.is_split {
            return Err(PlanError::RequirementSplit(requirement.item_name.clone()));
        }
        requirement.set_production_quantity(quantity);
        Ok(())
    }

    /// 指定生產類別（負責人維持原值，不跟著類別換）
    pub fn set_category(&mut self, requirement_id: Uuid, category: ProductionCategory) -> Result<()> {
        self.editable_mut(requirement_id)?.category = category;
        Ok(())
    }

    /// 指定負責人
    pub fn set_assignee(&mut self, requirement_id: Uuid, assigned_to: String) -> Result<()> {
        self.editable_mut(requirement_id)?.assigned_to = assigned_to;
        Ok(())
    }

    /// 指定班次
    pub fn set_shift(&mut self, requirement_id: Uuid, shift_id: Option<String>) -> Result<()> {
        self.editable_mut(requirement_id)?.shift_id = shift_id;
        Ok(())
    }

    /// 批次編輯：只套用有給值的欄位
    ///
    /// 先驗證每個目標都可編輯再動手，任何一個不合規就整批不改。
    pub fn apply_bulk(&mut self, requirement_ids: &[Uuid], edit: &BulkEdit) -> Result<usize> {
        if edit.is_empty() {
            return Ok(0);
        }

        for &requirement_id in requirement_ids {
            let requirement = self
                .requirement_by_id(requirement_id)
                .ok_or(PlanError::RequirementNotFound(requirement_id))?;
            if requirement.status.is_created() {
                return Err(PlanError::RequirementAlreadyCreated(requirement.item_name.clone()));
            }
        }

        for &requirement_id in requirement_ids {
            let requirement = match self
                .requirements
                .values_mut()
                .find(|requirement| requirement.id == requirement_id)
            {
                Some(requirement) => requirement,
                None => continue,
            };
            if let Some(category) = edit.category {
                requirement.category = category;
            }
            if let Some(assigned_to) = &edit.assigned_to {
                requirement.assigned_to = assigned_to.clone();
            }
            if let Some(shift_id) = &edit.shift_id {
                requirement.shift_id = Some(shift_id.clone());
            }
        }

        tracing::info!("批次編輯套用至 {} 項需求", requirement_ids.len());
        Ok(requirement_ids.len())
    }

    /// 開始拆分：回傳對半分配的草稿部分
    ///
    /// 草稿由呼叫端調整（數量經 SplitAllocator 驗證），
    /// 在 commit_split 之前會話狀態不變。
    pub fn begin_split(&self, requirement_id: Uuid) -> Result<Vec<SplitPart>> {
        let requirement = self
            .requirement_by_id(requirement_id)
            .ok_or(PlanError::RequirementNotFound(requirement_id))?;
        if requirement.status.is_created() {
            return Err(PlanError::RequirementAlreadyCreated(requirement.item_name.clone()));
        }
        Ok(SplitAllocator::init_split(requirement))
    }

    /// 提交拆分草稿，並清掉指向該需求的既有選取
    pub fn commit_split(&mut self, requirement_id: Uuid, parts: Vec<SplitPart>) -> Result<()> {
        let requirement = self
            .requirements
            .values_mut()
            .find(|requirement| requirement.id == requirement_id)
            .ok_or(PlanError::RequirementNotFound(requirement_id))?;
        SplitAllocator::commit(requirement, parts)?;
        self.selections.clear_for(requirement_id);
        Ok(())
    }

    /// 取消拆分，回到整筆需求
    pub fn unsplit(&mut self, requirement_id: Uuid) -> Result<()> {
        let requirement = self
            .requirements
            .values_mut()
            .find(|requirement| requirement.id == requirement_id)
            .ok_or(PlanError::RequirementNotFound(requirement_id))?;
        SplitAllocator::unsplit(requirement)?;
        self.selections.clear_for(requirement_id);
        Ok(())
    }

    /// 切換選取狀態，回傳切換後是否選取
    pub fn toggle(&mut self, selection: Selection) -> Result<bool> {
        let requirement = self
            .requirements
            .values()
            .find(|requirement| requirement.id == selection.requirement_id())
            .ok_or(PlanError::RequirementNotFound(selection.requirement_id()))?;
        Ok(self.selections.toggle(selection, requirement))
    }

    /// 全選未拆分且未建立的需求，回傳新增的選取數
    pub fn select_all(&mut self) -> usize {
        self.selections.select_regulars(self.requirements.values())
    }

    /// 清空選取
    pub fn clear_selection(&mut self) {
        self.selections.clear();
    }

    /// 展平選取項為待提交分配（以選取排序順序輸出）
    pub fn flatten_selected(&self) -> Vec<PlannedAllocation> {
        let mut allocations = Vec::new();
        for selection in self.selections.iter() {
            let requirement = match self
                .requirements
                .values()
                .find(|requirement| requirement.id == selection.requirement_id())
            {
                Some(requirement) => requirement,
                None => continue,
            };

            match *selection {
                Selection::Regular { .. } => {
                    allocations.push(PlannedAllocation::from_requirement(requirement));
                }
                Selection::SplitPart { part_index, .. } => {
                    if let Some(allocation) =
                        PlannedAllocation::from_split_part(requirement, part_index)
                    {
                        allocations.push(allocation);
                    }
                }
            }
        }
        allocations
    }

    /// 彙總選取項的物料需求
    pub fn consolidate_selected(&self) -> Vec<MaterialRequirement> {
        MaterialConsolidator::consolidate(&self.flatten_selected())
    }

    /// 把選取項打包成提交請求
    pub fn build_submission(&self) -> Result<SubmissionRequest> {
        let records = build_records(&self.flatten_selected())?;
        Ok(SubmissionRequest::new(
            self.production_date,
            self.default_shift_id.clone(),
            records,
        ))
    }

    /// 套用收單端的逐筆回覆，回傳標記為已建立的單位數
    ///
    /// 只動建立成功的記錄：標記 Created、取消其選取；
    /// 失敗的保持 Pending 與選取，修正後可重送。
    pub fn apply_submission(&mut self, report: &SubmissionReport, on: NaiveDate) -> usize {
        let mut marked = 0;

        for created in &report.created {
            let (requirement_id, part_index) = match parse_record_id(&created.record_id) {
                Some(parsed) => parsed,
                None => {
                    tracing::warn!("無法解析記錄ID: {}", created.record_id);
                    continue;
                }
            };

            let requirement = match self
                .requirements
                .values_mut()
                .find(|requirement| requirement.id == requirement_id)
            {
                Some(requirement) => requirement,
                None => continue,
            };

            match part_index {
                Some(index) => {
                    if let Some(part) = requirement.split_parts.get_mut(index) {
                        part.mark_created(on);
                        marked += 1;
                    }
                    // 所有部分都建立後，整筆需求跟著結案
                    if requirement.is_fully_created() {
                        requirement.mark_created(on);
                    }
                }
                None => {
                    requirement.mark_created(on);
                    marked += 1;
                }
            }

            self.selections.remove(&selection_for(requirement_id, part_index));
        }

        if !report.failed.is_empty() {
            tracing::warn!("{} 筆生產訂單建立失敗，保留選取供重送", report.failed.len());
        }

        marked
    }
}

/// 記錄ID還原為（需求ID，部分序號）
fn parse_record_id(record_id: &str) -> Option<(Uuid, Option<usize>)> {
    match record_id.rsplit_once("-split-") {
        Some((head, tail)) => {
            let requirement_id = Uuid::parse_str(head).ok()?;
            let part_index = tail.parse::<usize>().ok()?;
            Some((requirement_id, Some(part_index)))
        }
        None => Uuid::parse_str(record_id)
            .ok()
            .map(|requirement_id| (requirement_id, None)),
    }
}

fn selection_for(requirement_id: Uuid, part_index: Option<usize>) -> Selection {
    match part_index {
        Some(index) => Selection::split_part(requirement_id, index),
        None => Selection::regular(requirement_id),
    }
}

/// 可保存/還原的會話快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// 保存時間
    pub saved_at: DateTime<Utc>,

    /// 會話內容
    pub session: PlanningSession,
}

impl SessionSnapshot {
    /// 以指定時間打包會話
    pub fn new(session: PlanningSession, saved_at: DateTime<Utc>) -> Self {
        Self { saved_at, session }
    }

    /// 以當下時間打包會話
    pub fn capture(session: PlanningSession) -> Self {
        Self::new(session, Utc::now())
    }

    /// 檢查快照是否超過可還原時效
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.saved_at > Duration::hours(SNAPSHOT_MAX_AGE_HOURS)
    }

    /// 未過期時取回會話，過期快照不再還原
    pub fn restore(self, now: DateTime<Utc>) -> Option<PlanningSession> {
        if self.is_expired(now) {
            tracing::info!("會話快照已過期，捨棄: 保存於 {}", self.saved_at);
            return None;
        }
        Some(self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use prodplan_core::{
        FulfillmentStatus, ItemType, OrderLineItem, RecipeDefinition, RecipeIngredient,
    };
    use crate::submit::{CreatedRecord, FailedRecord};

    fn plan_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
    }

    fn flour_recipe() -> RecipeDefinition {
        RecipeDefinition::new("Sourdough Base".to_string(), Decimal::ONE, "pcs".to_string())
            .with_id("recipe-77".to_string())
            .with_ingredient(
                RecipeIngredient::new(
                    "ing-flour".to_string(),
                    "Flour".to_string(),
                    Decimal::new(5, 1),
                    "kg".to_string(),
                )
                .with_inventory_item_id("inv-flour".to_string())
                .with_unit_cost(Decimal::from(2)),
            )
    }

    /// 麵包 20 訂 5 庫存（淨 15），蛋糕 3 訂 0 庫存（淨 3）
    fn seeded_session() -> (PlanningSession, Uuid, Uuid) {
        let mut bread = ProductionRequirement::new(
            "FG-BREAD-001".to_string(),
            "Sourdough Loaf".to_string(),
            ProductionCategory::BakeryFrozenSavory,
        )
        .with_recipe(flour_recipe());
        bread.fold_order_line(Decimal::from(20), "SO-1001");
        bread.refresh_stock(Decimal::from(5));

        let mut cake = ProductionRequirement::new(
            "FG-CAKE-001".to_string(),
            "Chocolate Cake".to_string(),
            ProductionCategory::CakePastry,
        );
        cake.fold_order_line(Decimal::from(3), "SO-1002");

        let bread_id = bread.id;
        let cake_id = cake.id;

        let mut outcome = AggregateOutcome::empty();
        outcome.requirements.insert(bread.item_key(), bread);
        outcome.requirements.insert(cake.item_key(), cake);

        let session = PlanningSession::from_aggregation(plan_date(), outcome)
            .with_default_shift("shift-morning".to_string());
        (session, bread_id, cake_id)
    }

    /// 把麵包需求對半拆分並提交（數量跟隨當下的生產數量）
    fn split_bread(session: &mut PlanningSession, bread_id: Uuid) {
        let parts = session.begin_split(bread_id).unwrap();
        assert_eq!(parts.len(), 2);
        session.commit_split(bread_id, parts).unwrap();
    }

    #[test]
    fn test_quantity_edit_guards() {
        let (mut session, bread_id, cake_id) = seeded_session();

        session.set_production_quantity(bread_id, Decimal::from(18)).unwrap();
        let bread = session.requirement_by_id(bread_id).unwrap();
        assert_eq!(bread.production_quantity, Decimal::from(18));
        assert!(bread.quantity_touched);

        // 拆分草稿以改後的生產數量對半分，不是原淨需求
        let draft = session.begin_split(bread_id).unwrap();
        assert_eq!(draft[0].quantity, Decimal::from(9));
        assert_eq!(draft[1].quantity, Decimal::from(9));

        // 拆分後整筆數量鎖定
        split_bread(&mut session, bread_id);
        match session.set_production_quantity(bread_id, Decimal::from(30)) {
            Err(PlanError::RequirementSplit(name)) => assert_eq!(name, "Sourdough Loaf"),
            other => panic!("非預期結果: {other:?}"),
        }

        // 不存在的需求
        match session.set_production_quantity(Uuid::new_v4(), Decimal::from(5)) {
            Err(PlanError::RequirementNotFound(_)) => {}
            other => panic!("非預期結果: {other:?}"),
        }

        // 已建立的需求
        let report = SubmissionReport {
            created: vec![CreatedRecord {
                record_id: cake_id.to_string(),
                order_ref: None,
            }],
            failed: Vec::new(),
        };
        session.apply_submission(&report, plan_date());
        match session.set_production_quantity(cake_id, Decimal::from(9)) {
            Err(PlanError::RequirementAlreadyCreated(name)) => assert_eq!(name, "Chocolate Cake"),
            other => panic!("非預期結果: {other:?}"),
        }
    }

    #[test]
    fn test_category_edit_keeps_assignee() {
        let (mut session, bread_id, _) = seeded_session();

        session.set_category(bread_id, ProductionCategory::CakePastry).unwrap();

        // 類別換了，負責人維持原指派
        let bread = session.requirement_by_id(bread_id).unwrap();
        assert_eq!(bread.category, ProductionCategory::CakePastry);
        assert_eq!(bread.assigned_to, "Mr. Sabuz");
    }

    #[test]
    fn test_apply_bulk_partial_fields() {
        let (mut session, bread_id, cake_id) = seeded_session();

        let edit = BulkEdit {
            assigned_to: Some("Mr. Justin".to_string()),
            shift_id: Some("shift-night".to_string()),
            ..Default::default()
        };
        assert_eq!(session.apply_bulk(&[bread_id, cake_id], &edit).unwrap(), 2);

        for id in [bread_id, cake_id] {
            let requirement = session.requirement_by_id(id).unwrap();
            assert_eq!(requirement.assigned_to, "Mr. Justin");
            assert_eq!(requirement.shift_id, Some("shift-night".to_string()));
        }
        // 類別欄位沒給值，保持原狀
        let bread = session.requirement_by_id(bread_id).unwrap();
        assert_eq!(bread.category, ProductionCategory::BakeryFrozenSavory);

        // 空編輯是無操作
        assert_eq!(session.apply_bulk(&[bread_id], &BulkEdit::default()).unwrap(), 0);
    }

    #[test]
    fn test_apply_bulk_is_all_or_nothing() {
        let (mut session, bread_id, cake_id) = seeded_session();

        let report = SubmissionReport {
            created: vec![CreatedRecord {
                record_id: cake_id.to_string(),
                order_ref: None,
            }],
            failed: Vec::new(),
        };
        session.apply_submission(&report, plan_date());

        let edit = BulkEdit {
            assigned_to: Some("Mr. Justin".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            session.apply_bulk(&[bread_id, cake_id], &edit),
            Err(PlanError::RequirementAlreadyCreated(_))
        ));

        // 整批不動，麵包負責人未被改到
        let bread = session.requirement_by_id(bread_id).unwrap();
        assert_eq!(bread.assigned_to, "Mr. Sabuz");
    }

    #[test]
    fn test_split_commit_clears_selection_and_unsplit_restores() {
        let (mut session, bread_id, _) = seeded_session();

        assert!(session.toggle(Selection::regular(bread_id)).unwrap());
        split_bread(&mut session, bread_id);

        // 拆分後原整筆選取被清掉
        assert!(session.selections().is_empty());
        assert!(session.requirement_by_id(bread_id).unwrap().is_split);

        // 改選部分
        assert!(session.toggle(Selection::split_part(bread_id, 0)).unwrap());
        assert!(!session.toggle(Selection::regular(bread_id)).unwrap());
        assert_eq!(session.selections().len(), 1);

        // 取消拆分把部分選取一併清掉
        session.unsplit(bread_id).unwrap();
        assert!(session.selections().is_empty());
        assert!(!session.requirement_by_id(bread_id).unwrap().is_split);
    }

    #[test]
    fn test_select_all_then_flatten() {
        let (mut session, bread_id, _) = seeded_session();

        split_bread(&mut session, bread_id);
        assert_eq!(session.select_all(), 1);
        assert!(session.toggle(Selection::split_part(bread_id, 1)).unwrap());

        let allocations = session.flatten_selected();
        assert_eq!(allocations.len(), 2);

        let split = allocations
            .iter()
            .find(|allocation| allocation.is_split_order())
            .unwrap();
        assert_eq!(split.quantity, Decimal::from(8));
        assert_eq!(split.display_name(), "Sourdough Loaf (Split 2)");

        let whole = allocations
            .iter()
            .find(|allocation| !allocation.is_split_order())
            .unwrap();
        assert_eq!(whole.item_name, "Chocolate Cake");
        assert_eq!(whole.quantity, Decimal::from(3));
    }

    #[test]
    fn test_consolidate_selected_uses_flattened_quantities() {
        let (mut session, bread_id, _) = seeded_session();

        assert!(session.toggle(Selection::regular(bread_id)).unwrap());
        let materials = session.consolidate_selected();

        // 麵包淨需求 15，配方每件 0.5 kg 麵粉
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].name, "Flour");
        assert_eq!(materials[0].total_required, Decimal::new(75, 1));
        assert_eq!(materials[0].total_cost, Decimal::from(15));
    }

    #[test]
    fn test_build_submission_payload() {
        let (mut session, bread_id, cake_id) = seeded_session();

        split_bread(&mut session, bread_id);
        session.toggle(Selection::split_part(bread_id, 0)).unwrap();
        session.toggle(Selection::split_part(bread_id, 1)).unwrap();
        session.toggle(Selection::regular(cake_id)).unwrap();

        let request = session.build_submission().unwrap();
        assert_eq!(request.date, plan_date());
        assert_eq!(request.shift_id, Some("shift-morning".to_string()));
        assert_eq!(request.production_items.len(), 3);

        let ids: Vec<&str> = request
            .production_items
            .iter()
            .map(|record| record.record_id.as_str())
            .collect();
        assert!(ids.contains(&format!("{bread_id}-split-0").as_str()));
        assert!(ids.contains(&format!("{bread_id}-split-1").as_str()));
        assert!(ids.contains(&cake_id.to_string().as_str()));
    }

    #[test]
    fn test_apply_submission_partial_success() {
        let (mut session, bread_id, cake_id) = seeded_session();

        split_bread(&mut session, bread_id);
        session.toggle(Selection::split_part(bread_id, 0)).unwrap();
        session.toggle(Selection::split_part(bread_id, 1)).unwrap();
        session.toggle(Selection::regular(cake_id)).unwrap();

        let report = SubmissionReport {
            created: vec![
                CreatedRecord {
                    record_id: cake_id.to_string(),
                    order_ref: Some("PO-901".to_string()),
                },
                CreatedRecord {
                    record_id: format!("{bread_id}-split-0"),
                    order_ref: Some("PO-902".to_string()),
                },
            ],
            failed: vec![FailedRecord {
                record_id: format!("{bread_id}-split-1"),
                message: "shift closed".to_string(),
            }],
        };

        assert_eq!(session.apply_submission(&report, plan_date()), 2);

        // 蛋糕整筆結案且取消選取
        let cake = session.requirement_by_id(cake_id).unwrap();
        assert!(cake.status.is_created());
        assert_eq!(cake.created_on, Some(plan_date()));
        assert!(!session.selections().is_selected(&Selection::regular(cake_id)));

        // 部分 0 建立，部分 1 失敗保持選取，父需求未結案
        let bread = session.requirement_by_id(bread_id).unwrap();
        assert_eq!(bread.split_parts[0].status, FulfillmentStatus::Created);
        assert_eq!(bread.split_parts[1].status, FulfillmentStatus::Pending);
        assert!(!bread.status.is_created());
        assert!(session
            .selections()
            .is_selected(&Selection::split_part(bread_id, 1)));

        // 重送剩下的部分，全部建立後父需求跟著結案
        let retry = SubmissionReport {
            created: vec![CreatedRecord {
                record_id: format!("{bread_id}-split-1"),
                order_ref: Some("PO-903".to_string()),
            }],
            failed: Vec::new(),
        };
        assert_eq!(session.apply_submission(&retry, plan_date()), 1);

        let bread = session.requirement_by_id(bread_id).unwrap();
        assert!(bread.is_fully_created());
        assert!(bread.status.is_created());
        assert!(session.selections().is_empty());
    }

    #[test]
    fn test_fold_orders_preserves_edits_and_ids() {
        let (mut session, bread_id, _) = seeded_session();

        session.set_production_quantity(bread_id, Decimal::from(25)).unwrap();

        let aggregator = OrderLineAggregator::new(Vec::new(), Vec::new());
        let extra = OrderSummary::new(
            "SO-1009".to_string(),
            vec![OrderLineItem::new(
                "FG-BREAD-001".to_string(),
                "Sourdough Loaf".to_string(),
                Decimal::from(6),
                ItemType::FinishedGood,
                "SO-1009".to_string(),
            )],
        );

        let warnings = session.fold_orders(&aggregator, &[extra], &AggregationScope::All);
        assert!(warnings.is_empty());

        let bread = session.requirement_by_id(bread_id).unwrap();
        // 同品項折疊進既有需求：ID 不變，訂購量累加
        assert_eq!(bread.total_ordered, Decimal::from(26));
        assert_eq!(bread.net_required, Decimal::from(21));
        // 使用者指定的生產數量不被覆蓋
        assert_eq!(bread.production_quantity, Decimal::from(25));
        assert_eq!(session.requirement_count(), 2);
    }

    #[test]
    fn test_refresh_stock_recomputes_net() {
        let (mut session, bread_id, _) = seeded_session();

        let snapshots = vec![InventorySnapshot::new(
            "FG-BREAD-001".to_string(),
            "Sourdough Loaf".to_string(),
            Decimal::from(18),
        )];
        assert_eq!(session.refresh_stock(&snapshots), 1);

        let bread = session.requirement_by_id(bread_id).unwrap();
        assert_eq!(bread.current_stock, Decimal::from(18));
        assert_eq!(bread.net_required, Decimal::from(2));
    }

    #[test]
    fn test_snapshot_expiry_window() {
        let (session, _, _) = seeded_session();
        let saved_at = Utc::now();
        let snapshot = SessionSnapshot::new(session, saved_at);

        assert!(!snapshot.is_expired(saved_at + Duration::hours(23)));
        assert!(snapshot.is_expired(saved_at + Duration::hours(25)));

        assert!(snapshot.clone().restore(saved_at + Duration::hours(1)).is_some());
        assert!(snapshot.restore(saved_at + Duration::hours(25)).is_none());
    }

    #[test]
    fn test_session_serde_round_trip() {
        let (mut session, bread_id, cake_id) = seeded_session();
        split_bread(&mut session, bread_id);
        session.toggle(Selection::split_part(bread_id, 0)).unwrap();
        session.toggle(Selection::regular(cake_id)).unwrap();

        let snapshot = SessionSnapshot::new(session, Utc::now());
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: SessionSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.session.requirement_count(), 2);
        assert_eq!(restored.session.selections().len(), 2);
        assert!(restored
            .session
            .selections()
            .is_selected(&Selection::split_part(bread_id, 0)));

        let bread = restored.session.requirement_by_id(bread_id).unwrap();
        assert!(bread.is_split);
        assert_eq!(bread.split_parts[1].quantity, Decimal::from(8));
    }
}
