//! 拆分分配計算

use prodplan_core::{PlanError, ProductionRequirement, Result, SplitPart};
use rust_decimal::Decimal;
use uuid::Uuid;

/// 拆分分配器
///
/// 編輯期間的部分清單由呼叫端持有，數量總和不做即時驗證，
/// 只有提交時檢查「總和 = 生產數量」。
pub struct SplitAllocator;

impl SplitAllocator {
    /// 初始拆分：對半分配，餘數歸第二部分
    pub fn init_split(requirement: &ProductionRequirement) -> Vec<SplitPart> {
        let half = (requirement.production_quantity / Decimal::from(2)).floor();
        let rest = requirement.production_quantity - half;

        vec![
            SplitPart::inherit_from(requirement, half),
            SplitPart::inherit_from(requirement, rest),
        ]
    }

    /// 加入一個數量為零的新部分
    pub fn add_part(requirement: &ProductionRequirement, parts: &mut Vec<SplitPart>) {
        parts.push(SplitPart::inherit_from(requirement, Decimal::ZERO));
    }

    /// 移除指定部分（至少保留兩個）
    pub fn remove_part(parts: &mut Vec<SplitPart>, part_id: Uuid) -> Result<()> {
        if parts.len() <= 2 {
            return Err(PlanError::SplitTooFewParts);
        }

        let position = parts
            .iter()
            .position(|part| part.id == part_id)
            .ok_or(PlanError::SplitPartNotFound(part_id))?;
        parts.remove(position);
        Ok(())
    }

    /// 修改指定部分的數量
    pub fn set_part_quantity(
        parts: &mut [SplitPart],
        part_id: Uuid,
        quantity: Decimal,
    ) -> Result<()> {
        let part = parts
            .iter_mut()
            .find(|part| part.id == part_id)
            .ok_or(PlanError::SplitPartNotFound(part_id))?;
        part.quantity = quantity;
        Ok(())
    }

    /// 提交拆分：驗證後寫回需求
    ///
    /// 驗證順序：需求尚未建立 → 至少兩個部分 → 總和等於生產數量。
    pub fn commit(requirement: &mut ProductionRequirement, parts: Vec<SplitPart>) -> Result<()> {
        if requirement.status.is_created() {
            return Err(PlanError::RequirementAlreadyCreated(
                requirement.item_name.clone(),
            ));
        }
        if parts.len() < 2 {
            return Err(PlanError::SplitTooFewParts);
        }

        let actual: Decimal = parts.iter().map(|part| part.quantity).sum();
        if actual != requirement.production_quantity {
            return Err(PlanError::SplitQuantityMismatch {
                expected: requirement.production_quantity,
                actual,
            });
        }

        tracing::debug!(
            "拆分提交: {} 分為 {} 部分",
            requirement.item_name,
            parts.len()
        );
        requirement.is_split = true;
        requirement.split_parts = parts;
        Ok(())
    }

    /// 取消拆分，恢復為整筆需求
    pub fn unsplit(requirement: &mut ProductionRequirement) -> Result<()> {
        if !requirement.is_split {
            return Err(PlanError::RequirementNotSplit(
                requirement.item_name.clone(),
            ));
        }
        if requirement.has_created_parts() {
            return Err(PlanError::SplitLocked(requirement.item_name.clone()));
        }

        requirement.is_split = false;
        requirement.split_parts.clear();
        Ok(())
    }
}
