//! 淨需求計算

use std::collections::BTreeMap;

use prodplan_core::{InventorySnapshot, ProductionRequirement};
use rust_decimal::Decimal;

/// 淨需求計算器
pub struct RequirementCalculator;

impl RequirementCalculator {
    /// 淨需求 = max(0, 訂購總量 - 目前庫存)
    pub fn net_required(total_ordered: Decimal, current_stock: Decimal) -> Decimal {
        (total_ordered - current_stock).max(Decimal::ZERO)
    }

    /// 以較新的庫存快照重算整張需求表，回傳實際更新的筆數
    ///
    /// 只動庫存與淨需求，使用者改過的生產數量不會被覆蓋。
    pub fn refresh_stock(
        requirements: &mut BTreeMap<String, ProductionRequirement>,
        snapshots: &[InventorySnapshot],
    ) -> usize {
        let mut updated = 0;

        for requirement in requirements.values_mut() {
            let snapshot = match snapshots.iter().find(|s| Self::matches(requirement, s)) {
                Some(snapshot) => snapshot,
                None => continue,
            };

            if requirement.current_stock == snapshot.quantity_available {
                continue;
            }

            requirement.refresh_stock(snapshot.quantity_available);
            updated += 1;
        }

        if updated > 0 {
            tracing::info!("庫存更新: {} 項需求重算", updated);
        }

        updated
    }

    /// 已排產量：加總既有生產訂單中同品項鍵的數量
    ///
    /// 供呼叫端把需求對上游已存在的生產訂單做對帳。
    pub fn already_scheduled<'a, I>(scheduled: I, item_key: &str) -> Decimal
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        scheduled
            .into_iter()
            .filter(|(key, _)| *key == item_key)
            .map(|(_, quantity)| quantity)
            .sum()
    }

    /// 尚需生產量 = max(0, 需求量 - 已排產量)
    pub fn remaining_to_produce(required: Decimal, already_scheduled: Decimal) -> Decimal {
        (required - already_scheduled).max(Decimal::ZERO)
    }

    /// 需要的批次數（向上取整）
    ///
    /// 配方產量無效（<= 0）時以 1 計，避免除零。
    pub fn batches_required(remaining: Decimal, yield_per_batch: Decimal) -> Decimal {
        let yield_per_batch = if yield_per_batch <= Decimal::ZERO {
            Decimal::ONE
        } else {
            yield_per_batch
        };
        (remaining / yield_per_batch).ceil()
    }

    /// 需求與快照的對應：代碼相同，或 ERP 主檔ID相同
    fn matches(requirement: &ProductionRequirement, snapshot: &InventorySnapshot) -> bool {
        if requirement.item_code == snapshot.code {
            return true;
        }
        match (&requirement.inventory_item_id, &snapshot.item_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
