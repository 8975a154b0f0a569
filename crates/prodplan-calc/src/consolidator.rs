//! 物料彙總計算
//!
//! 把選取的生產分配展開為配方原料需求，同一原料跨配方合併。

use std::collections::BTreeMap;

use prodplan_core::{MaterialContribution, MaterialRequirement};
use rust_decimal::Decimal;

use crate::PlannedAllocation;

/// 分組維度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAxis {
    /// 依生產類別
    Category,
    /// 依負責人
    Assignee,
}

/// 一組物料需求
#[derive(Debug, Clone)]
pub struct MaterialGroup {
    /// 組鍵（類別代碼或負責人名）
    pub key: String,

    /// 該組的物料需求
    pub materials: Vec<MaterialRequirement>,
}

/// 物料彙總統計
#[derive(Debug, Clone)]
pub struct MaterialSummary {
    /// 物料種類數
    pub material_count: usize,

    /// 庫存不足的物料數
    pub insufficient_count: usize,

    /// 需求總成本
    pub total_cost: Decimal,
}

/// 物料彙總器
pub struct MaterialConsolidator;

impl MaterialConsolidator {
    /// 展開所有分配的配方原料，合併為物料需求清單（依名稱排序）
    ///
    /// 原料量 = 每批用量 × (分配數量 / 每批產量)，配方產量無效（<= 0）時以 1 計。
    pub fn consolidate(entries: &[PlannedAllocation]) -> Vec<MaterialRequirement> {
        let mut materials: BTreeMap<String, MaterialRequirement> = BTreeMap::new();

        for entry in entries {
            let recipe = match &entry.recipe {
                Some(recipe) => recipe,
                None => {
                    tracing::debug!("分配 {} 無配方，略過物料展開", entry.item_name);
                    continue;
                }
            };

            let yield_quantity = if recipe.yield_quantity <= Decimal::ZERO {
                Decimal::ONE
            } else {
                recipe.yield_quantity
            };
            let batches = entry.quantity / yield_quantity;

            for ingredient in &recipe.ingredients {
                let ingredient_id = ingredient.effective_id();
                if ingredient_id.is_empty() {
                    tracing::warn!(
                        "配方 {} 的原料 {} 無識別，略過",
                        recipe.name,
                        ingredient.name
                    );
                    continue;
                }

                let contribution = MaterialContribution {
                    source_item_name: entry.display_name(),
                    source_recipe_name: recipe.name.clone(),
                    quantity: ingredient.quantity_per_yield * batches,
                    category: entry.category,
                    assigned_to: entry.assigned_to.clone(),
                    production_quantity: entry.quantity,
                };

                materials
                    .entry(ingredient_id.to_string())
                    .or_insert_with(|| MaterialRequirement::from_ingredient(ingredient))
                    .add_contribution(contribution, ingredient.unit_cost);
            }
        }

        let mut result: Vec<MaterialRequirement> = materials.into_values().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!("物料彙總完成: {} 種原料", result.len());
        result
    }

    /// 依維度分組
    ///
    /// 純粹的重新分鍵，各組部分量由來源明細重新累計，全部組加總等於不分組的總量。
    pub fn group(materials: &[MaterialRequirement], axis: GroupAxis) -> Vec<MaterialGroup> {
        let mut groups: BTreeMap<String, BTreeMap<String, MaterialRequirement>> = BTreeMap::new();

        for material in materials {
            for contribution in &material.contributions {
                let key = match axis {
                    GroupAxis::Category => contribution.category.code().to_string(),
                    GroupAxis::Assignee => contribution.assigned_to.clone(),
                };

                groups
                    .entry(key)
                    .or_default()
                    .entry(material.ingredient_id.clone())
                    .or_insert_with(|| empty_like(material))
                    .add_contribution(contribution.clone(), material.unit_cost);
            }
        }

        groups
            .into_iter()
            .map(|(key, by_ingredient)| {
                let mut materials: Vec<MaterialRequirement> =
                    by_ingredient.into_values().collect();
                materials.sort_by(|a, b| a.name.cmp(&b.name));
                MaterialGroup { key, materials }
            })
            .collect()
    }

    /// 彙總統計
    pub fn summarize(materials: &[MaterialRequirement]) -> MaterialSummary {
        MaterialSummary {
            material_count: materials.len(),
            insufficient_count: materials.iter().filter(|m| m.is_insufficient()).count(),
            total_cost: materials.iter().map(|m| m.total_cost).sum(),
        }
    }
}

/// 複製識別欄位，量值歸零
fn empty_like(material: &MaterialRequirement) -> MaterialRequirement {
    MaterialRequirement {
        ingredient_id: material.ingredient_id.clone(),
        name: material.name.clone(),
        unit: material.unit.clone(),
        unit_cost: material.unit_cost,
        available_stock: material.available_stock,
        total_required: Decimal::ZERO,
        total_cost: Decimal::ZERO,
        contributions: Vec::new(),
    }
}
