//! 選取管理
//!
//! 選取單位是「整筆需求」或「某個拆分部分」，兩者互斥：
//! 需求一旦拆分，只能選取其部分，不能再選取整筆。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prodplan_core::ProductionRequirement;

/// 選取單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// 整筆需求
    Regular { requirement_id: Uuid },

    /// 拆分部分（以序號定位，部分增刪後由 retain_valid 清理）
    SplitPart { requirement_id: Uuid, part_index: usize },
}

impl Selection {
    /// 整筆需求的選取
    pub fn regular(requirement_id: Uuid) -> Self {
        Selection::Regular { requirement_id }
    }

    /// 拆分部分的選取
    pub fn split_part(requirement_id: Uuid, part_index: usize) -> Self {
        Selection::SplitPart {
            requirement_id,
            part_index,
        }
    }

    /// 所屬需求ID
    pub fn requirement_id(&self) -> Uuid {
        match self {
            Selection::Regular { requirement_id } => *requirement_id,
            Selection::SplitPart { requirement_id, .. } => *requirement_id,
        }
    }
}

/// 選取集合
///
/// 所有變更入口都套用同一組守門規則，集合內不會出現
/// 指向已建立記錄或不存在部分的選取。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionSet {
    selected: BTreeSet<Selection>,
}

impl SelectionSet {
    /// 創建空的選取集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 切換選取狀態，回傳切換後是否選取
    ///
    /// 無效的選取（拆分後選整筆、未拆分選部分、已建立者）
    /// 會被移出集合並回傳 false。
    pub fn toggle(&mut self, selection: Selection, requirement: &ProductionRequirement) -> bool {
        if !Self::is_selectable(selection, requirement) {
            self.selected.remove(&selection);
            return false;
        }

        if self.selected.remove(&selection) {
            false
        } else {
            self.selected.insert(selection);
            true
        }
    }

    /// 選取所有可選的整筆需求，回傳新增的數量
    pub fn select_regulars<'a, I>(&mut self, requirements: I) -> usize
    where
        I: IntoIterator<Item = &'a ProductionRequirement>,
    {
        let mut added = 0;
        for requirement in requirements {
            let selection = Selection::regular(requirement.id);
            if Self::is_selectable(selection, requirement) && self.selected.insert(selection) {
                added += 1;
            }
        }
        added
    }

    /// 檢查是否已選取
    pub fn is_selected(&self, selection: &Selection) -> bool {
        self.selected.contains(selection)
    }

    /// 選取數量
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// 檢查是否為空
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// 以排序順序走訪選取項
    pub fn iter(&self) -> impl Iterator<Item = &Selection> + '_ {
        self.selected.iter()
    }

    /// 移除單一選取
    pub fn remove(&mut self, selection: &Selection) -> bool {
        self.selected.remove(selection)
    }

    /// 清掉指向某需求的所有選取（拆分/取消拆分後呼叫）
    pub fn clear_for(&mut self, requirement_id: Uuid) {
        self.selected
            .retain(|selection| selection.requirement_id() != requirement_id);
    }

    /// 清空集合
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// 以目前的需求狀態清理失效選取
    ///
    /// 需求消失、拆分狀態改變或記錄已建立的選取都會被移除。
    pub fn retain_valid<'a, F>(&mut self, resolve: F)
    where
        F: Fn(Uuid) -> Option<&'a ProductionRequirement>,
    {
        self.selected.retain(|selection| {
            resolve(selection.requirement_id())
                .map(|requirement| Self::is_selectable(*selection, requirement))
                .unwrap_or(false)
        });
    }

    /// 守門規則：選取必須指向尚未建立、且與拆分狀態相符的單位
    fn is_selectable(selection: Selection, requirement: &ProductionRequirement) -> bool {
        match selection {
            Selection::Regular { .. } => {
                !requirement.is_split && !requirement.status.is_created()
            }
            Selection::SplitPart { part_index, .. } => {
                requirement.is_split
                    && requirement
                        .split_parts
                        .get(part_index)
                        .map(|part| !part.status.is_created())
                        .unwrap_or(false)
            }
        }
    }
}
