//! 生產類別

use serde::{Deserialize, Serialize};

/// 生產類別（固定三類，對應 ERP 類別代碼）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductionCategory {
    /// 麵包/冷凍/鹹點
    #[serde(rename = "Production-001")]
    BakeryFrozenSavory,
    /// 蛋糕/西點
    #[serde(rename = "Production-002")]
    CakePastry,
    /// 再製品
    #[serde(rename = "Production-003")]
    Resultant,
}

/// 類別顯示資訊
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    /// ERP 類別代碼
    pub code: &'static str,

    /// 顯示名稱
    pub display_name: &'static str,

    /// 預設負責人
    pub assignee: &'static str,

    /// 顯示圖示
    pub icon: &'static str,

    /// 顯示顏色
    pub color: &'static str,
}

/// 類別顯示表（固定，不依賴外部設定）
const CATEGORY_TABLE: [CategoryInfo; 3] = [
    CategoryInfo {
        code: "Production-001",
        display_name: "Bakery, Frozen & Savory",
        assignee: "Mr. Sabuz",
        icon: "🥖",
        color: "#4caf50",
    },
    CategoryInfo {
        code: "Production-002",
        display_name: "Cake & Pastry",
        assignee: "Mr. Rakib",
        icon: "🍰",
        color: "#e91e63",
    },
    CategoryInfo {
        code: "Production-003",
        display_name: "Resultant Items",
        assignee: "Mr. Justin",
        icon: "🍽️",
        color: "#2196f3",
    },
];

impl ProductionCategory {
    /// 全部類別（固定順序）
    pub const ALL: [ProductionCategory; 3] = [
        ProductionCategory::BakeryFrozenSavory,
        ProductionCategory::CakePastry,
        ProductionCategory::Resultant,
    ];

    /// 取得顯示資訊
    pub fn info(&self) -> &'static CategoryInfo {
        match self {
            ProductionCategory::BakeryFrozenSavory => &CATEGORY_TABLE[0],
            ProductionCategory::CakePastry => &CATEGORY_TABLE[1],
            ProductionCategory::Resultant => &CATEGORY_TABLE[2],
        }
    }

    /// ERP 類別代碼
    pub fn code(&self) -> &'static str {
        self.info().code
    }

    /// 預設負責人
    pub fn assignee(&self) -> &'static str {
        self.info().assignee
    }

    /// 由 ERP 類別代碼解析
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Production-001" => Some(ProductionCategory::BakeryFrozenSavory),
            "Production-002" => Some(ProductionCategory::CakePastry),
            "Production-003" => Some(ProductionCategory::Resultant),
            _ => None,
        }
    }
}

impl Default for ProductionCategory {
    fn default() -> Self {
        ProductionCategory::BakeryFrozenSavory
    }
}

impl std::fmt::Display for ProductionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
