//! 班次模型

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// 班次類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    /// 早班
    Morning,
    /// 午班
    Afternoon,
    /// 晚班
    Evening,
    /// 夜班（跨午夜）
    Night,
    /// 自訂
    Custom,
}

/// 生產班次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    /// 班次ID（上游 ERP 識別，保持不透明）
    pub id: String,

    /// 班次名稱
    pub name: String,

    /// 班次類型
    pub shift_type: ShiftType,

    /// 開始時間
    pub start_time: NaiveTime,

    /// 結束時間（早於開始時間時視為跨午夜）
    pub end_time: NaiveTime,

    /// 是否啟用
    pub is_active: bool,
}

impl Shift {
    /// 創建新的班次
    pub fn new(
        id: String,
        name: String,
        shift_type: ShiftType,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id,
            name,
            shift_type,
            start_time,
            end_time,
            is_active: true,
        }
    }

    /// 檢查某時刻是否落在本班次內（含跨午夜班次）
    pub fn covers(&self, time: NaiveTime) -> bool {
        if self.start_time <= self.end_time {
            self.start_time <= time && time <= self.end_time
        } else {
            // 跨午夜班次
            time >= self.start_time || time <= self.end_time
        }
    }

    /// 預設三班制（班次目錄為空時的後備方案）
    pub fn default_roster() -> Vec<Shift> {
        vec![
            Shift::new(
                "1".to_string(),
                "Morning Shift".to_string(),
                ShiftType::Morning,
                NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            ),
            Shift::new(
                "2".to_string(),
                "Afternoon Shift".to_string(),
                ShiftType::Afternoon,
                NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            ),
            Shift::new(
                "3".to_string(),
                "Night Shift".to_string(),
                ShiftType::Night,
                NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            ),
        ]
    }

    /// 班次目錄，空目錄退回預設三班制
    pub fn roster_or_default(shifts: Vec<Shift>) -> Vec<Shift> {
        if shifts.is_empty() {
            Shift::default_roster()
        } else {
            shifts
        }
    }
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} - {})",
            self.name,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}
