//! # Production Planning Session
//!
//! 規劃會話層：選取管理、欄位編輯、拆分流程與提交管道

pub mod selection;
pub mod session;
pub mod submit;

// Re-export 主要類型
pub use selection::{Selection, SelectionSet};
pub use session::{BulkEdit, PlanningSession, SessionSnapshot};
pub use submit::{
    build_records, CreatedRecord, FailedRecord, ProductionOrderRecord, SubmissionReport,
    SubmissionRequest,
};
