//! 网络分析：结构启发式（活性、有界性、死锁、冲突、吞吐）与连通性诊断。
pub mod diagnostics;
pub mod structural;

pub use diagnostics::{DiagnosticReport, diagnose_connectivity, log_diagnostics};
pub use structural::{Analysis, analyze};
