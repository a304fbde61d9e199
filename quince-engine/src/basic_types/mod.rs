mod csp_operation_error;
mod undo_log;

pub use csp_operation_error::CspOperationError;
pub(crate) use undo_log::UndoLog;
