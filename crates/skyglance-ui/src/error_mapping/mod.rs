//! Maps UI service errors to skyglance_core::AppError for consistent user-facing messages.

mod weather;
