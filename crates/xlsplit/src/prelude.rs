//! Prelude module - common imports for xlsplit users
//!
//! ```rust
//! use xlsplit::prelude::*;
//! ```

pub use crate::{
    CellValue,
    FailurePolicy,
    GroupOutput,
    SplitError,
    SplitKey,
    SplitOptions,
    SplitReport,
    SplitResult,
    Splitter,
};
