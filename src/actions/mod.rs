//! File actions module.
//!
//! Actions run after analysis and consume duplicate groups. The only action
//! today is relocation of duplicates into a backup folder, which plans but
//! does not move:
//!
//! ```no_run
//! use dupclean::actions::{PlanOnly, RelocateDuplicates};
//! use std::path::Path;
//!
//! let plan = PlanOnly::new("/data/photos")
//!     .relocate(Path::new("/data/backup"), &[], true)
//!     .unwrap();
//! assert!(!plan.performed);
//! ```

pub mod relocate;

pub use relocate::{PlanOnly, RelocateDuplicates, RelocateError, RelocatePlan};
