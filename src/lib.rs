//! Scoped validation sections that run every step and report all failures
//! together.
//!
//! Group independent validation checks under one named section: every step
//! runs even when earlier ones fail, each failure is captured at its step's
//! boundary, and the section closes with exactly one combined outcome. One
//! failing step surfaces unchanged; several failing steps surface as one
//! aggregate naming each of them.
//!
//! ```
//! use checkscope::section;
//!
//! let result = section("Validate power system activation").run(|s| {
//!     s.step("Validate control msg was sent", || assert_eq!(2 + 2, 4));
//!     s.step("Validate pin state is on", || assert!(false, "pin is off"));
//!     s.step("Validate consumer reaction", || assert!(false, "no reaction"));
//! });
//!
//! let error = result.unwrap_err();
//! assert!(error.kind().is_assertion());
//! assert_eq!(error.failures().len(), 2);
//! ```

pub mod failure;
pub mod reporter;
pub mod step;

mod section;
pub use section::*;

mod whatever;
pub use whatever::*;
