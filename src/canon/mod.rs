//! Canonical function adapters and the canonical section resolver.
//!
//! `canon lift` wraps a core function as a component function and
//! `canon lower` does the reverse. Both produce an adapter that marshals
//! values across the boundary: scalars travel as single core words and
//! strings as `(ptr, len)` pairs in a linear memory, allocated through the
//! declared `realloc` function.
//!
//! # Example
//!
//! ```ignore
//! use wit_canon::ast::{Canon, CanonOpt, CanonSection};
//! use wit_canon::canon::instantiate_canonical_section;
//!
//! let section = CanonSection::new(vec![Canon::Lift {
//!     core_func: 0,
//!     options: vec![CanonOpt::Memory(0), CanonOpt::Realloc(1)],
//!     func_type: 0,
//! }]);
//! instantiate_canonical_section(&section, &mut instance)?;
//! ```

mod convert;
mod lift;
mod lower;
mod options;
mod section;
mod strings;

pub use convert::{convert_func_type, convert_prim, convert_value_type};
pub use lift::LiftAdapter;
pub use lower::LowerAdapter;
pub use options::CanonOptions;
pub use section::{instantiate_canonical_section, lifting, lowering};
