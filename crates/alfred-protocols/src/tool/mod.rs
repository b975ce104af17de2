//! Tool protocol definitions.
//!
//! Tools are named, schema-described callables that agents may invoke while
//! processing a step.

mod descriptor;
mod invoker;
mod traits;

pub use descriptor::*;
pub use invoker::*;
pub use traits::*;
