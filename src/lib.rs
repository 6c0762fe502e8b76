//! tagstamp - compile version constants from git tags
//!
//! Extracts structured version fields from `git describe` output and
//! renders them into a generated source file, rewriting that file only
//! when its content actually changes so dependent build steps are not
//! spuriously re-run.
//!
//! # Architecture
//!
//! - **Pure core**: [`describe`] parses one describe line into a
//!   [`Description`]; [`fields`] turns it into ordered name/value pairs.
//!   Neither does any I/O.
//! - **Collaborators**: [`probe`] wraps the `git describe` subprocess,
//!   [`template`] handles `@NAME@` substitution and the change-aware
//!   write.
//! - **Two-phase gate**: [`gate::register`] records validated, absolute
//!   paths once per build configuration; [`gate::execute`] runs before
//!   every build action and re-renders unconditionally, relying on the
//!   content-equality write for idempotency.

pub mod describe;
pub mod fields;
pub mod gate;
pub mod probe;
pub mod template;

// Re-exports for convenience
pub use describe::{DescribeError, Description};
pub use fields::field_values;
pub use gate::{execute, register, GateConfig, GateError, GateOptions, RenderOutcome};
pub use probe::{Probe, ProbeError};
