//! Identity and capability primitives
//!
//! - **[`AclClass`]**: the closed set of securable object kinds
//! - **[`Sid`]** / **[`SidSet`]**: who a resolution is computed for
//! - **[`Mask`]** / **[`Permission`]**: what an access control entry grants or denies

mod class;
mod mask;
mod sid;

pub use class::{AclClass, Domain, UnknownAclClass};
pub use mask::{Mask, MaskParseError, Permission};
pub use sid::{Sid, SidSet};
