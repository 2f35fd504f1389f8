//! Role permission model.
//!
//! A role owns at most one permission row holding four capability groups:
//! - `store`, `member`: view/create/edit/delete plus ban/suspended
//! - `package`, `billing`: view/create/edit/delete

pub mod capability;

pub use capability::{
    Capability, CapabilityEdit, CapabilityGroup, CapabilitySuspend, PermissionSet,
};
