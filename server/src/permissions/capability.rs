//! Capability groups attached to a role.
//!
//! Each group is stored as a JSON object of boolean flags. The column default
//! is `{}`, so every flag is optional: an absent flag is "undefined" and reads
//! as deny. Absent flags are never materialised on output, which keeps `{}`
//! round-tripping as `{}`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single boolean capability inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    View,
    Create,
    Edit,
    Delete,
    Ban,
    Suspended,
}

impl Capability {
    pub const ALL: [Self; 6] = [
        Self::View,
        Self::Create,
        Self::Edit,
        Self::Delete,
        Self::Ban,
        Self::Suspended,
    ];
}

/// Common behaviour of the two group shapes.
pub trait CapabilityGroup {
    /// Raw flag value, `None` when the key is absent.
    fn flag(&self, capability: Capability) -> Option<bool>;

    /// True when no flag is set at all (the `{}` default).
    fn is_empty(&self) -> bool {
        Capability::ALL.iter().all(|c| self.flag(*c).is_none())
    }

    /// Default-deny check: only an explicit `true` grants.
    fn allows(&self, capability: Capability) -> bool {
        self.flag(capability).unwrap_or(false)
    }
}

/// Capability group with moderation flags (`store`, `member`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CapabilitySuspend {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = true)]
    pub view: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = false)]
    pub create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = false)]
    pub edit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = false)]
    pub delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = false)]
    pub ban: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = false)]
    pub suspended: Option<bool>,
}

impl CapabilitySuspend {
    /// Every flag explicitly set to `value`.
    #[must_use]
    pub const fn uniform(value: bool) -> Self {
        Self {
            view: Some(value),
            create: Some(value),
            edit: Some(value),
            delete: Some(value),
            ban: Some(value),
            suspended: Some(value),
        }
    }

    /// Only `view` granted, everything else explicitly denied.
    #[must_use]
    pub const fn view_only() -> Self {
        Self {
            view: Some(true),
            ..Self::uniform(false)
        }
    }
}

impl CapabilityGroup for CapabilitySuspend {
    fn flag(&self, capability: Capability) -> Option<bool> {
        match capability {
            Capability::View => self.view,
            Capability::Create => self.create,
            Capability::Edit => self.edit,
            Capability::Delete => self.delete,
            Capability::Ban => self.ban,
            Capability::Suspended => self.suspended,
        }
    }
}

/// Capability group with plain CRUD flags (`package`, `billing`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CapabilityEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = true)]
    pub view: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = false)]
    pub create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = false)]
    pub edit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = false)]
    pub delete: Option<bool>,
}

impl CapabilityEdit {
    /// Every flag explicitly set to `value`.
    #[must_use]
    pub const fn uniform(value: bool) -> Self {
        Self {
            view: Some(value),
            create: Some(value),
            edit: Some(value),
            delete: Some(value),
        }
    }

    /// Only `view` granted, everything else explicitly denied.
    #[must_use]
    pub const fn view_only() -> Self {
        Self {
            view: Some(true),
            ..Self::uniform(false)
        }
    }
}

impl CapabilityGroup for CapabilityEdit {
    // This shape has no moderation flags.
    fn flag(&self, capability: Capability) -> Option<bool> {
        match capability {
            Capability::View => self.view,
            Capability::Create => self.create,
            Capability::Edit => self.edit,
            Capability::Delete => self.delete,
            Capability::Ban | Capability::Suspended => None,
        }
    }
}

/// The four capability groups of one role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    pub store: CapabilitySuspend,
    pub member: CapabilitySuspend,
    pub package: CapabilityEdit,
    pub billing: CapabilityEdit,
}

impl PermissionSet {
    /// Full access on every resource.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            store: CapabilitySuspend::uniform(true),
            member: CapabilitySuspend::uniform(true),
            package: CapabilityEdit::uniform(true),
            billing: CapabilityEdit::uniform(true),
        }
    }

    /// Read-only access on every resource.
    #[must_use]
    pub const fn read_only() -> Self {
        Self {
            store: CapabilitySuspend::view_only(),
            member: CapabilitySuspend::view_only(),
            package: CapabilityEdit::view_only(),
            billing: CapabilityEdit::view_only(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_group_denies_everything() {
        let group: CapabilitySuspend = serde_json::from_str("{}").unwrap();
        assert!(group.is_empty());
        assert!(!group.allows(Capability::View));
        assert!(!group.allows(Capability::Ban));

        let set = PermissionSet::default();
        assert!(set.billing.is_empty());
        assert!(!set.billing.allows(Capability::View));
    }

    #[test]
    fn test_empty_group_round_trips_as_empty_object() {
        let group = CapabilityEdit::default();
        assert_eq!(serde_json::to_string(&group).unwrap(), "{}");
    }

    #[test]
    fn test_partial_group_keeps_missing_keys_absent() {
        let group: CapabilityEdit = serde_json::from_str(r#"{"view": true}"#).unwrap();
        assert!(!group.is_empty());
        assert!(group.allows(Capability::View));
        assert!(!group.allows(Capability::Edit));
        assert_eq!(serde_json::to_value(&group).unwrap(), serde_json::json!({"view": true}));
    }

    #[test]
    fn test_explicit_false_is_not_empty() {
        let group: CapabilityEdit = serde_json::from_str(r#"{"delete": false}"#).unwrap();
        assert!(!group.is_empty());
        assert!(!group.allows(Capability::Delete));
    }

    #[test]
    fn test_edit_group_never_grants_moderation() {
        let group = CapabilityEdit::uniform(true);
        assert!(!group.allows(Capability::Ban));
        assert!(!group.allows(Capability::Suspended));
    }

    #[test]
    fn test_presets() {
        let full = PermissionSet::full();
        assert!(full.store.allows(Capability::Suspended));
        assert!(full.billing.allows(Capability::Delete));

        let read_only = PermissionSet::read_only();
        assert!(read_only.member.allows(Capability::View));
        assert!(!read_only.member.allows(Capability::Ban));
        assert!(!read_only.package.allows(Capability::Create));
    }

    #[test]
    fn test_moderation_flag_alone_makes_group_non_empty() {
        let group: CapabilitySuspend = serde_json::from_str(r#"{"suspended": false}"#).unwrap();
        assert!(!group.is_empty());

        // Moderation keys are not part of the CRUD shape and are dropped.
        let group: CapabilityEdit = serde_json::from_str(r#"{"ban": true}"#).unwrap();
        assert!(group.is_empty());
    }

    #[test]
    fn test_non_boolean_flag_rejected() {
        let result: Result<CapabilitySuspend, _> = serde_json::from_str(r#"{"view": "yes"}"#);
        assert!(result.is_err());
    }
}
