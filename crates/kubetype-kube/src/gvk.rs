//! Group/version/kind parsing

use kube::core::{GroupVersion, GroupVersionKind, TypeMeta};
use serde_json::Value;

use crate::error::{KubeError, Result};

/// Parse an apiVersion and kind into a GroupVersionKind
///
/// - "apps/v1" -> group="apps", version="v1"
/// - "v1" -> group="", version="v1" (core API)
///
/// The kind may be empty when only the group version is of interest.
pub fn parse_gvk(api_version: &str, kind: &str) -> Result<GroupVersionKind> {
    if api_version.is_empty() {
        return Err(KubeError::InvalidGvk {
            api_version: String::new(),
            message: "no API version provided".to_string(),
        });
    }

    if api_version.matches('/').count() > 1 {
        return Err(KubeError::InvalidGvk {
            api_version: api_version.to_string(),
            message: format!("unexpected GroupVersion string: {}", api_version),
        });
    }

    let gv: GroupVersion = api_version.parse().map_err(|e| KubeError::InvalidGvk {
        api_version: api_version.to_string(),
        message: format!("{}", e),
    })?;

    if gv.version.is_empty() {
        return Err(KubeError::InvalidGvk {
            api_version: api_version.to_string(),
            message: "missing version".to_string(),
        });
    }

    Ok(GroupVersionKind::gvk(&gv.group, &gv.version, kind))
}

/// GroupVersionKind of a TypeMeta
pub fn gvk_from_type_meta(tm: &TypeMeta) -> Result<GroupVersionKind> {
    parse_gvk(&tm.api_version, &tm.kind)
}

/// GroupVersionKind named by an untyped object's `apiVersion` and `kind`
pub fn gvk_of(object: &Value) -> Result<GroupVersionKind> {
    let api_version = object
        .get("apiVersion")
        .and_then(Value::as_str)
        .ok_or_else(|| KubeError::InvalidManifest("missing apiVersion".to_string()))?;

    let kind = object
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| KubeError::InvalidManifest("missing kind".to_string()))?;

    parse_gvk(api_version, kind)
}

/// Human-readable form, e.g. `apps/v1 Deployment`
pub fn display_gvk(gvk: &GroupVersionKind) -> String {
    format!("{} {}", gvk.api_version(), gvk.kind)
}
