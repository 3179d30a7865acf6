//! Role identifier scheme
//!
//! A group role id encodes its whole scope: the group entity type, the group
//! bundle, optionally a single group instance, and finally the role name.
//! The same role name can therefore exist once per type/bundle and once per
//! group instance without a separate uniqueness index.

const SEPARATOR: char = '-';

/// Treat an empty group id the same as no group id
fn non_empty(group_id: Option<&str>) -> Option<&str> {
    group_id.filter(|id| !id.is_empty())
}

/// Prefix shared by every role id of a scope, including the trailing dash.
///
/// `role_id_prefix("node", "group", None)` is `"node-group-"`.
pub fn role_id_prefix(group_type: &str, group_bundle: &str, group_id: Option<&str>) -> String {
    let mut prefix = String::with_capacity(group_type.len() + group_bundle.len() + 2);
    prefix.push_str(group_type);
    prefix.push(SEPARATOR);
    prefix.push_str(group_bundle);
    prefix.push(SEPARATOR);
    if let Some(id) = non_empty(group_id) {
        prefix.push_str(id);
        prefix.push(SEPARATOR);
    }
    prefix
}

/// Canonical role id for a scope and role name
pub fn derive_role_id(
    group_type: &str,
    group_bundle: &str,
    group_id: Option<&str>,
    name: &str,
) -> String {
    let mut id = role_id_prefix(group_type, group_bundle, group_id);
    id.push_str(name);
    id
}

/// Role name encoded in `id`, if `id` belongs to the given scope
pub fn role_name_from_id<'a>(
    id: &'a str,
    group_type: &str,
    group_bundle: &str,
    group_id: Option<&str>,
) -> Option<&'a str> {
    let prefix = role_id_prefix(group_type, group_bundle, group_id);
    id.strip_prefix(prefix.as_str())
}
