//! Resource adapters, one per entity type
//!
//! Each adapter implements [`cxform_core::ResourceAdapter`] over the shared
//! [`crate::api::PlatformClient`] and leans on [`cxform_core::reconcile`] for
//! the eventual-consistency waits.

pub mod architect_flow;
pub mod idp_generic;
pub mod integration_action;
pub mod integration_credential;
pub mod location;
pub mod oauth_client;
pub mod phone;

use std::borrow::Cow;

use cxform_core::ResourceData;

pub use architect_flow::ArchitectFlowResource;
pub use idp_generic::IdpGenericResource;
pub use integration_action::IntegrationActionResource;
pub use integration_credential::IntegrationCredentialResource;
pub use location::LocationResource;
pub use oauth_client::OAuthClientResource;
pub use phone::PhoneResource;

/// Path-safe form of an entity id.
pub(crate) fn encode_id(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// Store `server` under `key` unless the current value is equivalent to it,
/// so the user's own formatting survives a read.
pub(crate) fn set_unless_equivalent(
    data: &mut ResourceData,
    key: &str,
    server: Option<String>,
    equivalent: fn(&str, &str) -> bool,
) {
    let Some(server) = server else {
        data.attrs_mut().remove(key);
        return;
    };
    let keep = matches!(
        data.attrs().get(key).and_then(|value| value.as_str()),
        Some(current) if equivalent(current, &server)
    );
    if !keep {
        data.set(key, server);
    }
}

#[cfg(test)]
mod tests {
    use cxform_core::diff::json_equivalent;
    use cxform_core::Attributes;

    use super::*;

    #[test]
    fn test_equivalent_value_keeps_user_formatting() {
        let mut data =
            ResourceData::from_state("a1", Attributes::new().with("doc", "{ \"a\": 1 }"));
        set_unless_equivalent(&mut data, "doc", Some(r#"{"a":1}"#.into()), json_equivalent);
        assert_eq!(data.get_string("doc").unwrap(), Some("{ \"a\": 1 }"));

        set_unless_equivalent(&mut data, "doc", Some(r#"{"a":2}"#.into()), json_equivalent);
        assert_eq!(data.get_string("doc").unwrap(), Some(r#"{"a":2}"#));

        set_unless_equivalent(&mut data, "doc", None, json_equivalent);
        assert!(!data.attrs().contains("doc"));
    }

    #[test]
    fn test_ids_are_path_encoded() {
        assert_eq!(encode_id("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_id("plain-id"), "plain-id");
    }
}
