//! Wire types for the mytoken service endpoints
//!
//! Request bodies are built fresh per call, serialized, sent, and
//! discarded; nothing here is cached or reused across calls.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Grant type used on every token request
pub const GRANT_TYPE_MYTOKEN: &str = "mytoken";

/// Sentinel IP meaning "the caller's current IP"
pub const IP_THIS: &str = "this";

/// Lifetime of a minted mytoken, in seconds
pub const MYTOKEN_LIFETIME_SECS: i64 = 60;

/// What a mytoken may be used for.
///
/// The set is open-ended; only access-token issuance ("AT") is
/// special-cased, because usage counters are split along that line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Capability {
    /// Access-token issuance ("AT")
    #[default]
    AccessToken,
    /// Any other capability, identified by its wire name
    Other(String),
}

impl Capability {
    /// Wire representation of this capability
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AccessToken => "AT",
            Self::Other(name) => name,
        }
    }

    /// Whether this is the access-token issuance capability
    #[must_use]
    pub fn is_access_token(&self) -> bool {
        matches!(self, Self::AccessToken)
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        if s == "AT" {
            Self::AccessToken
        } else {
            Self::Other(s.to_string())
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// A constraint attached to a mytoken mint request: expiry, IP bind,
/// and usage counters split by purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    /// Expiration timestamp, Unix seconds
    pub exp: i64,
    /// Allowed source IPs (`"this"` binds to the caller's current IP)
    pub ip: Vec<String>,
    /// How many times the token may be redeemed for access-token issuance
    #[serde(rename = "usages_AT")]
    pub usages_at: u32,
    /// How many times the token may be redeemed for other capabilities
    pub usages_other: u32,
}

impl Restriction {
    /// A single-use restriction for the given capability: expires in
    /// [`MYTOKEN_LIFETIME_SECS`], bound to the caller's IP, with exactly
    /// one usage counter set to 1 depending on the capability.
    #[must_use]
    pub fn single_use(capability: &Capability) -> Self {
        let at = capability.is_access_token();
        Self {
            exp: Utc::now().timestamp() + MYTOKEN_LIFETIME_SECS,
            ip: vec![IP_THIS.to_string()],
            usages_at: u32::from(at),
            usages_other: u32::from(!at),
        }
    }
}

/// Request body for minting a mytoken
#[derive(Debug, Clone, Serialize)]
pub struct MytokenRequest {
    /// Human-readable label for the token
    pub name: String,
    /// Always [`GRANT_TYPE_MYTOKEN`]
    pub grant_type: &'static str,
    /// Capabilities the token is scoped to (a singleton here)
    pub capabilities: Vec<Capability>,
    /// Restrictions limiting redemption (a singleton here)
    pub restrictions: Vec<Restriction>,
}

impl MytokenRequest {
    /// Build a mint request for a narrowly scoped, short-lived mytoken.
    /// The label embeds the client name and capability, e.g.
    /// "mytoken-web MT for AT".
    #[must_use]
    pub fn new(client_name: &str, capability: Capability) -> Self {
        Self {
            name: format!("{client_name} MT for {capability}"),
            grant_type: GRANT_TYPE_MYTOKEN,
            restrictions: vec![Restriction::single_use(&capability)],
            capabilities: vec![capability],
        }
    }
}

/// Response from the mytoken-issuance endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct MytokenResponse {
    /// The newly minted mytoken
    pub mytoken: String,
    /// How the token is represented (e.g. "token", "short_token")
    #[serde(default)]
    pub mytoken_type: Option<String>,
    /// Transfer code, when the server issued one instead of the token itself
    #[serde(default)]
    pub transfer_code: Option<String>,
    /// Seconds until the token expires
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Request body for exchanging a mytoken for an access token
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenRequest {
    /// Always [`GRANT_TYPE_MYTOKEN`]
    pub grant_type: &'static str,
    /// Annotation stored with the issued access token
    pub comment: String,
    /// The mytoken to redeem. When `None` the key is omitted from the
    /// body entirely and the server falls back to the ambient session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mytoken: Option<String>,
}

impl AccessTokenRequest {
    /// Build an exchange request, with or without an explicit mytoken.
    #[must_use]
    pub fn new(comment: &str, mytoken: Option<&str>) -> Self {
        Self {
            grant_type: GRANT_TYPE_MYTOKEN,
            comment: comment.to_string(),
            mytoken: mytoken.map(ToString::to_string),
        }
    }
}

/// Response from the access-token exchange endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    /// The bearer token for calling protected resource APIs
    pub access_token: String,
    /// Token type (typically "Bearer")
    #[serde(default)]
    pub token_type: Option<String>,
    /// Seconds until the access token expires
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Scopes the access token carries
    #[serde(default)]
    pub scope: Option<String>,
}

/// Request body for revoking a mytoken
#[derive(Debug, Clone, Serialize)]
pub struct RevocationRequest {
    /// When true, also revoke every token transitively minted from this one
    pub recursive: bool,
}

impl Default for RevocationRequest {
    fn default() -> Self {
        Self { recursive: true }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn at_capability_sets_at_usage_counter() {
        let r = Restriction::single_use(&Capability::AccessToken);
        assert_eq!(r.usages_at, 1);
        assert_eq!(r.usages_other, 0);
    }

    #[test]
    fn other_capability_sets_other_usage_counter() {
        for name in ["tokeninfo", "settings", "create_mytoken"] {
            let r = Restriction::single_use(&Capability::from(name));
            assert_eq!(r.usages_at, 0, "{name}");
            assert_eq!(r.usages_other, 1, "{name}");
        }
    }

    #[test]
    fn restriction_is_single_use_for_any_capability() {
        for cap in [Capability::AccessToken, Capability::from("tokeninfo")] {
            let r = Restriction::single_use(&cap);
            assert_eq!(r.usages_at + r.usages_other, 1);
            assert_eq!(r.usages_at == 1, cap.is_access_token());
        }
    }

    #[test]
    fn restriction_expires_in_sixty_seconds() {
        let before = Utc::now().timestamp();
        let r = Restriction::single_use(&Capability::AccessToken);
        let after = Utc::now().timestamp();
        assert!(r.exp >= before + MYTOKEN_LIFETIME_SECS);
        assert!(r.exp <= after + MYTOKEN_LIFETIME_SECS);
    }

    #[test]
    fn restriction_binds_to_caller_ip() {
        let r = Restriction::single_use(&Capability::AccessToken);
        assert_eq!(r.ip, vec![IP_THIS.to_string()]);
    }

    #[test]
    fn restriction_serializes_wire_field_names() {
        let r = Restriction::single_use(&Capability::AccessToken);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["usages_AT"], 1);
        assert_eq!(v["usages_other"], 0);
        assert_eq!(v["ip"][0], "this");
    }

    #[test]
    fn mint_request_label_embeds_client_and_capability() {
        let req = MytokenRequest::new("mytoken-web", Capability::AccessToken);
        assert_eq!(req.name, "mytoken-web MT for AT");
        assert_eq!(req.grant_type, "mytoken");
        assert_eq!(req.capabilities, vec![Capability::AccessToken]);
        assert_eq!(req.restrictions.len(), 1);
    }

    #[test]
    fn capability_round_trips_through_wire_form() {
        let v = serde_json::to_value(Capability::AccessToken).unwrap();
        assert_eq!(v, "AT");
        let c: Capability = serde_json::from_value(serde_json::json!("tokeninfo")).unwrap();
        assert_eq!(c, Capability::Other("tokeninfo".to_string()));
    }

    #[test]
    fn exchange_body_omits_mytoken_key_when_absent() {
        let req = AccessTokenRequest::new("from web interface", None);
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("mytoken").is_none(), "key must be absent, not null");
        assert_eq!(v["grant_type"], "mytoken");
        assert_eq!(v["comment"], "from web interface");
    }

    #[test]
    fn exchange_body_carries_mytoken_verbatim_when_present() {
        let req = AccessTokenRequest::new("from web interface", Some("MT123"));
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["mytoken"], "MT123");
    }

    #[test]
    fn revocation_defaults_to_recursive() {
        assert!(RevocationRequest::default().recursive);
        let v = serde_json::to_value(RevocationRequest::default()).unwrap();
        assert_eq!(v, serde_json::json!({"recursive": true}));
    }

    #[test]
    fn mytoken_response_ignores_unknown_fields() {
        let res: MytokenResponse = serde_json::from_str(
            r#"{"mytoken":"MT123","mytoken_type":"token","restrictions":[],"x":1}"#,
        )
        .unwrap();
        assert_eq!(res.mytoken, "MT123");
        assert_eq!(res.mytoken_type.as_deref(), Some("token"));
    }
}
