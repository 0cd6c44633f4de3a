// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cross-window messages delivered by the OAuth popup.

use serde::Deserialize;

/// A message event together with the origin it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthMessage {
    pub origin: String,
    pub payload: OAuthPayload,
}

/// Message body, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum OAuthPayload {
    #[serde(rename = "oauth_callback", rename_all = "camelCase")]
    OAuthCallback {
        #[serde(default)]
        token: Option<String>,
        #[serde(default)]
        user_id: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },
    /// Any other message type; ignored.
    #[serde(other)]
    Other,
}

impl OAuthMessage {
    pub fn new(origin: impl Into<String>, payload: OAuthPayload) -> Self {
        Self {
            origin: origin.into(),
            payload,
        }
    }

    /// Parse a raw JSON message body.
    pub fn from_json(origin: impl Into<String>, raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(origin, serde_json::from_str(raw)?))
    }

    /// Callback message carrying a token.
    pub fn callback(origin: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(
            origin,
            OAuthPayload::OAuthCallback {
                token: Some(token.into()),
                user_id: None,
                error: None,
            },
        )
    }
}

/// Compare origins, ignoring a trailing slash and ASCII case.
pub(crate) fn same_origin(a: &str, b: &str) -> bool {
    a.trim_end_matches('/')
        .eq_ignore_ascii_case(b.trim_end_matches('/'))
}
