//! Request bodies and route paths for the FReD HTTP API

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters allowed unencoded in a single URI path segment per RFC 3986.
/// `/` is encoded too, so an identifier can never span more than one segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// Percent-encode an identifier for use as one path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Body of an item write (`put` and `append`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    /// Opaque item payload
    pub data: String,
}

impl ItemData {
    /// Wrap a payload
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

/// Body of a trigger registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerHost {
    /// Address of the trigger node, as `host:port`
    pub host: String,
}

impl TriggerHost {
    /// Wrap a trigger node address
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

/// A keygroup-scoped resource on a FReD node.
///
/// [`Resource::path`] renders the request path relative to the client's base
/// URL, with every identifier percent-encoded as a single segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource<'a> {
    /// `/keygroup/{keygroup}`
    Keygroup {
        /// Keygroup name
        keygroup: &'a str,
    },
    /// `/keygroup/{keygroup}/items`
    Items {
        /// Keygroup name
        keygroup: &'a str,
    },
    /// `/keygroup/{keygroup}/items/{id}`
    Item {
        /// Keygroup name
        keygroup: &'a str,
        /// Item identifier
        id: &'a str,
    },
    /// `/keygroup/{keygroup}/replica`
    Replicas {
        /// Keygroup name
        keygroup: &'a str,
    },
    /// `/keygroup/{keygroup}/replica/{node}`
    Replica {
        /// Keygroup name
        keygroup: &'a str,
        /// Replica node identifier
        node: &'a str,
    },
    /// `/keygroup/{keygroup}/triggers`
    Triggers {
        /// Keygroup name
        keygroup: &'a str,
    },
    /// `/keygroup/{keygroup}/triggers/{trigger}`
    Trigger {
        /// Keygroup name
        keygroup: &'a str,
        /// Trigger node identifier
        trigger: &'a str,
    },
}

impl Resource<'_> {
    /// Request path for this resource, starting with `/`
    pub fn path(&self) -> String {
        match *self {
            Resource::Keygroup { keygroup } => {
                format!("/keygroup/{}", encode_segment(keygroup))
            }
            Resource::Items { keygroup } => {
                format!("/keygroup/{}/items", encode_segment(keygroup))
            }
            Resource::Item { keygroup, id } => format!(
                "/keygroup/{}/items/{}",
                encode_segment(keygroup),
                encode_segment(id)
            ),
            Resource::Replicas { keygroup } => {
                format!("/keygroup/{}/replica", encode_segment(keygroup))
            }
            Resource::Replica { keygroup, node } => format!(
                "/keygroup/{}/replica/{}",
                encode_segment(keygroup),
                encode_segment(node)
            ),
            Resource::Triggers { keygroup } => {
                format!("/keygroup/{}/triggers", encode_segment(keygroup))
            }
            Resource::Trigger { keygroup, trigger } => format!(
                "/keygroup/{}/triggers/{}",
                encode_segment(keygroup),
                encode_segment(trigger)
            ),
        }
    }
}
