//! Snowflake identifiers
//!
//! Platform identifiers are opaque 64-bit snowflakes. Each kind gets its own
//! newtype so a role id can never be passed where a member id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake_id!(
    /// Guild role identifier
    RoleId
);
snowflake_id!(
    /// Guild member (user) identifier
    MemberId
);
snowflake_id!(
    /// Text channel identifier
    ChannelId
);
snowflake_id!(
    /// Channel message identifier
    MessageId
);
