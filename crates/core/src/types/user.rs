//! Customer profile as returned by the profile endpoint.

use serde::{Deserialize, Serialize};

use crate::{Price, UserId};

/// Server-owned customer record.
///
/// Cached in memory only; re-fetched on demand and discarded on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub f_name: Option<String>,
    #[serde(default)]
    pub l_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub order_count: u32,
    #[serde(default)]
    pub wishlist_count: u32,
    #[serde(default)]
    pub wallet_balance: Option<Price>,
    #[serde(default)]
    pub loyalty_point: Option<i64>,
    #[serde(default)]
    pub ref_code: Option<String>,
}

impl UserProfile {
    /// First and last name joined, skipping missing parts.
    #[must_use]
    pub fn full_name(&self) -> String {
        [self.f_name.as_deref(), self.l_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
