//! # Records and Collections
//!
//! Every entity lives in its own named collection and is keyed by its `id`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Collection   │ Record type    │ Key                                    │
//! │  ───────────  │ ────────────── │ ─────────────────────────────────────  │
//! │  settings     │ StoreSettings  │ "settings" (singleton)                 │
//! │  users        │ User           │ user id                                │
//! │  products     │ Product        │ product id                             │
//! │  sales        │ Sale           │ invoice number "0001"                  │
//! │  returns      │ ReturnRecord   │ return id                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is generic over [`Record`]; it never needs to know more about a
//! record than its collection and identifier.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{Product, ReturnRecord, Sale, StoreSettings, User};

/// A named set of records of one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Settings,
    Users,
    Products,
    Sales,
    Returns,
}

impl Collection {
    /// Every collection, in backup order.
    pub const ALL: [Collection; 5] = [
        Collection::Settings,
        Collection::Users,
        Collection::Products,
        Collection::Sales,
        Collection::Returns,
    ];

    /// Storage name of the collection.
    pub const fn name(&self) -> &'static str {
        match self {
            Collection::Settings => "settings",
            Collection::Users => "users",
            Collection::Products => "products",
            Collection::Sales => "sales",
            Collection::Returns => "returns",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown collection: {}", s))
    }
}

/// An entity that can be stored in a collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + Unpin {
    /// Collection the record belongs to.
    const COLLECTION: Collection;

    /// Unique identifier within the collection.
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($ty:ty, $collection:expr) => {
        impl Record for $ty {
            const COLLECTION: Collection = $collection;

            #[inline]
            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_record!(StoreSettings, Collection::Settings);
impl_record!(User, Collection::Users);
impl_record!(Product, Collection::Products);
impl_record!(Sale, Collection::Sales);
impl_record!(ReturnRecord, Collection::Returns);
