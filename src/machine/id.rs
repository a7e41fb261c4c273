use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

/// The integer type backing node and link ids.
pub type DefaultIdType = u32;

macro_rules! impl_id_type {
    ($($(#[$meta:meta])* $name:ident => $prefix:literal),*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub(crate) DefaultIdType);

            impl $name {
                /// Returns the raw integer behind the id.
                pub fn inner(self) -> DefaultIdType {
                    self.0
                }
            }

            impl Debug for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, concat!($prefix, "{}"), self.0)
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    Debug::fmt(self, f)
                }
            }

            impl From<DefaultIdType> for $name {
                fn from(n: DefaultIdType) -> Self {
                    $name(n)
                }
            }
        )*
    }
}

impl_id_type!(
    /// Identifies a [`Node`](super::Node) within its machine. Ids are handed out in increasing
    /// order and never reused, so an id stays valid until its node is deleted.
    NodeId => "N",
    /// Identifies a [`Link`](super::Link) within its machine.
    LinkId => "L"
);

/// Hands out fresh ids for one kind of entity.
#[derive(Clone, Debug, Default)]
pub(crate) struct IdCounter(DefaultIdType);

impl IdCounter {
    pub(crate) fn next<I: From<DefaultIdType>>(&mut self) -> I {
        let id = self.0;
        self.0 += 1;
        I::from(id)
    }
}
