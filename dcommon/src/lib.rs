//! Shared identifiers and small utility types for the draftboard workspace crates.
//!
//! ```rust
//! use dcommon::{FavoriteId, ImageRef, SessionId};
//!
//! let session = SessionId::from("session-1");
//! let image = ImageRef::new("/static/generated/abc.png");
//! let favorite = FavoriteId::from("42");
//!
//! assert_eq!(session.as_str(), "session-1");
//! assert_eq!(image.to_string(), "/static/generated/abc.png");
//! assert_eq!(favorite.as_str(), "42");
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use dcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Opaque identifier newtypes shared across crates.
    //!
    //! Identifiers are handed out by the remote service and never interpreted locally.
    //!
    //! ```rust
    //! use dcommon::{ImageRef, SessionId};
    //!
    //! let session = SessionId::new("b2f1");
    //! let image = ImageRef::from("data:image/png;base64,AAAA");
    //!
    //! assert_eq!(session.to_string(), "b2f1");
    //! assert!(image.as_str().starts_with("data:"));
    //! ```

    use std::fmt::{Display, Formatter};

    macro_rules! opaque_id {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }

                pub fn into_inner(self) -> String {
                    self.0
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    self.0.as_str()
                }
            }
        };
    }

    opaque_id!(
        /// Server-issued conversation session identifier.
        SessionId
    );

    opaque_id!(
        /// Renderable reference to a generated image (URL or data URI).
        ImageRef
    );

    opaque_id!(
        /// Server-issued favorite record identifier.
        FavoriteId
    );

    opaque_id!(MessageId);
}

pub mod registry {
    //! Generic registry map wrapper used by per-element registries.
    //!
    //! ```rust
    //! use dcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
            self.items.retain(keep);
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{FavoriteId, ImageRef, MessageId, SessionId};
pub use future::BoxFuture;
pub use registry::Registry;
