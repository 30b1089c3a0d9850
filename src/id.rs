//! Code for handling IDs

/// Define a cheaply cloneable string ID type.
///
/// IDs are compared exactly; callers trim user input before looking one up.
macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Clone,
            std::hash::Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            serde::Deserialize,
            Debug,
            serde::Serialize,
        )]
        /// An ID type (e.g. `ProductID`)
        pub struct $name(pub std::sync::Arc<str>);

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(std::sync::Arc::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(std::sync::Arc::from(s))
            }
        }

        impl $name {
            /// Create a new ID from a string slice
            pub fn new(id: &str) -> Self {
                $name(std::sync::Arc::from(id))
            }
        }
    };
}
pub(crate) use define_id_type;

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    define_id_type!(GenericID);

    #[test]
    fn test_id_lookup_by_str() {
        let map: IndexMap<GenericID, u32> = [("a".into(), 1), ("b".into(), 2)].into_iter().collect();
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(map.get("c"), None);
        assert_eq!(GenericID::new("a").to_string(), "a");
    }

    #[test]
    fn test_id_deserialize() {
        let id: GenericID = toml::from_str::<toml::Table>("id = \"x\"").unwrap()["id"]
            .clone()
            .try_into()
            .unwrap();
        assert_eq!(id, "x".into());
    }
}
