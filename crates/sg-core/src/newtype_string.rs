//! Name newtypes for stages and runs.
//!
//! Both end up as path components in the dataset store and the run ledger
//! (`<data_dir>/<stage>/<run_id>.parquet`), so both share one rule: non-empty,
//! no surrounding whitespace, no path separators, not `.` or `..`.

/// Why a raw string is not a usable name
pub(crate) fn name_problem(s: &str) -> Option<&'static str> {
    if s.is_empty() {
        Some("must not be empty")
    } else if s.trim() != s {
        Some("must not have leading or trailing whitespace")
    } else if s.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if s == "." || s == ".." {
        Some("must not be a relative path component")
    } else {
        None
    }
}

/// Define a validated string newtype usable as a path component.
///
/// Generates the struct (serde-transparent, deserialization goes through
/// `TryFrom<String>`), `new` (panics on bad input), `try_new`, `as_str`,
/// `into_inner`, plus `Display`, `Deref<Target = str>`, `Borrow<str>` and
/// comparisons against `str`.
macro_rules! define_newtype_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        $vis struct $Name(String);

        impl $Name {
            /// Wrap a name known to be valid. Panics otherwise; use
            /// [`try_new`](Self::try_new) for anything user supplied.
            pub fn new(name: impl Into<String>) -> Self {
                match Self::try_new(name) {
                    Some(valid) => valid,
                    None => panic!(concat!("invalid ", stringify!($Name))),
                }
            }

            /// Wrap a name, or `None` when it is not a usable path component
            pub fn try_new(name: impl Into<String>) -> Option<Self> {
                let name = name.into();
                match $crate::newtype_string::name_problem(&name) {
                    None => Some(Self(name)),
                    Some(_) => None,
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $Name {
            type Error = String;
            fn try_from(name: String) -> Result<Self, Self::Error> {
                match $crate::newtype_string::name_problem(&name) {
                    None => Ok(Self(name)),
                    Some(problem) => Err(format!(
                        concat!(stringify!($Name), " '{}' {}"),
                        name, problem
                    )),
                }
            }
        }

        impl TryFrom<&str> for $Name {
            type Error = String;
            fn try_from(name: &str) -> Result<Self, Self::Error> {
                Self::try_from(name.to_string())
            }
        }

        impl From<$Name> for String {
            fn from(name: $Name) -> String {
                name.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

pub(crate) use define_newtype_string;
