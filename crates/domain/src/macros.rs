//! Macros for the closed vocabularies exchanged with the Ping APIs
//!
//! Every status or code the servers send is a fixed set of strings. These
//! macros turn such a set into an enum that renders its wire form, parses it
//! case-insensitively and rejects anything else at the boundary.
//!
//! # Example
//!
//! ```rust
//! use pingintel_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum UploadState {
//!     Pending,
//!     Done,
//! }
//!
//! impl_domain_status_conversions!(UploadState {
//!     Pending => "PENDING",
//!     Done => "DONE",
//! });
//!
//! assert_eq!("pending".parse::<UploadState>().unwrap(), UploadState::Pending);
//! assert_eq!(UploadState::Done.to_string(), "DONE");
//! ```

/// Implements Display, FromStr and string conversions for status enums
///
/// This macro generates:
/// - `as_str()` returning the wire representation
/// - Display trait: writes the wire representation unchanged
/// - FromStr trait: parses case-insensitive strings to enum variants
/// - `TryFrom<String>` / `From<Self> for String`, so the enum can be used with
///   `#[serde(try_from = "String", into = "String")]`
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire strings
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire representation of this value.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }

        impl TryFrom<String> for $enum_name {
            type Error = String;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$enum_name> for String {
            fn from(value: $enum_name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

/// Declares a coded vocabulary: an enum whose variants carry a short wire code
/// and a human readable description.
///
/// Generates the enum itself, `code()`, `description()`, `ALL` and the same
/// conversions as [`impl_domain_status_conversions!`] keyed on the code.
#[macro_export]
macro_rules! define_coded_vocabulary {
    (
        $(#[$meta:meta])*
        $vis:vis enum $enum_name:ident {
            $($variant:ident => ($code:expr, $description:expr)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        $vis enum $enum_name {
            $(
                #[doc = $description]
                $variant,
            )+
        }

        impl $enum_name {
            /// Every value of the vocabulary, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Short code sent on the wire.
            pub const fn code(&self) -> &'static str {
                self.as_str()
            }

            /// Human readable description of the code.
            pub const fn description(&self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)+
                }
            }
        }

        $crate::impl_domain_status_conversions!($enum_name {
            $($variant => $code,)+
        });
    };
}
