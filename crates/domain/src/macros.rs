//! Macro for implementing Display and FromStr for status enums
//!
//! Status-like enums (order status, user role, log level, entity kind) are
//! stored and displayed as lowercase strings and parsed case-insensitively.
//!
//! # Example
//!
//! ```rust
//! use storefront_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum ShipmentState {
//!     Packed,
//!     InTransit,
//!     Delivered,
//! }
//!
//! impl_domain_status_conversions!(ShipmentState {
//!     Packed => "packed",
//!     InTransit => "in_transit",
//!     Delivered => "delivered",
//! });
//!
//! assert_eq!(ShipmentState::InTransit.to_string(), "in_transit");
//! assert_eq!("DELIVERED".parse::<ShipmentState>(), Ok(ShipmentState::Delivered));
//! ```

/// Implements Display and FromStr traits for status enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
