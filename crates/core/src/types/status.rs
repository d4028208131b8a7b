//! Status and category enums for users, orders, and riders.
//!
//! All enums serialize as `snake_case` strings, matching both the JSON wire
//! format and the TEXT columns they are stored in. The Postgres impls go
//! through `Display`/`FromStr` so a bad row surfaces as a decode error
//! instead of a panic.

use serde::{Deserialize, Serialize};

/// Implement `sqlx` TEXT-column support for a string-like enum.
///
/// Relies on the enum's `Display` and `FromStr` implementations.
#[cfg(feature = "postgres")]
macro_rules! impl_pg_text_enum {
    ($name:ident) => {
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let s = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                s.parse::<Self>().map_err(Into::into)
            }
        }

        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(
                    &self.to_string(),
                    buf,
                )
            }
        }
    };
}

#[cfg(not(feature = "postgres"))]
macro_rules! impl_pg_text_enum {
    ($name:ident) => {};
}

/// Error returned when parsing a status string fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical `snake_case` string for this variant.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseStatusError::new($kind, s)),
                }
            }
        }

        impl_pg_text_enum!($name);
    };
}

string_enum! {
    /// Account role; gates route access.
    Role, "role" {
        Customer => "customer",
        Admin => "admin",
        Rider => "rider",
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Customer
    }
}

string_enum! {
    /// Order delivery lifecycle state.
    ///
    /// Transitions are enforced by [`OrderStatus::can_transition_to`]:
    ///
    /// ```text
    /// pending -> confirmed -> picked_up -> in_transit -> delivered
    ///     \----------\------------\------------\--> cancelled
    /// ```
    ///
    /// `delivered` and `cancelled` are terminal.
    OrderStatus, "order status" {
        Pending => "pending",
        Confirmed => "confirmed",
        PickedUp => "picked_up",
        InTransit => "in_transit",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

impl OrderStatus {
    /// Statuses in which an unassigned order is visible to riders.
    pub const CLAIMABLE: &'static [Self] = &[Self::Confirmed, Self::PickedUp, Self::InTransit];

    /// Whether this state admits no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(*self, Self::Delivered | Self::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// The lifecycle is a strict forward chain; `cancelled` is reachable
    /// from every non-terminal state. Setting a status to itself is not a
    /// transition and is rejected.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (*self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::PickedUp)
                | (Self::PickedUp, Self::InTransit)
                | (Self::InTransit, Self::Delivered)
        ) || (!self.is_terminal() && matches!(next, Self::Cancelled))
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

string_enum! {
    /// Order payment state.
    PaymentStatus, "payment status" {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
        Refunded => "refunded",
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

string_enum! {
    /// Accepted payment methods.
    PaymentMethod, "payment method" {
        CreditCard => "credit_card",
        DebitCard => "debit_card",
        Paypal => "paypal",
    }
}

string_enum! {
    /// Rider account state.
    RiderStatus, "rider status" {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
}

impl Default for RiderStatus {
    fn default() -> Self {
        Self::Active
    }
}

string_enum! {
    /// Rider vehicle type.
    VehicleType, "vehicle type" {
        Bicycle => "bicycle",
        Motorcycle => "motorcycle",
        Car => "car",
    }
}

string_enum! {
    /// Product gender category.
    Gender, "gender" {
        Men => "men",
        Women => "women",
        Unisex => "unisex",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_forward_chain() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(PickedUp));
        assert!(PickedUp.can_transition_to(InTransit));
        assert!(InTransit.can_transition_to(Delivered));
    }

    #[test]
    fn test_order_status_no_skipping() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(PickedUp));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Confirmed.can_transition_to(InTransit));
        assert!(!Confirmed.can_transition_to(Delivered));
    }

    #[test]
    fn test_order_status_no_backwards() {
        use OrderStatus::*;
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!InTransit.can_transition_to(PickedUp));
        assert!(!Delivered.can_transition_to(InTransit));
    }

    #[test]
    fn test_order_status_cancel_from_non_terminal() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(PickedUp.can_transition_to(Cancelled));
        assert!(InTransit.can_transition_to(Cancelled));
    }

    #[test]
    fn test_order_status_terminal_states() {
        use OrderStatus::*;
        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
        for next in OrderStatus::ALL {
            assert!(!Delivered.can_transition_to(*next));
            assert!(!Cancelled.can_transition_to(*next));
        }
    }

    #[test]
    fn test_order_status_self_transition_rejected() {
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(*status), "{status} -> {status}");
        }
    }

    #[test]
    fn test_claimable_statuses() {
        use OrderStatus::*;
        assert_eq!(OrderStatus::CLAIMABLE, &[Confirmed, PickedUp, InTransit]);
        assert!(!OrderStatus::CLAIMABLE.contains(&Pending));
    }

    #[test]
    fn test_roundtrip_display_from_str() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().expect("roundtrip");
            assert_eq!(parsed, *status);
        }
        for method in PaymentMethod::ALL {
            let parsed: PaymentMethod = method.as_str().parse().expect("roundtrip");
            assert_eq!(parsed, *method);
        }
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::PickedUp).expect("serialize");
        assert_eq!(json, "\"picked_up\"");
        let back: OrderStatus = serde_json::from_str("\"in_transit\"").expect("deserialize");
        assert_eq!(back, OrderStatus::InTransit);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("PENDING".parse::<OrderStatus>().is_err());
        assert!("scooter".parse::<VehicleType>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Role::default(), Role::Customer);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(RiderStatus::default(), RiderStatus::Active);
    }
}
