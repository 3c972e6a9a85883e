//! Newtype IDs for type-safe entity references.
//!
//! Use the `entity_id!` macro to create ID wrappers that prevent mixing
//! identifiers from different tables (an `OrderId` is not a `ProductId`,
//! even though both are serial integers in Postgres).

/// Macro to define a type-safe ID wrapper around `i32`.
///
/// Generated types carry:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Display`
/// - `new()` / `get()` accessors and `From` conversions in both directions
/// - `sqlx` `Type`/`Encode`/`Decode` as `INTEGER` (with the `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use tamarind_core::entity_id;
/// entity_id!(WarehouseId);
///
/// let id = WarehouseId::new(7);
/// assert_eq!(id.get(), 7);
/// ```
#[macro_export]
macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database ID.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn get(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Entity IDs used across the workspace
entity_id!(UserId);
entity_id!(AdminUserId);
entity_id!(ProductId);
entity_id!(OrderId);
entity_id!(OrderItemId);
entity_id!(CouponId);
entity_id!(ShippingZoneId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let user = UserId::new(1);
        let order = OrderId::new(1);
        // Same raw value, different types; equality only within a type.
        assert_eq!(user.get(), order.get());
        assert_eq!(user, UserId::from(1));
    }

    #[test]
    fn display_and_from_str_round_trip() {
        let id = ProductId::new(42);
        let parsed: ProductId = id.to_string().parse().expect("parses back");
        assert_eq!(parsed, id);
    }

    #[test]
    fn serde_is_transparent() {
        let id = CouponId::new(9);
        let json = serde_json::to_string(&id).expect("serializes");
        assert_eq!(json, "9");
    }
}
