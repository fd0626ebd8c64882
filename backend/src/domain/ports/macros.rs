//! Helper macro for declaring port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! fields accept anything convertible into the declared type.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum AdapterError {
            Unreachable { message: String } => "unreachable: {message}",
            Timeout { millis: u64 } => "timed out after {millis}ms",
            Rejected { message: String, status: u16 } => "rejected: {message} ({status})",
            Closed => "closed",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = AdapterError::unreachable("db-1");
        assert_eq!(err.to_string(), "unreachable: db-1");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = AdapterError::timeout(250_u64);
        assert_eq!(err.to_string(), "timed out after 250ms");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = AdapterError::rejected("constraint", 23_u16);
        assert_eq!(err.to_string(), "rejected: constraint (23)");
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(AdapterError::closed(), AdapterError::Closed);
    }
}
