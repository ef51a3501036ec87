//! `define_port_error!` generates a `thiserror` enum plus one snake-case
//! constructor per variant, so adapters can write `Error::query(msg)`.

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
        pub enum ClinicPortError {
            Offline => "clinic store offline",
            Rejected { reason: String } => "rejected: {reason}",
            Backlog { pending: u32 } => "backlog of {pending}",
            Stale { table: String, age_secs: u64 } => "{table} is {age_secs}s stale",
        }
    }

    #[test]
    fn unit_variants_get_plain_constructors() {
        assert_eq!(ClinicPortError::offline(), ClinicPortError::Offline);
        assert_eq!(ClinicPortError::offline().to_string(), "clinic store offline");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = ClinicPortError::rejected("duplicate");
        assert_eq!(err.to_string(), "rejected: duplicate");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = ClinicPortError::backlog(3_u32);
        assert_eq!(err, ClinicPortError::Backlog { pending: 3 });
    }

    #[test]
    fn mixed_fields_follow_declaration_order() {
        let err = ClinicPortError::stale("consultations", 90_u64);
        assert_eq!(err.to_string(), "consultations is 90s stale");
    }
}
