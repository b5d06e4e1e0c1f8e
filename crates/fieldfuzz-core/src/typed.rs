//! Bridge between Rust types and the dynamic record model.
//!
//! [`Shaped`] yields the static field-descriptor table of a type and
//! [`FromFieldValue`] turns a produced [`FieldValue`] back into it. The
//! [`record!`](crate::record) macro implements both for a plain struct.

use crate::error::{Error, Result};
use crate::types::FieldType;
use crate::value::FieldValue;

/// Types with a statically known field type descriptor.
pub trait Shaped {
    fn field_type() -> FieldType;
}

/// Types that can be rebuilt from a dynamic value.
pub trait FromFieldValue: Sized {
    fn from_field_value(value: FieldValue) -> Result<Self>;
}

fn unexpected(expected: &str, value: &FieldValue) -> Error {
    Error::Conversion(format!("expected {expected}, found {}", value.kind()))
}

macro_rules! signed {
    ($($ty:ty => $bits:expr),* $(,)?) => {$(
        impl Shaped for $ty {
            fn field_type() -> FieldType {
                FieldType::Int { bits: $bits }
            }
        }

        impl FromFieldValue for $ty {
            fn from_field_value(value: FieldValue) -> Result<Self> {
                match value {
                    FieldValue::Int(raw) => <$ty>::try_from(raw)
                        .map_err(|_| Error::Conversion(format!("{raw} out of range for {}", stringify!($ty)))),
                    other => Err(unexpected(stringify!($ty), &other)),
                }
            }
        }
    )*};
}

macro_rules! unsigned {
    ($($ty:ty => $bits:expr),* $(,)?) => {$(
        impl Shaped for $ty {
            fn field_type() -> FieldType {
                FieldType::UInt { bits: $bits }
            }
        }

        impl FromFieldValue for $ty {
            fn from_field_value(value: FieldValue) -> Result<Self> {
                match value {
                    FieldValue::UInt(raw) => <$ty>::try_from(raw)
                        .map_err(|_| Error::Conversion(format!("{raw} out of range for {}", stringify!($ty)))),
                    other => Err(unexpected(stringify!($ty), &other)),
                }
            }
        }
    )*};
}

signed!(i8 => 8, i16 => 16, i32 => 32, i64 => 64);
unsigned!(u8 => 8, u16 => 16, u32 => 32, u64 => 64);

impl Shaped for bool {
    fn field_type() -> FieldType {
        FieldType::Bool
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Bool(raw) => Ok(raw),
            other => Err(unexpected("bool", &other)),
        }
    }
}

impl Shaped for f64 {
    fn field_type() -> FieldType {
        FieldType::Float
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Float(raw) => Ok(raw),
            other => Err(unexpected("f64", &other)),
        }
    }
}

impl Shaped for String {
    fn field_type() -> FieldType {
        FieldType::Text
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Text(raw) => Ok(raw),
            other => Err(unexpected("string", &other)),
        }
    }
}

impl<T: Shaped> Shaped for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::list(T::field_type())
    }
}

impl<T: FromFieldValue> FromFieldValue for Vec<T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::List(items) => items.into_iter().map(T::from_field_value).collect(),
            FieldValue::Bytes(bytes) => bytes
                .into_iter()
                .map(|byte| T::from_field_value(FieldValue::UInt(u64::from(byte))))
                .collect(),
            other => Err(unexpected("list", &other)),
        }
    }
}

impl<T: Shaped> Shaped for Option<T> {
    fn field_type() -> FieldType {
        FieldType::optional(T::field_type())
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_field_value(other).map(Some),
        }
    }
}

/// Declare a struct together with its [`Shaped`] and [`FromFieldValue`]
/// implementations.
///
/// ```
/// fieldfuzz_core::record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Person {
///         pub name: String,
///         pub age: i64,
///     }
/// }
///
/// use fieldfuzz_core::Shaped;
/// let shape = Person::field_type();
/// assert_eq!(shape.as_record().map(|r| r.fields.len()), Some(2));
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($fvis:vis $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($fvis $field: $ty),*
        }

        impl $crate::Shaped for $name {
            fn field_type() -> $crate::FieldType {
                $crate::FieldType::Record(
                    $crate::RecordType::builder(stringify!($name))
                        $(.field(stringify!($field), <$ty as $crate::Shaped>::field_type()))*
                        .build(),
                )
            }
        }

        impl $crate::FromFieldValue for $name {
            fn from_field_value(
                value: $crate::FieldValue,
            ) -> ::std::result::Result<Self, $crate::Error> {
                #[allow(unused_mut, unused_variables)]
                let mut record = value.into_record()?;
                Ok(Self {
                    $($field: <$ty as $crate::FromFieldValue>::from_field_value(
                        record.take(stringify!($field))?,
                    )?),*
                })
            }
        }
    };
}
