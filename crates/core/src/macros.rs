// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros shared by the domain types.

/// Generate a `Display` impl that maps enum variants to string literals.
///
/// Unit variants match directly; data-carrying variants use `(..)` to ignore fields.
///
/// ```ignore
/// crate::simple_display! {
///     MyEnum {
///         Foo => "foo",
///         Bar(..) => "bar",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident $(( $($ignore:tt)* ))? => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant $(( $($ignore)* ))? => $str, )+
                })
            }
        }
    };
}

/// Generate a test builder (struct + Default + setters + build).
///
/// All generated items are gated behind `#[cfg(any(test, feature = "test-support"))]`.
///
/// Field groups:
/// - `into { field: Type = default }`: setter takes `impl Into<Type>`
/// - `set { field: Type = default }`: setter takes `Type`
///
/// ```ignore
/// crate::builder! {
///     pub struct FooBuilder => Foo {
///         into { name: String = "test" }
///         set { count: u32 = 0 }
///     }
/// }
/// ```
#[macro_export]
macro_rules! builder {
    (
        pub struct $builder:ident => $target:ident {
            $(into {
                $( $into_field:ident : $into_ty:ty = $into_default:expr ),* $(,)?
            })?
            $(set {
                $( $set_field:ident : $set_ty:ty = $set_default:expr ),* $(,)?
            })?
        }
    ) => {
        #[cfg(any(test, feature = "test-support"))]
        pub struct $builder {
            $($( $into_field: $into_ty, )*)?
            $($( $set_field: $set_ty, )*)?
        }

        #[cfg(any(test, feature = "test-support"))]
        impl Default for $builder {
            fn default() -> Self {
                Self {
                    $($( $into_field: $into_default.into(), )*)?
                    $($( $set_field: $set_default, )*)?
                }
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $builder {
            $($(
                pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                    self.$into_field = v.into();
                    self
                }
            )*)?

            $($(
                pub fn $set_field(mut self, v: $set_ty) -> Self {
                    self.$set_field = v;
                    self
                }
            )*)?

            pub fn build(self) -> $target {
                $target {
                    $($( $into_field: self.$into_field, )*)?
                    $($( $set_field: self.$set_field, )*)?
                }
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $target {
            /// Create a builder with test defaults.
            pub fn builder() -> $builder {
                $builder::default()
            }
        }
    };
}
