//! Macros for declaring phase enums.

/// Generate a `Phase` implementation for a fieldless enum.
///
/// # Example
///
/// ```
/// use stagehand::phase_enum;
/// use stagehand::core::Phase;
///
/// phase_enum! {
///     pub enum Drawer {
///         Closed,
///         Sliding,
///         Open,
///     }
///     resting: [Closed, Open]
/// }
///
/// assert_eq!(Drawer::Sliding.name(), "Sliding");
/// assert!(!Drawer::Sliding.is_resting());
/// ```
#[macro_export]
macro_rules! phase_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(resting: [$($resting:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Phase for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            #[allow(unreachable_patterns)]
            fn is_resting(&self) -> bool {
                match self {
                    $($(Self::$resting => true,)*)?
                    _ => false,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::core::Phase::name(self))
            }
        }
    };
}
