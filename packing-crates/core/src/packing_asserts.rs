//! Assertions grouped by how expensive they are to check. Only the assertions up to the compiled
//! level run: the simple ones always, the moderate ones in tests or with the `debug-checks`
//! feature, and the advanced and extreme ones only when the level below is raised by hand.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub(crate) const PACKING_ASSERT_LEVEL_DEFINITION: u8 = PACKING_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub(crate) const PACKING_ASSERT_LEVEL_DEFINITION: u8 = PACKING_ASSERT_MODERATE;

pub(crate) const PACKING_ASSERT_SIMPLE: u8 = 1;
pub(crate) const PACKING_ASSERT_MODERATE: u8 = 2;
pub(crate) const PACKING_ASSERT_ADVANCED: u8 = 3;
pub(crate) const PACKING_ASSERT_EXTREME: u8 = 4;

macro_rules! print_packing_assert_warning_message {
    () => {
        if $crate::packing_asserts::PACKING_ASSERT_LEVEL_DEFINITION
            >= $crate::packing_asserts::PACKING_ASSERT_ADVANCED
        {
            log::warn!(
                "The packing assert level is {}; expensive consistency checks slow down propagation",
                $crate::packing_asserts::PACKING_ASSERT_LEVEL_DEFINITION
            );
        }
    };
}

macro_rules! packing_assert_at_level {
    ($level:ident, $($arg:tt)*) => {
        if $crate::packing_asserts::PACKING_ASSERT_LEVEL_DEFINITION
            >= $crate::packing_asserts::$level
        {
            assert!($($arg)*);
        }
    };
}

macro_rules! packing_assert_simple {
    ($($arg:tt)*) => {
        $crate::packing_asserts::packing_assert_at_level!(PACKING_ASSERT_SIMPLE, $($arg)*)
    };
}

macro_rules! packing_assert_moderate {
    ($($arg:tt)*) => {
        $crate::packing_asserts::packing_assert_at_level!(PACKING_ASSERT_MODERATE, $($arg)*)
    };
}

macro_rules! packing_assert_advanced {
    ($($arg:tt)*) => {
        $crate::packing_asserts::packing_assert_at_level!(PACKING_ASSERT_ADVANCED, $($arg)*)
    };
}

macro_rules! packing_assert_extreme {
    ($($arg:tt)*) => {
        $crate::packing_asserts::packing_assert_at_level!(PACKING_ASSERT_EXTREME, $($arg)*)
    };
}

pub(crate) use packing_assert_advanced;
pub(crate) use packing_assert_at_level;
pub(crate) use packing_assert_extreme;
pub(crate) use packing_assert_moderate;
pub(crate) use packing_assert_simple;
pub(crate) use print_packing_assert_warning_message;
