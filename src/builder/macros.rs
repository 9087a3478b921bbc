//! Macros for terse state declarations.

/// Build a [`FlagOverrides`](crate::core::FlagOverrides) from `Flag = value`
/// pairs.
///
/// # Example
///
/// ```
/// use record_state::core::Flag;
/// use record_state::flags;
///
/// let overrides = flags!(IsDeleted = true, IsLoaded = true, IsDirty = true);
///
/// assert_eq!(overrides.get(Flag::IsDeleted), Some(true));
/// assert_eq!(overrides.get(Flag::IsNew), None);
/// ```
#[macro_export]
macro_rules! flags {
    ($($flag:ident = $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut overrides = $crate::core::FlagOverrides::new();
        $(
            overrides.set($crate::core::Flag::$flag, $value);
        )*
        overrides
    }};
}

#[cfg(test)]
mod tests {
    use crate::core::Flag;

    #[test]
    fn flags_macro_sets_listed_flags() {
        let overrides = flags!(IsSaving = true, IsValid = false);

        assert_eq!(overrides.get(Flag::IsSaving), Some(true));
        assert_eq!(overrides.get(Flag::IsValid), Some(false));
        assert_eq!(overrides.get(Flag::IsLoaded), None);
    }

    #[test]
    fn flags_macro_accepts_empty_input() {
        let overrides = flags!();
        assert_eq!(overrides.missing().count(), 8);
    }
}
