use std::marker::PhantomData;

/// Register a type-safe settings key.
///
/// # Example
/// ```rust
/// use mwp_state::register_setting_key;
///
/// register_setting_key!(pub const ACTIVE_CHAIN: String = "activeChain");
/// ```
#[macro_export]
macro_rules! register_setting_key {
    ($vis:vis const $name:ident: $ty:ty = $key:literal) => {
        $vis const $name: $crate::settings::Key<$ty> = $crate::settings::Key::new($key);
    };
}

/// Associates a storage name with a value type at compile time.
///
/// Use the [`register_setting_key!`](crate::register_setting_key) macro to create keys.
#[derive(Debug)]
pub struct Key<T> {
    pub(crate) name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> Key<T> {
    #[doc(hidden)]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The storage name, without any scope prefix.
    pub fn name(&self) -> &'static str {
        self.name
    }
}
