/// A single cell of a virtual list.
///
/// A slot starts out `Unfetched` and is replaced wholesale by a `Fetched` slot once its value
/// arrives. A fetched value that happens to equal the placeholder is still distinguishable from
/// an unfetched slot.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Slot<T> {
    Unfetched,
    Fetched(T),
}

impl<T> Slot<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Fetched(v) => Some(v),
            Self::Unfetched => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Fetched(v) => Some(v),
            Self::Unfetched => None,
        }
    }

    /// Returns the fetched value, or `placeholder` if the slot has not been fetched yet.
    pub fn value_or<'a>(&'a self, placeholder: &'a T) -> &'a T {
        self.value().unwrap_or(placeholder)
    }

    pub(crate) fn holds(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.value() == Some(item)
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::Unfetched
    }
}

impl<T> From<T> for Slot<T> {
    fn from(value: T) -> Self {
        Self::Fetched(value)
    }
}
