//! Tri-state field updates for partial record edits.
//!
//! Update requests distinguish "leave the field alone" from "clear it" from
//! "set it to this value". Truthiness checks cannot: an empty-but-valid value
//! would silently turn into "leave alone".

/// Per-field update intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Leave the current value untouched.
    #[default]
    Keep,
    /// Set the field to absent.
    Clear,
    /// Overwrite with the given value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Applies the intent to an optional field.
    pub fn apply(self, field: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *field = None,
            Patch::Set(value) => *field = Some(value),
        }
    }

    /// The new value, if this patch sets one.
    pub fn into_set(self) -> Option<T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl Patch<String> {
    /// Apply to a required text field.
    ///
    /// `Clear` and blank values are rejected; the returned reason is meant
    /// to be prefixed with the field name by the caller.
    pub fn apply_text(self, field: &mut String) -> Result<(), &'static str> {
        match self {
            Patch::Keep => Ok(()),
            Patch::Clear => Err("cannot be cleared"),
            Patch::Set(value) => {
                let value = value.trim();
                if value.is_empty() {
                    return Err("must not be empty");
                }
                *field = value.to_string();
                Ok(())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Keep is expressed by omitting the field (skip_serializing_if);
        // a Keep that reaches the serializer degrades to null.
        match self {
            Patch::Set(value) => serializer.serialize_some(value),
            Patch::Clear | Patch::Keep => serializer.serialize_none(),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // An absent field never reaches this impl; serde(default) turns it
        // into Keep. Present-and-null means Clear.
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(inner) => Patch::Set(inner),
            None => Patch::Clear,
        })
    }
}

/// Partial edit of a principal's profile fields.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountUpdate {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Patch::is_keep")
    )]
    pub username: Patch<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Patch::is_keep")
    )]
    pub email: Patch<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Patch::is_keep")
    )]
    pub full_name: Patch<String>,
}

impl AccountUpdate {
    /// True when no field carries an update.
    pub fn is_noop(&self) -> bool {
        self.username.is_keep()
            && self.email.is_keep()
            && self.full_name.is_keep()
    }
}

/// Partial edit of a video's descriptive fields.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoUpdate {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Patch::is_keep")
    )]
    pub title: Patch<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Patch::is_keep")
    )]
    pub description: Patch<String>,
}

impl VideoUpdate {
    /// True when no field carries an update.
    pub fn is_noop(&self) -> bool {
        self.title.is_keep() && self.description.is_keep()
    }
}
