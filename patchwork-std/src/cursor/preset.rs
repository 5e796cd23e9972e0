//! Named walkable-key presets.

use std::borrow::Cow;
use strum::{AsRefStr, Display, EnumString};

/// Child-pointer names a [`find`](super::Cursor::find) may traverse into.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Walkable {
    /// Only these keys, in this order of preference.
    Keys(Vec<Cow<'static, str>>),
    /// Every enumerable key.
    Any,
    /// No key at all: only sequences are expanded.
    #[default]
    Nothing,
}

impl Walkable {
    /// An allow-list of keys.
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Walkable::Keys(keys.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if traversal into `key` is permitted.
    pub fn allows(&self, key: &str) -> bool {
        match self {
            Walkable::Keys(keys) => keys.iter().any(|k| k == key),
            Walkable::Any => true,
            Walkable::Nothing => false,
        }
    }
}

/// Built-in walkable presets, selected by name at cursor construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, Display, AsRefStr)]
pub enum Preset {
    /// Rendered component trees: `props`, `children`.
    #[strum(serialize = "react")]
    Component,
    /// Linked reconciler nodes: `child`, `return`, `alternate`.
    #[strum(serialize = "react-vdom")]
    Fiber,
    /// Walks nothing.
    #[default]
    #[strum(serialize = "none")]
    Empty,
}

impl Preset {
    /// Resolve a preset by name; unknown names select [`Preset::Empty`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// The keys this preset walks.
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            Preset::Component => &["props", "children"],
            Preset::Fiber => &["child", "return", "alternate"],
            Preset::Empty => &[],
        }
    }

    /// The preset as a [`Walkable`].
    pub fn walkable(self) -> Walkable {
        match self {
            Preset::Empty => Walkable::Nothing,
            preset => Walkable::keys(preset.keys().iter().copied()),
        }
    }
}
