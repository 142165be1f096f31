#![forbid(unsafe_code)]

//! Effective text direction of the editing surface.
//!
//! A host exposes direction through several attributes that can change at
//! any time (an app-level locale toggle, a `dir` attribute on the editor
//! element, a `lang` on the document root). [`DirectionHints`] snapshots
//! them and [`DirectionHints::resolve`] applies the precedence rules:
//!
//! 1. The surface's computed direction, the document `dir`, or the root
//!    element `dir` being `rtl` wins outright.
//! 2. Otherwise the first non-empty `lang` (surface, then root) is checked
//!    against [`RTL_LANGUAGES`] by prefix.
//! 3. Otherwise left-to-right.

/// Language code prefixes treated as right-to-left.
pub const RTL_LANGUAGES: [&str; 6] = ["ar", "he", "fa", "ur", "ps", "sd"];

/// A text direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextDirection {
    /// Left-to-right.
    #[default]
    Ltr,
    /// Right-to-left.
    Rtl,
}

impl TextDirection {
    /// Parse a `dir` attribute or computed `direction` value.
    ///
    /// Only `ltr` and `rtl` are recognised (case-insensitive); `auto` and
    /// anything else yield `None`.
    #[must_use]
    pub fn from_attr(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("rtl") {
            Some(Self::Rtl)
        } else if value.eq_ignore_ascii_case("ltr") {
            Some(Self::Ltr)
        } else {
            None
        }
    }

    /// Whether this is right-to-left.
    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }
}

/// Whether a language tag is written right-to-left.
///
/// Matches by prefix, so `ar-EG` and `fa_IR` are both right-to-left.
#[must_use]
pub fn is_rtl_language(lang: &str) -> bool {
    let lang = lang.trim().to_ascii_lowercase();
    !lang.is_empty() && RTL_LANGUAGES.iter().any(|code| lang.starts_with(code))
}

/// Snapshot of the direction-bearing attributes on the editing surface and
/// the document root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionHints {
    /// Computed `direction` of the editor element (after CSS cascade).
    pub surface_direction: Option<TextDirection>,
    /// `lang` attribute of the editor element.
    pub surface_lang: Option<String>,
    /// `dir` of the document.
    pub document_dir: Option<TextDirection>,
    /// `dir` attribute of the root element.
    pub root_dir: Option<TextDirection>,
    /// `lang` attribute of the root element.
    pub root_lang: Option<String>,
}

impl DirectionHints {
    /// Hints for a plain left-to-right surface.
    #[must_use]
    pub fn ltr() -> Self {
        Self::default()
    }

    /// Hints for a surface whose computed direction is right-to-left.
    #[must_use]
    pub fn rtl() -> Self {
        Self {
            surface_direction: Some(TextDirection::Rtl),
            ..Self::default()
        }
    }

    /// Set the surface `lang`.
    #[must_use]
    pub fn with_surface_lang(mut self, lang: impl Into<String>) -> Self {
        self.surface_lang = Some(lang.into());
        self
    }

    /// Set the root element `lang`.
    #[must_use]
    pub fn with_root_lang(mut self, lang: impl Into<String>) -> Self {
        self.root_lang = Some(lang.into());
        self
    }

    /// Set the root element `dir`.
    #[must_use]
    pub fn with_root_dir(mut self, dir: TextDirection) -> Self {
        self.root_dir = Some(dir);
        self
    }

    /// Resolve the effective direction.
    #[must_use]
    pub fn resolve(&self) -> TextDirection {
        let explicit_rtl = [self.surface_direction, self.document_dir, self.root_dir]
            .into_iter()
            .flatten()
            .any(TextDirection::is_rtl);
        if explicit_rtl {
            return TextDirection::Rtl;
        }

        let lang = [self.surface_lang.as_deref(), self.root_lang.as_deref()]
            .into_iter()
            .flatten()
            .find(|lang| !lang.trim().is_empty())
            .unwrap_or("");
        if is_rtl_language(lang) {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        }
    }
}
