//! Profile registry: language profiles loaded from embedded TOML configs.
//!
//! Each `.toml` file in `packages/locate/profiles/` is baked into the binary
//! at compile time via [`include_str!`]. Adding a language is a matter of
//! writing a new TOML file and adding it to the list below. Extra
//! definitions (e.g. from a pipeline config file) may replace built-in
//! profiles by name.

use std::collections::BTreeMap;

use unicode_normalization::UnicodeNormalization as _;

use crate::LocateError;
use crate::profile::{LanguageProfile, ProfileDefinition, parse_profile_toml};

/// TOML configs embedded at compile time.
const PROFILE_TOMLS: &[(&str, &str)] = &[
    ("english", include_str!("../profiles/english.toml")),
    ("french", include_str!("../profiles/french.toml")),
    ("spanish", include_str!("../profiles/spanish.toml")),
    ("portuguese", include_str!("../profiles/portuguese.toml")),
];

/// Returns the built-in profile definitions, parsed from embedded TOML.
///
/// # Errors
///
/// Returns [`LocateError::Toml`] if an embedded config is malformed.
pub fn builtin_definitions() -> Result<Vec<ProfileDefinition>, LocateError> {
    PROFILE_TOMLS
        .iter()
        .map(|(name, toml)| parse_profile_toml(name, toml))
        .collect()
}

/// Normalizes a language name for lookup.
///
/// Metadata sheets and file systems disagree on Unicode normalization
/// (`Français` may arrive composed or decomposed), so names are compared in
/// NFC and without case.
#[must_use]
pub fn lookup_key(language: &str) -> String {
    language.trim().nfc().collect::<String>().to_lowercase()
}

/// Immutable mapping from language names (and aliases) to profiles.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<LanguageProfile>,
    by_name: BTreeMap<String, usize>,
}

impl ProfileRegistry {
    /// Builds a registry from the embedded profiles.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError`] if an embedded profile fails to parse or
    /// compile.
    pub fn builtin() -> Result<Self, LocateError> {
        Self::from_definitions(builtin_definitions()?)
    }

    /// Builds a registry from the embedded profiles, with `overrides`
    /// replacing any built-in profile of the same name and adding the rest.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError`] if any profile fails to compile or two
    /// profiles claim the same name or alias.
    pub fn builtin_with(overrides: Vec<ProfileDefinition>) -> Result<Self, LocateError> {
        let mut definitions = builtin_definitions()?;
        for definition in overrides {
            let key = lookup_key(&definition.name);
            definitions.retain(|d| lookup_key(&d.name) != key);
            definitions.push(definition);
        }
        Self::from_definitions(definitions)
    }

    /// Builds a registry from explicit definitions.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError`] if any profile fails to compile or two
    /// profiles claim the same name or alias.
    pub fn from_definitions(definitions: Vec<ProfileDefinition>) -> Result<Self, LocateError> {
        let mut registry = Self::default();

        for definition in definitions {
            let profile = LanguageProfile::compile(definition)?;
            let index = registry.profiles.len();

            let aliases = profile.aliases().iter().map(String::as_str);
            for name in std::iter::once(profile.name()).chain(aliases) {
                if registry.by_name.insert(lookup_key(name), index).is_some() {
                    return Err(LocateError::DuplicateLanguage(name.to_owned()));
                }
            }

            log::trace!("Registered language profile '{}'", profile.name());
            registry.profiles.push(profile);
        }

        Ok(registry)
    }

    /// Looks up the profile for `language` (name or alias).
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::UnknownLanguage`] if no profile matches.
    pub fn get(&self, language: &str) -> Result<&LanguageProfile, LocateError> {
        self.by_name
            .get(&lookup_key(language))
            .map(|&i| &self.profiles[i])
            .ok_or_else(|| LocateError::UnknownLanguage(language.to_owned()))
    }

    /// All registered profiles, in registration order.
    #[must_use]
    pub fn profiles(&self) -> &[LanguageProfile] {
        &self.profiles
    }
}
