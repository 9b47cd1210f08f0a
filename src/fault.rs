// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Human-readable fault code lookup.
//!
//! When the heater reports [`ControlMode::Error`], the setpoint byte
//! carries a fault code. Code meanings vary between vendors and are not
//! part of the wire protocol, so the mapping is injected configuration:
//! the host populates a [`FaultDictionary`] once and passes it by
//! reference wherever descriptions are rendered. There is no ambient
//! global cache.
//!
//! [`ControlMode::Error`]: crate::types::ControlMode::Error

use std::collections::HashMap;

use crate::error::ParseError;

/// Per-language fault code descriptions.
///
/// # Examples
///
/// ```
/// use dieselheat_ble::fault::FaultDictionary;
///
/// let faults = FaultDictionary::new("en")
///     .with_language("en", [(1, "Supply voltage out of range".to_string())])
///     .with_language("de", [(1, "Versorgungsspannung außerhalb des Bereichs".to_string())]);
///
/// assert_eq!(faults.describe(1), Some("Supply voltage out of range"));
/// assert_eq!(
///     faults.describe_in("de", 1),
///     Some("Versorgungsspannung außerhalb des Bereichs")
/// );
/// // Unlisted languages fall back to the default.
/// assert_eq!(faults.describe_in("fr", 1), Some("Supply voltage out of range"));
/// assert_eq!(faults.describe(99), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FaultDictionary {
    languages: HashMap<String, HashMap<u8, String>>,
    default_language: String,
}

impl FaultDictionary {
    /// Creates an empty dictionary with the given default language.
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            languages: HashMap::new(),
            default_language: default_language.into(),
        }
    }

    /// Adds or replaces the code table for one language.
    #[must_use]
    pub fn with_language(
        mut self,
        language: impl Into<String>,
        entries: impl IntoIterator<Item = (u8, String)>,
    ) -> Self {
        self.languages
            .insert(language.into(), entries.into_iter().collect());
        self
    }

    /// Loads a dictionary from JSON of the form
    /// `{"en": {"1": "Supply voltage out of range"}}`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidFaultTable`] if the JSON does not
    /// decode or a code key is not an integer 0-255.
    pub fn from_json(default_language: impl Into<String>, json: &str) -> Result<Self, ParseError> {
        let raw: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)
            .map_err(|err| ParseError::InvalidFaultTable(err.to_string()))?;

        let mut dictionary = Self::new(default_language);
        for (language, entries) in raw {
            let mut table = HashMap::with_capacity(entries.len());
            for (code, text) in entries {
                let code: u8 = code.parse().map_err(|_| {
                    ParseError::InvalidFaultTable(format!("bad fault code key: {code:?}"))
                })?;
                table.insert(code, text);
            }
            dictionary.languages.insert(language, table);
        }
        Ok(dictionary)
    }

    /// Returns the default language.
    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Returns the description for a code in the default language.
    #[must_use]
    pub fn describe(&self, code: u8) -> Option<&str> {
        self.describe_in(&self.default_language, code)
    }

    /// Returns the description for a code in the given language, falling
    /// back to the default language when the language or the code is not
    /// listed there.
    #[must_use]
    pub fn describe_in(&self, language: &str, code: u8) -> Option<&str> {
        self.languages
            .get(language)
            .and_then(|table| table.get(&code))
            .or_else(|| {
                if language == self.default_language {
                    None
                } else {
                    self.languages
                        .get(&self.default_language)
                        .and_then(|table| table.get(&code))
                }
            })
            .map(String::as_str)
    }
}
