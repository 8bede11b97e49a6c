//! Bundled shipping personas for generated orders.
//!
//! The address book is a YAML document mapping a persona key to a shipping
//! address. It is loaded once at startup; chaos orders draw a random
//! persona from it per submission.

use std::collections::BTreeMap;
use std::path::Path;

use driftwood_core::ShippingAddress;
use rand::seq::IndexedRandom;
use thiserror::Error;

/// Errors that can occur while loading the address book.
#[derive(Debug, Error)]
pub enum AddressBookError {
    /// The file could not be read.
    #[error("Failed to read address book: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid persona map.
    #[error("Failed to parse address book: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file parsed but contains no personas.
    #[error("Address book contains no personas")]
    Empty,
}

/// A named shipping destination drawn for generated orders.
#[derive(Debug, Clone)]
pub struct Persona {
    /// The persona key from the YAML document.
    pub name: String,
    pub address: ShippingAddress,
}

/// The full persona pool, loaded once at startup.
///
/// Personas are kept in key order so the pool's contents are deterministic
/// regardless of YAML document order.
#[derive(Debug, Clone)]
pub struct AddressBook {
    personas: Vec<Persona>,
}

impl AddressBook {
    /// Load and validate the persona pool from `path`.
    ///
    /// # Errors
    ///
    /// Returns `AddressBookError` if the file cannot be read, is not a
    /// map of personas, or is empty.
    pub fn load(path: &Path) -> Result<Self, AddressBookError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, ShippingAddress> = serde_yaml::from_str(&raw)?;

        if entries.is_empty() {
            return Err(AddressBookError::Empty);
        }

        let personas = entries
            .into_iter()
            .map(|(name, address)| Persona { name, address })
            .collect();

        Ok(Self { personas })
    }

    /// Draw a random persona.
    ///
    /// # Panics
    ///
    /// Panics if the pool is empty, which [`load`](Self::load) rules out.
    #[must_use]
    pub fn pick(&self) -> &Persona {
        self.personas
            .choose(&mut rand::rng())
            .expect("address book is never empty after load")
    }

    #[must_use]
    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write as _;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_book(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_orders_personas_by_key() {
        let file = write_book(
            "rowan:\n  name: Rowan Ellis\n  city: Portland\n\
             harper:\n  name: Harper Quinn\n  city: Austin\n",
        );

        let book = AddressBook::load(file.path()).unwrap();

        assert_eq!(book.len(), 2);
        assert_eq!(book.personas()[0].name, "harper");
        assert_eq!(book.personas()[1].name, "rowan");
        assert_eq!(
            book.personas()[0].address.city.as_deref(),
            Some("Austin")
        );
    }

    #[test]
    fn test_load_keeps_marketplace_casing() {
        let file = write_book(
            "lucia:\n  name: Lucia Moreno\n  postalCode: \"06100\"\n  country: MX\n",
        );

        let book = AddressBook::load(file.path()).unwrap();

        assert_eq!(
            book.personas()[0].address.postal_code.as_deref(),
            Some("06100")
        );
    }

    #[test]
    fn test_load_rejects_empty_document() {
        let file = write_book("{}\n");

        let err = AddressBook::load(file.path()).unwrap_err();

        assert!(matches!(err, AddressBookError::Empty));
    }

    #[test]
    fn test_load_rejects_non_map_document() {
        let file = write_book("- harper\n- rowan\n");

        let err = AddressBook::load(file.path()).unwrap_err();

        assert!(matches!(err, AddressBookError::Yaml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AddressBook::load(Path::new("/nonexistent/addresses.yml")).unwrap_err();

        assert!(matches!(err, AddressBookError::Io(_)));
    }

    #[test]
    fn test_pick_draws_from_the_pool() {
        let file = write_book("mateo:\n  name: Mateo Alvarez\n  city: Denver\n");
        let book = AddressBook::load(file.path()).unwrap();

        let persona = book.pick();

        assert_eq!(persona.name, "mateo");
        assert_eq!(persona.address.name.as_deref(), Some("Mateo Alvarez"));
    }
}
