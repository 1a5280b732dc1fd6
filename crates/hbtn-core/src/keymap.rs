// Hbtn Keymap Table
// Sparse scancode -> key associations for the tablet buttons

use crate::key::Key;
use crate::status::SCANCODE_MASK;

/// One scancode to key association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEntry {
    pub scancode: u64,
    pub key: Key,
}

impl KeyEntry {
    pub const fn new(scancode: u64, key: Key) -> Self {
        Self { scancode, key }
    }
}

/// Buttons on the Panasonic CF-18/CF-19 tablet bezel.
///
/// Scancode 0x0 is an explicit mapping to KEY_RESERVED.
pub const PANASONIC_KEYMAP: &[KeyEntry] = &[
    KeyEntry::new(0x0, Key::RESERVED),
    KeyEntry::new(0x4, Key::SCREENLOCK), // Screen lock
    KeyEntry::new(0x6, Key::DIRECTION),  // Screen rotate
    KeyEntry::new(0x8, Key::ENTER),      // Enter
    KeyEntry::new(0xA, Key::KEYBOARD),   // Soft keyboard
];

/// Errors raised when building a custom table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeymapError {
    #[error("Duplicate scancode {0:#x} in keymap")]
    DuplicateScancode(u64),

    #[error("Scancode {0:#x} can never be decoded from a hardware status")]
    ScancodeOutOfRange(u64),
}

/// Ordered, immutable scancode table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapTable {
    entries: Vec<KeyEntry>,
}

impl Default for KeymapTable {
    fn default() -> Self {
        Self::panasonic()
    }
}

impl KeymapTable {
    /// The stock Panasonic tablet button table
    pub fn panasonic() -> Self {
        Self {
            entries: PANASONIC_KEYMAP.to_vec(),
        }
    }

    /// Build a table from arbitrary entries.
    ///
    /// Scancodes must be unique and must fit the decoded scancode field.
    pub fn from_entries<I>(entries: I) -> Result<Self, KeymapError>
    where
        I: IntoIterator<Item = KeyEntry>,
    {
        let mut table = Self {
            entries: Vec::new(),
        };
        for entry in entries {
            validate_scancode(entry.scancode)?;
            if table.position(entry.scancode).is_some() {
                return Err(KeymapError::DuplicateScancode(entry.scancode));
            }
            table.entries.push(entry);
        }
        Ok(table)
    }

    /// Return a copy of this table with overrides applied.
    ///
    /// An override for a known scancode replaces its key in place; an
    /// unknown scancode is appended.
    pub fn with_overrides<I>(&self, overrides: I) -> Result<Self, KeymapError>
    where
        I: IntoIterator<Item = KeyEntry>,
    {
        let mut table = self.clone();
        for entry in overrides {
            validate_scancode(entry.scancode)?;
            match table.position(entry.scancode) {
                Some(idx) => table.entries[idx].key = entry.key,
                None => table.entries.push(entry),
            }
        }
        Ok(table)
    }

    /// Find the entry for a scancode
    pub fn lookup(&self, scancode: u64) -> Option<KeyEntry> {
        self.entries.iter().find(|e| e.scancode == scancode).copied()
    }

    /// Keys the input endpoint must advertise.
    ///
    /// KEY_RESERVED is never advertised.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.entries
            .iter()
            .map(|e| e.key)
            .filter(|k| !k.is_reserved())
    }

    pub fn entries(&self) -> &[KeyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, scancode: u64) -> Option<usize> {
        self.entries.iter().position(|e| e.scancode == scancode)
    }
}

fn validate_scancode(scancode: u64) -> Result<(), KeymapError> {
    if scancode & !SCANCODE_MASK != 0 {
        return Err(KeymapError::ScancodeOutOfRange(scancode));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_scancodes() {
        let table = KeymapTable::panasonic();
        assert_eq!(table.lookup(0x0).map(|e| e.key), Some(Key::RESERVED));
        assert_eq!(table.lookup(0x4).map(|e| e.key), Some(Key::SCREENLOCK));
        assert_eq!(table.lookup(0x6).map(|e| e.key), Some(Key::DIRECTION));
        assert_eq!(table.lookup(0x8).map(|e| e.key), Some(Key::ENTER));
        assert_eq!(table.lookup(0xA).map(|e| e.key), Some(Key::KEYBOARD));
    }

    #[test]
    fn test_lookup_returns_matching_scancode() {
        let table = KeymapTable::panasonic();
        for scancode in [0x0, 0x4, 0x6, 0x8, 0xA] {
            assert_eq!(table.lookup(scancode).unwrap().scancode, scancode);
        }
    }

    #[test]
    fn test_lookup_unknown_scancodes() {
        let table = KeymapTable::panasonic();
        for scancode in [0x1, 0x2, 0x3, 0x5, 0x7, 0x9, 0xB, 0xC, 0xE, 0xF, 0x10] {
            assert_eq!(table.lookup(scancode), None, "scancode={:#x}", scancode);
        }
    }

    #[test]
    fn test_table_order_and_size() {
        let table = KeymapTable::default();
        let scancodes: Vec<u64> = table.entries().iter().map(|e| e.scancode).collect();
        assert_eq!(scancodes, vec![0x0, 0x4, 0x6, 0x8, 0xA]);
        assert_eq!(table.len(), 5);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_keys_skip_reserved() {
        let keys: Vec<Key> = KeymapTable::panasonic().keys().collect();
        assert_eq!(
            keys,
            vec![Key::SCREENLOCK, Key::DIRECTION, Key::ENTER, Key::KEYBOARD]
        );
    }

    #[test]
    fn test_from_entries_rejects_duplicates() {
        let err = KeymapTable::from_entries([
            KeyEntry::new(0x4, Key::ENTER),
            KeyEntry::new(0x4, Key::SCREENLOCK),
        ])
        .unwrap_err();
        assert_eq!(err, KeymapError::DuplicateScancode(0x4));
    }

    #[test]
    fn test_from_entries_rejects_undecodable_scancode() {
        let err = KeymapTable::from_entries([KeyEntry::new(0x5, Key::ENTER)]).unwrap_err();
        assert_eq!(err, KeymapError::ScancodeOutOfRange(0x5));

        let err = KeymapTable::from_entries([KeyEntry::new(0x10, Key::ENTER)]).unwrap_err();
        assert_eq!(err, KeymapError::ScancodeOutOfRange(0x10));
    }

    #[test]
    fn test_with_overrides_replaces_in_place_and_appends() {
        let table = KeymapTable::panasonic()
            .with_overrides([
                KeyEntry::new(0x8, Key::from(57)),
                KeyEntry::new(0xC, Key::from(116)),
            ])
            .unwrap();

        assert_eq!(table.len(), 6);
        assert_eq!(table.entries()[3], KeyEntry::new(0x8, Key::from(57)));
        assert_eq!(table.lookup(0xC).map(|e| e.key), Some(Key::from(116)));
        // Original is untouched
        assert_eq!(
            KeymapTable::panasonic().lookup(0x8).map(|e| e.key),
            Some(Key::ENTER)
        );
    }

    #[test]
    fn test_with_overrides_validates() {
        let err = KeymapTable::panasonic()
            .with_overrides([KeyEntry::new(0x3, Key::ENTER)])
            .unwrap_err();
        assert_eq!(err, KeymapError::ScancodeOutOfRange(0x3));
    }
}
