//! Column references and their resolution to numeric sheet positions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SheetsError;

/// A column position as written in operator configuration: either the
/// 1-based index itself or a spreadsheet letter reference like `"AA"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Letters(String),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Letters(letters) => f.write_str(letters),
        }
    }
}

/// Resolves a column reference to its 1-based sheet index.
///
/// Letter references follow spreadsheet convention: `A` is 1, `Z` is 26,
/// `AA` is 27. The string is read as a base-26 numeral with the least
/// significant letter last, so references may be arbitrarily long. Case is
/// ignored. Numeric references pass through after a positivity check.
pub fn resolve(reference: &ColumnRef) -> Result<usize, SheetsError> {
    match reference {
        ColumnRef::Index(0) => Err(SheetsError::InvalidColumnReference {
            reference: "0".to_string(),
            detail: "index must be positive".to_string(),
        }),
        ColumnRef::Index(index) => Ok(*index),
        ColumnRef::Letters(letters) => resolve_letters(letters),
    }
}

fn resolve_letters(letters: &str) -> Result<usize, SheetsError> {
    if letters.is_empty() {
        return Err(SheetsError::InvalidColumnReference {
            reference: letters.to_string(),
            detail: "reference is empty".to_string(),
        });
    }
    let mut index: usize = 0;
    for ch in letters.chars() {
        let Some(value) = letter_value(ch) else {
            return Err(SheetsError::InvalidColumnReference {
                reference: letters.to_string(),
                detail: format!("{ch:?} is not an ASCII letter"),
            });
        };
        index = index
            .checked_mul(26)
            .and_then(|scaled| scaled.checked_add(value))
            .ok_or_else(|| SheetsError::InvalidColumnReference {
                reference: letters.to_string(),
                detail: "index does not fit in usize".to_string(),
            })?;
    }
    Ok(index)
}

fn letter_value(ch: char) -> Option<usize> {
    ch.is_ascii_alphabetic()
        .then(|| usize::from(ch.to_ascii_lowercase() as u8 - b'a') + 1)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn letters_follow_spreadsheet_numbering() {
        for (letters, expected) in [
            ("A", 1),
            ("B", 2),
            ("Z", 26),
            ("AA", 27),
            ("AZ", 52),
            ("BA", 53),
            ("ZZ", 702),
            ("AAA", 703),
        ] {
            assert_eq!(
                resolve(&ColumnRef::Letters(letters.to_string())).unwrap(),
                expected,
                "reference {letters}"
            );
        }
    }

    #[test]
    fn case_does_not_matter() {
        assert_eq!(resolve(&ColumnRef::Letters("az".to_string())).unwrap(), 52);
        assert_eq!(resolve(&ColumnRef::Letters("Ba".to_string())).unwrap(), 53);
    }

    #[test]
    fn integers_pass_through() {
        assert_eq!(resolve(&ColumnRef::Index(7)).unwrap(), 7);
        assert_eq!(resolve(&ColumnRef::Index(1)).unwrap(), 1);
    }

    #[test]
    fn zero_index_is_rejected() {
        let err = resolve(&ColumnRef::Index(0)).unwrap_err();
        assert!(matches!(err, SheetsError::InvalidColumnReference { .. }));
    }

    #[test]
    fn mixed_input_is_rejected() {
        for bad in ["1a", "A1", "a-b", " a", ""] {
            let err = resolve(&ColumnRef::Letters(bad.to_string())).unwrap_err();
            assert!(
                matches!(err, SheetsError::InvalidColumnReference { .. }),
                "reference {bad:?}"
            );
        }
    }

    #[test]
    fn untagged_serde_accepts_both_forms() {
        let by_index: ColumnRef = serde_json::from_str("3").unwrap();
        assert_eq!(by_index, ColumnRef::Index(3));
        let by_letters: ColumnRef = serde_json::from_str("\"AB\"").unwrap();
        assert_eq!(by_letters, ColumnRef::Letters("AB".to_string()));
    }

    proptest! {
        // Oracle: the positional formula from the right, evaluated in u128.
        #[test]
        fn letters_match_positional_arithmetic(reference in "[A-Za-z]{1,8}") {
            let chars: Vec<char> = reference.chars().collect();
            let mut expected: u128 = 0;
            for (pos, ch) in chars.iter().enumerate() {
                let value = u128::from(ch.to_ascii_lowercase() as u8 - b'a') + 1;
                let weight = 26u128.pow((chars.len() - 1 - pos) as u32);
                expected += value * weight;
            }
            let resolved = resolve(&ColumnRef::Letters(reference)).unwrap();
            prop_assert_eq!(resolved as u128, expected);
        }

        #[test]
        fn resolution_is_case_insensitive(reference in "[a-z]{1,6}") {
            let lower = resolve(&ColumnRef::Letters(reference.clone())).unwrap();
            let upper = resolve(&ColumnRef::Letters(reference.to_uppercase())).unwrap();
            prop_assert_eq!(lower, upper);
        }
    }
}
