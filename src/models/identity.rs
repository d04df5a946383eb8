use crate::errors::LedgerError;

/// What a caller knows about a client when asking for their ledger.
/// The phone number is the only mandatory piece.
#[derive(Debug, Clone, Default)]
pub struct IdentityHint {
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    /// Id of the client-directory record this hint came from, if any.
    pub original_client_id: Option<String>,
}

impl IdentityHint {
    pub fn from_phone(phone: &str) -> Self {
        Self { phone: phone.to_string(), ..Default::default() }
    }
}

/// Strip a phone number down to its digits. Fails when nothing usable
/// remains.
pub fn normalize_phone(raw: &str) -> Result<String, LedgerError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(LedgerError::InvalidIdentity(format!(
            "phone number contains no digits: {:?}",
            raw
        )));
    }
    Ok(digits)
}

/// Names the original intake forms fill in when the operator did not
/// know the client. Such a name is worth replacing with directory data.
pub fn is_placeholder_name(name: &str) -> bool {
    let name = name.trim();
    name.is_empty()
        || name == "Client"
        || name == "Unknown Client"
        || name.starts_with("Client ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_formatting() {
        assert_eq!(normalize_phone("0303-7255114").unwrap(), "03037255114");
        assert_eq!(normalize_phone("+92 (303) 725 5114").unwrap(), "923037255114");
        assert_eq!(normalize_phone("03037255114").unwrap(), "03037255114");
    }

    #[test]
    fn test_normalize_rejects_digitless_input() {
        assert!(matches!(
            normalize_phone("no number"),
            Err(LedgerError::InvalidIdentity(_))
        ));
        assert!(matches!(normalize_phone(""), Err(LedgerError::InvalidIdentity(_))));
    }

    #[test]
    fn test_placeholder_names() {
        assert!(is_placeholder_name(""));
        assert!(is_placeholder_name("  "));
        assert!(is_placeholder_name("Client"));
        assert!(is_placeholder_name("Unknown Client"));
        assert!(is_placeholder_name("Client 03037255114"));
        assert!(!is_placeholder_name("Ayesha Khan"));
        // "Clientele" is a real name, not the generic prefix
        assert!(!is_placeholder_name("Clientele Travels"));
    }
}
