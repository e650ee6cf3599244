//! Human-shareable confirmation codes, e.g. `DSG-9F2A11C0`.

use rand::{rngs::OsRng, RngCore};

pub const MEMBER_PREFIX: &str = "MBR";
pub const EVENT_REGISTRATION_PREFIX: &str = "EVT";

/// `<prefix>-` followed by 8 uppercase hex characters from the OS random source.
///
/// No uniqueness check is made against any store; 32 random bits are plenty
/// for gallery volumes.
pub fn generate_code(prefix: &str) -> String {
    let mut bytes = [0u8; 4];
    OsRng.fill_bytes(&mut bytes);
    format!("{}-{}", prefix, hex::encode_upper(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_have_prefix_and_eight_hex_digits() {
        let code = generate_code("DSG");
        let (prefix, suffix) = code.split_once('-').unwrap();
        assert_eq!(prefix, "DSG");
        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn codes_do_not_repeat() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_code(MEMBER_PREFIX)).collect();
        assert_eq!(codes.len(), 1000);
    }
}
