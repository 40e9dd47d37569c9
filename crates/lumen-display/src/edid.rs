//! EDID vendor identification.
//!
//! EDID PNPIDs are packed strangely. Characters A-Z are assigned values 1
//! thru 26, represented by 5 bits per character. The three characters then
//! fit into two bytes, with one padding bit at the beginning. (Big endian)

use crate::error::{DisplayError, Result};

/// Byte offset of the packed vendor id within an EDID blob.
const PNPID_OFFSET: usize = 8;

/// Minimum EDID length that carries a vendor id.
const MIN_EDID_LEN: usize = PNPID_OFFSET + 2;

const fn pnpid_char_to_int(letter: u8) -> u16 {
    let upper = if letter >= b'a' { letter - b'a' } else { letter - b'A' };
    upper as u16 + 1
}

const fn pnpid_to_u16(a: u8, b: u8, c: u8) -> u16 {
    (pnpid_char_to_int(a) << 10) | (pnpid_char_to_int(b) << 5) | pnpid_char_to_int(c)
}

/// Pack a 3-letter vendor code into its 2-byte EDID representation.
pub const fn pack_pnpid(a: u8, b: u8, c: u8) -> [u8; 2] {
    let val = pnpid_to_u16(a, b, c);
    [((val & 0xff00) >> 8) as u8, (val & 0x00ff) as u8]
}

/// Production PNPID.
pub const PNPID_CFR: [u8; 2] = pack_pnpid(b'C', b'F', b'R');

/// Old vendor PNPID, used by some test hardware.
pub const PNPID_MVA: [u8; 2] = pack_pnpid(b'M', b'V', b'A');

/// Extract the packed vendor id from an EDID blob.
///
/// Fails rather than reading out of bounds if the blob is truncated.
pub fn vendor_bytes(edid: &[u8]) -> Result<[u8; 2]> {
    if edid.len() < MIN_EDID_LEN {
        return Err(DisplayError::EdidTooShort { len: edid.len() });
    }
    Ok([edid[PNPID_OFFSET], edid[PNPID_OFFSET + 1]])
}

/// Does this EDID belong to one of our displays?
pub fn is_target_vendor(edid: &[u8]) -> Result<bool> {
    let pnpid = vendor_bytes(edid)?;
    Ok(pnpid == PNPID_CFR || pnpid == PNPID_MVA)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unpack the 2-byte pair back into letters, for round-trip checks.
    fn unpack_pnpid(bytes: [u8; 2]) -> (u8, u8, u8) {
        let val = ((bytes[0] as u16) << 8) | bytes[1] as u16;
        let letter = |v: u16| (v as u8 - 1) + b'A';
        (
            letter((val >> 10) & 0x1f),
            letter((val >> 5) & 0x1f),
            letter(val & 0x1f),
        )
    }

    #[test]
    fn test_pnpid_round_trip() {
        assert_eq!(unpack_pnpid(pack_pnpid(b'C', b'F', b'R')), (b'C', b'F', b'R'));
        assert_eq!(unpack_pnpid(pack_pnpid(b'M', b'V', b'A')), (b'M', b'V', b'A'));
        assert_eq!(unpack_pnpid(pack_pnpid(b'A', b'A', b'A')), (b'A', b'A', b'A'));
        assert_eq!(unpack_pnpid(pack_pnpid(b'Z', b'Z', b'Z')), (b'Z', b'Z', b'Z'));
    }

    #[test]
    fn test_known_vendor_ids_are_distinct_and_stable() {
        // Bit layout: 0 00011 00110 10010 for C(3) F(6) R(18)
        assert_eq!(PNPID_CFR, [0x0c, 0xd2]);
        // 0 01101 10110 00001 for M(13) V(22) A(1)
        assert_eq!(PNPID_MVA, [0x36, 0xc1]);
        assert_ne!(PNPID_CFR, PNPID_MVA);
    }

    #[test]
    fn test_lowercase_packs_like_uppercase() {
        assert_eq!(pack_pnpid(b'c', b'f', b'r'), PNPID_CFR);
    }

    #[test]
    fn test_vendor_match() {
        let mut edid = vec![0u8; 128];
        edid[8] = PNPID_CFR[0];
        edid[9] = PNPID_CFR[1];
        assert!(is_target_vendor(&edid).unwrap());

        edid[8] = PNPID_MVA[0];
        edid[9] = PNPID_MVA[1];
        assert!(is_target_vendor(&edid).unwrap());

        edid[8] = 0x01;
        edid[9] = 0x02;
        assert!(!is_target_vendor(&edid).unwrap());
    }

    #[test]
    fn test_short_edid_is_an_error_not_false() {
        let err = is_target_vendor(&[0u8; 9]).unwrap_err();
        assert!(matches!(err, DisplayError::EdidTooShort { len: 9 }));
    }
}
