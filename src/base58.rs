use sha2::Digest;
use zeroize::Zeroizing;

use crate::error::FormatError;

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const CHECKSUM_LEN: usize = 4;

/// Base58Check: `data ‖ SHA256(SHA256(data))[..4]`, then Base58.
pub fn encode_check(data: &[u8]) -> String {
    let mut buf = Zeroizing::new(Vec::with_capacity(data.len() + CHECKSUM_LEN));
    buf.extend_from_slice(data);
    buf.extend_from_slice(&checksum(data));

    encode(&buf)
}

pub fn decode_check(s: &str) -> Result<Vec<u8>, FormatError> {
    let mut data = decode(s)?;
    if data.len() < CHECKSUM_LEN {
        return Err(FormatError::InvalidLength(data.len()));
    }

    let payload_len = data.len() - CHECKSUM_LEN;
    if data[payload_len..] != checksum(&data[..payload_len]) {
        return Err(FormatError::InvalidChecksum);
    }
    data.truncate(payload_len);
    Ok(data)
}

/// Plain Base58 of a big-endian integer. Each leading zero byte is
/// written as a leading `'1'`.
pub fn encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|&&b| b == 0).count();

    // remainders of repeated division by 58, least significant first
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    let mut num = Zeroizing::new(data[zeros..].to_vec());
    while !num.is_empty() {
        let mut rem = 0u32;
        let mut quotient = Zeroizing::new(Vec::with_capacity(num.len()));
        for &b in num.iter() {
            let acc = (rem << 8) | b as u32;
            let q = acc / 58;
            rem = acc % 58;
            if !quotient.is_empty() || q != 0 {
                quotient.push(q as u8);
            }
        }
        digits.push(ALPHABET[rem as usize]);
        num = quotient;
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat_n('1', zeros));
    out.extend(digits.iter().rev().map(|&c| c as char));
    out
}

pub fn decode(s: &str) -> Result<Vec<u8>, FormatError> {
    let zeros = s.chars().take_while(|&c| c == '1').count();

    // big-endian magnitude, accumulated digit by digit
    let mut num: Vec<u8> = Vec::with_capacity(s.len() * 733 / 1000 + 1);
    for c in s.chars().skip(zeros) {
        let mut carry = digit_value(c)? as u32;
        for b in num.iter_mut().rev() {
            let acc = (*b as u32) * 58 + carry;
            *b = acc as u8;
            carry = acc >> 8;
        }
        while carry > 0 {
            num.insert(0, carry as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeros];
    out.extend_from_slice(&num);
    Ok(out)
}

fn digit_value(c: char) -> Result<u8, FormatError> {
    if !c.is_ascii() {
        return Err(FormatError::InvalidCharacter(c));
    }
    ALPHABET
        .iter()
        .position(|&a| a == c as u8)
        .map(|i| i as u8)
        .ok_or(FormatError::InvalidCharacter(c))
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let h1 = sha2::Sha256::digest(data);
    let h2 = sha2::Sha256::digest(h1);
    [h2[0], h2[1], h2[2], h2[3]]
}
