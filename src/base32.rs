// Base32 decoder (RFC 4648 alphabet, permissive)
//
// Characters outside A-Z/2-7 are skipped rather than rejected so that
// secrets pasted with spaces, dashes or other separators still decode.
pub fn base32_decode(input: &str) -> Vec<u8> {
    let alphabet = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
    let input = input.trim_end_matches('=').to_uppercase();

    let mut result = Vec::new();
    let mut buffer = 0u64;
    let mut bits = 0;

    for c in input.chars() {
        let Some(value) = alphabet.find(c) else {
            continue;
        };

        buffer = (buffer << 5) | value as u64;
        bits += 5;

        if bits >= 8 {
            result.push((buffer >> (bits - 8)) as u8);
            bits -= 8;
        }
    }

    // Leftover bits (< 8) never form a byte.
    result
}
