// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.4.7
//
// Modified UTF-8 differs from standard UTF-8 in two ways: the null character is encoded with two
// bytes (0xC0 0x80), and supplementary characters are encoded as a surrogate pair, each half
// taking three bytes. Anything that is not also valid UTF-8 is decoded through UTF-16 code units.

pub(crate) fn decode(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_owned();
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i] as u16;
        if b & 0x80 == 0 {
            units.push(b);
            i += 1;
        } else if b & 0xE0 == 0xC0 && i + 1 < bytes.len() {
            units.push(((b & 0x1F) << 6) | (bytes[i + 1] as u16 & 0x3F));
            i += 2;
        } else if b & 0xF0 == 0xE0 && i + 2 < bytes.len() {
            units.push(
                ((b & 0x0F) << 12)
                    | ((bytes[i + 1] as u16 & 0x3F) << 6)
                    | (bytes[i + 2] as u16 & 0x3F),
            );
            i += 3;
        } else {
            units.push(char::REPLACEMENT_CHARACTER as u16);
            i += 1;
        }
    }

    String::from_utf16_lossy(&units)
}
