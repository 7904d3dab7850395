//! NFC Forum RTD Text payloads.
//!
//! Layout: one status byte, the IANA language code, then the text. In the
//! status byte bit 7 selects UTF-16 and bits 0..5 hold the language length.

const UTF16_FLAG: u8 = 0x80;
const LANG_LEN_MASK: u8 = 0x3F;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPayload {
    pub language: String,
    pub text: String,
}

/// Encode `text` as UTF-8 with the given language code. Non-ASCII
/// characters are dropped from the language and it is cut at 63 bytes.
pub fn encode(text: &str, language: &str) -> Vec<u8> {
    let lang: Vec<u8> = language
        .bytes()
        .filter(u8::is_ascii)
        .take(LANG_LEN_MASK as usize)
        .collect();

    let mut payload = Vec::with_capacity(1 + lang.len() + text.len());
    payload.push(lang.len() as u8 & LANG_LEN_MASK);
    payload.extend_from_slice(&lang);
    payload.extend_from_slice(text.as_bytes());
    payload
}

/// Decode a text payload. Invalid sequences are replaced rather than
/// rejected; a language length running past the end yields the whole
/// payload as UTF-8 text.
pub fn decode(payload: &[u8]) -> TextPayload {
    let Some((&status, rest)) = payload.split_first() else {
        return TextPayload {
            language: String::new(),
            text: String::new(),
        };
    };

    let lang_len = (status & LANG_LEN_MASK) as usize;
    if lang_len > rest.len() {
        return TextPayload {
            language: String::new(),
            text: String::from_utf8_lossy(payload).into_owned(),
        };
    }

    let (lang, body) = rest.split_at(lang_len);
    let text = if status & UTF16_FLAG != 0 {
        decode_utf16(body)
    } else {
        String::from_utf8_lossy(body).into_owned()
    };

    TextPayload {
        language: String::from_utf8_lossy(lang).into_owned(),
        text,
    }
}

fn decode_utf16(body: &[u8]) -> String {
    let (little_endian, body) = match body {
        [0xFF, 0xFE, rest @ ..] => (true, rest),
        [0xFE, 0xFF, rest @ ..] => (false, rest),
        _ => (false, body),
    };

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_status_language_and_text() {
        let payload = encode("{}", "en");
        assert_eq!(payload, vec![0x02, b'e', b'n', b'{', b'}']);
    }

    #[test]
    fn decodes_utf8() {
        let decoded = decode(&encode("{\"sn\":\"ü\"}", "en"));
        assert_eq!(decoded.language, "en");
        assert_eq!(decoded.text, "{\"sn\":\"ü\"}");
    }

    #[test]
    fn decodes_utf16_with_and_without_bom() {
        let mut be = vec![0x80 | 2, b'e', b'n'];
        be.extend_from_slice(&[0x00, b'h', 0x00, b'i']);
        assert_eq!(decode(&be).text, "hi");

        let mut le = vec![0x80 | 2, b'e', b'n', 0xFF, 0xFE];
        le.extend_from_slice(&[b'h', 0x00, b'i', 0x00]);
        assert_eq!(decode(&le).text, "hi");
    }

    #[test]
    fn overlong_language_falls_back_to_raw_text() {
        let decoded = decode(&[0x3F, b'{', b'}']);
        assert_eq!(decoded.language, "");
        assert_eq!(decoded.text, "?{}");
    }

    #[test]
    fn empty_payload() {
        assert_eq!(decode(&[]).text, "");
    }
}
