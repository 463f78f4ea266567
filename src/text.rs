//! Text chunk payload layouts
//!
//! `tEXt`: `keyword\0text`
//!
//! `iTXt`: `keyword\0 + compression_flag(1) + compression_method(1) +
//! language_tag\0 + translated_keyword\0 + text`

/// A text payload split at its first zero byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPayload<'a> {
    /// Bytes before the first zero byte
    pub key: &'a [u8],
    /// Everything after the first zero byte
    pub value: &'a [u8],
}

impl<'a> TextPayload<'a> {
    /// Split `data` at the first zero byte, `None` if there is none
    pub fn split(data: &'a [u8]) -> Option<Self> {
        let nul = data.iter().position(|&b| b == 0)?;
        Some(Self {
            key: &data[..nul],
            value: &data[nul + 1..],
        })
    }

    /// `key ++ 0x00 ++ value`
    pub fn assemble(key: &[u8], value: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(key.len() + 1 + value.len());
        data.extend_from_slice(key);
        data.push(0);
        data.extend_from_slice(value);
        data
    }
}

/// The fields of an `iTXt` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItxtFields<'a> {
    pub keyword: &'a [u8],
    /// 0 = uncompressed, 1 = compressed
    pub compression_flag: u8,
    pub compression_method: u8,
    pub language_tag: &'a [u8],
    pub translated_keyword: &'a [u8],
    pub text: &'a [u8],
}

impl<'a> ItxtFields<'a> {
    /// Parse an `iTXt` payload, `None` if a terminator or flag byte is missing
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        let (keyword, rest) = split_nul(data)?;
        let (&compression_flag, rest) = rest.split_first()?;
        let (&compression_method, rest) = rest.split_first()?;
        let (language_tag, rest) = split_nul(rest)?;
        let (translated_keyword, text) = split_nul(rest)?;

        Some(Self {
            keyword,
            compression_flag,
            compression_method,
            language_tag,
            translated_keyword,
            text,
        })
    }

    /// Whether the text field holds zlib data
    pub fn is_compressed(&self) -> bool {
        self.compression_flag != 0
    }

    /// Serialize these fields with `text` in place of the current text
    pub fn assemble_with_text(&self, text: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(
            self.keyword.len() + self.language_tag.len() + self.translated_keyword.len()
                + text.len()
                + 5,
        );
        data.extend_from_slice(self.keyword);
        data.push(0);
        data.push(self.compression_flag);
        data.push(self.compression_method);
        data.extend_from_slice(self.language_tag);
        data.push(0);
        data.extend_from_slice(self.translated_keyword);
        data.push(0);
        data.extend_from_slice(text);
        data
    }
}

fn split_nul(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let nul = data.iter().position(|&b| b == 0)?;
    Some((&data[..nul], &data[nul + 1..]))
}
