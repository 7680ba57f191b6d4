//! Stream tag metadata.
//!
//! Grounded in `original_source/libneac/neac_tag.c`: present-bit, `u8`
//! entry count, then `{id:u8, size:u8, payload}` entries — string payloads
//! NUL-terminated within `size`, numeric payloads fixed at `size = 2`.
//! `picture`, not covered by the C source's switch, is carried as an
//! opaque byte payload for forward compatibility.
//! Unknown ids are skipped by `size` rather than failing the read, exactly
//! as the C source does.

use std::io::Write;

use crate::errors;
use crate::io::{ReadBuffer, WriteBuffer};
use crate::Result;

/// A recognized tag entry id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagId {
    Title,
    Album,
    Artist,
    AlbumArtist,
    Subtitle,
    Publisher,
    Composer,
    Songwriter,
    Conductor,
    Copyright,
    Genre,
    Year,
    TrackNumber,
    TrackCount,
    Disc,
    Rate,
    Comment,
    Picture,
}

impl TagId {
    fn code(self) -> u8 {
        match self {
            TagId::Title => 1,
            TagId::Album => 2,
            TagId::Artist => 3,
            TagId::AlbumArtist => 4,
            TagId::Subtitle => 5,
            TagId::Publisher => 6,
            TagId::Composer => 7,
            TagId::Songwriter => 8,
            TagId::Conductor => 9,
            TagId::Copyright => 10,
            TagId::Genre => 11,
            TagId::Year => 12,
            TagId::TrackNumber => 13,
            TagId::TrackCount => 14,
            TagId::Disc => 15,
            TagId::Rate => 16,
            TagId::Comment => 17,
            TagId::Picture => 18,
        }
    }

    fn from_code(code: u8) -> Option<TagId> {
        Some(match code {
            1 => TagId::Title,
            2 => TagId::Album,
            3 => TagId::Artist,
            4 => TagId::AlbumArtist,
            5 => TagId::Subtitle,
            6 => TagId::Publisher,
            7 => TagId::Composer,
            8 => TagId::Songwriter,
            9 => TagId::Conductor,
            10 => TagId::Copyright,
            11 => TagId::Genre,
            12 => TagId::Year,
            13 => TagId::TrackNumber,
            14 => TagId::TrackCount,
            15 => TagId::Disc,
            16 => TagId::Rate,
            17 => TagId::Comment,
            18 => TagId::Picture,
            _ => return None,
        })
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            TagId::Year | TagId::TrackNumber | TagId::TrackCount | TagId::Disc | TagId::Rate
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum TagValue {
    Text(String),
    Number(u16),
    Bytes(Vec<u8>),
}

/// An optional metadata record attached to a stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tag {
    entries: Vec<(TagId, TagValue)>,
}

impl Tag {
    pub fn new() -> Self {
        Tag { entries: Vec::new() }
    }

    pub fn set_text(&mut self, id: TagId, value: impl Into<String>) {
        self.entries.push((id, TagValue::Text(value.into())));
    }

    pub fn set_number(&mut self, id: TagId, value: u16) {
        self.entries.push((id, TagValue::Number(value)));
    }

    pub fn set_picture(&mut self, bytes: Vec<u8>) {
        self.entries.push((TagId::Picture, TagValue::Bytes(bytes)));
    }

    pub fn get_text(&self, id: TagId) -> Option<&str> {
        self.entries.iter().find_map(|(entry_id, value)| match value {
            TagValue::Text(s) if *entry_id == id => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn get_number(&self, id: TagId) -> Option<u16> {
        self.entries.iter().find_map(|(entry_id, value)| match value {
            TagValue::Number(n) if *entry_id == id => Some(*n),
            _ => None,
        })
    }

    pub fn picture(&self) -> Option<&[u8]> {
        self.entries.iter().find_map(|(entry_id, value)| match value {
            TagValue::Bytes(b) if *entry_id == TagId::Picture => Some(b.as_slice()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the present-bit, and if `tag` is `Some`, the entry count and
    /// entries.
    pub fn write<W: WriteBuffer>(tag: Option<&Tag>, writer: &mut W) -> Result<()> {
        let tag = match tag {
            None => {
                writer.write_u8(0)?;
                return Ok(());
            }
            Some(tag) => tag,
        };
        writer.write_u8(1)?;
        if tag.entries.len() > u8::MAX as usize {
            return errors::invalid_parameter_error("too many tag entries to encode (max 255)");
        }
        writer.write_u8(tag.entries.len() as u8)?;
        for (id, value) in &tag.entries {
            match value {
                TagValue::Text(s) => {
                    let mut payload = s.as_bytes().to_vec();
                    payload.push(0);
                    if payload.len() > u8::MAX as usize {
                        return errors::invalid_parameter_error("tag string too long to encode");
                    }
                    writer.write_u8(id.code())?;
                    writer.write_u8(payload.len() as u8)?;
                    writer.write_all(&payload)?;
                }
                TagValue::Number(n) => {
                    writer.write_u8(id.code())?;
                    writer.write_u8(2)?;
                    writer.write_le_u16(*n)?;
                }
                TagValue::Bytes(b) => {
                    if b.len() > u8::MAX as usize {
                        return errors::invalid_parameter_error("tag payload too long to encode");
                    }
                    writer.write_u8(id.code())?;
                    writer.write_u8(b.len() as u8)?;
                    writer.write_all(b)?;
                }
            }
        }
        Ok(())
    }

    /// Reads the present-bit and, if set, the entries that follow. Unknown
    /// ids are skipped by `size` rather than rejected.
    pub fn read<R: ReadBuffer>(reader: &mut R) -> Result<Option<Tag>> {
        let present = reader.read_u8()?;
        if present == 0 {
            return Ok(None);
        }
        let count = reader.read_u8()?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let code = reader.read_u8()?;
            let size = reader.read_u8()? as usize;
            let payload = reader.read_bytes(size)?;
            match TagId::from_code(code) {
                None => continue,
                Some(TagId::Picture) => entries.push((TagId::Picture, TagValue::Bytes(payload))),
                Some(id) if id.is_numeric() => {
                    if size != 2 {
                        return errors::malformed_error("numeric tag entry must have size 2");
                    }
                    let n = u16::from_le_bytes([payload[0], payload[1]]);
                    entries.push((id, TagValue::Number(n)));
                }
                Some(id) => {
                    let mut text = match String::from_utf8(payload) {
                        Ok(text) => text,
                        Err(_) => return errors::malformed_error("tag string is not valid UTF-8"),
                    };
                    if text.ends_with('\0') {
                        text.pop();
                    }
                    entries.push((id, TagValue::Text(text)));
                }
            }
        }
        Ok(Some(Tag { entries }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ReadBuffer;

    #[test]
    fn absent_tag_roundtrips() {
        let mut buf = Vec::new();
        Tag::write(None, &mut buf).unwrap();
        let mut reader = &buf[..];
        assert_eq!(Tag::read(&mut reader).unwrap(), None);
    }

    #[test]
    fn present_tag_roundtrips() {
        let mut tag = Tag::new();
        tag.set_text(TagId::Title, "Song Title");
        tag.set_text(TagId::Artist, "Some Artist");
        tag.set_number(TagId::Year, 2024);
        tag.set_number(TagId::TrackNumber, 7);
        tag.set_picture(vec![0xFF, 0xD8, 0xFF, 0xE0]);

        let mut buf = Vec::new();
        Tag::write(Some(&tag), &mut buf).unwrap();
        let mut reader = &buf[..];
        let decoded = Tag::read(&mut reader).unwrap().unwrap();

        assert_eq!(decoded.get_text(TagId::Title), Some("Song Title"));
        assert_eq!(decoded.get_text(TagId::Artist), Some("Some Artist"));
        assert_eq!(decoded.get_number(TagId::Year), Some(2024));
        assert_eq!(decoded.get_number(TagId::TrackNumber), Some(7));
        assert_eq!(decoded.picture(), Some(&[0xFFu8, 0xD8, 0xFF, 0xE0][..]));
    }

    #[test]
    fn unknown_id_is_skipped_by_size() {
        // present=1, count=2, then an unknown id (250) with a 3-byte
        // payload to skip, then a recognized Comment entry.
        let mut buf = vec![1u8, 2, 250, 3, 0xAA, 0xBB, 0xCC];
        buf.push(TagId::Comment.code());
        let comment = b"hi\0";
        buf.push(comment.len() as u8);
        buf.extend_from_slice(comment);

        let mut reader = &buf[..];
        let decoded = Tag::read(&mut reader).unwrap().unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get_text(TagId::Comment), Some("hi"));
    }

    #[test]
    fn numeric_entry_with_wrong_size_is_malformed() {
        let buf = vec![1u8, 1, TagId::Year.code(), 3, 1, 2, 3];
        let mut reader = &buf[..];
        assert!(Tag::read(&mut reader).is_err());
    }

    #[test]
    fn empty_tag_is_still_present() {
        let tag = Tag::new();
        let mut buf = Vec::new();
        Tag::write(Some(&tag), &mut buf).unwrap();
        let mut reader = &buf[..];
        let decoded = Tag::read(&mut reader).unwrap().unwrap();
        assert!(decoded.is_empty());
    }
}
