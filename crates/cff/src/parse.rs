//! Minimal CFF container walk: just enough to reach the CharStrings,
//! Private DICT and subroutine INDEXes for outline extraction. Charset and
//! Encoding are irrelevant to glyph geometry and are not read.

use crate::{
    dict::{self, op},
    error::{Error, Result},
    index,
};

/// Borrowed views into one CFF font's executable pieces.
#[derive(Debug)]
pub struct CffFont<'a> {
    pub charstrings: Vec<&'a [u8]>,
    pub local_subrs: Vec<&'a [u8]>,
    pub global_subrs: Vec<&'a [u8]>,
}

/// Walk `data` (a complete `CFF ` table) down to its CharStrings.
pub fn parse(data: &[u8]) -> Result<CffFont<'_>> {
    let header_size = *data.get(2).ok_or(Error::UnexpectedEof(2))? as usize;
    let mut pos = header_size;

    let name_index = index::parse(data, pos)?;
    pos += name_index.encoded_len;

    let top_dict_index = index::parse(data, pos)?;
    pos += top_dict_index.encoded_len;
    let top_dict_data = top_dict_index.get(0).ok_or(Error::UnexpectedEof(pos))?;
    let top_dict = dict::parse(top_dict_data)?;

    if dict::find(&top_dict, op::ROS).is_some()
        || dict::find(&top_dict, op::FD_ARRAY).is_some()
        || dict::find(&top_dict, op::FD_SELECT).is_some()
    {
        return Err(Error::CidKeyed);
    }
    if let Some(entry) = dict::find(&top_dict, op::CHARSTRING_TYPE) {
        let cs_type = entry.int(0)?;
        if cs_type != 2 {
            return Err(Error::UnsupportedCharstringType(cs_type));
        }
    }

    let string_index = index::parse(data, pos)?;
    pos += string_index.encoded_len;

    let global_subrs = index::parse(data, pos)?;

    let charstrings_offset = dict::find(&top_dict, op::CHARSTRINGS)
        .ok_or(Error::MissingDictEntry("CharStrings"))?
        .int(0)? as usize;
    let charstrings = index::parse(data, charstrings_offset)?;

    let mut local_subrs = Vec::new();
    if let Some(private) = dict::find(&top_dict, op::PRIVATE) {
        let size = private.int(0)? as usize;
        let offset = private.int(1)? as usize;
        let private_data = data
            .get(offset..offset + size)
            .ok_or(Error::UnexpectedEof(offset))?;
        let private_dict = dict::parse(private_data)?;
        if let Some(subrs) = dict::find(&private_dict, op::SUBRS) {
            let subrs_offset = offset + subrs.int(0)? as usize;
            local_subrs = index::parse(data, subrs_offset)?.entries;
        }
    }

    Ok(CffFont {
        charstrings: charstrings.entries,
        local_subrs,
        global_subrs: global_subrs.entries,
    })
}
