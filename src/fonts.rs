use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use subsetter::GlyphRemapper;
use ttf_parser::Face;

use crate::error::Error;
use crate::options::FONT_ENV;

/// Helvetica advance widths (1000 units/em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths (1000 units/em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const HELVETICA_ASCENDER: f32 = 0.718;

pub(crate) struct FontEntry {
    pub(crate) pdf_name: &'static str,
    source: FontSource,
}

enum FontSource {
    Builtin {
        base_font: &'static str,
        widths: &'static [u16; 95],
    },
    Embedded(EmbeddedFace),
}

/// A TrueType/OpenType face embedded as a Type0 CIDFont. Glyphs are remapped
/// as text is encoded, so the subset written at the end holds exactly the
/// glyphs the document drew.
struct EmbeddedFace {
    ps_name: String,
    data: Mmap,
    units_per_em: f32,
    ascender_ratio: f32,
    remapper: GlyphRemapper,
    char_to_gid: BTreeMap<char, u16>,
}

impl EmbeddedFace {
    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }
}

impl FontEntry {
    pub(crate) fn helvetica(pdf_name: &'static str) -> Self {
        Self {
            pdf_name,
            source: FontSource::Builtin {
                base_font: "Helvetica",
                widths: &HELVETICA_WIDTHS,
            },
        }
    }

    pub(crate) fn helvetica_bold(pdf_name: &'static str) -> Self {
        Self {
            pdf_name,
            source: FontSource::Builtin {
                base_font: "Helvetica-Bold",
                widths: &HELVETICA_BOLD_WIDTHS,
            },
        }
    }

    pub(crate) fn load(path: &Path, pdf_name: &'static str) -> Result<Self, Error> {
        let file = File::open(path)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        // SAFETY: the mapping is read-only and lives as long as the entry.
        let data = unsafe { Mmap::map(&file) }
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        let face = Face::parse(&data, 0)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;

        let units_per_em = face.units_per_em() as f32;
        let ascender_ratio = face.ascender() as f32 / units_per_em;
        let ps_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().replace(' ', ""))
                    .unwrap_or_else(|| pdf_name.to_string())
            });
        drop(face);

        log::debug!("Loaded font {ps_name} from {}", path.display());

        Ok(Self {
            pdf_name,
            source: FontSource::Embedded(EmbeddedFace {
                ps_name,
                data,
                units_per_em,
                ascender_ratio,
                remapper: GlyphRemapper::new(),
                char_to_gid: BTreeMap::new(),
            }),
        })
    }

    pub(crate) fn ascender_ratio(&self) -> f32 {
        match &self.source {
            FontSource::Builtin { .. } => HELVETICA_ASCENDER,
            FontSource::Embedded(face) => face.ascender_ratio,
        }
    }

    /// Advance width of `text` at `size`. Characters the font cannot draw
    /// measure as zero; [`FontEntry::encode`] rejects them.
    pub(crate) fn text_width(&self, text: &str, size: f32) -> f32 {
        match &self.source {
            FontSource::Builtin { widths, .. } => {
                text.chars().map(|c| builtin_width(widths, c)).sum::<f32>() * size / 1000.0
            }
            FontSource::Embedded(embedded) => {
                let Some(face) = embedded.face() else {
                    return 0.0;
                };
                text.chars()
                    .filter_map(|c| face.glyph_index(c))
                    .filter_map(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| adv as f32 / embedded.units_per_em * size)
                    .sum()
            }
        }
    }

    /// Bytes for a `Tj` operand in this font's encoding.
    pub(crate) fn encode(&mut self, text: &str) -> Result<Vec<u8>, Error> {
        match &mut self.source {
            FontSource::Builtin { base_font, .. } => text
                .chars()
                .map(|c| match char_to_winansi(c) {
                    0 => Err(Error::Render(format!(
                        "character {c:?} cannot be drawn with {base_font}; \
                         embed a TrueType font that covers it (--font or {FONT_ENV})"
                    ))),
                    b => Ok(b),
                })
                .collect(),
            FontSource::Embedded(embedded) => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for c in text.chars() {
                    let gid = match embedded.char_to_gid.get(&c) {
                        Some(&gid) => gid,
                        None => {
                            let original = embedded
                                .face()
                                .and_then(|f| f.glyph_index(c))
                                .ok_or_else(|| {
                                    Error::Render(format!(
                                        "character {c:?} is missing from {}",
                                        embedded.ps_name
                                    ))
                                })?;
                            let gid = embedded.remapper.remap(original.0);
                            embedded.char_to_gid.insert(c, gid);
                            gid
                        }
                    };
                    out.extend_from_slice(&gid.to_be_bytes());
                }
                Ok(out)
            }
        }
    }

    /// Write the font dictionary (and for embedded faces, the subset program).
    pub(crate) fn write(
        &self,
        pdf: &mut Pdf,
        font_ref: Ref,
        alloc: &mut impl FnMut() -> Ref,
    ) -> Result<(), Error> {
        match &self.source {
            FontSource::Builtin { base_font, .. } => {
                pdf.type1_font(font_ref)
                    .base_font(Name(base_font.as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                Ok(())
            }
            FontSource::Embedded(embedded) => embed_truetype(pdf, font_ref, embedded, alloc),
        }
    }
}

fn builtin_width(widths: &[u16; 95], c: char) -> f32 {
    match c {
        ' '..='~' => widths[(c as u32 - 32) as usize] as f32,
        '\u{2022}' => 350.0,
        '\u{2018}' | '\u{2019}' | '\u{201A}' => 222.0,
        '\u{201C}' | '\u{201D}' | '\u{201E}' => 333.0,
        '\u{2014}' | '\u{2026}' | '\u{2030}' => 1000.0,
        _ if char_to_winansi(c) != 0 => 556.0,
        _ => 0.0,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95, // bullet
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Embed a TrueType/OpenType font as a CIDFont (Type0 composite) with Identity-H encoding.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    embedded: &EmbeddedFace,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<(), Error> {
    let face = embedded
        .face()
        .ok_or_else(|| Error::Font(format!("{} no longer parses", embedded.ps_name)))?;
    let units = embedded.units_per_em;
    let scale = |v: f32| v / units * 1000.0;

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        scale(bb.x_min as f32),
        scale(bb.y_min as f32),
        scale(bb.x_max as f32),
        scale(bb.y_max as f32),
    );
    let cap_height = face
        .capital_height()
        .map(|h| scale(h as f32))
        .unwrap_or(700.0);

    let subset_data = subsetter::subset(&embedded.data, 0, &embedded.remapper).unwrap_or_else(|e| {
        log::warn!(
            "Font subsetting failed for {}: {e}; embedding full font",
            embedded.ps_name
        );
        embedded.data.to_vec()
    });
    let data_len = i32::try_from(subset_data.len())
        .map_err(|_| Error::Font(format!("{} is too large to embed", embedded.ps_name)))?;

    let descriptor_ref = alloc();
    let data_ref = alloc();
    let cid_font_ref = alloc();
    let tounicode_ref = alloc();
    let ps_name = embedded.ps_name.as_bytes();

    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(scale(face.ascender() as f32))
        .descent(scale(face.descender() as f32))
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name));
        cid.system_info(identity_system_info());
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        let mut gid_widths: Vec<(u16, f32)> = embedded
            .char_to_gid
            .iter()
            .filter_map(|(&ch, &new_gid)| {
                face.glyph_index(ch)
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| (new_gid, scale(adv as f32)))
            })
            .collect();
        gid_widths.sort_by_key(|&(gid, _)| gid);
        gid_widths.dedup_by_key(|&mut (gid, _)| gid);
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let cmap_name = format!("{}-UTF16", embedded.ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(Name(cmap_name.as_bytes()), identity_system_info());
    for (&ch, &new_gid) in &embedded.char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Ok(())
}

fn identity_system_info() -> pdf_writer::types::SystemInfo<'static> {
    pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    }
}

/// The two faces every document draws with.
pub(crate) struct FontSet {
    pub(crate) regular: FontEntry,
    pub(crate) bold: FontEntry,
}

impl FontSet {
    pub(crate) fn builtin() -> Self {
        Self {
            regular: FontEntry::helvetica("F1"),
            bold: FontEntry::helvetica_bold("F2"),
        }
    }

    /// Embedded faces where paths are given. A lone regular face also serves
    /// as the bold face so glyph coverage stays consistent.
    pub(crate) fn load(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self, Error> {
        let regular_entry = match regular {
            Some(path) => FontEntry::load(path, "F1")?,
            None => FontEntry::helvetica("F1"),
        };
        let bold_entry = match bold.or(regular) {
            Some(path) => FontEntry::load(path, "F2")?,
            None => FontEntry::helvetica_bold("F2"),
        };
        Ok(Self {
            regular: regular_entry,
            bold: bold_entry,
        })
    }

    pub(crate) fn get(&self, bold: bool) -> &FontEntry {
        if bold { &self.bold } else { &self.regular }
    }

    pub(crate) fn get_mut(&mut self, bold: bool) -> &mut FontEntry {
        if bold { &mut self.bold } else { &mut self.regular }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_measures_known_strings() {
        let font = FontEntry::helvetica("F1");
        // "Page" = 667 + 556 + 556 + 556
        assert!((font.text_width("Page", 10.0) - 23.35).abs() < 0.01);
        assert_eq!(font.text_width("", 10.0), 0.0);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let fonts = FontSet::builtin();
        let text = "Alternative Thought";
        assert!(fonts.bold.text_width(text, 11.0) > fonts.regular.text_width(text, 11.0));
    }

    #[test]
    fn winansi_encoding_rejects_unmappable_chars() {
        let mut font = FontEntry::helvetica("F1");
        assert_eq!(font.encode("caf\u{e9} \u{2022}").unwrap(), b"caf\xe9 \x95");
        let Err(Error::Render(msg)) = font.encode("\u{4f60}") else {
            panic!("CJK text should not encode in WinAnsi");
        };
        assert!(msg.contains(FONT_ENV), "{msg}");
    }
}
