//! End-to-end conversion tests over synthetic fonts built with write-fonts.

use read_fonts::{FontRef, tables::glyf::CurvePoint, types::Tag};
use write_fonts::{
    FontBuilder,
    tables::{
        glyf::{Bbox, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
    },
};

use crosstype_convert::{Converter, Error, Options, TargetFormat, extract};

const CFF: Tag = Tag::new(b"CFF ");
const GLYF: Tag = Tag::new(b"glyf");
const LOCA: Tag = Tag::new(b"loca");
const HEAD: Tag = Tag::new(b"head");
const MAXP: Tag = Tag::new(b"maxp");

/// One single-contour glyph from (x, y, on_curve) triples.
fn simple_glyph(points: &[(i16, i16, bool)]) -> SimpleGlyph {
    let contour: Vec<CurvePoint> = points
        .iter()
        .map(|&(x, y, on_curve)| CurvePoint { x, y, on_curve })
        .collect();
    let bbox = Bbox {
        x_min: points.iter().map(|p| p.0).min().unwrap(),
        y_min: points.iter().map(|p| p.1).min().unwrap(),
        x_max: points.iter().map(|p| p.0).max().unwrap(),
        y_max: points.iter().map(|p| p.1).max().unwrap(),
    };
    SimpleGlyph { bbox, contours: vec![contour.into()], instructions: vec![] }
}

/// Build a minimal TrueType font: one empty `.notdef` plus the given
/// glyphs, 500/glyph advances, 1000 upem.
fn make_ttf(glyphs: &[SimpleGlyph]) -> Vec<u8> {
    let num_glyphs = (glyphs.len() + 1) as u16;

    let mut glyf_builder = GlyfLocaBuilder::new();
    glyf_builder.add_glyph(&Glyph::Empty).unwrap();
    for glyph in glyphs {
        glyf_builder.add_glyph(&Glyph::Simple(glyph.clone())).unwrap();
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let head = Head {
        font_revision: font_types::Fixed::from_f64(1.0),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: write_fonts::tables::head::Flags::empty(),
        units_per_em: 1000,
        created: font_types::LongDateTime::new(0),
        modified: font_types::LongDateTime::new(0),
        x_min: 0,
        y_min: 0,
        x_max: 500,
        y_max: 700,
        mac_style: write_fonts::tables::head::MacStyle::empty(),
        lowest_rec_ppem: 8,
        font_direction_hint: 2,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
    };

    let hhea = Hhea {
        ascender: font_types::FWord::new(700),
        descender: font_types::FWord::new(-200),
        line_gap: font_types::FWord::new(0),
        advance_width_max: font_types::UfWord::new(500),
        min_left_side_bearing: font_types::FWord::new(0),
        min_right_side_bearing: font_types::FWord::new(0),
        x_max_extent: font_types::FWord::new(500),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
    };

    let hmtx = Hmtx {
        h_metrics: (0..num_glyphs)
            .map(|_| LongMetric { advance: 500, side_bearing: 0 })
            .collect(),
        left_side_bearings: vec![],
    };

    let maxp = Maxp {
        num_glyphs,
        max_points: Some(16),
        max_contours: Some(4),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };

    let mut builder = FontBuilder::new();
    builder.add_table(&head).unwrap();
    builder.add_table(&hhea).unwrap();
    builder.add_table(&hmtx).unwrap();
    builder.add_table(&maxp).unwrap();
    builder.add_table(&glyf).unwrap();
    builder.add_table(&loca).unwrap();
    builder.build()
}

fn square_glyph() -> SimpleGlyph {
    simple_glyph(&[
        (100, 0, true),
        (400, 0, true),
        (400, 300, true),
        (100, 300, true),
    ])
}

/// One quadratic arch (off-curve apex control) plus a line.
fn curvy_glyph() -> SimpleGlyph {
    simple_glyph(&[
        (50, 0, true),
        (250, 400, false),
        (450, 0, true),
        (250, -100, true),
    ])
}

#[test]
fn ttf_to_otf_builds_a_cff_font() {
    let ttf = make_ttf(&[square_glyph()]);
    let converter = Converter::new(Options::default());
    let tables = converter.convert(&ttf, TargetFormat::Otf).unwrap();

    assert!(tables.contains_key(&CFF));
    assert!(!tables.contains_key(&GLYF));
    assert!(!tables.contains_key(&LOCA));

    let maxp = &tables[&MAXP];
    assert_eq!(&maxp[..4], &0x00005000u32.to_be_bytes());
    assert_eq!(&maxp[4..6], &2u16.to_be_bytes());

    // indexToLocFormat zeroed at byte offset 50.
    assert_eq!(&tables[&HEAD][50..52], &[0, 0]);
}

#[test]
fn square_bbox_survives_exactly() {
    let ttf = make_ttf(&[square_glyph()]);
    let converter = Converter::new(Options::default());
    let otf = converter.convert_to_font(&ttf, TargetFormat::Otf).unwrap();

    let font = FontRef::new(&otf).unwrap();
    let outlines = extract::cff::extract_outlines(&font).unwrap();
    assert_eq!(outlines.len(), 2);
    assert!(outlines[0].is_empty());

    let square = &outlines[1];
    assert_eq!(square.bbox.x_min, 100);
    assert_eq!(square.bbox.y_min, 0);
    assert_eq!(square.bbox.x_max, 400);
    assert_eq!(square.bbox.y_max, 300);
}

#[test]
fn round_trip_preserves_bbox_and_command_count() {
    let ttf = make_ttf(&[square_glyph(), curvy_glyph()]);
    let source_font = FontRef::new(&ttf).unwrap();
    let source_outlines = extract::ttf::extract_outlines(&source_font).unwrap();

    let converter = Converter::new(Options::default());
    let otf = converter.convert_to_font(&ttf, TargetFormat::Otf).unwrap();
    let otf_font = FontRef::new(&otf).unwrap();
    let cff_outlines = extract::cff::extract_outlines(&otf_font).unwrap();

    assert_eq!(source_outlines.len(), cff_outlines.len());
    for (before, after) in source_outlines.iter().zip(&cff_outlines) {
        assert_eq!(
            before.drawing_command_count(),
            after.drawing_command_count(),
            "glyph {}",
            before.glyph_id
        );
        assert!(
            (before.bbox.x_min - after.bbox.x_min).abs() <= 2
                && (before.bbox.y_min - after.bbox.y_min).abs() <= 2
                && (before.bbox.x_max - after.bbox.x_max).abs() <= 2
                && (before.bbox.y_max - after.bbox.y_max).abs() <= 2,
            "glyph {}: {:?} vs {:?}",
            before.glyph_id,
            before.bbox,
            after.bbox
        );
    }
}

#[test]
fn otf_round_trips_back_to_ttf() {
    let ttf = make_ttf(&[square_glyph(), curvy_glyph()]);
    let converter = Converter::new(Options::default());
    let otf = converter.convert_to_font(&ttf, TargetFormat::Otf).unwrap();

    let tables = converter.convert(&otf, TargetFormat::Ttf).unwrap();
    assert!(tables.contains_key(&GLYF));
    assert!(tables.contains_key(&LOCA));
    assert!(!tables.contains_key(&CFF));

    let maxp = &tables[&MAXP];
    assert_eq!(&maxp[..4], &0x00010000u32.to_be_bytes());
    assert_eq!(&maxp[4..6], &3u16.to_be_bytes());

    // head.indexToLocFormat matches the loca size relation: with short
    // offsets, loca holds (num_glyphs + 1) u16 entries.
    let loca_format = i16::from_be_bytes([tables[&HEAD][50], tables[&HEAD][51]]);
    let entry_size = if loca_format == 0 { 2 } else { 4 };
    assert_eq!(tables[&LOCA].len(), (3 + 1) * entry_size);
}

#[test]
fn optimization_never_grows_the_table_and_preserves_geometry() {
    // Four glyphs sharing identical contours: prime subroutinizer food.
    let paths: Vec<SimpleGlyph> = (0..4).map(|_| square_glyph()).collect();
    let ttf = make_ttf(&paths);

    let plain = Converter::new(Options::default())
        .convert(&ttf, TargetFormat::Otf)
        .unwrap();
    let optimized = Converter::new(Options::new().optimize_cff(true).min_pattern_length(4))
        .convert(&ttf, TargetFormat::Otf)
        .unwrap();

    assert!(optimized[&CFF].len() <= plain[&CFF].len());

    // Lossless bytecode transformation: identical command sequences after
    // resolving every callsubr.
    let plain_outlines = {
        let cff = crosstype_cff::parse::parse(&plain[&CFF]).unwrap();
        charstring_outlines(&cff)
    };
    let optimized_outlines = {
        let cff = crosstype_cff::parse::parse(&optimized[&CFF]).unwrap();
        charstring_outlines(&cff)
    };
    assert_eq!(plain_outlines, optimized_outlines);
}

fn charstring_outlines(
    cff: &crosstype_cff::parse::CffFont<'_>,
) -> Vec<Vec<crosstype_convert::PathCommand>> {
    let charstrings: Vec<Vec<u8>> = cff.charstrings.iter().map(|c| c.to_vec()).collect();
    let local: Vec<Vec<u8>> = cff.local_subrs.iter().map(|s| s.to_vec()).collect();
    extract::cff::outlines_from_charstrings(&charstrings, &local)
        .unwrap()
        .into_iter()
        .map(|o| o.commands)
        .collect()
}

#[test]
fn unsupported_conversions_are_reported() {
    let ttf = make_ttf(&[square_glyph()]);
    let converter = Converter::new(Options::default());
    let err = converter.convert(&ttf, TargetFormat::Ttf).unwrap_err();
    assert!(matches!(err, Error::UnsupportedConversion { .. }));
    assert!(err.to_string().contains("otf"));
}

#[test]
fn format_detection_failure_is_fatal() {
    // A font with no outline tables at all.
    let mut builder = FontBuilder::new();
    builder.add_raw(Tag::new(b"name"), vec![0u8; 6]);
    let data = builder.build();
    let converter = Converter::new(Options::default());
    assert!(matches!(
        converter.convert(&data, TargetFormat::Otf),
        Err(Error::UnknownFormat)
    ));
}

#[test]
fn instance_request_without_fvar_is_ignored() {
    let ttf = make_ttf(&[square_glyph()]);
    let converter = Converter::new(Options::new().generate_instance(true));
    assert!(converter.convert(&ttf, TargetFormat::Otf).is_ok());
}

#[test]
fn instance_request_without_generator_fails() {
    // Same font with an fvar table: now a generator is mandatory.
    let ttf = make_ttf(&[square_glyph()]);
    let font = FontRef::new(&ttf).unwrap();
    let mut builder = FontBuilder::new();
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if let Some(data) = font.table_data(tag) {
            builder.add_raw(tag, data);
        }
    }
    builder.add_raw(Tag::new(b"fvar"), vec![0u8; 16]);
    let variable = builder.build();

    let converter = Converter::new(Options::new().generate_instance(true));
    assert!(matches!(
        converter.convert(&variable, TargetFormat::Otf),
        Err(Error::NoInstanceGenerator)
    ));
}
