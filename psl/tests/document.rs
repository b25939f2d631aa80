//! Complete documents written through the public interface.

mod common;

use common::{ascii85_decode, hex_decode, lzw_decode, rle_decode};
use psl::{
    BoxShape, ClipFlags, ColorImage, Compression, Config, ImageSource, MarkKind, Paint, PenFlags,
    PlotOptions, Point, Rgba, Session, Symbol, Transport, Unit, load_eps, load_raster,
};

fn config() -> Config {
    Config::default()
        .with_unit(Unit::Inch)
        .with_user_name("tester")
        .with_creation_date("Fri Oct 16 12:00:00 2026")
}

fn output(s: Session<Vec<u8>>) -> String {
    String::from_utf8(s.finish().unwrap()).unwrap()
}

/// The decoded data of every inline image stream, in order.
fn image_streams(doc: &str) -> Vec<(String, Vec<u8>)> {
    let mut streams = vec![];
    let mut rest = doc;
    while let Some(start) = rest.find("/DataSource currentfile") {
        let header_end = start + rest[start..].find('\n').unwrap();
        let filters = rest[start..header_end].to_string();
        let data_start = header_end + 1 + rest[header_end + 1..].find('\n').unwrap() + 1;
        let data_end = data_start + rest[data_start..].find("~>").unwrap() + 2;
        streams.push((filters, ascii85_decode(rest[data_start..data_end].as_bytes())));
        rest = &rest[data_end..];
    }
    streams
}

/// Names of procedures and variables used but never defined.
fn undefined_names(doc: &str) -> Vec<String> {
    // Drop encoded data first, its alphabet overlaps with PostScript syntax.
    let mut code = String::new();
    let mut rest = doc;
    loop {
        let next = [">> image\n", ">> imagemask\n", "<~\n"]
            .iter()
            .filter_map(|m| rest.find(m).map(|i| i + m.len()))
            .min();
        let Some(i) = next else {
            code.push_str(rest);
            break;
        };
        code.push_str(&rest[..i]);
        let end = i + rest[i..].find("~>").unwrap() + 2;
        rest = &rest[end..];
    }

    // Drop strings, hex strings and comments.
    let mut bare = String::new();
    let mut chars = code.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '(' => {
                let mut depth = 1;
                while depth > 0 {
                    match chars.next() {
                        Some('\\') => {
                            chars.next();
                        }
                        Some('(') => depth += 1,
                        Some(')') => depth -= 1,
                        Some(_) => {}
                        None => break,
                    }
                }
                bare.push(' ');
            }
            '<' if chars.peek() == Some(&'<') => {
                chars.next();
                bare.push(' ');
            }
            '<' => {
                for c in chars.by_ref() {
                    if c == '>' {
                        break;
                    }
                }
                bare.push(' ');
            }
            '%' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                bare.push('\n');
            }
            '{' | '}' | '[' | ']' | '>' => bare.push(' '),
            c => bare.push(c),
        }
    }

    let short = |t: &str| {
        t.len() <= 2
            && t.starts_with(|c: char| c.is_ascii_uppercase())
            && t.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-')
    };
    let mut missing: Vec<String> = bare
        .split_whitespace()
        .filter(|t| short(t) || t.starts_with("PSL_"))
        .filter(|t| {
            !["/{t} ", "/{t}\n", "/{t}{"]
                .iter()
                .any(|p| doc.contains(&p.replace("{t}", t)))
        })
        .map(str::to_string)
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

#[test]
fn complete_document() {
    let mut s = Session::in_memory(config());
    s.begin_plot(&PlotOptions {
        offset: [1.0, 1.0],
        title: Some("Scenario".into()),
        ..PlotOptions::default()
    })
    .unwrap();

    s.set_line_width(2.0).unwrap();
    s.set_dash(Some("4 2"), 0.0).unwrap();
    s.plot_line(
        &[Point::new(0.0, 0.0), Point::new(1.0, 0.5), Point::new(2.0, 0.0)],
        PenFlags::MOVE | PenFlags::STROKE,
    )
    .unwrap();
    s.set_dash(None, 0.0).unwrap();

    s.set_fill(Paint::Color(Rgba::new(1.0, 0.0, 0.0)), Some(true)).unwrap();
    for (i, kind) in [MarkKind::Circle, MarkKind::Star, MarkKind::Cross, MarkKind::Hexagon]
        .into_iter()
        .enumerate()
    {
        s.plot_symbol(i as f64, 2.0, &Symbol::Mark(kind, 0.25)).unwrap();
    }
    s.plot_symbol(
        1.0,
        3.0,
        &Symbol::RoundRect {
            width: 1.0,
            height: 0.5,
            radius: 0.1,
        },
    )
    .unwrap();

    s.plot_text(1.0, 4.0, 18.0, Some("T@-2@- and @%1%bold@%%"), 30.0, 6, 0)
        .unwrap();
    s.plot_text_box(1.0, 5.0, 12.0, "boxed", 0.0, 2, [0.05, 0.05], true)
        .unwrap();
    s.plot_text(1.0, 5.0, 12.0, None, 0.0, 2, 0).unwrap();

    s.set_paragraph(0.2, 3.0, 4).unwrap();
    s.set_fill(Paint::Color(Rgba::new(0.9, 0.9, 0.9)), Some(true)).unwrap();
    s.plot_paragraph_box(
        0.5,
        7.0,
        10.0,
        "A paragraph with enough words to wrap across a few lines of text.",
        0.0,
        1,
        [0.1, 0.1],
        BoxShape::Rounded,
    )
    .unwrap();
    s.plot_paragraph(0.5, 7.0, 10.0, None, 0.0, 1).unwrap();

    let n = s
        .set_image(
            ImageSource::Predefined(12),
            300,
            Paint::Color(Rgba::new(0.0, 0.0, 1.0)),
            Paint::Color(Rgba::WHITE),
        )
        .unwrap();
    s.set_fill(Paint::Pattern(n), Some(false)).unwrap();
    let square = [
        Point::new(4.0, 1.0),
        Point::new(5.0, 1.0),
        Point::new(5.0, 2.0),
        Point::new(4.0, 2.0),
    ];
    s.plot_polygon(&square).unwrap();

    s.begin_clipping(&square, Paint::NoChange, ClipFlags::START | ClipFlags::END)
        .unwrap();
    s.plot_symbol(4.5, 1.5, &Symbol::Mark(MarkKind::Circle, 1.5)).unwrap();
    s.end_clipping(None).unwrap();

    s.end_plot(true).unwrap();
    let doc = output(s);

    assert!(doc.starts_with("%!PS-Adobe-3.0\n%%BoundingBox: 0 0 612 792\n"));
    assert!(doc.contains("%%Title: Scenario\n%%Creator: PSL\n%%For: tester\n"));
    assert!(doc.ends_with("showpage\n\n%%Trailer\n\nend\n%%EOF\n"));

    let order = [
        "%%EndComments",
        "%%BeginProlog",
        "%%EndProlog",
        "%%BeginSetup",
        "%%EndSetup",
        "%%Page: 1 1",
        "%%BeginPageSetup",
        "%%EndPageSetup",
        "%PSL_End_Header",
        "/PSL_textjustifier {",
        "%PSL_Begin_Trailer",
        "%%PageTrailer",
        "%%Trailer",
        "%%EOF",
    ];
    let positions: Vec<usize> = order.iter().map(|m| doc.find(m).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");

    // Library comments are stripped without comment mode.
    assert!(!doc.contains("%-"));
    assert!(!doc.contains("% Short names"));
    assert_eq!(doc.matches("/PSL_textjustifier {").count(), 1);

    assert!(doc.contains("clipsave\n"));
    assert!(doc.contains("PSL_nclip {PSL_cliprestore} repeat\n"));
    assert!(doc.contains("pattern12 I"));
    assert!(doc.contains("currentdict /pattern12 undef\n"));

    assert_eq!(undefined_names(&doc), Vec::<String>::new());
}

#[test]
fn comments_are_kept_on_request() {
    let mut s = Session::in_memory(config().with_comments(true));
    s.begin_plot(&PlotOptions::default()).unwrap();
    s.plot_text(1.0, 1.0, 12.0, Some("hello"), 0.0, 1, 0).unwrap();
    s.end_plot(true).unwrap();
    let doc = output(s);

    assert!(doc.contains("% Short names for common operators\n"));
    assert!(doc.contains("% End of PSL header\n"));
    assert!(!doc.contains("%-"));
    assert!(doc.ends_with("%%EOF\n"));
}

#[test]
fn overlays_continue_the_document() {
    let mut s = Session::in_memory(config());
    s.begin_plot(&PlotOptions::default()).unwrap();
    s.plot_segment(0.0, 0.0, 1.0, 1.0).unwrap();
    s.end_plot(false).unwrap();

    s.begin_plot(&PlotOptions {
        overlay: true,
        ..PlotOptions::default()
    })
    .unwrap();
    s.plot_segment(1.0, 1.0, 2.0, 0.0).unwrap();
    s.end_plot(true).unwrap();
    let doc = output(s);

    assert_eq!(doc.matches("%!PS-Adobe-3.0").count(), 1);
    assert_eq!(doc.matches("%%EndProlog").count(), 1);
    assert_eq!(doc.matches("%%EOF").count(), 1);
    assert_eq!(doc.matches("\nshowpage\n").count(), 1);
}

#[test]
fn rejected_calls_write_nothing() {
    let mut s = Session::in_memory(config());

    assert!(s.plot_text(0.0, 0.0, 12.0, Some("x"), 0.0, 4, 0).is_err());
    assert!(s.plot_text(0.0, 0.0, 12.0, Some("x"), 0.0, 1, 7).is_err());
    assert!(s.set_paragraph(0.2, 3.0, 5).is_err());
    assert!(s.set_line_width(-1.0).is_err());
    assert!(s.set_image(ImageSource::Predefined(91), 0, Paint::Skip, Paint::Skip).is_err());
    assert!(s.end_plot(true).is_err());

    assert_eq!(output(s), "");
}

#[test]
fn compressed_images_decode_to_their_pixels() {
    // A gray ramp with long runs on every row.
    let (nx, ny) = (64, 16);
    let pixels: Vec<u8> = (0..nx * ny).map(|i| ((i / nx) * 16 + i % nx / 16) as u8).collect();
    let image = ColorImage {
        data: &pixels,
        width: nx,
        height: ny,
        bits: 8,
        interpolate: false,
        mask: None,
    };

    for compression in [Compression::Rle, Compression::Lzw] {
        let mut s = Session::in_memory(config().with_compression(compression));
        s.begin_plot(&PlotOptions::default()).unwrap();
        s.plot_color_image(1.0, 1.0, 2.0, 0.0, 1, &image).unwrap();
        s.end_plot(true).unwrap();
        let doc = output(s);

        assert!(doc.contains("/DeviceGray setcolorspace\n<< /ImageType 1 /Decode [0 1] "));
        assert!(doc.contains("/Width 64 /Height 16 /BitsPerComponent 8\n"));

        let streams = image_streams(&doc);
        assert_eq!(streams.len(), 1);
        let (filters, data) = &streams[0];
        assert!(filters.contains("/ASCII85Decode filter"));
        let decoded = match compression {
            Compression::Rle => {
                assert!(filters.ends_with("/RunLengthDecode filter"));
                rle_decode(data)
            }
            _ => {
                assert!(filters.ends_with("/LZWDecode filter"));
                lzw_decode(data)
            }
        };
        assert_eq!(decoded, pixels);
    }
}

#[test]
fn hex_transport_is_used_for_images_and_patterns() {
    let (nx, ny) = (32, 8);
    let pixels: Vec<u8> = (0..nx * ny).map(|i| (i / 8 * 8) as u8).collect();
    let image = ColorImage {
        data: &pixels,
        width: nx,
        height: ny,
        bits: 8,
        interpolate: false,
        mask: None,
    };

    let mut s = Session::in_memory(
        config()
            .with_transport(Transport::Hex)
            .with_compression(Compression::Rle),
    );
    s.begin_plot(&PlotOptions::default()).unwrap();
    s.plot_color_image(1.0, 1.0, 2.0, 0.0, 1, &image).unwrap();
    let n = s
        .set_image(ImageSource::Predefined(3), 300, Rgba::BLACK.into(), Rgba::WHITE.into())
        .unwrap();
    s.end_plot(true).unwrap();
    let doc = output(s);

    assert!(!doc.contains("ASCII85"));
    assert!(!doc.contains("~>"));
    assert!(doc.contains(&format!("/image{n} {{<\n")));

    let marker = "/DataSource currentfile /ASCIIHexDecode filter /RunLengthDecode filter\n>> image\n";
    let start = doc.find(marker).unwrap() + marker.len();
    let data = hex_decode(doc[start..].as_bytes());
    assert_eq!(rle_decode(&data), pixels);
    let end = start + doc[start..].find('>').unwrap();
    assert!(doc[end..].starts_with(">\nU\n"));
}

#[test]
fn uncompressible_image_is_written_plain() {
    let mut state = 7_u32;
    let noise: Vec<u8> = (0..32 * 32)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            (state >> 16) as u8
        })
        .collect();
    let image = ColorImage {
        data: &noise,
        width: 32,
        height: 32,
        bits: 8,
        interpolate: true,
        mask: None,
    };

    let mut s = Session::in_memory(config().with_compression(Compression::Rle));
    s.begin_plot(&PlotOptions::default()).unwrap();
    s.plot_color_image(0.0, 0.0, 1.0, 1.0, 1, &image).unwrap();
    s.end_plot(true).unwrap();
    let doc = output(s);

    assert!(doc.contains("<< /ImageType 1 /Interpolate true /Decode [0 1] "));
    let streams = image_streams(&doc);
    assert!(!streams[0].0.contains("RunLengthDecode"));
    assert_eq!(streams[0].1, noise);
}

#[test]
fn embedded_eps() {
    let eps = b"%!PS-Adobe-3.0 EPSF-3.0\n%%BoundingBox: 10 20 110 70\n\
                %%EndComments\nnewpath 10 20 moveto 110 70 lineto stroke\nshowpage\n";
    let info = load_eps(eps).unwrap();
    assert_eq!((info.llx, info.lly, info.trx, info.try_), (10.0, 20.0, 110.0, 70.0));

    let mut s = Session::in_memory(config());
    s.begin_plot(&PlotOptions::default()).unwrap();
    s.plot_eps_image(1.0, 1.0, 2.0, 0.0, 1, eps, &info).unwrap();
    s.end_plot(true).unwrap();
    let doc = output(s);

    let begin = doc.find("PSL_eps_begin\n").unwrap();
    let embedded = doc.find("%%BeginDocument: psimage.eps\n").unwrap();
    let end = doc.find("%%EndDocument\nPSL_eps_end\n").unwrap();
    assert!(begin < embedded && embedded < end);
    assert!(doc[embedded..end].contains("110 70 lineto"));
    assert!(doc.contains("-10 -20 T\n"));

    assert!(load_eps(b"not postscript").is_err());
}

#[test]
fn rasterfile_feeds_images_and_patterns() {
    // An 8 by 2 byte-encoded Sun rasterfile of 8-bit gray.
    let body = [0x80, 7, 0x40, 0, 1, 2, 3, 4, 5, 6, 7];
    let mut file = vec![];
    for v in [0x59a6_6a95_u32, 8, 2, 8, body.len() as u32, 2, 0, 0] {
        file.extend_from_slice(&v.to_be_bytes());
    }
    file.extend_from_slice(&body);

    let raster = load_raster(&file).unwrap();
    assert_eq!((raster.width, raster.height, raster.depth), (8, 2, 8));
    assert_eq!(&raster.data[..8], &[0x40; 8]);

    let mut s = Session::in_memory(config().with_compression(Compression::None));
    s.begin_plot(&PlotOptions::default()).unwrap();
    s.plot_color_image(1.0, 1.0, 1.0, 0.0, 1, &raster.color_image())
        .unwrap();
    let n = s
        .set_image(raster.source("ramp"), 0, Rgba::BLACK.into(), Rgba::WHITE.into())
        .unwrap();
    s.end_plot(true).unwrap();
    let doc = output(s);

    assert_eq!(n, 91);
    assert!(doc.contains("/image91 {<~\n"));
    let streams = image_streams(&doc);
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].1, raster.data);

    assert_eq!(load_raster(b"%!PS-Adobe-3.0\n"), Err(psl::Error::ReadFailure));
}
