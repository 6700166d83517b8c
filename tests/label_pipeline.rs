use std::fs;

use engrave_label::consts::PT_TO_PX;
use engrave_label::layout::LineMetrics;
use engrave_label::{
    download_fallback, encode, row_size, BlockTypesetter, FontBook, FontSpec, FontStyle, FontWeight, LabelContent,
    LabelJob, LabelSettings, PlainText, RichText, TextSpan, Typesetter, Unit,
};

const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

fn hello_settings() -> LabelSettings {
    LabelSettings {
        width: 50.0,
        height: 20.0,
        padding: 5.0,
        unit: Unit::Millimeter,
        auto_size: true,
        ..LabelSettings::default()
    }
}

fn pixel_bits(bmp: &[u8], width: u32, height: u32) -> Vec<Vec<bool>> {
    // decode back to top-down rows of ink flags
    let stride = row_size(width);
    (0..height as usize)
        .map(|row| {
            let stored = height as usize - 1 - row;
            let data = &bmp[62 + stored * stride..62 + (stored + 1) * stride];
            (0..width as usize).map(|x| data[x / 8] & (0x80 >> (x % 8)) != 0).collect()
        })
        .collect()
}

#[test]
fn hello_label_end_to_end() {
    let job = LabelJob::new(hello_settings()).unwrap();
    let rendered = job.render(&LabelContent::Plain(PlainText::new("HELLO")), &BlockTypesetter);

    assert_eq!((rendered.surface.width(), rendered.surface.height()), (590, 236));
    assert!(rendered.font_size.unwrap() > 0.0);

    let bmp = rendered.to_bmp().unwrap();
    assert_eq!(bmp.len(), 62 + 590usize.div_ceil(32) * 4 * 236);

    // dead zone is light grey and never engraves; text does
    let bits = pixel_bits(bmp.as_bytes(), 590, 236);
    assert!(bits.iter().all(|row| row[..59].iter().all(|&b| !b)));
    assert!(bits.iter().any(|row| row[59..].iter().any(|&b| b)));
}

#[test]
fn mirrored_export_flips_ink() {
    let settings = LabelSettings { is_flipped: true, ..hello_settings() };
    let job = LabelJob::new(settings).unwrap();
    let rendered = job.render(&LabelContent::Plain(PlainText::new("HI")), &BlockTypesetter);
    let straight = pixel_bits(encode(&rendered.surface, false).unwrap().as_bytes(), 590, 236);
    let mirrored = pixel_bits(rendered.to_bmp().unwrap().as_bytes(), 590, 236);
    for (a, b) in straight.iter().zip(&mirrored) {
        let reversed: Vec<bool> = a.iter().rev().copied().collect();
        assert_eq!(&reversed, b);
    }
}

#[test]
fn rich_line_is_sum_of_spans_and_tallest_wins() {
    let rich = RichText::new(vec![TextSpan::new("AB").size(24.0).bold(), TextSpan::new("CD").size(12.0)]);
    let job = LabelJob::new(hello_settings()).unwrap();
    let rendered = job.render(&LabelContent::Rich(rich.clone()), &BlockTypesetter);
    let effective = rendered.font_size.unwrap();
    let scale = effective / 18.0;

    let lines = rich.lines();
    assert_eq!(lines.len(), 1);
    let m = LineMetrics::measure(&lines[0], scale, &BlockTypesetter);
    assert!((m.height() - 24.0 * scale * PT_TO_PX).abs() < 1e-3);
    assert!(m.sizes[0] > m.sizes[1]);

    let ab = BlockTypesetter.measure("AB", &FontSpec::for_span(&lines[0][0], m.sizes[0]));
    let cd = BlockTypesetter.measure("CD", &FontSpec::for_span(&lines[0][1], m.sizes[1]));
    assert!((m.width() - (ab + cd)).abs() < 1e-3);

    // the bold 24pt span is drawn taller than the 12pt one
    let ink_height = |x0: u32, x1: u32| {
        (0..rendered.surface.height())
            .filter(|&y| (x0..x1).any(|x| rendered.surface.pixel(x, y).unwrap()[0] == 0))
            .count()
    };
    let left = (59.055 + (590.0 - 59.055) / 2.0 - m.width() / 2.0) as u32;
    let split = left + ab as u32;
    assert!(ink_height(left, split) > ink_height(split, split + cd as u32));
}

#[test]
fn empty_input_exports_background_only() {
    let job = LabelJob::new(hello_settings()).unwrap();
    for content in [LabelContent::Plain(PlainText::new("")), LabelContent::Rich(RichText::default())] {
        let rendered = job.render(&content, &BlockTypesetter);
        assert_eq!(rendered.font_size, None);
        let bmp = rendered.to_bmp().unwrap();
        assert!(bmp.as_bytes()[62..].iter().all(|&b| b == 0));
    }
}

#[test]
fn settings_file_drives_export() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("label.json");
    fs::write(&settings_path, r#"{"width":2,"height":1,"padding":0.2,"unit":"in","isFlipped":false}"#).unwrap();

    let job = LabelJob::new(LabelSettings::load(&settings_path).unwrap()).unwrap();
    let bmp = job.build_bmp(&LabelContent::Plain(PlainText::new("A\nB")), &BlockTypesetter).unwrap();
    let path = download_fallback(&bmp, dir.path(), "label.bmp").unwrap();

    let written = fs::read(path).unwrap();
    assert_eq!(written.len(), 62 + row_size(600) * 300);
    assert_eq!(&written[0..2], b"BM");
}

#[test]
fn truetype_fit_stays_inside_safe_area() {
    let Ok(bytes) = fs::read(SYSTEM_FONT) else { return };
    let mut book = FontBook::new();
    book.add_face("DejaVu Sans", FontWeight::Normal, FontStyle::Normal, bytes).unwrap();

    let settings = hello_settings();
    let job = LabelJob::new(settings.clone()).unwrap();
    let rendered = job.render(&LabelContent::Plain(PlainText::new("HELLO\nWORLD")), &book);
    let px = rendered.font_size.unwrap() * PT_TO_PX;

    let g = settings.geometry();
    let safe_w = g.engrave_width() * 0.9;
    let widest = ["HELLO", "WORLD"]
        .iter()
        .map(|l| book.measure(l, &FontSpec::new("sans-serif", px)))
        .fold(0.0_f32, f32::max);
    assert!(widest <= safe_w + 1e-3);
    assert!(px * 2.0 * 1.2 <= g.engrave_height() * 0.9 + 1e-3);
}

#[test]
fn absurd_max_font_size_still_renders() {
    let settings = LabelSettings::from_json(r#"{"maxFontSize":1e30}"#).unwrap();
    let job = LabelJob::new(settings).unwrap();

    let plain = job.render(&LabelContent::Plain(PlainText::new("HELLO")), &BlockTypesetter);
    let pt = plain.font_size.unwrap();
    assert!(pt.is_finite() && pt > 0.0);
    // one line at 1.2 line height inside 90% of the 236px label
    assert!(pt * PT_TO_PX * 1.2 <= 236.0 * 0.9 + 1e-3);

    let rich = RichText::new(vec![TextSpan::new("HELLO").size(24.0)]);
    let rendered = job.render(&LabelContent::Rich(rich), &BlockTypesetter);
    assert!(rendered.font_size.unwrap().is_finite());
}
