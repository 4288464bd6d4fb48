//! End-to-end tests for the conversion pipeline.

use std::io::Write;

use docmark::convert::{ConversionInput, ConvertOptions, Pipeline};
use docmark::model::{DrawOp, PageContent};
use docmark::parser::{merge_intervals, Interval, TableRouter};
use docmark::render::Emphasis;
use docmark::{DocumentProfile, DocumentVariant, ImageRef};

fn pipeline() -> Pipeline {
    Pipeline::with_defaults().unwrap()
}

/// A two-column ruled page with one grid row per entry, top to bottom.
fn ruled_page(number: u32, rows: &[(&str, &str)]) -> PageContent {
    let height = rows.len() as f32 * 20.0;
    let mut page = PageContent::new(number);
    for x in [0.0, 100.0, 300.0] {
        page = page.op(DrawOp::Rect {
            x,
            y: 0.0,
            width: 0.5,
            height,
        });
    }
    for r in 0..=rows.len() {
        page = page.op(DrawOp::Rect {
            x: 0.0,
            y: r as f32 * 20.0,
            width: 300.0,
            height: 0.5,
        });
    }
    for (r, (left, right)) in rows.iter().enumerate() {
        let y = height - r as f32 * 20.0 - 10.0;
        page = page.text(*left, 5.0, y).text(*right, 105.0, y);
    }
    page
}

fn image(index: usize, name: &str) -> ImageRef {
    ImageRef::new(index, format!("images/{}", name), format!("Diagram {}", index + 1))
}

// ==================== Standard Documents ====================

#[test]
fn test_intro_section() {
    let result = pipeline()
        .convert_text("Introduction\nThis is the intro text.", &[])
        .unwrap();

    assert_eq!(result.variant, DocumentVariant::Standard);
    assert!(result
        .markdown
        .starts_with("## Introduction\n\nThis is the intro text."));
    assert!(result
        .markdown
        .ends_with("---\n\n© 2025 Cloudbrink, Inc. All rights reserved."));
}

#[test]
fn test_callout_keeps_continuation() {
    let result = pipeline()
        .convert_text("NOTE: careful here.\nMore detail.\n\nNext paragraph.", &[])
        .unwrap();
    assert!(result
        .markdown
        .starts_with("> **NOTE:** careful here.\n> More detail.\n\nNext paragraph."));
}

#[test]
fn test_ordered_list_is_contiguous() {
    let result = pipeline()
        .convert_text("1. First step\n2. Second step", &[])
        .unwrap();
    assert!(result.markdown.starts_with("1. First step\n2. Second step\n\n"));
}

#[test]
fn test_repeated_title_rendered_once() {
    let mut text = String::from("Bridge Mode User Guide\nSome intro words.\n");
    for _ in 0..4 {
        text.push_str("Bridge Mode User Guide\nMore words follow.\n");
    }
    let result = pipeline().convert_text(&text, &[]).unwrap();

    let titles: Vec<&str> = result
        .markdown
        .lines()
        .filter(|l| l.starts_with("# "))
        .collect();
    assert_eq!(titles, vec!["# Bridge Mode User Guide"]);
    assert_eq!(result.markdown.matches("Bridge Mode User Guide").count(), 1);
}

#[test]
fn test_images_placed_in_order() {
    let images = vec![
        image(0, "a.png"),
        image(1, "b.png"),
        image(2, "c.png"),
        image(3, "d.png"),
    ];
    let result = pipeline()
        .convert_text("1. First step\n2. Second step\n3. Third step", &images)
        .unwrap();

    let positions: Vec<usize> = images
        .iter()
        .map(|img| {
            assert_eq!(result.markdown.matches(img.path.as_str()).count(), 1);
            result.markdown.find(img.path.as_str()).unwrap()
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    // Three placeholders follow the steps; the fourth image is appended.
    let last_step = result.markdown.find("3. Third step").unwrap();
    assert!(positions[2] > last_step);
}

#[test]
fn test_suppressed_image_never_rendered() {
    let images = vec![image(0, "logo.png").suppressed(), image(1, "topology.png")];
    let result = pipeline()
        .convert_text("Introduction\nThis is the intro text.", &images)
        .unwrap();
    assert!(!result.markdown.contains("logo.png"));
    assert!(result.markdown.contains("![Diagram 2](images/topology.png)"));
}

#[test]
fn test_logo_sized_image_filtered_out() {
    let images = vec![
        image(0, "logo.png").with_dimensions(568, 130).with_size(4_000),
        image(1, "topology.png").with_dimensions(1200, 800).with_size(90_000),
    ];
    let result = pipeline()
        .convert_text("Introduction\nThis is the intro text.", &images)
        .unwrap();

    assert!(!result.markdown.contains("logo.png"));
    assert!(result.markdown.contains("![Diagram 2](images/topology.png)"));
}

// ==================== How-To Documents ====================

#[test]
fn test_howto_variant_from_image_paths() {
    let images = vec![image(0, "howto_split_tunnel_1.png")];
    let text = "HOW TO CONFIGURE\nSplit Tunneling\n\nThis guide covers the settings.";
    let result = pipeline().convert_text(text, &images).unwrap();

    assert_eq!(result.variant, DocumentVariant::HowTo);
    assert!(result
        .markdown
        .starts_with("# HOW TO CONFIGURE Split Tunneling"));
    assert!(result.markdown.contains("howto_split_tunnel_1.png"));
}

// ==================== Table Documents ====================

#[test]
fn test_release_notes_table() {
    let page = ruled_page(1, &[("Feature", "Description"), ("VPN", "Secure tunnel")]);
    let text = "release notes\n\nNew Features\nFeature Description\nVPN Secure tunnel";
    let input = ConversionInput::new(text).with_pages(vec![page]);

    let result = pipeline().convert(&input, &[]).unwrap();

    assert_eq!(result.variant, DocumentVariant::Table);
    assert!(result.markdown.contains("## New Features"));
    assert!(result.markdown.contains(
        "| # | Feature | Description |\n| --- | --- | --- |\n| 1 | VPN | Secure tunnel |"
    ));
}

#[test]
fn test_table_rows_are_rectangular() {
    let page = ruled_page(
        1,
        &[
            ("Feature", "Description"),
            ("VPN", "Secure tunnel"),
            ("DNS", ""),
            ("", "Orphan description"),
        ],
    );
    let text = "release notes\n\nNew Features\nFeature Description";
    let input = ConversionInput::new(text).with_pages(vec![page]);
    let result = pipeline().convert(&input, &[]).unwrap();

    let widths: Vec<usize> = result
        .markdown
        .lines()
        .filter(|l| l.starts_with('|'))
        .map(|l| l.replace("\\|", "").matches('|').count())
        .collect();
    assert!(!widths.is_empty());
    assert!(widths.iter().all(|w| *w == widths[0]));
}

#[test]
fn test_table_continues_across_pages() {
    let router = TableRouter::new(&DocumentProfile::default());
    let page1 = ruled_page(1, &[("Feature", "Description"), ("A", "first")]);
    let page2 = ruled_page(2, &[("B", "second"), ("C", "third")]);

    let tables = router.geometry_tables(&[page1, page2]);

    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].pages, vec![1, 2]);
    assert_eq!(tables[0].row_count(), 4);
    assert_eq!(tables[0].rows[3].texts(), vec!["C", "third"]);
}

// ==================== Geometry ====================

#[test]
fn test_interval_merging() {
    let merged = merge_intervals(vec![Interval::new(0.0, 10.0), Interval::new(8.0, 20.0)], 0.5);
    assert_eq!(merged, vec![Interval::new(0.0, 20.0)]);

    let disjoint = merge_intervals(vec![Interval::new(0.0, 10.0), Interval::new(15.0, 20.0)], 0.5);
    assert_eq!(disjoint, vec![Interval::new(0.0, 10.0), Interval::new(15.0, 20.0)]);
}

// ==================== Emphasis ====================

#[test]
fn test_emphasis_is_idempotent() {
    let emphasis = Emphasis::new(&DocumentProfile::default()).unwrap();
    let text = "Open the Admin Portal and enable Bridge Mode.\n> Note: the BrinkAgent restarts.";

    let once = emphasis.apply(text);
    assert!(once.contains("**Admin Portal**"));
    assert!(once.contains("**Bridge Mode**"));
    assert!(once.contains("> **Note:** the **BrinkAgent** restarts."));
    assert_eq!(emphasis.apply(&once), once);
}

#[test]
fn test_conversion_output_is_stable_under_emphasis() {
    let result = pipeline()
        .convert_text("Introduction\nUse Bridge Mode with the BrinkAgent.", &[])
        .unwrap();
    let emphasis = Emphasis::new(&DocumentProfile::default()).unwrap();
    assert_eq!(emphasis.apply(&result.markdown), result.markdown);
}

// ==================== Profiles ====================

#[test]
fn test_partial_profile_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"name": "acme", "emphasis_keywords": ["Widget"], "footer": []}}"#
    )
    .unwrap();

    let profile = DocumentProfile::from_path(file.path()).unwrap();
    assert_eq!(profile.name, "acme");
    assert_eq!(profile.callout_labels, DocumentProfile::default().callout_labels);

    let pipeline = Pipeline::new(profile, ConvertOptions::default()).unwrap();
    let result = pipeline.convert_text("Widget setup is easy.", &[]).unwrap();
    assert_eq!(result.markdown, "**Widget** setup is easy.");
}

#[test]
fn test_stats_match_output() {
    let options = ConvertOptions::new().with_stats(true);
    let pipeline = Pipeline::new(DocumentProfile::default(), options).unwrap();
    let images = vec![image(0, "a.png"), image(1, "b.png")];

    let result = pipeline
        .convert_text("1. First step\n2. Second step\n3. Third step", &images)
        .unwrap();

    let stats = result.stats.unwrap();
    assert_eq!(stats.list_item_count, 3);
    assert_eq!(stats.images_in_output(), 2);
}
