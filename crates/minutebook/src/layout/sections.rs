//! Section renderers.
//!
//! Each function turns the part of a record it is responsible for into draw
//! commands (fixed-position sections) or a [`TableSpec`] (flowing sections
//! the controller paginates). None of them decide page breaks.

use std::sync::Arc;

use crate::record::{AgendaItem, Decision, MinutesRecord, Status};

use super::commands::{Align, DrawCommand, FontStyle, Rgb, RectStyle};
use super::metrics::wrap_text;
use super::table::{Cell, ColumnSpec, TableSpec, Theme};
use super::{LayoutOptions, CONTENT_WIDTH, HEADER_HEIGHT, MARGIN_X, PAGE_HEIGHT, PAGE_WIDTH};

/// Header band colour.
const HEADER_FILL: Rgb = Rgb(44, 62, 80);

/// Label cell background of the metadata grid.
const LABEL_FILL: Rgb = Rgb(236, 240, 241);

const ATTENDEE_FILL: Rgb = Rgb(52, 152, 219);
const AGENDA_FILL: Rgb = Rgb(46, 204, 113);
const DECISION_FILL: Rgb = Rgb(155, 89, 182);

/// Width the watermark is scaled to.
const WATERMARK_WIDTH: f32 = 150.0;

/// Opacity of the watermark where the surface supports it.
const WATERMARK_OPACITY: f32 = 0.1;

/// Section title size in points.
pub const SECTION_TITLE_SIZE: f32 = 14.0;

/// Executive summary body size in points.
pub const SUMMARY_FONT_SIZE: f32 = 11.0;

/// Wrap width of the executive summary.
const SUMMARY_WIDTH: f32 = 180.0;

/// Header band, title, confidentiality label and organisation name.
#[must_use]
pub fn header(record: &MinutesRecord, options: &LayoutOptions) -> Vec<DrawCommand> {
    let mut commands = vec![
        DrawCommand::SetFillColor(HEADER_FILL),
        DrawCommand::Rect {
            x: 0.0,
            y: 0.0,
            w: PAGE_WIDTH,
            h: HEADER_HEIGHT,
            style: RectStyle::Fill,
        },
        DrawCommand::SetTextColor(Rgb::WHITE),
        DrawCommand::SetFont {
            style: FontStyle::Bold,
            size: 24.0,
        },
        DrawCommand::Text {
            x: PAGE_WIDTH / 2.0,
            y: 25.0,
            text: "MEETING MINUTES".to_string(),
            align: Align::Center,
        },
        DrawCommand::SetFont {
            style: FontStyle::Bold,
            size: 10.0,
        },
        DrawCommand::Text {
            x: PAGE_WIDTH - 20.0,
            y: 10.0,
            text: options.confidential_label.clone(),
            align: Align::Right,
        },
    ];

    if !record.org_name.is_empty() {
        commands.push(DrawCommand::SetFont {
            style: FontStyle::Normal,
            size: 12.0,
        });
        commands.push(DrawCommand::Text {
            x: PAGE_WIDTH / 2.0,
            y: 34.0,
            text: record.org_name.clone(),
            align: Align::Center,
        });
    }
    commands
}

/// The watermark, centred on the page at a fixed width.
///
/// `pixels` are the decoded image dimensions; the height follows the
/// aspect ratio. Without translucency support the image is drawn opaque.
#[must_use]
pub fn watermark(image: Arc<[u8]>, pixels: (u32, u32), supports_opacity: bool) -> Vec<DrawCommand> {
    let (px_w, px_h) = pixels;
    if px_w == 0 || px_h == 0 {
        return Vec::new();
    }
    let w = WATERMARK_WIDTH;
    let h = px_h as f32 * w / px_w as f32;
    let draw = DrawCommand::Image {
        data: image,
        x: (PAGE_WIDTH - w) / 2.0,
        y: (PAGE_HEIGHT - h) / 2.0,
        w,
        h,
    };

    if supports_opacity {
        vec![
            DrawCommand::SetOpacity(WATERMARK_OPACITY),
            draw,
            DrawCommand::SetOpacity(1.0),
        ]
    } else {
        vec![draw]
    }
}

/// The key/value grid under the header.
#[must_use]
pub fn metadata_table(record: &MinutesRecord) -> TableSpec {
    let time = if record.duration.is_empty() {
        record.time.clone()
    } else {
        format!("{} ({} min)", record.time, record.duration)
    };

    let mut rows = vec![
        row(["Reference No", &record.reference_number, "Department", &record.department]),
        row(["Date", &record.date, "Time", &time]),
        row(["Location", &record.location, "Type", record.meeting_type.label()]),
        row(["Chairman", &record.chairman, "Secretary", &record.secretary]),
    ];
    if let Some(next) = &record.next_meeting_date {
        rows.push(row(["Next Meeting", next, "", ""]));
    }

    TableSpec {
        title: None,
        columns: vec![
            ColumnSpec::fixed(40.0).bold().fill(LABEL_FILL),
            ColumnSpec::auto(),
            ColumnSpec::auto().bold().fill(LABEL_FILL),
            ColumnSpec::auto(),
        ],
        header: None,
        rows,
        theme: Theme::Grid,
        header_fill: LABEL_FILL,
        min_row_height: 0.0,
        image_size: (0.0, 0.0),
        space_after: 10.0,
    }
}

/// Chairman, secretary and the recorded attendees, with signatures.
#[must_use]
pub fn attendee_table(record: &MinutesRecord) -> Option<TableSpec> {
    let mut rows = Vec::new();
    let mut has_images = false;

    let mut push = |name: &str, position: &str, role: &str, present: bool, signature: Option<&Vec<u8>>| {
        let image = signature.map(|bytes| Arc::<[u8]>::from(bytes.as_slice()));
        has_images |= image.is_some();
        rows.push(vec![
            Cell::text(name),
            Cell::text(position),
            Cell::text(role),
            Cell::text(if present { "Present" } else { "Absent" }),
            Cell::image(image),
        ]);
    };

    if !record.chairman.is_empty() {
        push(&record.chairman, "", "Chairman", true, record.chairman_signature.as_ref());
    }
    if !record.secretary.is_empty() {
        push(&record.secretary, "", "Secretary", true, record.secretary_signature.as_ref());
    }
    for attendee in &record.attendees {
        push(
            &attendee.name,
            &attendee.position,
            &attendee.role,
            attendee.present,
            attendee.signature_image.as_ref(),
        );
    }

    if rows.is_empty() {
        return None;
    }

    Some(TableSpec {
        title: Some("Attendees & Participants".to_string()),
        columns: vec![
            ColumnSpec::auto(),
            ColumnSpec::auto(),
            ColumnSpec::auto(),
            ColumnSpec::auto(),
            ColumnSpec::fixed(30.0),
        ],
        header: Some(labels(&["Name", "Position", "Role", "Status", "Signature"])),
        rows,
        theme: Theme::Striped,
        header_fill: ATTENDEE_FILL,
        min_row_height: if has_images { 12.0 } else { 0.0 },
        image_size: (25.0, 10.0),
        space_after: 10.0,
    })
}

/// Numbered agenda.
#[must_use]
pub fn agenda_table(items: &[AgendaItem]) -> Option<TableSpec> {
    if items.is_empty() {
        return None;
    }
    let rows = items
        .iter()
        .enumerate()
        .map(|(index, agenda)| {
            vec![
                Cell::text((index + 1).to_string()),
                Cell::text(agenda.item.as_str()),
                Cell::text(agenda.speaker.as_str()),
            ]
        })
        .collect();

    Some(TableSpec {
        title: Some("Agenda Items".to_string()),
        columns: vec![
            ColumnSpec::fixed(15.0).align(Align::Center),
            ColumnSpec::auto(),
            ColumnSpec::fixed(40.0),
        ],
        header: Some(labels(&["#", "Item Description", "Speaker"])),
        rows,
        theme: Theme::Grid,
        header_fill: AGENDA_FILL,
        min_row_height: 0.0,
        image_size: (0.0, 0.0),
        space_after: 10.0,
    })
}

/// Decisions numbered `D-n`.
#[must_use]
pub fn decisions_table(decisions: &[Decision]) -> Option<TableSpec> {
    if decisions.is_empty() {
        return None;
    }
    let rows = decisions
        .iter()
        .enumerate()
        .map(|(index, decision)| {
            vec![
                Cell::text(format!("D-{}", index + 1)),
                Cell::text(decision.decision.as_str()),
                Cell::text(decision.responsible.as_str()),
                Cell::text(decision.deadline.as_str()),
            ]
        })
        .collect();

    Some(TableSpec {
        title: Some("Decisions & Recommendations".to_string()),
        columns: vec![
            ColumnSpec::fixed(20.0).bold(),
            ColumnSpec::auto(),
            ColumnSpec::auto(),
            ColumnSpec::auto(),
        ],
        header: Some(labels(&["ID", "Decision/Recommendation", "Responsible", "Deadline"])),
        rows,
        theme: Theme::Grid,
        header_fill: DECISION_FILL,
        min_row_height: 0.0,
        image_size: (0.0, 0.0),
        space_after: 15.0,
    })
}

/// The executive summary wrapped to the summary width.
#[must_use]
pub fn executive_summary(text: &str) -> Option<Vec<String>> {
    if text.trim().is_empty() {
        return None;
    }
    Some(wrap_text(text, FontStyle::Normal, SUMMARY_FONT_SIZE, SUMMARY_WIDTH))
}

/// Whether the record names or carries anything for the signature block.
#[must_use]
pub fn has_signatories(record: &MinutesRecord) -> bool {
    !record.chairman.is_empty()
        || !record.secretary.is_empty()
        || record.chairman_signature.is_some()
        || record.secretary_signature.is_some()
}

/// Separator, the two signature columns and the status line.
///
/// Returns the commands and the cursor below the block. A missing signature
/// image only drops its draw; nothing else moves.
#[must_use]
pub fn signature_block(record: &MinutesRecord, y: f32) -> (Vec<DrawCommand>, f32) {
    let mut commands = vec![
        DrawCommand::SetDrawColor(Rgb::gray(200)),
        DrawCommand::Line {
            x1: MARGIN_X,
            y1: y,
            x2: MARGIN_X + CONTENT_WIDTH,
            y2: y,
        },
        DrawCommand::SetTextColor(Rgb::BLACK),
    ];
    let top = y + 10.0;

    let columns = [
        ("Approved By (Chairman)", &record.chairman, &record.chairman_signature, 60.0),
        ("Meeting Secretary", &record.secretary, &record.secretary_signature, 150.0),
    ];
    for (caption, name, signature, center) in columns {
        commands.push(DrawCommand::SetFont {
            style: FontStyle::Bold,
            size: 12.0,
        });
        commands.push(DrawCommand::Text {
            x: center,
            y: top,
            text: caption.to_string(),
            align: Align::Center,
        });
        commands.push(DrawCommand::SetFont {
            style: FontStyle::Normal,
            size: 12.0,
        });
        commands.push(DrawCommand::Text {
            x: center,
            y: top + 7.0,
            text: name.clone(),
            align: Align::Center,
        });
        if let Some(bytes) = signature {
            commands.push(DrawCommand::Image {
                data: Arc::from(bytes.as_slice()),
                x: center - 20.0,
                y: top + 10.0,
                w: 40.0,
                h: 20.0,
            });
        }
    }

    let status_y = top + 40.0;
    commands.push(DrawCommand::SetFont {
        style: FontStyle::Normal,
        size: 10.0,
    });
    commands.push(DrawCommand::Text {
        x: PAGE_WIDTH / 2.0,
        y: status_y,
        text: status_line(record),
        align: Align::Center,
    });

    (commands, status_y + 6.0)
}

/// The line under the signatures describing where approval stands.
#[must_use]
pub fn status_line(record: &MinutesRecord) -> String {
    match (record.status, record.signature_timestamp) {
        (Status::Approved, Some(at)) => {
            format!("Digitally Signed on: {}", at.format("%Y-%m-%d %H:%M UTC"))
        }
        (Status::Approved, None) => "Digitally Signed".to_string(),
        (Status::PendingChairman, _) => "Awaiting chairman approval".to_string(),
        (Status::Draft, _) => "Draft - not signed".to_string(),
    }
}

/// The page number line stamped on every page.
#[must_use]
pub fn footer(page: usize, total: usize, footer_text: &str) -> Vec<DrawCommand> {
    let text = if footer_text.is_empty() {
        format!("Page {page} of {total}")
    } else {
        format!("Page {page} of {total} - {footer_text}")
    };
    vec![
        DrawCommand::SetFont {
            style: FontStyle::Normal,
            size: 8.0,
        },
        DrawCommand::SetTextColor(Rgb::gray(150)),
        DrawCommand::Text {
            x: PAGE_WIDTH / 2.0,
            y: super::FOOTER_Y,
            text,
            align: Align::Center,
        },
    ]
}

fn row<const N: usize>(cells: [&str; N]) -> Vec<Cell> {
    cells.into_iter().map(Cell::text).collect()
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}
