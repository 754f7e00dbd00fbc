use chrono::{Duration, NaiveDate};

use crate::calendar::week::{format_long_date, format_short_date};
use crate::calendar::{WeekGrid, DAYS, TIME_BANDS};
use crate::mailer::EmailMessage;

/// Marker rendered for a slot with nobody assigned
const EMPTY_SLOT: &str = "-";

/// Plain-text rendering of one week: per day, per band, names or `-`.
/// Always covers all 7 days and 4 bands, however sparse the grid.
pub fn render_text(grid: &WeekGrid, week_start: NaiveDate) -> String {
    let week_end = week_start + Duration::days(6);
    let mut text = String::from("Weekly Rota\n");
    text.push_str(&format!(
        "Week of {} - {}\n\n",
        format_short_date(week_start),
        format_short_date(week_end)
    ));

    for day in DAYS {
        text.push_str(&format!("{}:\n", day));
        for band in TIME_BANDS {
            let people = grid.get(day, band);
            let names = if people.is_empty() {
                EMPTY_SLOT.to_string()
            } else {
                people.join(", ")
            };
            text.push_str(&format!("  {}: {}\n", band.label(), names));
        }
        text.push('\n');
    }

    text
}

/// HTML table rendering of one week: day columns (with dates), band rows,
/// one chip per assigned name, `-` for empty cells
pub fn render_html(grid: &WeekGrid, week_start: NaiveDate) -> String {
    let week_end = week_start + Duration::days(6);
    let mut html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto;">
            <h1 style="color: #3498db; text-align: center;">Weekly Rota</h1>
            <h2 style="color: #666; text-align: center; font-weight: normal;">Week of {} - {}</h2>
            <table style="width: 100%; border-collapse: collapse; margin-top: 20px;">
                <thead>
                    <tr style="background: #3498db; color: white;">
                        <th style="padding: 12px; border: 1px solid #2980b9;">Time</th>"#,
        format_short_date(week_start),
        format_short_date(week_end)
    );

    for (i, day) in DAYS.iter().enumerate() {
        let date = week_start + Duration::days(i as i64);
        html.push_str(&format!(
            r#"<th style="padding: 12px; border: 1px solid #2980b9;">{}<br><small>{}</small></th>"#,
            day,
            format_short_date(date)
        ));
    }

    html.push_str("</tr></thead><tbody>");

    for band in TIME_BANDS {
        html.push_str(&format!(
            r#"<tr><td style="padding: 10px; border: 1px solid #ddd; background: #ebf5fb; font-weight: bold; text-align: center;">{}</td>"#,
            band.label()
        ));

        for day in DAYS {
            let people = grid.get(day, band);
            let cell = if people.is_empty() {
                EMPTY_SLOT.to_string()
            } else {
                people
                    .iter()
                    .map(|p| {
                        format!(
                            r#"<span style="display: inline-block; background: #85c1e9; padding: 4px 10px; border-radius: 15px; margin: 2px; font-size: 12px;">{}</span>"#,
                            p
                        )
                    })
                    .collect::<String>()
            };
            html.push_str(&format!(
                r#"<td style="padding: 10px; border: 1px solid #ddd; vertical-align: top;">{}</td>"#,
                cell
            ));
        }

        html.push_str("</tr>");
    }

    html.push_str("</tbody></table></div>");
    html
}

/// Saturday email: the schedule is still open for changes
pub fn proposal_email(grid: &WeekGrid, week_start: NaiveDate, to: &str) -> EmailMessage {
    let table = render_html(grid, week_start);
    EmailMessage {
        to: to.to_string(),
        subject: format!(
            "Weekly Rota: Proposed plan for week of {}",
            format_long_date(week_start)
        ),
        html: format!(
            "<p>Hi,</p>\
             <p>Here's the proposed schedule for next week. Please review and make any necessary changes.</p>\
             {table}\
             <p style=\"color: #666; margin-top: 20px;\"><em>This is an automated email from the weekly rota.</em></p>"
        ),
        text: Some(render_text(grid, week_start)),
    }
}

/// Sunday email: same data, now announced as final
pub fn final_plan_email(grid: &WeekGrid, week_start: NaiveDate, to: &str) -> EmailMessage {
    let table = render_html(grid, week_start);
    EmailMessage {
        to: to.to_string(),
        subject: format!(
            "Weekly Rota: Final plan for week of {}",
            format_long_date(week_start)
        ),
        html: format!(
            "<p>Hi,</p>\
             <p>Here's the final schedule for next week.</p>\
             {table}\
             <p style=\"color: #666; margin-top: 20px;\"><em>This is an automated email from the weekly rota.</em></p>"
        ),
        text: Some(render_text(grid, week_start)),
    }
}
