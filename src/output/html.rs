use std::fmt::Write as _;

use crate::output::formatter::{format_stats, format_summary};
use crate::output::truncate_description;
use crate::pulls::PullRequestRecord;

const STYLE: &str = "
body { font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; color: #333; background: #f5f5f5; margin: 0; padding: 20px; }
.container { max-width: 900px; margin: 0 auto; background: #fff; padding: 32px 40px; border-radius: 8px; }
header { border-bottom: 2px solid #e0e0e0; margin-bottom: 24px; padding-bottom: 16px; text-align: center; }
header h1 { font-size: 24px; margin: 0 0 8px; }
header .repos { color: #666; font-size: 14px; }
.summary { background: #f8f9fa; border-radius: 6px; font-weight: 600; margin-bottom: 24px; padding: 12px 16px; }
.pr { border-bottom: 1px solid #e0e0e0; margin-bottom: 28px; padding-bottom: 20px; }
.pr:last-child { border-bottom: none; }
.badge { border-radius: 4px; color: #fff; display: inline-block; font-size: 12px; font-weight: bold; padding: 3px 10px; }
.badge.merged { background: #6f42c1; }
.badge.open { background: #28a745; }
.badge.closed { background: #6c757d; }
.relation { color: #0366d6; font-size: 12px; margin-left: 8px; }
.title { font-size: 16px; font-weight: 600; margin: 8px 0 4px; }
.meta { color: #666; font-size: 13px; }
.meta a { color: #0366d6; text-decoration: none; }
.description { color: #555; font-size: 14px; margin-top: 8px; white-space: pre-wrap; word-wrap: break-word; }
";

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render a standalone HTML report
pub fn render_html(
    records: &[PullRequestRecord],
    username: &str,
    repositories: &[String],
    show_stats: bool,
) -> String {
    let mut html = String::new();
    let username = escape_html(username);

    // Writing to a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>Pull Requests by {user}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <div class=\"container\">\n<header>\n<h1>Pull Requests by {user}</h1>\n\
         <div class=\"repos\">{repos}</div>\n</header>\n<div class=\"summary\">{summary}</div>\n",
        user = username,
        style = STYLE,
        repos = escape_html(&repositories.join(", ")),
        summary = escape_html(&format_summary(records)),
    );

    for record in records {
        let url = escape_html(&record.url);
        let stats = if show_stats {
            format!(" &middot; {}", escape_html(&format_stats(record.stats.as_ref())))
        } else {
            String::new()
        };
        let _ = write!(
            html,
            "<div class=\"pr\">\n\
             <span class=\"badge {class}\">{state}</span><span class=\"relation\">{relation}</span>\n\
             <div class=\"title\">{repo}#{number} - {title}</div>\n\
             <div class=\"meta\">{date}{stats} &middot; <a href=\"{url}\" target=\"_blank\">{url}</a></div>\n\
             <div class=\"description\">{description}</div>\n</div>\n",
            class = record.state.as_str(),
            state = record.state,
            relation = record.relation.label(),
            repo = escape_html(&record.repository),
            number = record.number,
            title = escape_html(&record.title),
            date = record.effective_date.format("%Y-%m-%d"),
            stats = stats,
            url = url,
            description = escape_html(&truncate_description(&record.description)),
        );
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}
