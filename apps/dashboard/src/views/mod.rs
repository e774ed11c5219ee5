//! Server-rendered HTML pages.
//!
//! Every piece of dataset text passes through `escape` before it lands in markup.

use std::fmt::Write;

use crate::models::JobPosting;

const NAV: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/data", "Data"),
    ("/image", "Chart"),
    ("/about", "About"),
];

/// Escapes the five HTML-significant characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    let nav: String = NAV
        .iter()
        .map(|(href, label)| format!(r#"<a href="{href}">{label}</a>"#))
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - AI/ML Jobs</title>
</head>
<body>
<nav>{nav}</nav>
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

/// `/`: position types with their posting counts, in the order given.
pub fn home(position_counts: &[(String, usize)]) -> String {
    let mut body = String::from(
        "<table>\n<thead><tr><th>Type of position</th><th>Jobs</th></tr></thead>\n<tbody>\n",
    );
    for (position_type, count) in position_counts {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{count}</td></tr>",
            escape(position_type)
        );
    }
    body.push_str("</tbody>\n</table>\n");
    body.push_str(r#"<p><img src="/image" alt="Most requested skills" style="width:100%"></p>"#);
    page("Job postings by type", &body)
}

/// `/data`: already-truncated display copies.
pub fn data(jobs: &[JobPosting]) -> String {
    let mut body = String::from(
        "<table>\n<thead><tr><th>Title</th><th>Company</th><th>Location</th>\
         <th>Type</th><th>Salary</th><th>Description</th></tr></thead>\n<tbody>\n",
    );
    for job in jobs {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&job.title),
            escape(&job.company),
            escape(&job.location),
            escape(&job.position_type),
            job.salary,
            escape(&job.job_description),
        );
    }
    body.push_str("</tbody>\n</table>\n");
    page("Dataset sample", &body)
}

pub fn about() -> String {
    page(
        "About",
        "<p>This dashboard summarizes a public dataset of AI and machine learning job \
         postings: how many postings exist per type of position, and which skills are \
         requested most often.</p>\n\
         <p>The raw data and the statistics are also available as JSON at \
         <a href=\"/json-dataset\">/json-dataset</a> and \
         <a href=\"/json-stats\">/json-stats</a>.</p>\n",
    )
}
