//! HTML views
//!
//! Pages are plain `format!` templates around a shared layout. Every value
//! that comes from a record or a user goes through [`escape_html`].

mod admin;
mod login;
mod public;

pub use admin::{AdminView, admin_page};
pub use login::login_page;
pub use public::public_page;

use crate::auth::Flash;
pub use shared::util::escape_html;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f5f6f8;color:#222}\
main{max-width:1100px;margin:0 auto;padding:1.5rem}\
header{display:flex;justify-content:space-between;align-items:center}\
table{width:100%;border-collapse:collapse;background:#fff}\
th,td{padding:.45rem .6rem;border-bottom:1px solid #e3e5e8;text-align:left;vertical-align:middle}\
th a{color:inherit}\
form.inline{display:inline}\
.alert{padding:.6rem .9rem;margin:.5rem 0;border-radius:4px}\
.alert-success{background:#d1e7dd}.alert-danger{background:#f8d7da}\
.alert-info{background:#cff4fc}.alert-warning{background:#fff3cd}\
.paid{color:#146c43;font-weight:600}.unpaid{color:#b02a37;font-weight:600}\
.pagination a,.pagination span{margin-right:.4rem}\
img.thumb{max-width:80px;max-height:80px}\
img.photo{max-width:100%;height:auto}\
.card{background:#fff;padding:1rem 1.25rem;border-radius:6px;margin-bottom:1rem}\
label{display:block;margin:.4rem 0 .1rem}";

/// `1234.5` -> `1 234,50`; non-finite values render as `0,00`
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return "0,00".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*c);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

fn render_flashes(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| {
            format!(
                "<div class=\"alert alert-{}\">{}</div>",
                f.level.as_str(),
                escape_html(&f.message)
            )
        })
        .collect()
}

/// Wrap a page body in the shared layout
pub fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main>\n\
         {flashes}\n{body}\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
        flashes = render_flashes(flashes),
    )
}
