use super::{escape_html, format_money, layout};
use crate::auth::Flash;
use crate::qr::qr_filename;
use shared::models::{Page, Shield, SortDirection, SortField};
use shared::util::format_millis;

/// Everything the admin list needs
pub struct AdminView<'a> {
    pub page: &'a Page<Shield>,
    pub sort: SortField,
    pub dir: SortDirection,
    pub flashes: &'a [Flash],
}

/// Where a record's photo is served from, if it has one
pub(super) fn photo_src(shield: &Shield) -> Option<String> {
    let reference = shield.photo_url.as_deref()?;
    if shield.has_remote_photo() {
        Some(reference.to_string())
    } else {
        Some(format!("/static/photos/{reference}"))
    }
}

fn list_href(page: u32, sort: SortField, dir: SortDirection) -> String {
    format!(
        "/admin?page={page}&amp;sort={}&amp;dir={}",
        sort.as_param(),
        dir.as_param()
    )
}

/// Column header; clicking the active column flips its direction
fn sort_header(label: &str, field: SortField, view: &AdminView<'_>) -> String {
    let (dir, marker) = if view.sort == field {
        let marker = match view.dir {
            SortDirection::Asc => " &#9650;",
            SortDirection::Desc => " &#9660;",
        };
        (view.dir.flip(), marker)
    } else {
        (SortDirection::Desc, "")
    };
    format!(
        "<th><a href=\"{}\">{label}{marker}</a></th>",
        list_href(1, field, dir)
    )
}

fn row(shield: &Shield) -> String {
    let id = shield.id;
    let (status, toggle_label) = if shield.paid {
        ("<span class=\"paid\">Paid</span>", "Mark unpaid")
    } else {
        ("<span class=\"unpaid\">Unpaid</span>", "Mark paid")
    };
    let paid_at = shield.paid_at.map(format_millis).unwrap_or_default();
    let photo = photo_src(shield)
        .map(|src| {
            format!(
                "<a href=\"{src}\"><img class=\"thumb\" src=\"{src}\" alt=\"Photo\"></a>",
                src = escape_html(&src)
            )
        })
        .unwrap_or_default();
    let qr = qr_filename(id);

    format!(
        "<tr>\n<td>{id}</td>\n<td>{street}</td>\n<td>{client}</td>\n<td>{amount}</td>\n\
         <td>{created}</td>\n<td>{status}</td>\n<td>{paid_at}</td>\n<td>{photo}</td>\n\
         <td><a href=\"/public/{id}\"><img class=\"thumb\" src=\"/static/qrcodes/{qr}\" alt=\"QR\"></a><br>\
         <a href=\"/download_qr/{id}\">Download</a></td>\n\
         <td><a href=\"/toggle_paid/{id}\">{toggle_label}</a>\n\
         <form class=\"inline\" method=\"post\" action=\"/delete_shield/{id}\" \
         onsubmit=\"return confirm('Delete shield #{id}?');\">\
         <button type=\"submit\">Delete</button></form></td>\n</tr>",
        street = escape_html(&shield.street),
        client = escape_html(&shield.client),
        amount = format_money(shield.amount),
        created = format_millis(shield.created_at),
    )
}

fn pagination(view: &AdminView<'_>) -> String {
    let page = view.page;
    let total_pages = page.total_pages();
    if total_pages <= 1 {
        return String::new();
    }

    let mut out = String::from("<div class=\"pagination\">");
    if page.has_prev() {
        out.push_str(&format!(
            "<a href=\"{}\">&laquo; Prev</a>",
            list_href(page.page - 1, view.sort, view.dir)
        ));
    }
    for n in 1..=total_pages {
        if n == page.page {
            out.push_str(&format!("<span>{n}</span>"));
        } else {
            out.push_str(&format!(
                "<a href=\"{}\">{n}</a>",
                list_href(n, view.sort, view.dir)
            ));
        }
    }
    if page.has_next() {
        out.push_str(&format!(
            "<a href=\"{}\">Next &raquo;</a>",
            list_href(page.page + 1, view.sort, view.dir)
        ));
    }
    out.push_str("</div>");
    out
}

const CREATE_FORM: &str = "<div class=\"card\">\n<h2>New shield</h2>\n\
<form method=\"post\" action=\"/admin\" enctype=\"multipart/form-data\">\n\
<label for=\"street\">Street</label><input id=\"street\" name=\"street\" maxlength=\"100\" required>\n\
<label for=\"client\">Client</label><input id=\"client\" name=\"client\" maxlength=\"100\" required>\n\
<label for=\"amount\">Amount</label><input id=\"amount\" name=\"amount\" type=\"number\" step=\"0.01\" min=\"0.01\" required>\n\
<label for=\"photo\">Photo (JPG/PNG)</label><input id=\"photo\" name=\"photo\" type=\"file\" accept=\".jpg,.jpeg,.png\">\n\
<p><button type=\"submit\">Add shield</button></p>\n</form>\n</div>";

/// Admin dashboard: create form, sortable list, pagination
pub fn admin_page(view: &AdminView<'_>) -> String {
    let rows: String = if view.page.items.is_empty() {
        "<tr><td colspan=\"10\">No shields on this page.</td></tr>".to_string()
    } else {
        view.page.items.iter().map(row).collect::<Vec<_>>().join("\n")
    };

    let body = format!(
        "<header><h1>Shields</h1><a href=\"/logout\">Log out</a></header>\n\
         {CREATE_FORM}\n\
         <p>{total} shield(s)</p>\n\
         <table>\n<thead><tr><th>ID</th><th>Street</th><th>Client</th>{amount}{created}{paid}{paid_at}\
         <th>Photo</th><th>QR</th><th>Actions</th></tr></thead>\n<tbody>\n{rows}\n</tbody>\n</table>\n\
         {pagination}",
        total = view.page.total,
        amount = sort_header("Amount", SortField::Amount, view),
        created = sort_header("Created", SortField::CreatedAt, view),
        paid = sort_header("Status", SortField::Paid, view),
        paid_at = sort_header("Paid on", SortField::PaidAt, view),
        pagination = pagination(view),
    );

    layout("Shields", view.flashes, &body)
}
