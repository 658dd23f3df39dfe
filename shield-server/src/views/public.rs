use super::{escape_html, format_money, layout};
use shared::models::Shield;
use shared::util::format_millis;

/// Read-only record page reached from a QR code
pub fn public_page(shield: &Shield) -> String {
    let status = match (shield.paid, shield.paid_at) {
        (true, Some(at)) => format!("<span class=\"paid\">Paid</span> ({})", format_millis(at)),
        (true, None) => "<span class=\"paid\">Paid</span>".to_string(),
        (false, _) => "<span class=\"unpaid\">Unpaid</span>".to_string(),
    };

    let photo = super::admin::photo_src(shield)
        .map(|src| {
            format!(
                "<p><img class=\"photo\" src=\"{}\" alt=\"Shield photo\"></p>",
                escape_html(&src)
            )
        })
        .unwrap_or_default();

    let body = format!(
        "<div class=\"card\">\n<h1>Shield #{id}</h1>\n<dl>\n\
         <dt>Street</dt><dd>{street}</dd>\n\
         <dt>Client</dt><dd>{client}</dd>\n\
         <dt>Amount</dt><dd>{amount}</dd>\n\
         <dt>Status</dt><dd>{status}</dd>\n\
         </dl>\n{photo}\n</div>",
        id = shield.id,
        street = escape_html(&shield.street),
        client = escape_html(&shield.client),
        amount = format_money(shield.amount),
    );

    layout(&format!("Shield #{}", shield.id), &[], &body)
}
