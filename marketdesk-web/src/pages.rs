//! Server-rendered HTML pages.
//!
//! Pages are built with `format!` into a shared Bootstrap layout. Every value
//! that originates outside the binary (form input, market symbols, error
//! messages) passes through [`escape`].

use axum::http::StatusCode;
use marketdesk_core::data::QUOTE_COLUMNS;
use marketdesk_core::{Dashboard, Direction, QuoteRow, RankedTable, SourceId};

/// Shown when a signup collides with an existing username.
pub const USERNAME_TAKEN: &str = "⚠️ Username already exists";

/// Shown by the login placeholder.
pub const LOGIN_SUCCESS: &str = "Login successful!";

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

/// HTML-escape text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head>\n\
<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title}</title>\n\
<link rel=\"stylesheet\" href=\"{BOOTSTRAP_CSS}\">\n\
</head>\n\
<body>\n\
<nav class=\"navbar navbar-dark bg-dark mb-4\"><div class=\"container\">\
<a class=\"navbar-brand\" href=\"/\">MarketDesk</a>\
<div><a class=\"btn btn-outline-light btn-sm me-2\" href=\"/dashboard\">Dashboard</a>\
<a class=\"btn btn-outline-light btn-sm me-2\" href=\"/signup\">Sign up</a>\
<a class=\"btn btn-outline-light btn-sm\" href=\"/login\">Log in</a></div>\
</div></nav>\n\
<main class=\"container\">\n{body}</main>\n\
</body>\n\
</html>\n",
        title = escape(title),
    )
}

fn alert(kind: &str, message: &str) -> String {
    format!(
        "<div class=\"alert alert-{kind}\" role=\"alert\">{}</div>\n",
        escape(message)
    )
}

fn yes_no(name: &str, label: &str) -> String {
    format!(
        "<div class=\"mb-3\">\
<label class=\"form-label\" for=\"{name}\">{label}</label>\
<select class=\"form-select\" id=\"{name}\" name=\"{name}\" required>\
<option value=\"yes\">Yes</option>\
<option value=\"no\">No</option>\
</select></div>\n"
    )
}

fn text_input(name: &str, label: &str, kind: &str, required: bool) -> String {
    format!(
        "<div class=\"mb-3\">\
<label class=\"form-label\" for=\"{name}\">{label}</label>\
<input class=\"form-control\" type=\"{kind}\" id=\"{name}\" name=\"{name}\"{}>\
</div>\n",
        if required { " required" } else { "" }
    )
}

/// `GET /`: the lead form.
pub fn home() -> String {
    let mut body = String::from(
        "<h1 class=\"mb-3\">Talk to an advisor</h1>\n\
<p class=\"lead\">Tell us what you are interested in and we will call you back.</p>\n\
<form method=\"post\" action=\"/submit\">\n",
    );
    body.push_str(&text_input("name", "Name", "text", true));
    body.push_str(&text_input("phone", "Phone", "tel", true));
    body.push_str(&text_input("whatsapp", "WhatsApp (optional)", "tel", false));
    body.push_str(&yes_no("insurance", "Insurance"));
    body.push_str(&yes_no("mutualfund", "Mutual funds"));
    body.push_str(&yes_no("stockresearch", "Stock research"));
    body.push_str(&yes_no("expertcall", "Call with an expert"));
    body.push_str("<button class=\"btn btn-primary\" type=\"submit\">Submit</button>\n</form>\n");
    layout("MarketDesk", &body)
}

/// `GET /signup`, and the re-render after a rejected signup.
pub fn signup(warning: Option<&str>) -> String {
    let mut body = String::from("<h1 class=\"mb-3\">Create an account</h1>\n");
    if let Some(warning) = warning {
        body.push_str(&alert("warning", warning));
    }
    body.push_str("<form method=\"post\" action=\"/signup\">\n");
    body.push_str(&text_input("username", "Username", "text", true));
    body.push_str(&text_input("email", "Email", "email", true));
    body.push_str(&text_input("password", "Password", "password", true));
    body.push_str("<button class=\"btn btn-primary\" type=\"submit\">Sign up</button>\n</form>\n");
    layout("Sign up", &body)
}

/// `GET /login`
pub fn login() -> String {
    let mut body = String::from(
        "<h1 class=\"mb-3\">Log in</h1>\n<form method=\"post\" action=\"/login\">\n",
    );
    body.push_str(&text_input("username", "Username", "text", true));
    body.push_str(&text_input("password", "Password", "password", true));
    body.push_str("<button class=\"btn btn-primary\" type=\"submit\">Log in</button>\n</form>\n");
    layout("Log in", &body)
}

/// `GET /thankyou`
pub fn thankyou() -> String {
    layout(
        "Thank you",
        "<h1 class=\"mb-3\">Thank you!</h1>\n\
<p class=\"lead\">We received your details and will be in touch shortly.</p>\n\
<a class=\"btn btn-secondary\" href=\"/\">Back</a>\n",
    )
}

/// Dashboard page. `dashboard` is `None` for the login placeholder, which
/// renders only the shell and the message.
pub fn dashboard(dashboard: Option<&Dashboard>, message: Option<&str>) -> String {
    let mut body = String::from("<h1 class=\"mb-3\">Market movers</h1>\n");
    if let Some(message) = message {
        body.push_str(&alert("success", message));
    }
    if let Some(dashboard) = dashboard {
        for (source, table) in dashboard.sections() {
            body.push_str(&section(source, table));
        }
    }
    layout("Dashboard", &body)
}

fn section(source: SourceId, table: &RankedTable) -> String {
    let slug = match table.direction {
        Direction::Gainers => "gainers",
        Direction::Losers => "losers",
    };
    format!(
        "<section class=\"mb-5\" id=\"{id}-{slug}\">\n<h2>{source} {label}</h2>\n{table}</section>\n",
        id = source.as_str().to_lowercase(),
        label = table.direction.label(),
        table = render_table(table),
    )
}

/// One ranked table as `<table class="table table-striped" border="0">` with
/// the quote columns as headers and no index column.
///
/// Placeholder rows leave the numeric cells blank.
pub fn render_table(table: &RankedTable) -> String {
    let mut html = String::from("<table border=\"0\" class=\"table table-striped\">\n<thead>\n<tr>");
    for column in QUOTE_COLUMNS {
        html.push_str(&format!("<th>{column}</th>"));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    let blank = table.is_placeholder();
    for row in table.rows() {
        html.push_str(&render_row(row, blank));
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn render_row(row: &QuoteRow, blank: bool) -> String {
    let numbers = [
        row.open,
        row.day_high,
        row.day_low,
        row.last_price,
        row.previous_close,
        row.percent_change,
    ];
    let mut html = format!("<tr><td>{}</td>", escape(&row.symbol));
    for value in numbers {
        if blank {
            html.push_str("<td></td>");
        } else {
            html.push_str(&format!("<td>{value}</td>"));
        }
    }
    html.push_str("</tr>\n");
    html
}

/// Minimal page for [`crate::error::WebError`]. Carries only the status text.
pub fn error_page(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    layout(
        reason,
        &format!(
            "<h1 class=\"mb-3\">{} {}</h1>\n<p>Something went wrong. Please try again later.</p>\n",
            status.as_u16(),
            escape(reason)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketdesk_core::MoverTables;

    fn row(symbol: &str, pct: f64) -> QuoteRow {
        QuoteRow {
            last_price: 100.5,
            percent_change: pct,
            ..QuoteRow::empty(symbol)
        }
    }

    fn sample_dashboard() -> Dashboard {
        Dashboard {
            nse: MoverTables {
                gainers: RankedTable::from_ranked(Direction::Gainers, vec![row("TCS", 2.5)]),
                losers: RankedTable::from_ranked(Direction::Losers, vec![row("INFY", -1.25)]),
            },
            bse: MoverTables::placeholder("BSE API Error: request timed out"),
        }
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn table_has_quote_headers_and_bootstrap_classes() {
        let html = render_table(&RankedTable::from_ranked(
            Direction::Gainers,
            vec![row("TCS", 2.5)],
        ));
        assert!(html.starts_with("<table border=\"0\" class=\"table table-striped\">"));
        for column in QUOTE_COLUMNS {
            assert!(html.contains(&format!("<th>{column}</th>")));
        }
        assert!(html.contains("<td>TCS</td>"));
        assert!(html.contains("<td>100.5</td>"));
        assert!(html.contains("<td>2.5</td>"));
    }

    #[test]
    fn placeholder_row_has_message_and_blank_numbers() {
        let html = render_table(&RankedTable::placeholder(
            Direction::Losers,
            "NSE API Error: <boom>",
        ));
        assert!(html.contains("<td>NSE API Error: &lt;boom&gt;</td><td></td><td></td>"));
        assert!(!html.contains("<td>0</td>"));
    }

    #[test]
    fn dashboard_renders_four_sections_in_order() {
        let html = dashboard(Some(&sample_dashboard()), None);
        assert_eq!(html.matches("<table ").count(), 4);
        let order: Vec<usize> = ["nse-gainers", "nse-losers", "bse-gainers", "bse-losers"]
            .iter()
            .map(|id| html.find(&format!("id=\"{id}\"")).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
        assert!(html.contains("BSE API Error: request timed out"));
    }

    #[test]
    fn login_placeholder_shell_has_no_tables() {
        let html = dashboard(None, Some(LOGIN_SUCCESS));
        assert!(html.contains(LOGIN_SUCCESS));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn signup_warning_is_optional() {
        assert!(!signup(None).contains("alert-warning"));
        let html = signup(Some(USERNAME_TAKEN));
        assert!(html.contains(USERNAME_TAKEN));
        assert!(html.contains("action=\"/signup\""));
    }

    #[test]
    fn home_form_posts_all_lead_fields() {
        let html = home();
        assert!(html.contains("action=\"/submit\""));
        for field in [
            "name",
            "phone",
            "whatsapp",
            "insurance",
            "mutualfund",
            "stockresearch",
            "expertcall",
        ] {
            assert!(html.contains(&format!("name=\"{field}\"")), "missing {field}");
        }
    }

    #[test]
    fn error_page_omits_details() {
        let html = error_page(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(html.contains("500 Internal Server Error"));
    }
}
