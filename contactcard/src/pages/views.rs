//! HTML rendering. Every interpolated value goes through [`escape`].

use std::borrow::Cow;
use std::fmt::Write;

use card_axum::csrf::CSRF_FIELD;
use card_axum::FlashMessage;

use crate::services::{Contact, ContactChanges};

/// Form fields in display order: (name, label, input type).
pub const FIELDS: [(&str, &str, &str); 5] = [
    ("firstname", "First name", "text"),
    ("lastname", "Last name", "text"),
    ("title", "Title", "text"),
    ("email", "Email Address", "email"),
    ("phone", "Phone Number", "tel"),
];

/// Index of `field` in [`FIELDS`]; unknown fields sort last.
pub fn field_position(field: &str) -> usize {
    FIELDS
        .iter()
        .position(|(name, _, _)| *name == field)
        .unwrap_or(FIELDS.len())
}

pub fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// `/contact/{sfid}` with the id percent-encoded as one path segment.
pub fn contact_path(sfid: &str) -> String {
    format!("/contact/{}", urlencoding::encode(sfid))
}

fn layout(title: &str, flashes: &[FlashMessage], body: &str) -> String {
    let mut alerts = String::new();
    for f in flashes {
        let _ = writeln!(
            alerts,
            "<div class=\"alert alert-{}\" role=\"alert\">{}</div>",
            f.category.as_str(),
            escape(&f.message)
        );
    }

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | ContactCard</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@4.6.2/dist/css/bootstrap.min.css">
</head>
<body>
<nav class="navbar navbar-dark bg-primary mb-4"><a class="navbar-brand" href="/">ContactCard</a></nav>
<main class="container">
{alerts}{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn cell(v: Option<&str>) -> Cow<'_, str> {
    escape(v.unwrap_or(""))
}

pub fn index(contacts: &[Contact], flashes: &[FlashMessage]) -> String {
    let mut rows = String::new();
    for c in contacts {
        let _ = writeln!(
            rows,
            "<tr><td><a href=\"{href}\">{name}</a></td><td>{title}</td><td>{email}</td><td>{phone}</td></tr>",
            href = escape(&contact_path(&c.sfid)),
            name = escape(&c.display_name()),
            title = cell(c.title.as_deref()),
            email = cell(c.email.as_deref()),
            phone = cell(c.phone.as_deref()),
        );
    }

    let body = if contacts.is_empty() {
        "<h1>Contacts</h1>\n<p class=\"text-muted\">No contacts have been synced yet.</p>".to_string()
    } else {
        format!(
            "<h1>Contacts</h1>\n<table class=\"table table-striped\">\n\
             <thead><tr><th>Name</th><th>Title</th><th>Email</th><th>Phone</th></tr></thead>\n\
             <tbody>\n{rows}</tbody>\n</table>"
        )
    };

    layout("Contacts", flashes, &body)
}

fn field_value<'a>(values: &'a ContactChanges, name: &str) -> &'a str {
    match name {
        "firstname" => &values.firstname,
        "lastname" => &values.lastname,
        "title" => values.title.as_deref().unwrap_or(""),
        "email" => &values.email,
        "phone" => &values.phone,
        _ => "",
    }
}

/// The edit form. `errors` are `(field, message)` pairs from validation.
pub fn contact_form(
    sfid: &str,
    values: &ContactChanges,
    errors: &[(String, String)],
    csrf_token: &str,
    flashes: &[FlashMessage],
) -> String {
    let mut inputs = String::new();
    for (name, label, kind) in FIELDS {
        let field_errors: Vec<&str> = errors
            .iter()
            .filter(|(f, _)| f == name)
            .map(|(_, m)| m.as_str())
            .collect();
        let invalid = if field_errors.is_empty() { "" } else { " is-invalid" };

        let _ = write!(
            inputs,
            "<div class=\"form-group\">\n\
             <label for=\"{name}\">{label}</label>\n\
             <input class=\"form-control{invalid}\" id=\"{name}\" name=\"{name}\" type=\"{kind}\" value=\"{value}\">\n",
            value = escape(field_value(values, name)),
        );
        for m in field_errors {
            let _ = writeln!(inputs, "<div class=\"invalid-feedback\">{}</div>", escape(m));
        }
        inputs.push_str("</div>\n");
    }

    let body = format!(
        "<h1>Edit contact</h1>\n\
         <p class=\"text-muted\">Salesforce ID <code>{sfid_text}</code></p>\n\
         <form method=\"post\" action=\"{action}\">\n\
         <input type=\"hidden\" name=\"{CSRF_FIELD}\" value=\"{token}\">\n\
         {inputs}\
         <button type=\"submit\" class=\"btn btn-primary\">Save</button>\n\
         <a class=\"btn btn-link\" href=\"/\">Back to contacts</a>\n\
         </form>",
        sfid_text = escape(sfid),
        action = escape(&contact_path(sfid)),
        token = escape(csrf_token),
    );

    layout("Edit contact", flashes, &body)
}

pub fn welcome(resources_url: &str) -> String {
    let body = format!(
        "<h1>Welcome to ContactCard</h1>\n\
         <p>This app lists and edits Salesforce contacts synced by Heroku Connect, \
         but Heroku Connect has not been set up yet.</p>\n\
         <ol>\n\
         <li>Open the <a href=\"{url}\">resources page of this app</a> on the Heroku dashboard.</li>\n\
         <li>Open the Heroku Connect add-on, set up the connection and authorize your Salesforce org.</li>\n\
         <li>Create a mapping for the <code>Contact</code> object with <code>FirstName</code>, \
         <code>LastName</code>, <code>Title</code>, <code>Email</code> and <code>Phone</code>, \
         and enable writing to Salesforce.</li>\n\
         </ol>\n\
         <p>Reload this page once the first sync has finished.</p>",
        url = escape(resources_url),
    );
    layout("Welcome", &[], &body)
}

pub fn error_page(code: u16, title: &str, message: &str) -> String {
    let body = format!(
        "<h1>{code} {title}</h1>\n<p>{message}</p>\n<p><a href=\"/\">Back to contacts</a></p>",
        title = escape(title),
        message = escape(message),
    );
    layout(title, &[], &body)
}
