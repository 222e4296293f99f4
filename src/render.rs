//! HTML for the index, detail and error pages.

use crate::models::{IndexProps, Todo};
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:60rem}\
.grid{display:flex;flex-wrap:wrap;gap:1rem}\
.card{border:1px solid #eaeaea;border-radius:10px;padding:1rem;width:16rem;color:inherit;text-decoration:none}\
.error-boundary{border:1px solid #e74c3c;color:#e74c3c;padding:.5rem;margin-bottom:1rem}\
fieldset{margin-bottom:1rem}";

/// What the authentication gate around the form should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate<'a> {
    SignedIn { username: &'a str },
    SignedOut { sign_in_url: Option<&'a str> },
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main class=\"container\">\n{body}</main>\n</body>\n</html>\n",
        escape_html(title)
    )
}

/// Index page: one link card per todo, then the gated creation form.
/// `error` is shown by the error boundary above the form.
pub fn index_page(props: &IndexProps, gate: Gate<'_>, error: Option<&str>) -> String {
    let mut body = String::new();

    body.push_str("<div class=\"grid\">\n");
    for todo in &props.todos {
        let _ = writeln!(
            body,
            "<a class=\"card\" href=\"{}\"><h3>{}</h3><p>{}</p></a>",
            escape_html(&todo.detail_path()),
            escape_html(&todo.name),
            escape_html(&todo.description)
        );
    }
    body.push_str("</div>\n");

    body.push_str("<section class=\"auth-gate\">\n");
    if let Some(message) = error {
        let _ = writeln!(
            body,
            "<div class=\"error-boundary\" role=\"alert\">{}</div>",
            escape_html(message)
        );
    }
    match gate {
        Gate::SignedIn { username } => {
            let _ = writeln!(
                body,
                "<p class=\"signed-in\">Signed in as {}</p>",
                escape_html(username)
            );
            body.push_str(FORM);
        }
        Gate::SignedOut {
            sign_in_url: Some(url),
        } => {
            let _ = writeln!(
                body,
                "<p class=\"sign-in\"><a href=\"{}\">Sign in</a> to create a todo.</p>",
                escape_html(url)
            );
        }
        Gate::SignedOut { sign_in_url: None } => {
            body.push_str("<p class=\"sign-in\">Sign in to create a todo.</p>\n");
        }
    }
    body.push_str("</section>\n");

    layout("Todos", &body)
}

const FORM: &str = "<form method=\"post\" action=\"/\">
<fieldset>
<legend>Title</legend>
<input placeholder=\"Insert a title\" name=\"title\">
</fieldset>
<fieldset>
<legend>Content</legend>
<textarea placeholder=\"What you want to do?\" name=\"content\"></textarea>
</fieldset>
<button type=\"submit\">Create Todo</button>
</form>
";

pub fn detail_page(todo: &Todo) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape_html(&todo.name));
    let _ = writeln!(body, "<p>{}</p>", escape_html(&todo.description));
    if let Some(created_at) = todo.created_at {
        let _ = writeln!(
            body,
            "<p class=\"created\">Created {}</p>",
            created_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    body.push_str("<p><a href=\"/\">Back to all todos</a></p>\n");
    layout(&todo.name, &body)
}

pub fn not_found_page() -> String {
    layout(
        "Not found",
        "<h1>404</h1>\n<p>This todo could not be found.</p>\n<p><a href=\"/\">Back to all todos</a></p>\n",
    )
}

pub fn forbidden_page() -> String {
    layout(
        "Forbidden",
        "<h1>403</h1>\n<p>This form must be submitted from this site.</p>\n<p><a href=\"/\">Back to all todos</a></p>\n",
    )
}

pub fn error_page() -> String {
    layout(
        "Error",
        "<h1>500</h1>\n<p>An error occurred on the server.</p>\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_index_page_cards() {
        let props = IndexProps::new(vec![
            Todo::new("abc123", "Buy milk", "2% milk"),
            Todo::new("x", "<script>", "a & b"),
        ])
        .unwrap();
        let html = index_page(&props, Gate::SignedOut { sign_in_url: None }, None);

        assert!(html.contains(
            "<a class=\"card\" href=\"/todo/abc123\"><h3>Buy milk</h3><p>2% milk</p></a>"
        ));
        assert!(html.contains("<h3>&lt;script&gt;</h3><p>a &amp; b</p>"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn test_index_page_signed_in_shows_form() {
        let html = index_page(
            &IndexProps::default(),
            Gate::SignedIn { username: "alice" },
            Some("Invalid input"),
        );
        assert!(html.contains("name=\"title\""));
        assert!(html.contains("<textarea placeholder=\"What you want to do?\" name=\"content\">"));
        assert!(html.contains("Create Todo"));
        assert!(html.contains("role=\"alert\">Invalid input</div>"));
    }

    #[test]
    fn test_sign_in_link() {
        let html = index_page(
            &IndexProps::default(),
            Gate::SignedOut {
                sign_in_url: Some("https://auth.example.com/login?a=1&b=2"),
            },
            None,
        );
        assert!(html.contains("href=\"https://auth.example.com/login?a=1&amp;b=2\""));
    }

    #[test]
    fn test_detail_page() {
        let html = detail_page(&Todo::new("1", "Buy milk", "2% milk"));
        assert!(html.contains("<title>Buy milk</title>"));
        assert!(html.contains("<h1>Buy milk</h1>"));
        assert!(html.contains("<p>2% milk</p>"));
    }
}
