use crate::util::html::escape;
use crate::util::jwt::Claims;

/// Who is looking at a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: String,
    pub name: String,
    pub is_admin: bool,
}

impl From<&Claims> for Viewer {
    fn from(claims: &Claims) -> Self {
        Viewer {
            user_id: claims.user_id().to_string(),
            name: claims.name.clone(),
            is_admin: claims.is_admin(),
        }
    }
}

impl Viewer {
    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

fn nav(viewer: Option<&Viewer>) -> String {
    let mut links = String::from(
        r#"<a href="/">Home</a><a href="/browse">Browse</a><a href="/requests">Requests</a><a href="/upgrade">Plans</a>"#,
    );
    match viewer {
        Some(viewer) => {
            links.push_str(r#"<a href="/inbox">Inbox</a><a href="/dashboard">Dashboard</a>"#);
            if viewer.is_admin {
                links.push_str(r#"<a href="/admin">Admin</a>"#);
            }
            links.push_str(r#"<form method="post" action="/logout" class="inline"><button type="submit" class="link">Logout</button></form>"#);
        }
        None => links.push_str(r#"<a href="/login">Login</a><a href="/signup" class="btn btn-primary">Sign Up</a>"#),
    }
    format!(r#"<nav class="site-nav"><a href="/" class="brand">Kabale Market</a><div class="links">{links}</div></nav>"#)
}

/// Wrap a page body in the shared document shell.
pub fn page(title: &str, viewer: Option<&Viewer>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Kabale Market</title>
<link rel="stylesheet" href="/static/style.css">
<script src="/static/app.js" defer></script>
</head>
<body>
{nav}
<main class="container">
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = nav(viewer),
        body = body
    )
}

/// A page that only carries one message, e.g. not found or access denied.
pub fn message_page(title: &str, viewer: Option<&Viewer>, message: &str) -> String {
    page(
        title,
        viewer,
        &format!(r#"<p class="text-center text-error-color p-8">{}</p>"#, escape(message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_depends_on_viewer() {
        let anonymous = page("Home", None, "");
        assert!(anonymous.contains(r#"href="/login""#));
        assert!(!anonymous.contains(r#"href="/dashboard""#));

        let admin = Viewer {
            user_id: "u1".into(),
            name: "Amina".into(),
            is_admin: true,
        };
        let html = page("Home", Some(&admin), "");
        assert!(html.contains(r#"href="/admin""#));
        assert!(html.contains("Logout"));
    }

    #[test]
    fn message_is_escaped() {
        let html = message_page("Oops", None, "<b>bad</b>");
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
    }
}
