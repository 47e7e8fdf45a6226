//! Login, signup and account-recovery pages. Forms post url-encoded bodies
//! back to the page routes, which re-render with an error or redirect.

use crate::util::html::escape;
use crate::view::layout::page;

/// Values echoed back into a form after a failed submit.
#[derive(Debug, Default)]
pub struct FormState<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub error: Option<&'a str>,
    pub notice: Option<&'a str>,
}

fn feedback(state: &FormState<'_>) -> String {
    let mut out = String::new();
    if let Some(error) = state.error {
        out.push_str(&format!(r#"<p id="error-message" class="text-error-color">{}</p>"#, escape(error)));
    }
    if let Some(notice) = state.notice {
        out.push_str(&format!(r#"<p id="notice-message" class="text-success-color">{}</p>"#, escape(notice)));
    }
    out
}

fn auth_card(title: &str, inner: &str) -> String {
    page(title, None, &format!(r#"<div class="auth-card">{inner}</div>"#))
}

pub fn login(state: &FormState<'_>) -> String {
    auth_card(
        "Login",
        &format!(
            r#"<h1>Login</h1>
{feedback}
<form id="login-form" method="post" action="/login">
<div class="form-group"><input type="email" name="email" value="{email}" placeholder="Email" required></div>
<div class="form-group"><input type="password" name="password" placeholder="Password" required></div>
<button type="submit" class="btn btn-primary w-full">Login</button>
</form>
<p><a href="/forgot-password">Forgot your password?</a></p>
<p>Don't have an account? <a href="/signup">Sign up</a></p>"#,
            feedback = feedback(state),
            email = escape(state.email),
        ),
    )
}

pub fn signup(state: &FormState<'_>) -> String {
    auth_card(
        "Sign Up",
        &format!(
            r#"<h1>Create Account</h1>
{feedback}
<form id="signup-form" method="post" action="/signup">
<div class="form-group"><input type="text" name="name" value="{name}" placeholder="Full Name" required></div>
<div class="form-group"><input type="email" name="email" value="{email}" placeholder="Email" required></div>
<div class="form-group"><input type="password" name="password" placeholder="Password (at least 6 characters)" required></div>
<button type="submit" class="btn btn-primary w-full">Create Account</button>
</form>
<p>Already have an account? <a href="/login">Log in</a></p>"#,
            feedback = feedback(state),
            name = escape(state.name),
            email = escape(state.email),
        ),
    )
}

pub fn forgot_password(state: &FormState<'_>) -> String {
    auth_card(
        "Forgot Password",
        &format!(
            r#"<h1>Reset your password</h1>
{feedback}
<form method="post" action="/forgot-password">
<div class="form-group"><input type="email" name="email" value="{email}" placeholder="Email" required></div>
<button type="submit" class="btn btn-primary w-full">Send reset link</button>
</form>
<p><a href="/login">Back to login</a></p>"#,
            feedback = feedback(state),
            email = escape(state.email),
        ),
    )
}

pub fn reset_password(token: &str, state: &FormState<'_>) -> String {
    auth_card(
        "Choose a New Password",
        &format!(
            r#"<h1>Choose a new password</h1>
{feedback}
<form method="post" action="/reset-password">
<input type="hidden" name="token" value="{token}">
<div class="form-group"><input type="password" name="new_password" placeholder="New password" required></div>
<button type="submit" class="btn btn-primary w-full">Update password</button>
</form>"#,
            feedback = feedback(state),
            token = escape(token),
        ),
    )
}

pub fn verify_email_result(verified: bool, message: &str) -> String {
    let class = if verified { "text-success-color" } else { "text-error-color" };
    auth_card(
        "Email Verification",
        &format!(
            r#"<h1>Email Verification</h1>
<p class="{class}">{message}</p>
<p><a href="/dashboard" class="btn btn-primary">Go to Dashboard</a></p>"#,
            message = escape(message),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_echoes_values_escaped() {
        let html = signup(&FormState {
            name: "\"Bob\"",
            email: "bob@example.com",
            error: Some("Password must be at least 6 characters."),
            notice: None,
        });
        assert!(html.contains("&quot;Bob&quot;"));
        assert!(html.contains("Password must be at least 6 characters."));
    }

    #[test]
    fn reset_form_carries_token() {
        let html = reset_password("abc123", &FormState::default());
        assert!(html.contains(r#"name="token" value="abc123""#));
    }
}
