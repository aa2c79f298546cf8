// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use minijinja::{default_auto_escape_callback, Environment, Value};

pub trait TemplateEngine: Send + Sync {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error>;
}

pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(embedded_template_loader);
        Self { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template_name)?;
        tmpl.render(context)
    }
}

/// Template loader for minijinja that loads from embedded sources
fn embedded_template_loader(name: &str) -> Result<Option<String>, minijinja::Error> {
    let template_content = match name {
        "base.html" => Some(include_str!("pages/templates/base.html")),
        "welcome.html" => Some(include_str!("pages/templates/welcome.html")),
        "register.html" => Some(include_str!("pages/templates/register.html")),
        "login.html" => Some(include_str!("pages/templates/login.html")),
        "dashboard.html" => Some(include_str!("pages/templates/dashboard.html")),
        "change_password.html" => Some(include_str!("pages/templates/change_password.html")),
        "reset_password.html" => Some(include_str!("pages/templates/reset_password.html")),
        "profile.html" => Some(include_str!("pages/templates/profile.html")),
        "feedback.html" => Some(include_str!("pages/templates/feedback.html")),
        "report_bug.html" => Some(include_str!("pages/templates/report_bug.html")),
        "delete_account.html" => Some(include_str!("pages/templates/delete_account.html")),
        _ => None,
    };

    Ok(template_content.map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn all_page_templates_load() {
        let engine = MiniJinjaEngine::new();
        for name in [
            "welcome.html",
            "register.html",
            "login.html",
            "dashboard.html",
            "change_password.html",
            "reset_password.html",
            "profile.html",
            "feedback.html",
            "report_bug.html",
            "delete_account.html",
        ] {
            let rendered = engine.render(name, context! {}).expect(name);
            assert!(rendered.contains("</html>"), "{} has no closing tag", name);
        }
    }

    #[test]
    fn unknown_template_is_an_error() {
        let engine = MiniJinjaEngine::new();
        assert!(engine.render("missing.html", context! {}).is_err());
    }

    #[test]
    fn error_text_is_escaped() {
        let engine = MiniJinjaEngine::new();
        let rendered = engine
            .render(
                "login.html",
                context! { error => "<script>alert(1)</script>" },
            )
            .expect("render");
        assert!(!rendered.contains("<script>alert(1)</script>"));
        assert!(rendered.contains("&lt;script&gt;"));
    }
}
