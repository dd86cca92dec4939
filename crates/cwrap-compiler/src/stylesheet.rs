//! Stylesheet assembly.
//!
//! Output order is fixed: `@font-face` blocks, the `:root` block, classroom
//! rules, collected selector rules, then one `@media` block per query.

use std::fmt::Write;

use cwrap_skeleton::{ClassroomRule, Font, Skeleton};

use crate::selectors::StyleAccumulator;

/// Render the stylesheet for a skeleton from its collected styles.
///
/// Classroom media queries are merged into `styles` under the rule's
/// selector before the media blocks are written.
pub fn render_stylesheet(skeleton: &Skeleton, mut styles: StyleAccumulator) -> String {
    let mut css = String::new();

    for font in &skeleton.fonts {
        css.push_str(&font_face(font));
    }

    if !skeleton.root.is_empty() {
        css.push_str(":root {\n");
        for (name, value) in &skeleton.root {
            let _ = writeln!(css, "{}: {};", name, value);
        }
        css.push_str("}\n");
    }

    for rule in &skeleton.classroom {
        css.push_str(&classroom_rule(rule, &mut styles));
    }

    for (selector, style) in styles.rules() {
        let _ = writeln!(css, "{} {{{}}}", selector, style);
    }

    for (query, rules) in styles.media_queries() {
        let _ = writeln!(css, "@media ({}) {{", query);
        for (selector, style) in rules {
            let _ = writeln!(css, "  {} {{{}}}", selector, style);
        }
        css.push_str("}\n");
    }

    css
}

fn font_face(font: &Font) -> String {
    let mut block = String::from("@font-face {\n");
    let _ = writeln!(block, "    font-family: \"{}\";", font.font_family);
    let _ = writeln!(block, "    src: \"{}\";", font.src);
    if let Some(display) = &font.font_display {
        let _ = writeln!(block, "    font-display: {};", display);
    }
    block.push_str("}\n");
    block
}

fn classroom_rule(rule: &ClassroomRule, styles: &mut StyleAccumulator) -> String {
    let selector = rule.selector();

    for query in &rule.media_queries {
        styles.insert_media(query.query.as_str(), selector.as_str(), query.style.as_str());
    }

    format!("{} {{{}}}\n", selector, rule.style)
}
